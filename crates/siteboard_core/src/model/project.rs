//! Project record.
//!
//! # Invariants
//! - `id` is unique within the `projects` collection.
//! - `created_at` is immutable after creation.

use super::fundi::FundiRef;
use super::{require_present, ValidationError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed id of the project seeded into an absent collection.
pub const DEFAULT_PROJECT_ID: &str = "default-project";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    Pending,
    Ongoing,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProjectPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: ProjectStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<ProjectPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub assigned_fundis: Vec<FundiRef>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub files: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates a pending project with a generated id.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), name, description)
    }

    /// Creates a pending project with a caller-provided id.
    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            status: ProjectStatus::Pending,
            priority: None,
            start_date: None,
            end_date: None,
            assigned_fundis: Vec::new(),
            images: Vec::new(),
            files: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The sample record materialized the first time `projects` is read.
    pub fn default_seed() -> Self {
        let mut project = Self::with_id(
            DEFAULT_PROJECT_ID,
            "Sample Construction Project",
            "A sample construction project for testing purposes.",
        );
        project.status = ProjectStatus::Ongoing;
        project
    }

    /// Whether `fundi_id` appears in `assigned_fundis`.
    pub fn is_assigned_to(&self, fundi_id: &str) -> bool {
        self.assigned_fundis.iter().any(|fundi| fundi.id == fundi_id)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_present("id", &self.id)?;
        require_present("name", &self.name)
    }
}
