//! Fundi (skilled worker) record and the reference projects keep to it.

use super::{require_present, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillCategory {
    Plumber,
    Electrician,
    Carpenter,
    Painter,
    Mason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvailabilityStatus {
    Available,
    Busy,
    #[serde(rename = "On Leave")]
    OnLeave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMode {
    Cash,
    #[serde(rename = "Mobile Money")]
    MobileMoney,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fundi {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub skill_category: SkillCategory,
    pub availability_status: AvailabilityStatus,
    pub payment_mode: PaymentMode,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lightweight pointer stored in `Project::assigned_fundis`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundiRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl Fundi {
    /// Creates an available fundi with a generated id.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        skill_category: SkillCategory,
        payment_mode: PaymentMode,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into(),
            phone: String::new(),
            skill_category,
            availability_status: AvailabilityStatus::Available,
            payment_mode,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn to_ref(&self) -> FundiRef {
        FundiRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_present("id", &self.id)?;
        require_present("name", &self.name)?;
        require_present("email", &self.email)
    }
}
