//! Managed user record and its form payload.
//!
//! # Invariants
//! - `email` is unique across the `users` collection, compared with
//!   [`normalize_email`].
//! - `name` and `email` are never blank.

use super::{refreshed_timestamp, require_present, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Manager,
    Fundi,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Fundi => "fundi",
        }
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

/// Named permission flags, e.g. `"projects" -> true`.
pub type Permissions = BTreeMap<String, bool>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub permissions: Permissions,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update payload for the user management screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserForm {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub permissions: Permissions,
}

impl UserForm {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: UserRole) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            role,
            status: UserStatus::default(),
            phone: String::new(),
            permissions: Permissions::new(),
        }
    }

    pub fn with_permission(mut self, name: impl Into<String>, granted: bool) -> Self {
        self.permissions.insert(name.into(), granted);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_present("name", &self.name)?;
        require_present("email", &self.email)
    }
}

impl User {
    pub(crate) fn from_form(form: UserForm) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: form.name,
            email: form.email.trim().to_string(),
            role: form.role,
            status: form.status,
            phone: form.phone,
            permissions: form.permissions,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges `form` over this record, keeping `id` and `created_at`.
    pub(crate) fn apply_form(&mut self, form: UserForm) {
        self.name = form.name;
        self.email = form.email.trim().to_string();
        self.role = form.role;
        self.status = form.status;
        self.phone = form.phone;
        self.permissions = form.permissions;
        self.updated_at = refreshed_timestamp(self.updated_at);
    }

    /// Permission names whose flag is set.
    pub fn granted_permissions(&self) -> impl Iterator<Item = &str> {
        self.permissions
            .iter()
            .filter(|(_, granted)| **granted)
            .map(|(name, _)| name.as_str())
    }

    pub fn has_email(&self, email: &str) -> bool {
        normalize_email(&self.email) == normalize_email(email)
    }
}

/// Comparison form of an email address: trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
