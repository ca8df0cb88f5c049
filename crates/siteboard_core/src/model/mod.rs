//! Domain records persisted in SiteBoard slots.
//!
//! # Responsibility
//! - Define the serialized shape of every collection record.
//! - Keep timestamp refresh and presence checks next to the data they guard.
//!
//! # Invariants
//! - Records serialize with camelCase field names.
//! - `created_at` is set once; `updated_at` never moves backwards.

use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod fundi;
pub mod identity;
pub mod notification;
pub mod project;
pub mod user;

/// Presence-check failure for a required text field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "`{}` must not be blank", self.field)
    }
}

impl Error for ValidationError {}

pub(crate) fn require_present(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError { field });
    }
    Ok(())
}

/// Returns a fresh `updated_at` that is never earlier than `previous`.
pub(crate) fn refreshed_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    Utc::now().max(previous)
}
