//! Collection repositories over versioned key-value slots.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per collection.
//! - Keep slot serialization details inside [`record_store`].
//!
//! # Invariants
//! - Every mutation is snapshot, transform in memory, then one conditional
//!   commit. A concurrent writer surfaces as a conflict, never a lost update.
//! - Failed operations validate before committing and leave slots untouched.

use crate::kv::StoreError;
use crate::model::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod fundi_repo;
pub mod notification_repo;
pub mod project_repo;
pub mod record_store;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for collection reads and mutations.
#[derive(Debug)]
pub enum RepoError {
    Store(StoreError),
    Validation(ValidationError),
    Serialization {
        collection: &'static str,
        source: serde_json::Error,
    },
    /// The slot exists but its blob is not a valid record sequence.
    Deserialization {
        collection: &'static str,
        source: serde_json::Error,
    },
    DuplicateEmail(String),
    DuplicateId(String),
    NotFound(String),
}

impl RepoError {
    /// Whether this error is a stale-snapshot write rejection.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Store(StoreError::Conflict { .. }))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Serialization { collection, source } => {
                write!(f, "failed to serialize `{collection}`: {source}")
            }
            Self::Deserialization { collection, source } => {
                write!(f, "invalid persisted `{collection}` data: {source}")
            }
            Self::DuplicateEmail(email) => write!(f, "email already exists: {email}"),
            Self::DuplicateId(id) => write!(f, "record id already exists: {id}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Serialization { source, .. } | Self::Deserialization { source, .. } => {
                Some(source)
            }
            Self::DuplicateEmail(_) | Self::DuplicateId(_) | Self::NotFound(_) => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}
