//! Versioned key-value slot storage.
//!
//! # Responsibility
//! - Define the slot contract shared by the durable and ephemeral tiers.
//! - Detect lost updates between independent writers via slot versions.
//!
//! # Invariants
//! - An absent slot (never written, or removed) is expected as version 0.
//! - Every successful write or removal advances the stored counter by one.
//!   Removal leaves a tombstone, so a key's versions never restart and a
//!   snapshot taken before a remove-and-rewrite stays stale.
//! - A conditional write against a stale version changes nothing.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryKvStore;
pub use sqlite::SqliteKvStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// One persisted blob and the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub payload: String,
    pub version: u64,
}

#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Another writer advanced the slot since the caller's snapshot.
    Conflict {
        key: String,
        expected: u64,
        found: u64,
    },
    /// The in-memory map lock was poisoned by a panicking holder.
    Poisoned,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Conflict {
                key,
                expected,
                found,
            } => write!(
                f,
                "slot `{key}` changed concurrently: expected version {expected}, found {found}"
            ),
            Self::Poisoned => write!(f, "memory store lock poisoned"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Conflict { .. } | Self::Poisoned => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Synchronous slot storage.
pub trait KeyValueStore {
    /// Reads one slot, `None` when the key was never written or was removed.
    fn read_slot(&self, key: &str) -> StoreResult<Option<Slot>>;

    /// Writes one slot and returns its new version.
    ///
    /// `expected_version = None` overwrites unconditionally. `Some(v)` only
    /// writes when the stored version is still `v` and fails with
    /// [`StoreError::Conflict`] otherwise.
    fn write_slot(&self, key: &str, payload: &str, expected_version: Option<u64>)
        -> StoreResult<u64>;

    /// Removes one slot, keeping its version counter. Removing an absent
    /// slot succeeds and changes nothing.
    fn remove_slot(&self, key: &str) -> StoreResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn read_slot(&self, key: &str) -> StoreResult<Option<Slot>> {
        (**self).read_slot(key)
    }

    fn write_slot(
        &self,
        key: &str,
        payload: &str,
        expected_version: Option<u64>,
    ) -> StoreResult<u64> {
        (**self).write_slot(key, payload, expected_version)
    }

    fn remove_slot(&self, key: &str) -> StoreResult<()> {
        (**self).remove_slot(key)
    }
}
