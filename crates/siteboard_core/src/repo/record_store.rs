//! Generic whole-collection persistence over one named slot.
//!
//! # Responsibility
//! - Serialize a record sequence as one JSON array per collection.
//! - Expose snapshot/commit so callers can detect interleaved writers.
//!
//! # Invariants
//! - An absent slot loads as an empty sequence at version 0.
//! - A present but malformed blob fails with `RepoError::Deserialization`
//!   and is never overwritten implicitly.
//! - Insertion order is preserved across load/commit.

use crate::kv::KeyValueStore;
use crate::repo::{RepoError, RepoResult};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// Record with a stable string id, unique within its collection.
pub trait Record: Serialize + DeserializeOwned + Clone {
    fn record_id(&self) -> &str;
}

/// Records read at one slot version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<T> {
    pub records: Vec<T>,
    /// Slot version the records were read at; 0 when the slot was absent.
    pub version: u64,
}

impl<T: Record> Snapshot<T> {
    /// Whether the slot existed when the snapshot was taken.
    pub fn exists(&self) -> bool {
        self.version > 0
    }

    pub fn find(&self, id: &str) -> Option<&T> {
        self.records.iter().find(|record| record.record_id() == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|record| record.record_id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }
}

/// Typed view over one collection slot.
pub struct RecordStore<S, T> {
    store: S,
    collection: &'static str,
    _records: PhantomData<fn() -> T>,
}

impl<S: KeyValueStore, T: Record> RecordStore<S, T> {
    pub fn new(store: S, collection: &'static str) -> Self {
        Self {
            store,
            collection,
            _records: PhantomData,
        }
    }

    pub fn collection(&self) -> &'static str {
        self.collection
    }

    /// Reads the collection together with its slot version.
    pub fn snapshot(&self) -> RepoResult<Snapshot<T>> {
        let Some(slot) = self.store.read_slot(self.collection)? else {
            return Ok(Snapshot {
                records: Vec::new(),
                version: 0,
            });
        };

        let records = serde_json::from_str::<Vec<T>>(&slot.payload).map_err(|source| {
            RepoError::Deserialization {
                collection: self.collection,
                source,
            }
        })?;
        Ok(Snapshot {
            records,
            version: slot.version,
        })
    }

    /// Returns the persisted records, or an empty sequence when absent.
    pub fn load(&self) -> RepoResult<Vec<T>> {
        Ok(self.snapshot()?.records)
    }

    /// Overwrites the whole collection regardless of its current version.
    pub fn replace_all(&self, records: &[T]) -> RepoResult<u64> {
        let payload = self.encode(records)?;
        let version = self.store.write_slot(self.collection, &payload, None)?;
        debug!(
            "event=collection_write module=repo status=ok collection={} mode=replace records={} version={version}",
            self.collection,
            records.len()
        );
        Ok(version)
    }

    /// Writes `records` only if the slot is still at `snapshot_version`.
    ///
    /// # Errors
    /// - `RepoError::Store(StoreError::Conflict)` when another writer
    ///   committed in between. The slot keeps the other writer's data.
    pub fn commit(&self, snapshot_version: u64, records: &[T]) -> RepoResult<u64> {
        let payload = self.encode(records)?;
        let version = self
            .store
            .write_slot(self.collection, &payload, Some(snapshot_version))?;
        debug!(
            "event=collection_write module=repo status=ok collection={} mode=commit records={} version={version}",
            self.collection,
            records.len()
        );
        Ok(version)
    }

    fn encode(&self, records: &[T]) -> RepoResult<String> {
        serde_json::to_string(records).map_err(|source| RepoError::Serialization {
            collection: self.collection,
            source,
        })
    }
}
