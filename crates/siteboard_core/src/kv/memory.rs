use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{KeyValueStore, Slot, StoreError, StoreResult};

/// In-memory slot store for the ephemeral session tier and for tests.
///
/// Clones share the same map, so a clone handed to another component sees
/// every write.
#[derive(Clone, Debug, Default)]
pub struct MemoryKvStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

/// A live slot, or the tombstone a removal leaves behind.
#[derive(Clone, Debug)]
struct Entry {
    payload: Option<String>,
    version: u64,
}

impl Entry {
    fn live_version(&self) -> u64 {
        if self.payload.is_some() {
            self.version
        } else {
            0
        }
    }
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether a slot currently exists for `key`.
    pub fn contains(&self, key: &str) -> StoreResult<bool> {
        Ok(self.read_slot(key)?.is_some())
    }

    /// Drops every slot, like closing the browser tab that owned them.
    pub fn clear(&self) -> StoreResult<()> {
        for entry in self.lock()?.values_mut() {
            if entry.payload.take().is_some() {
                entry.version += 1;
            }
        }
        Ok(())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, HashMap<String, Entry>>> {
        self.entries.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl KeyValueStore for MemoryKvStore {
    fn read_slot(&self, key: &str) -> StoreResult<Option<Slot>> {
        let entries = self.lock()?;
        let slot = entries.get(key).and_then(|entry| {
            entry.payload.as_ref().map(|payload| Slot {
                payload: payload.clone(),
                version: entry.version,
            })
        });
        Ok(slot)
    }

    fn write_slot(
        &self,
        key: &str,
        payload: &str,
        expected_version: Option<u64>,
    ) -> StoreResult<u64> {
        let mut entries = self.lock()?;
        let (stored, found) = entries
            .get(key)
            .map_or((0, 0), |entry| (entry.version, entry.live_version()));
        if let Some(expected) = expected_version {
            if expected != found {
                return Err(StoreError::Conflict {
                    key: key.to_string(),
                    expected,
                    found,
                });
            }
        }

        let version = stored + 1;
        entries.insert(
            key.to_string(),
            Entry {
                payload: Some(payload.to_string()),
                version,
            },
        );
        Ok(version)
    }

    fn remove_slot(&self, key: &str) -> StoreResult<()> {
        if let Some(entry) = self.lock()?.get_mut(key) {
            if entry.payload.take().is_some() {
                entry.version += 1;
            }
        }
        Ok(())
    }
}
