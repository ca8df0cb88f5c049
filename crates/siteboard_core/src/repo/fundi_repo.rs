//! Fundi repository and list filtering.
//!
//! # Invariants
//! - Same id and timestamp rules as the project collection; no seeding.
//! - Filtering is read-only and never touches the slot.

use crate::kv::KeyValueStore;
use crate::model::fundi::{AvailabilityStatus, Fundi, SkillCategory};
use crate::model::refreshed_timestamp;
use crate::repo::record_store::{Record, RecordStore};
use crate::repo::{RepoError, RepoResult};
use log::info;

/// Slot name of the fundis collection.
pub const FUNDIS_COLLECTION: &str = "fundis";

impl Record for Fundi {
    fn record_id(&self) -> &str {
        &self.id
    }
}

/// Search and exact-match filters for the fundi list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FundiFilter {
    /// Case-insensitive substring of name or email. Blank matches all.
    pub search: String,
    pub skill: Option<SkillCategory>,
    pub availability: Option<AvailabilityStatus>,
}

impl FundiFilter {
    pub fn matches(&self, fundi: &Fundi) -> bool {
        let needle = self.search.trim().to_lowercase();
        let matches_search = needle.is_empty()
            || fundi.name.to_lowercase().contains(&needle)
            || fundi.email.to_lowercase().contains(&needle);
        let matches_skill = self.skill.map_or(true, |skill| fundi.skill_category == skill);
        let matches_status = self
            .availability
            .map_or(true, |status| fundi.availability_status == status);

        matches_search && matches_skill && matches_status
    }
}

/// Repository interface for fundi records.
pub trait FundiRepository {
    fn list_fundis(&self) -> RepoResult<Vec<Fundi>>;
    fn get_fundi(&self, id: &str) -> RepoResult<Option<Fundi>>;
    fn create_fundi(&self, fundi: &Fundi) -> RepoResult<()>;
    fn update_fundi(&self, fundi: &Fundi) -> RepoResult<bool>;
    fn delete_fundi(&self, id: &str) -> RepoResult<bool>;
    fn filter_fundis(&self, filter: &FundiFilter) -> RepoResult<Vec<Fundi>>;
}

/// Fundi repository over a key-value slot store.
pub struct KvFundiRepository<S> {
    records: RecordStore<S, Fundi>,
}

impl<S: KeyValueStore> KvFundiRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            records: RecordStore::new(store, FUNDIS_COLLECTION),
        }
    }
}

impl<S: KeyValueStore> FundiRepository for KvFundiRepository<S> {
    fn list_fundis(&self) -> RepoResult<Vec<Fundi>> {
        self.records.load()
    }

    fn get_fundi(&self, id: &str) -> RepoResult<Option<Fundi>> {
        Ok(self.records.snapshot()?.find(id).cloned())
    }

    fn create_fundi(&self, fundi: &Fundi) -> RepoResult<()> {
        fundi.validate()?;

        let mut snapshot = self.records.snapshot()?;
        if snapshot.contains(&fundi.id) {
            return Err(RepoError::DuplicateId(fundi.id.clone()));
        }

        snapshot.records.push(fundi.clone());
        self.records.commit(snapshot.version, &snapshot.records)?;
        info!("event=fundi_create module=repo status=ok id={}", fundi.id);
        Ok(())
    }

    fn update_fundi(&self, fundi: &Fundi) -> RepoResult<bool> {
        fundi.validate()?;

        let mut snapshot = self.records.snapshot()?;
        let Some(index) = snapshot.position(&fundi.id) else {
            return Ok(false);
        };

        let previous = &snapshot.records[index];
        let mut updated = fundi.clone();
        updated.created_at = previous.created_at;
        updated.updated_at = refreshed_timestamp(previous.updated_at.max(fundi.updated_at));
        snapshot.records[index] = updated;

        self.records.commit(snapshot.version, &snapshot.records)?;
        info!("event=fundi_update module=repo status=ok id={}", fundi.id);
        Ok(true)
    }

    fn delete_fundi(&self, id: &str) -> RepoResult<bool> {
        let mut snapshot = self.records.snapshot()?;
        let Some(index) = snapshot.position(id) else {
            return Ok(false);
        };

        snapshot.records.remove(index);
        self.records.commit(snapshot.version, &snapshot.records)?;
        info!("event=fundi_delete module=repo status=ok id={id}");
        Ok(true)
    }

    fn filter_fundis(&self, filter: &FundiFilter) -> RepoResult<Vec<Fundi>> {
        Ok(self
            .records
            .load()?
            .into_iter()
            .filter(|fundi| filter.matches(fundi))
            .collect())
    }
}
