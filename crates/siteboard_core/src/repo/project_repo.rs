//! Project repository contracts and slot-backed implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `projects` collection.
//! - Materialize the default project the first time the slot is absent.
//!
//! # Invariants
//! - Seeding happens only for an absent slot. An existing empty collection
//!   stays empty, so deleting the default project sticks.
//! - `update` keeps the stored `created_at` and never moves `updated_at`
//!   backwards.
//! - The repository applies no access control; see
//!   `service::project_service` for the visibility rule.

use crate::kv::KeyValueStore;
use crate::model::project::Project;
use crate::model::refreshed_timestamp;
use crate::repo::record_store::{Record, RecordStore, Snapshot};
use crate::repo::{RepoError, RepoResult};
use log::{info, warn};

/// Slot name of the projects collection.
pub const PROJECTS_COLLECTION: &str = "projects";

impl Record for Project {
    fn record_id(&self) -> &str {
        &self.id
    }
}

/// Repository interface for project CRUD operations.
pub trait ProjectRepository {
    /// Lists all projects in insertion order, seeding on first access.
    fn list_projects(&self) -> RepoResult<Vec<Project>>;
    fn get_project(&self, id: &str) -> RepoResult<Option<Project>>;
    /// Appends a project with a caller-generated id.
    fn create_project(&self, project: &Project) -> RepoResult<()>;
    /// Replaces the record with a matching id. Returns `false` when absent.
    fn update_project(&self, project: &Project) -> RepoResult<bool>;
    /// Removes the record with a matching id. Returns `false` when absent.
    fn delete_project(&self, id: &str) -> RepoResult<bool>;
}

/// Project repository over a key-value slot store.
pub struct KvProjectRepository<S> {
    records: RecordStore<S, Project>,
}

impl<S: KeyValueStore> KvProjectRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            records: RecordStore::new(store, PROJECTS_COLLECTION),
        }
    }

    fn seeded_snapshot(&self) -> RepoResult<Snapshot<Project>> {
        let snapshot = self.records.snapshot()?;
        if snapshot.exists() {
            return Ok(snapshot);
        }

        let records = vec![Project::default_seed()];
        let version = self.records.commit(snapshot.version, &records)?;
        info!("event=project_seed module=repo status=ok collection={PROJECTS_COLLECTION}");
        Ok(Snapshot { records, version })
    }
}

impl<S: KeyValueStore> ProjectRepository for KvProjectRepository<S> {
    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        Ok(self.seeded_snapshot()?.records)
    }

    fn get_project(&self, id: &str) -> RepoResult<Option<Project>> {
        Ok(self.seeded_snapshot()?.find(id).cloned())
    }

    fn create_project(&self, project: &Project) -> RepoResult<()> {
        project.validate()?;

        let mut snapshot = self.seeded_snapshot()?;
        if snapshot.contains(&project.id) {
            warn!(
                "event=project_create module=repo status=error error_code=duplicate_id id={}",
                project.id
            );
            return Err(RepoError::DuplicateId(project.id.clone()));
        }

        snapshot.records.push(project.clone());
        self.records.commit(snapshot.version, &snapshot.records)?;
        info!(
            "event=project_create module=repo status=ok id={}",
            project.id
        );
        Ok(())
    }

    fn update_project(&self, project: &Project) -> RepoResult<bool> {
        project.validate()?;

        let mut snapshot = self.seeded_snapshot()?;
        let Some(index) = snapshot.position(&project.id) else {
            info!(
                "event=project_update module=repo status=noop reason=not_found id={}",
                project.id
            );
            return Ok(false);
        };

        let previous = &snapshot.records[index];
        let mut updated = project.clone();
        updated.created_at = previous.created_at;
        updated.updated_at = refreshed_timestamp(previous.updated_at.max(project.updated_at));
        snapshot.records[index] = updated;

        self.records.commit(snapshot.version, &snapshot.records)?;
        info!(
            "event=project_update module=repo status=ok id={}",
            project.id
        );
        Ok(true)
    }

    fn delete_project(&self, id: &str) -> RepoResult<bool> {
        let mut snapshot = self.seeded_snapshot()?;
        let Some(index) = snapshot.position(id) else {
            return Ok(false);
        };

        snapshot.records.remove(index);
        self.records.commit(snapshot.version, &snapshot.records)?;
        info!("event=project_delete module=repo status=ok id={id}");
        Ok(true)
    }
}
