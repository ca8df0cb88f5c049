//! Project use-case service.
//!
//! # Invariants
//! - Administrators see every project.
//! - Any other identity sees only projects listing its id in
//!   `assigned_fundis`.
//! - Visibility never changes what is persisted.

use crate::model::identity::Identity;
use crate::model::project::Project;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::RepoResult;

/// Filters `projects` down to those visible to `identity`.
pub fn visible_projects(identity: &Identity, projects: Vec<Project>) -> Vec<Project> {
    if identity.is_admin() {
        return projects;
    }
    projects
        .into_iter()
        .filter(|project| project.is_assigned_to(&identity.id))
        .collect()
}

/// Use-case service wrapper for project screens.
pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists the projects `identity` may select.
    pub fn visible_for(&self, identity: &Identity) -> RepoResult<Vec<Project>> {
        Ok(visible_projects(identity, self.repo.list_projects()?))
    }

    /// Loads one project if it exists and is visible to `identity`.
    pub fn open_for(&self, identity: &Identity, id: &str) -> RepoResult<Option<Project>> {
        Ok(self
            .repo
            .get_project(id)?
            .filter(|project| identity.is_admin() || project.is_assigned_to(&identity.id)))
    }

    pub fn create_project(&self, project: &Project) -> RepoResult<()> {
        self.repo.create_project(project)
    }

    pub fn update_project(&self, project: &Project) -> RepoResult<bool> {
        self.repo.update_project(project)
    }

    pub fn delete_project(&self, id: &str) -> RepoResult<bool> {
        self.repo.delete_project(id)
    }
}
