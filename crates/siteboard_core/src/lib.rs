//! Core data access and session logic for the SiteBoard dashboard.
//! This crate is the single source of truth for collection invariants.

pub mod config;
pub mod db;
pub mod kv;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;

pub use config::{ConfigError, CoreConfig};
pub use kv::{KeyValueStore, MemoryKvStore, Slot, SqliteKvStore, StoreError, StoreResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::fundi::{AvailabilityStatus, Fundi, FundiRef, PaymentMode, SkillCategory};
pub use model::identity::{Identity, IdentityRole};
pub use model::notification::{Notification, NotificationCategory};
pub use model::project::{Project, ProjectPriority, ProjectStatus, DEFAULT_PROJECT_ID};
pub use model::user::{Permissions, User, UserForm, UserRole, UserStatus};
pub use model::ValidationError;
pub use repo::fundi_repo::{FundiFilter, FundiRepository, KvFundiRepository};
pub use repo::notification_repo::{KvNotificationRepository, NotificationRepository};
pub use repo::project_repo::{KvProjectRepository, ProjectRepository};
pub use repo::record_store::{Record, RecordStore, Snapshot};
pub use repo::user_repo::{KvUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::project_service::{visible_projects, ProjectService};
pub use session::credentials::{CredentialVerifier, StaticCredentialVerifier};
pub use session::route::{Route, RouteDecision};
pub use session::{
    ProfileUpdate, SessionError, SessionGate, SessionResult, SessionState, StorageTier,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
