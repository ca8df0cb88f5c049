//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `siteboard_core` linkage against a real durable store.
//! - Print deterministic `key=value` lines for quick local sanity checks.
//!
//! Usage: `siteboard_cli [path/to/siteboard.toml]`

use siteboard_core::{
    CoreConfig, FundiRepository, KvFundiRepository, KvNotificationRepository,
    KvProjectRepository, KvUserRepository, MemoryKvStore, NotificationRepository,
    ProjectRepository, SessionGate, SqliteKvStore, StaticCredentialVerifier, UserRepository,
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };
    config.init_logging()?;

    let conn = config.open_storage()?;
    let durable = SqliteKvStore::new(&conn);
    let ephemeral = MemoryKvStore::new();

    let mut gate = SessionGate::new(StaticCredentialVerifier, &durable, &ephemeral);
    gate.restore_on_startup()?;

    let notifications = KvNotificationRepository::new(&durable);
    let projects = KvProjectRepository::new(&durable);
    let users = KvUserRepository::new(&durable, &notifications);
    let fundis = KvFundiRepository::new(&durable);

    println!("siteboard_core ping={}", siteboard_core::ping());
    println!("siteboard_core version={}", siteboard_core::core_version());
    println!("session authenticated={}", gate.is_authenticated());
    println!("projects count={}", projects.list_projects()?.len());
    println!("users count={}", users.list_users()?.len());
    println!("fundis count={}", fundis.list_fundis()?.len());
    println!(
        "notifications count={} unread={}",
        notifications.list_notifications()?.len(),
        notifications.unread_count()?
    );
    log::info!("event=cli_smoke module=cli status=ok");
    Ok(())
}
