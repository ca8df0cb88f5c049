//! User repository contracts and slot-backed implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `users` collection.
//! - Enforce email uniqueness across the collection.
//! - Emit exactly one notification per successful mutation.
//!
//! # Invariants
//! - Emails compare trimmed and case-insensitively.
//! - Validation and uniqueness checks run before any slot is written.
//! - No-op paths (missing id on delete or password reset) emit nothing.
//! - A mutation whose notification cannot be written is undone, so a failed
//!   call leaves `users` as it was.

use crate::kv::KeyValueStore;
use crate::model::notification::NotificationCategory;
use crate::model::require_present;
use crate::model::user::{User, UserForm};
use crate::repo::notification_repo::NotificationRepository;
use crate::repo::record_store::{Record, RecordStore};
use crate::repo::{RepoError, RepoResult};
use log::{error, info, warn};

/// Slot name of the users collection.
pub const USERS_COLLECTION: &str = "users";

impl Record for User {
    fn record_id(&self) -> &str {
        &self.id
    }
}

/// Repository interface for managed users.
pub trait UserRepository {
    fn list_users(&self) -> RepoResult<Vec<User>>;
    fn get_user(&self, id: &str) -> RepoResult<Option<User>>;
    /// Creates a user from form data.
    ///
    /// # Errors
    /// - `Validation` when name or email is blank.
    /// - `DuplicateEmail` when another user already has the email.
    fn create_user(&self, form: UserForm) -> RepoResult<User>;
    /// Merges form data over an existing user.
    ///
    /// # Errors
    /// - `NotFound` when `id` does not exist.
    /// - `Validation` / `DuplicateEmail` as for create.
    fn update_user(&self, id: &str, form: UserForm) -> RepoResult<User>;
    /// Removes a user. Returns the removed record, `None` when absent.
    fn delete_user(&self, id: &str) -> RepoResult<Option<User>>;
    /// Records a password reset request. No credential material is stored.
    ///
    /// Returns whether the user existed.
    fn reset_password(&self, id: &str, new_password: &str) -> RepoResult<bool>;
}

/// User repository over a key-value slot store, notifying through `N`.
pub struct KvUserRepository<S, N> {
    records: RecordStore<S, User>,
    notifications: N,
}

impl<S: KeyValueStore, N: NotificationRepository> KvUserRepository<S, N> {
    pub fn new(store: S, notifications: N) -> Self {
        Self {
            records: RecordStore::new(store, USERS_COLLECTION),
            notifications,
        }
    }

    fn notify(&self, title: &str, message: String) -> RepoResult<()> {
        self.notifications
            .add_notification(title, &message, NotificationCategory::Task)?;
        Ok(())
    }

    /// Commits `updated` over the snapshot and emits its notification.
    ///
    /// The notifications collection is read first so a malformed blob fails
    /// before `users` is touched. If the notification write itself fails,
    /// `original` is committed back over the new version.
    fn commit_with_notice(
        &self,
        snapshot_version: u64,
        original: &[User],
        updated: &[User],
        title: &str,
        message: String,
    ) -> RepoResult<()> {
        self.notifications.list_notifications()?;
        let committed = self.records.commit(snapshot_version, updated)?;

        let Err(err) = self.notify(title, message) else {
            return Ok(());
        };
        match self.records.commit(committed, original) {
            Ok(_) => warn!(
                "event=user_write module=repo status=rolled_back error_code=notification_failed"
            ),
            Err(undo_err) => error!(
                "event=user_write module=repo status=error error_code=rollback_failed error={undo_err}"
            ),
        }
        Err(err)
    }
}

fn reject_duplicate_email<'a>(
    mut users: impl Iterator<Item = &'a User>,
    email: &str,
) -> RepoResult<()> {
    if users.any(|user| user.has_email(email)) {
        warn!("event=user_write module=repo status=error error_code=duplicate_email");
        return Err(RepoError::DuplicateEmail(email.trim().to_string()));
    }
    Ok(())
}

impl<S: KeyValueStore, N: NotificationRepository> UserRepository for KvUserRepository<S, N> {
    fn list_users(&self) -> RepoResult<Vec<User>> {
        self.records.load()
    }

    fn get_user(&self, id: &str) -> RepoResult<Option<User>> {
        Ok(self.records.snapshot()?.find(id).cloned())
    }

    fn create_user(&self, form: UserForm) -> RepoResult<User> {
        form.validate()?;

        let snapshot = self.records.snapshot()?;
        reject_duplicate_email(snapshot.records.iter(), &form.email)?;

        let user = User::from_form(form);
        let mut updated = snapshot.records.clone();
        updated.push(user.clone());
        self.commit_with_notice(
            snapshot.version,
            &snapshot.records,
            &updated,
            "User Created",
            format!("{} has been added as {}", user.name, user.role),
        )?;
        info!("event=user_create module=repo status=ok id={}", user.id);
        Ok(user)
    }

    fn update_user(&self, id: &str, form: UserForm) -> RepoResult<User> {
        let snapshot = self.records.snapshot()?;
        let index = snapshot
            .position(id)
            .ok_or_else(|| RepoError::NotFound(id.to_string()))?;

        form.validate()?;
        reject_duplicate_email(
            snapshot.records.iter().filter(|user| user.id != id),
            &form.email,
        )?;

        let mut updated = snapshot.records.clone();
        updated[index].apply_form(form);
        let user = updated[index].clone();
        self.commit_with_notice(
            snapshot.version,
            &snapshot.records,
            &updated,
            "User Updated",
            format!("{}'s profile has been updated", user.name),
        )?;
        info!("event=user_update module=repo status=ok id={id}");
        Ok(user)
    }

    fn delete_user(&self, id: &str) -> RepoResult<Option<User>> {
        let snapshot = self.records.snapshot()?;
        let Some(index) = snapshot.position(id) else {
            return Ok(None);
        };

        let mut updated = snapshot.records.clone();
        let removed = updated.remove(index);
        self.commit_with_notice(
            snapshot.version,
            &snapshot.records,
            &updated,
            "User Deleted",
            format!("{} has been removed from the system", removed.name),
        )?;
        info!("event=user_delete module=repo status=ok id={id}");
        Ok(Some(removed))
    }

    fn reset_password(&self, id: &str, new_password: &str) -> RepoResult<bool> {
        require_present("password", new_password)?;

        let Some(user) = self.get_user(id)? else {
            return Ok(false);
        };

        info!("event=user_password_reset module=repo status=ok id={id}");
        self.notify(
            "Password Reset",
            format!("Password has been reset for {}", user.name),
        )?;
        Ok(true)
    }
}
