//! Notification repository: append-only event log for other repositories.
//!
//! # Invariants
//! - `add_notification` always appends; there are no uniqueness rules.
//! - List order is insertion order.

use crate::kv::KeyValueStore;
use crate::model::notification::{Notification, NotificationCategory};
use crate::repo::record_store::{Record, RecordStore};
use crate::repo::RepoResult;
use log::info;

/// Slot name of the notifications collection.
pub const NOTIFICATIONS_COLLECTION: &str = "notifications";

impl Record for Notification {
    fn record_id(&self) -> &str {
        &self.id
    }
}

/// Repository interface for notification persistence.
pub trait NotificationRepository {
    fn list_notifications(&self) -> RepoResult<Vec<Notification>>;
    /// Appends one notification stamped with a fresh id and timestamp.
    fn add_notification(
        &self,
        title: &str,
        message: &str,
        category: NotificationCategory,
    ) -> RepoResult<Notification>;
    /// Flags one notification as read. Returns `false` when absent.
    fn mark_read(&self, id: &str) -> RepoResult<bool>;
    fn unread_count(&self) -> RepoResult<usize>;
}

/// Notification repository over a key-value slot store.
pub struct KvNotificationRepository<S> {
    records: RecordStore<S, Notification>,
}

impl<S: KeyValueStore> KvNotificationRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            records: RecordStore::new(store, NOTIFICATIONS_COLLECTION),
        }
    }
}

impl<S: KeyValueStore> NotificationRepository for KvNotificationRepository<S> {
    fn list_notifications(&self) -> RepoResult<Vec<Notification>> {
        self.records.load()
    }

    fn add_notification(
        &self,
        title: &str,
        message: &str,
        category: NotificationCategory,
    ) -> RepoResult<Notification> {
        let mut snapshot = self.records.snapshot()?;
        let notification = Notification::new(title, message, category);
        snapshot.records.push(notification.clone());
        self.records.commit(snapshot.version, &snapshot.records)?;

        info!(
            "event=notification_add module=repo status=ok id={} category={category}",
            notification.id
        );
        Ok(notification)
    }

    fn mark_read(&self, id: &str) -> RepoResult<bool> {
        let mut snapshot = self.records.snapshot()?;
        let Some(index) = snapshot.position(id) else {
            return Ok(false);
        };
        if snapshot.records[index].read {
            return Ok(true);
        }

        snapshot.records[index].read = true;
        self.records.commit(snapshot.version, &snapshot.records)?;
        Ok(true)
    }

    fn unread_count(&self) -> RepoResult<usize> {
        Ok(self
            .records
            .load()?
            .iter()
            .filter(|notification| !notification.read)
            .count())
    }
}

impl<T: NotificationRepository + ?Sized> NotificationRepository for &T {
    fn list_notifications(&self) -> RepoResult<Vec<Notification>> {
        (**self).list_notifications()
    }

    fn add_notification(
        &self,
        title: &str,
        message: &str,
        category: NotificationCategory,
    ) -> RepoResult<Notification> {
        (**self).add_notification(title, message, category)
    }

    fn mark_read(&self, id: &str) -> RepoResult<bool> {
        (**self).mark_read(id)
    }

    fn unread_count(&self) -> RepoResult<usize> {
        (**self).unread_count()
    }
}
