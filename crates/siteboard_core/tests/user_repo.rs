use siteboard_core::db::open_db_in_memory;
use siteboard_core::{
    KeyValueStore, KvNotificationRepository, KvUserRepository, MemoryKvStore, Notification,
    NotificationCategory, NotificationRepository, RepoError, RepoResult, SqliteKvStore,
    StoreError, UserForm, UserRepository, UserRole, UserStatus,
};

fn jane() -> UserForm {
    UserForm::new("Jane", "jane@x.com", UserRole::Fundi)
}

#[test]
fn create_user_appends_record_and_one_notification() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::new(&conn);
    let notifications = KvNotificationRepository::new(&store);
    let users = KvUserRepository::new(&store, &notifications);

    let before = users.list_users().unwrap().len();
    let created = users.create_user(jane()).unwrap();

    let listed = users.list_users().unwrap();
    assert_eq!(listed.len(), before + 1);
    assert_eq!(listed.last().unwrap().email, "jane@x.com");
    assert_eq!(created.created_at, created.updated_at);

    let events = notifications.list_notifications().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "User Created");
    assert_eq!(events[0].message, "Jane has been added as fundi");
    assert_eq!(events[0].category, NotificationCategory::Task);
}

#[test]
fn duplicate_email_fails_and_leaves_collections_unchanged() {
    let store = MemoryKvStore::new();
    let notifications = KvNotificationRepository::new(&store);
    let users = KvUserRepository::new(&store, &notifications);
    users.create_user(jane()).unwrap();

    let err = users
        .create_user(UserForm::new("Jane Clone", "JANE@x.com ", UserRole::Manager))
        .unwrap_err();
    assert!(matches!(err, RepoError::DuplicateEmail(_)));

    assert_eq!(users.list_users().unwrap().len(), 1);
    assert_eq!(notifications.list_notifications().unwrap().len(), 1);
}

#[test]
fn blank_name_fails_validation_without_notification() {
    let store = MemoryKvStore::new();
    let notifications = KvNotificationRepository::new(&store);
    let users = KvUserRepository::new(&store, &notifications);

    let err = users
        .create_user(UserForm::new("", "nobody@x.com", UserRole::Fundi))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(users.list_users().unwrap().is_empty());
    assert!(notifications.list_notifications().unwrap().is_empty());
}

#[test]
fn update_merges_form_and_notifies() {
    let store = MemoryKvStore::new();
    let notifications = KvNotificationRepository::new(&store);
    let users = KvUserRepository::new(&store, &notifications);
    let created = users.create_user(jane()).unwrap();

    let mut form = UserForm::new("Jane Wambui", "jane@x.com", UserRole::Manager)
        .with_permission("finance", true);
    form.status = UserStatus::Inactive;
    form.phone = "+254700000000".to_string();
    let updated = users.update_user(&created.id, form).unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(updated.role, UserRole::Manager);
    assert_eq!(updated.status, UserStatus::Inactive);
    assert_eq!(updated.permissions.get("finance"), Some(&true));
    assert_eq!(users.get_user(&created.id).unwrap(), Some(updated));

    let events = notifications.list_notifications().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].title, "User Updated");
    assert_eq!(events[1].message, "Jane Wambui's profile has been updated");
}

#[test]
fn update_missing_user_is_not_found() {
    let store = MemoryKvStore::new();
    let notifications = KvNotificationRepository::new(&store);
    let users = KvUserRepository::new(&store, &notifications);

    let err = users.update_user("missing", jane()).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == "missing"));
    assert!(notifications.list_notifications().unwrap().is_empty());
}

#[test]
fn update_to_another_users_email_is_rejected() {
    let store = MemoryKvStore::new();
    let notifications = KvNotificationRepository::new(&store);
    let users = KvUserRepository::new(&store, &notifications);
    users.create_user(jane()).unwrap();
    let john = users
        .create_user(UserForm::new("John", "john@x.com", UserRole::Fundi))
        .unwrap();

    let err = users
        .update_user(&john.id, UserForm::new("John", "jane@x.com", UserRole::Fundi))
        .unwrap_err();
    assert!(matches!(err, RepoError::DuplicateEmail(_)));
    assert_eq!(users.get_user(&john.id).unwrap().unwrap().email, "john@x.com");

    // Keeping one's own email is not a collision.
    users
        .update_user(&john.id, UserForm::new("Johnny", "john@x.com", UserRole::Fundi))
        .unwrap();
}

#[test]
fn delete_removes_user_and_notifies_once() {
    let store = MemoryKvStore::new();
    let notifications = KvNotificationRepository::new(&store);
    let users = KvUserRepository::new(&store, &notifications);
    let created = users.create_user(jane()).unwrap();

    let removed = users.delete_user(&created.id).unwrap().unwrap();
    assert_eq!(removed.id, created.id);
    assert!(users
        .list_users()
        .unwrap()
        .iter()
        .all(|user| user.id != created.id));

    assert!(users.delete_user(&created.id).unwrap().is_none());

    let events = notifications.list_notifications().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].title, "User Deleted");
    assert_eq!(events[1].message, "Jane has been removed from the system");
}

#[test]
fn reset_password_only_emits_notification() {
    let store = MemoryKvStore::new();
    let notifications = KvNotificationRepository::new(&store);
    let users = KvUserRepository::new(&store, &notifications);
    let created = users.create_user(jane()).unwrap();
    let before = users.list_users().unwrap();

    assert!(users.reset_password(&created.id, "s3cret").unwrap());
    assert_eq!(users.list_users().unwrap(), before);

    let events = notifications.list_notifications().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].title, "Password Reset");
    assert_eq!(events[1].message, "Password has been reset for Jane");

    assert!(!users.reset_password("missing", "s3cret").unwrap());
    let err = users.reset_password(&created.id, " ").unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(notifications.list_notifications().unwrap().len(), 2);
}

#[test]
fn malformed_notifications_blob_fails_create_without_saving_user() {
    let store = MemoryKvStore::new();
    let notifications = KvNotificationRepository::new(&store);
    let users = KvUserRepository::new(&store, &notifications);
    store.write_slot("notifications", "not json", None).unwrap();

    let err = users.create_user(jane()).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Deserialization {
            collection: "notifications",
            ..
        }
    ));
    assert!(users.list_users().unwrap().is_empty());

    // Once the log is repaired the same form is accepted, not a duplicate.
    store.write_slot("notifications", "[]", None).unwrap();
    users.create_user(jane()).unwrap();
    assert_eq!(users.list_users().unwrap().len(), 1);
}

/// Reads fine but refuses every append.
struct RejectingNotifications;

impl NotificationRepository for RejectingNotifications {
    fn list_notifications(&self) -> RepoResult<Vec<Notification>> {
        Ok(Vec::new())
    }

    fn add_notification(
        &self,
        _title: &str,
        _message: &str,
        _category: NotificationCategory,
    ) -> RepoResult<Notification> {
        Err(RepoError::Store(StoreError::Poisoned))
    }

    fn mark_read(&self, _id: &str) -> RepoResult<bool> {
        Ok(false)
    }

    fn unread_count(&self) -> RepoResult<usize> {
        Ok(0)
    }
}

#[test]
fn failed_notification_write_undoes_user_mutations() {
    let store = MemoryKvStore::new();
    let notifications = KvNotificationRepository::new(&store);
    let seeded = KvUserRepository::new(&store, &notifications)
        .create_user(jane())
        .unwrap();
    let before = KvUserRepository::new(&store, &notifications)
        .list_users()
        .unwrap();

    let users = KvUserRepository::new(&store, RejectingNotifications);

    let err = users
        .create_user(UserForm::new("John", "john@x.com", UserRole::Fundi))
        .unwrap_err();
    assert!(matches!(err, RepoError::Store(StoreError::Poisoned)));
    assert_eq!(users.list_users().unwrap(), before);

    users
        .update_user(&seeded.id, UserForm::new("Jane W", "jane@x.com", UserRole::Admin))
        .unwrap_err();
    assert_eq!(users.list_users().unwrap(), before);

    users.delete_user(&seeded.id).unwrap_err();
    assert_eq!(users.list_users().unwrap(), before);

    assert_eq!(notifications.list_notifications().unwrap().len(), 1);
}
