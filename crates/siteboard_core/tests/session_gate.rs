use siteboard_core::db::open_db_in_memory;
use siteboard_core::session::IDENTITY_SLOT;
use siteboard_core::{
    CredentialVerifier, Identity, IdentityRole, KeyValueStore, MemoryKvStore, ProfileUpdate,
    Route, RouteDecision, SessionError, SessionGate, SessionResult, SessionState,
    Slot, SqliteKvStore, StaticCredentialVerifier, StorageTier, StoreError, StoreResult,
};

fn stored_identity(store: &dyn KeyValueStore) -> Option<Identity> {
    store
        .read_slot(IDENTITY_SLOT)
        .unwrap()
        .map(|slot| serde_json::from_str(&slot.payload).unwrap())
}

#[test]
fn login_with_remember_persists_to_durable_tier() {
    let durable = MemoryKvStore::new();
    let ephemeral = MemoryKvStore::new();
    let mut gate = SessionGate::new(StaticCredentialVerifier, &durable, &ephemeral);

    let identity = gate.login("admin@km.com", "admin", true).unwrap().clone();
    assert_eq!(identity.role, IdentityRole::Admin);
    assert_eq!(gate.state(), &SessionState::Authenticated(identity.clone()));
    assert_eq!(gate.storage_tier(), Some(StorageTier::Durable));

    assert_eq!(stored_identity(&durable), Some(identity));
    assert!(!ephemeral.contains(IDENTITY_SLOT).unwrap());
}

#[test]
fn login_without_remember_uses_ephemeral_tier_and_clears_durable() {
    let durable = MemoryKvStore::new();
    let ephemeral = MemoryKvStore::new();
    let mut gate = SessionGate::new(StaticCredentialVerifier, &durable, &ephemeral);

    gate.login("admin@km.com", "admin", true).unwrap();
    gate.login("admin@km.com", "admin", false).unwrap();

    assert_eq!(gate.storage_tier(), Some(StorageTier::Ephemeral));
    assert!(ephemeral.contains(IDENTITY_SLOT).unwrap());
    assert!(!durable.contains(IDENTITY_SLOT).unwrap());
}

#[test]
fn invalid_credentials_leave_gate_anonymous() {
    let durable = MemoryKvStore::new();
    let ephemeral = MemoryKvStore::new();
    let mut gate = SessionGate::new(StaticCredentialVerifier, &durable, &ephemeral);

    let err = gate.login("admin@km.com", "wrong", true).unwrap_err();
    assert!(matches!(err, SessionError::InvalidCredentials));
    assert_eq!(err.to_string(), "Invalid credentials");
    assert_eq!(gate.state(), &SessionState::Anonymous);
    assert!(!durable.contains(IDENTITY_SLOT).unwrap());
    assert!(!ephemeral.contains(IDENTITY_SLOT).unwrap());
}

#[test]
fn failed_login_keeps_existing_session() {
    let durable = MemoryKvStore::new();
    let ephemeral = MemoryKvStore::new();
    let mut gate = SessionGate::new(StaticCredentialVerifier, &durable, &ephemeral);
    gate.login("admin@km.com", "admin", false).unwrap();

    gate.login("intruder@x.com", "admin", true).unwrap_err();
    assert!(gate.is_authenticated());
    assert_eq!(gate.storage_tier(), Some(StorageTier::Ephemeral));
}

/// Store whose reads and removals work but whose writes always fail.
struct ReadOnlyStore(MemoryKvStore);

impl KeyValueStore for ReadOnlyStore {
    fn read_slot(&self, key: &str) -> StoreResult<Option<Slot>> {
        self.0.read_slot(key)
    }

    fn write_slot(
        &self,
        _key: &str,
        _payload: &str,
        _expected_version: Option<u64>,
    ) -> StoreResult<u64> {
        Err(StoreError::Poisoned)
    }

    fn remove_slot(&self, key: &str) -> StoreResult<()> {
        self.0.remove_slot(key)
    }
}

#[test]
fn failed_tier_write_keeps_remembered_identity() {
    let durable = MemoryKvStore::new();
    let ephemeral = ReadOnlyStore(MemoryKvStore::new());
    let mut gate = SessionGate::new(StaticCredentialVerifier, &durable, &ephemeral);
    let identity = gate.login("admin@km.com", "admin", true).unwrap().clone();

    let err = gate.login("admin@km.com", "admin", false).unwrap_err();
    assert!(matches!(err, SessionError::Store(StoreError::Poisoned)));
    assert_eq!(gate.storage_tier(), Some(StorageTier::Durable));
    assert_eq!(stored_identity(&durable), Some(identity.clone()));

    let mut restarted = SessionGate::new(StaticCredentialVerifier, &durable, &ephemeral);
    restarted.restore_on_startup().unwrap();
    assert_eq!(restarted.state(), &SessionState::Authenticated(identity));
}

#[test]
fn logout_clears_both_tiers_and_is_idempotent() {
    let durable = MemoryKvStore::new();
    let ephemeral = MemoryKvStore::new();
    let mut gate = SessionGate::new(StaticCredentialVerifier, &durable, &ephemeral);

    gate.logout().unwrap();
    assert_eq!(gate.state(), &SessionState::Anonymous);

    gate.login("admin@km.com", "admin", true).unwrap();
    // A stale copy in the other tier is cleared too.
    ephemeral.write_slot(IDENTITY_SLOT, "{}", None).unwrap();
    gate.logout().unwrap();
    gate.logout().unwrap();

    assert_eq!(gate.state(), &SessionState::Anonymous);
    assert_eq!(gate.storage_tier(), None);
    assert!(!durable.contains(IDENTITY_SLOT).unwrap());
    assert!(!ephemeral.contains(IDENTITY_SLOT).unwrap());
}

#[test]
fn restore_prefers_durable_tier_and_trusts_stored_identity() {
    let conn = open_db_in_memory().unwrap();
    let durable = SqliteKvStore::new(&conn);
    let ephemeral = MemoryKvStore::new();

    let mut remembered = StaticCredentialVerifier::admin_identity();
    remembered.name = "Remembered Admin".to_string();
    durable
        .write_slot(IDENTITY_SLOT, &serde_json::to_string(&remembered).unwrap(), None)
        .unwrap();
    let mut tab = StaticCredentialVerifier::admin_identity();
    tab.name = "Tab Admin".to_string();
    ephemeral
        .write_slot(IDENTITY_SLOT, &serde_json::to_string(&tab).unwrap(), None)
        .unwrap();

    let mut gate = SessionGate::new(StaticCredentialVerifier, &durable, &ephemeral);
    let state = gate.restore_on_startup().unwrap().clone();

    assert_eq!(state, SessionState::Authenticated(remembered));
    assert_eq!(gate.storage_tier(), Some(StorageTier::Durable));
}

#[test]
fn restore_falls_back_to_ephemeral_then_anonymous() {
    let durable = MemoryKvStore::new();
    let ephemeral = MemoryKvStore::new();

    {
        let mut gate = SessionGate::new(StaticCredentialVerifier, &durable, &ephemeral);
        gate.login("admin@km.com", "admin", false).unwrap();
    }

    let mut restarted = SessionGate::new(StaticCredentialVerifier, &durable, &ephemeral);
    restarted.restore_on_startup().unwrap();
    assert_eq!(restarted.storage_tier(), Some(StorageTier::Ephemeral));

    ephemeral.clear().unwrap();
    let mut fresh = SessionGate::new(StaticCredentialVerifier, &durable, &ephemeral);
    assert_eq!(fresh.restore_on_startup().unwrap(), &SessionState::Anonymous);
}

#[test]
fn malformed_identity_blob_is_discarded() {
    let durable = MemoryKvStore::new();
    let ephemeral = MemoryKvStore::new();
    durable.write_slot(IDENTITY_SLOT, "not json", None).unwrap();

    let mut gate = SessionGate::new(StaticCredentialVerifier, &durable, &ephemeral);
    assert_eq!(gate.restore_on_startup().unwrap(), &SessionState::Anonymous);
    assert!(!durable.contains(IDENTITY_SLOT).unwrap());
}

#[test]
fn update_profile_rewrites_identity_in_its_tier() {
    let durable = MemoryKvStore::new();
    let ephemeral = MemoryKvStore::new();
    let mut gate = SessionGate::new(StaticCredentialVerifier, &durable, &ephemeral);

    let err = gate.update_profile(ProfileUpdate::default()).unwrap_err();
    assert!(matches!(err, SessionError::NotAuthenticated));

    gate.login("admin@km.com", "admin", true).unwrap();
    let updated = gate
        .update_profile(ProfileUpdate {
            name: Some("Site Admin".to_string()),
            avatar: None,
        })
        .unwrap()
        .clone();

    assert_eq!(updated.name, "Site Admin");
    assert_eq!(updated.email, "admin@km.com");
    assert_eq!(stored_identity(&durable), Some(updated));
    assert!(!ephemeral.contains(IDENTITY_SLOT).unwrap());
}

#[test]
fn guard_redirects_protected_routes_while_anonymous() {
    let durable = MemoryKvStore::new();
    let ephemeral = MemoryKvStore::new();
    let mut gate = SessionGate::new(StaticCredentialVerifier, &durable, &ephemeral);

    assert_eq!(gate.guard(Route::Login), RouteDecision::Allow(Route::Login));
    assert_eq!(gate.guard(Route::Signup), RouteDecision::Allow(Route::Signup));
    for path in ["/projects", "/users", "/fundis", "/dashboard/default-project"] {
        let route = Route::parse(path).unwrap();
        assert_eq!(gate.guard(route), RouteDecision::Redirect(Route::Login));
    }

    gate.login("admin@km.com", "admin", false).unwrap();
    assert_eq!(
        gate.guard(Route::Notifications),
        RouteDecision::Allow(Route::Notifications)
    );

    gate.logout().unwrap();
    assert_eq!(
        gate.guard(Route::Settings),
        RouteDecision::Redirect(Route::Login)
    );
}

struct DirectoryVerifier {
    fundi: Identity,
}

impl CredentialVerifier for DirectoryVerifier {
    fn verify(&self, email: &str, password: &str) -> SessionResult<Identity> {
        if email == self.fundi.email && password == "fundi-pass" {
            return Ok(self.fundi.clone());
        }
        Err(SessionError::InvalidCredentials)
    }
}

#[test]
fn pluggable_verifier_drives_the_same_state_machine() {
    let verifier = DirectoryVerifier {
        fundi: Identity {
            id: "f-7".to_string(),
            name: "Wanjiru".to_string(),
            email: "wanjiru@fundis.co.ke".to_string(),
            role: IdentityRole::Fundi,
            avatar: String::new(),
        },
    };
    let durable = MemoryKvStore::new();
    let ephemeral = MemoryKvStore::new();
    let mut gate = SessionGate::new(&verifier, &durable, &ephemeral);

    assert!(gate.login("admin@km.com", "admin", false).is_err());
    let identity = gate
        .login("wanjiru@fundis.co.ke", "fundi-pass", false)
        .unwrap();
    assert!(!identity.is_admin());
    assert_eq!(gate.require_identity().unwrap().id, "f-7");
}
