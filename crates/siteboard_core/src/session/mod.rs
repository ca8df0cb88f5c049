//! Session gate: current identity, login/logout, and route protection.
//!
//! # Responsibility
//! - Own the authenticated identity for one running dashboard.
//! - Persist it to the durable tier (remember me) or the ephemeral tier.
//! - Decide whether a route is reachable for the current session.
//!
//! # Invariants
//! - The identity lives in at most one tier at a time.
//! - A failed login leaves the state exactly as it was.
//! - `logout` always ends `Anonymous`, even when clearing a tier fails.
//! - Passwords are never persisted or logged.

use crate::kv::{KeyValueStore, StoreError};
use crate::model::identity::Identity;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod credentials;
pub mod route;

use credentials::CredentialVerifier;
use route::{Route, RouteDecision};

/// Slot name of the persisted identity in either tier.
pub const IDENTITY_SLOT: &str = "user";

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug)]
pub enum SessionError {
    InvalidCredentials,
    NotAuthenticated,
    Store(StoreError),
    Serialization(serde_json::Error),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "Invalid credentials"),
            Self::NotAuthenticated => write!(f, "no authenticated session"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "failed to encode identity: {err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidCredentials | Self::NotAuthenticated => None,
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated(Identity),
}

/// Where the identity of an authenticated session is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageTier {
    /// Survives restarts ("remember me").
    Durable,
    /// Lives as long as the ephemeral store.
    Ephemeral,
}

impl StorageTier {
    fn as_str(self) -> &'static str {
        match self {
            Self::Durable => "durable",
            Self::Ephemeral => "ephemeral",
        }
    }
}

/// Editable identity fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub avatar: Option<String>,
}

/// Session state machine over a credential verifier and two storage tiers.
pub struct SessionGate<V, D, E> {
    verifier: V,
    durable: D,
    ephemeral: E,
    state: SessionState,
    tier: Option<StorageTier>,
}

impl<V, D, E> SessionGate<V, D, E>
where
    V: CredentialVerifier,
    D: KeyValueStore,
    E: KeyValueStore,
{
    /// Creates an anonymous gate. Call [`Self::restore_on_startup`] next.
    pub fn new(verifier: V, durable: D, ephemeral: E) -> Self {
        Self {
            verifier,
            durable,
            ephemeral,
            state: SessionState::Anonymous,
            tier: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn identity(&self) -> Option<&Identity> {
        match &self.state {
            SessionState::Authenticated(identity) => Some(identity),
            SessionState::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }

    pub fn storage_tier(&self) -> Option<StorageTier> {
        self.tier
    }

    /// Returns the identity or `NotAuthenticated`.
    pub fn require_identity(&self) -> SessionResult<&Identity> {
        self.identity().ok_or(SessionError::NotAuthenticated)
    }

    /// Restores a previously persisted identity, durable tier first.
    ///
    /// The stored identity is trusted without re-verification. A malformed
    /// blob is removed and treated as absent.
    pub fn restore_on_startup(&mut self) -> SessionResult<&SessionState> {
        let restored = match self.read_identity(StorageTier::Durable)? {
            Some(identity) => Some((identity, StorageTier::Durable)),
            None => self
                .read_identity(StorageTier::Ephemeral)?
                .map(|identity| (identity, StorageTier::Ephemeral)),
        };

        match restored {
            Some((identity, tier)) => {
                info!(
                    "event=session_restore module=session status=ok tier={}",
                    tier.as_str()
                );
                self.state = SessionState::Authenticated(identity);
                self.tier = Some(tier);
            }
            None => {
                info!("event=session_restore module=session status=ok tier=none");
                self.state = SessionState::Anonymous;
                self.tier = None;
            }
        }
        Ok(&self.state)
    }

    /// Verifies credentials and persists the identity.
    ///
    /// `remember = true` selects the durable tier, otherwise the ephemeral
    /// tier. The other tier is cleared so the identity lives in one place.
    ///
    /// The chosen tier is written before the other is cleared. A failed
    /// write leaves the previous session and both tiers untouched. Once the
    /// write lands the gate is authenticated; a failure to clear the other
    /// tier is still reported.
    pub fn login(
        &mut self,
        email: &str,
        password: &str,
        remember: bool,
    ) -> SessionResult<&Identity> {
        let identity = match self.verifier.verify(email, password) {
            Ok(identity) => identity,
            Err(err) => {
                warn!(
                    "event=session_login module=session status=error error_code=invalid_credentials"
                );
                return Err(err);
            }
        };

        let (tier, other) = if remember {
            (StorageTier::Durable, StorageTier::Ephemeral)
        } else {
            (StorageTier::Ephemeral, StorageTier::Durable)
        };
        self.write_identity(tier, &identity)?;

        info!(
            "event=session_login module=session status=ok tier={} identity_id={}",
            tier.as_str(),
            identity.id
        );
        self.tier = Some(tier);
        self.state = SessionState::Authenticated(identity);

        if let Err(err) = self.store(other).remove_slot(IDENTITY_SLOT) {
            warn!(
                "event=session_login module=session status=error error_code=stale_tier tier={}",
                other.as_str()
            );
            return Err(err.into());
        }
        self.require_identity()
    }

    /// Ends the session and clears both tiers. Idempotent.
    ///
    /// The gate is `Anonymous` on return even if clearing a tier failed; the
    /// first storage error is still reported.
    pub fn logout(&mut self) -> SessionResult<()> {
        self.state = SessionState::Anonymous;
        self.tier = None;

        let durable = self.durable.remove_slot(IDENTITY_SLOT);
        let ephemeral = self.ephemeral.remove_slot(IDENTITY_SLOT);
        info!("event=session_logout module=session status=ok");
        durable?;
        ephemeral?;
        Ok(())
    }

    /// Edits the current identity and rewrites it in its tier.
    pub fn update_profile(&mut self, update: ProfileUpdate) -> SessionResult<&Identity> {
        let mut identity = self.require_identity()?.clone();
        if let Some(name) = update.name {
            identity.name = name;
        }
        if let Some(avatar) = update.avatar {
            identity.avatar = avatar;
        }

        let tier = self.tier.unwrap_or(StorageTier::Ephemeral);
        self.write_identity(tier, &identity)?;
        self.tier = Some(tier);
        self.state = SessionState::Authenticated(identity);
        self.require_identity()
    }

    /// Allows public routes always and protected routes only while
    /// authenticated; everything else redirects to the login route.
    pub fn guard(&self, route: Route) -> RouteDecision {
        if route.is_public() || self.is_authenticated() {
            return RouteDecision::Allow(route);
        }
        info!("event=route_guard module=session status=redirect route={route}");
        RouteDecision::Redirect(Route::Login)
    }

    fn store(&self, tier: StorageTier) -> &dyn KeyValueStore {
        match tier {
            StorageTier::Durable => &self.durable,
            StorageTier::Ephemeral => &self.ephemeral,
        }
    }

    fn read_identity(&self, tier: StorageTier) -> SessionResult<Option<Identity>> {
        let store = self.store(tier);
        let Some(slot) = store.read_slot(IDENTITY_SLOT)? else {
            return Ok(None);
        };

        match serde_json::from_str::<Identity>(&slot.payload) {
            Ok(identity) => Ok(Some(identity)),
            Err(err) => {
                warn!(
                    "event=session_restore module=session status=error error_code=invalid_identity tier={} error={err}",
                    tier.as_str()
                );
                store.remove_slot(IDENTITY_SLOT)?;
                Ok(None)
            }
        }
    }

    fn write_identity(&self, tier: StorageTier, identity: &Identity) -> SessionResult<()> {
        let payload = serde_json::to_string(identity).map_err(SessionError::Serialization)?;
        self.store(tier).write_slot(IDENTITY_SLOT, &payload, None)?;
        Ok(())
    }
}
