//! Authenticated principal held by the session gate.

use serde::{Deserialize, Serialize};

/// Role carried by an authenticated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityRole {
    Admin,
    /// Issued only by pluggable verifiers; sees assigned projects only.
    Fundi,
}

/// The logged-in principal. Distinct from managed [`crate::User`] records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: IdentityRole,
    pub avatar: String,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == IdentityRole::Admin
    }
}
