//! Pluggable credential verification for the session gate.

use super::{SessionError, SessionResult};
use crate::model::identity::{Identity, IdentityRole};

pub const ADMIN_EMAIL: &str = "admin@km.com";
const ADMIN_PASSWORD: &str = "admin";
const ADMIN_AVATAR: &str =
    "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?w=400&h=400&fit=crop";

/// Maps an email/password pair to an identity.
pub trait CredentialVerifier {
    /// # Errors
    /// - `SessionError::InvalidCredentials` for any rejected pair.
    fn verify(&self, email: &str, password: &str) -> SessionResult<Identity>;
}

/// Accepts exactly one built-in administrator account.
///
/// Placeholder for a real credential backend; nothing is hashed or stored.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCredentialVerifier;

impl StaticCredentialVerifier {
    pub fn admin_identity() -> Identity {
        Identity {
            id: "1".to_string(),
            name: "Admin User".to_string(),
            email: ADMIN_EMAIL.to_string(),
            role: IdentityRole::Admin,
            avatar: ADMIN_AVATAR.to_string(),
        }
    }
}

impl CredentialVerifier for StaticCredentialVerifier {
    fn verify(&self, email: &str, password: &str) -> SessionResult<Identity> {
        if email == ADMIN_EMAIL && password == ADMIN_PASSWORD {
            return Ok(Self::admin_identity());
        }
        Err(SessionError::InvalidCredentials)
    }
}

impl<T: CredentialVerifier + ?Sized> CredentialVerifier for &T {
    fn verify(&self, email: &str, password: &str) -> SessionResult<Identity> {
        (**self).verify(email, password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_only_the_exact_admin_pair() {
        let verifier = StaticCredentialVerifier;
        let identity = verifier.verify("admin@km.com", "admin").unwrap();
        assert!(identity.is_admin());
        assert_eq!(identity.id, "1");

        for (email, password) in [
            ("admin@km.com", "Admin"),
            ("ADMIN@km.com", "admin"),
            ("admin@km.com", ""),
            ("", ""),
        ] {
            let err = verifier.verify(email, password).unwrap_err();
            assert!(matches!(err, SessionError::InvalidCredentials));
        }
    }
}
