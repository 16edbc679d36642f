//! Admin authentication: credential checks and the session marker.
//!
//! Authentication is a single shared credential stored in the site document.
//! A successful login hands the caller an opaque marker; holding a non-empty
//! marker is the whole authorization check. Nothing ties the marker to this
//! process or protects it from tampering.

use crate::content::Admin;
use crate::error::{FolioError, Result};
use crate::store::ContentStore;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "auth_session";

/// Value carried by a fresh session marker.
pub const SESSION_MARKER: &str = "authenticated";

/// Default marker lifetime: one day.
pub const DEFAULT_SESSION_MAX_AGE_SECS: i64 = 60 * 60 * 24;

/// Checks a presented password against the stored one.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, presented: &str, stored: &str) -> bool;
}

/// Verifies Argon2 PHC strings, and falls back to plain equality for
/// passwords stored in clear text.
#[derive(Debug, Default, Clone, Copy)]
pub struct StoredCredentialVerifier;

impl CredentialVerifier for StoredCredentialVerifier {
    fn verify(&self, presented: &str, stored: &str) -> bool {
        if is_password_hash(stored) {
            match verify_password(presented, stored) {
                Ok(ok) => ok,
                Err(e) => {
                    log::warn!("Stored admin password hash is unusable: {e}");
                    false
                }
            }
        } else {
            presented == stored
        }
    }
}

pub fn is_password_hash(stored: &str) -> bool {
    stored.starts_with("$argon2")
}

/// Hash a password using Argon2id
///
/// Returns the PHC-formatted hash string that includes the salt and parameters.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| FolioError::Other(format!("Failed to hash password: {e}")))
}

/// Verify a password against a stored Argon2 hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| FolioError::Auth(format!("Invalid password hash format: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

/// A marker to attach to the caller's transport session (a cookie over HTTP).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMarker {
    pub name: &'static str,
    pub value: String,
    /// Lifetime in seconds. Zero expires the marker immediately.
    pub max_age_secs: i64,
}

impl SessionMarker {
    /// The marker that ends a session.
    pub fn cleared() -> Self {
        SessionMarker {
            name: SESSION_COOKIE,
            value: String::new(),
            max_age_secs: 0,
        }
    }
}

/// Decides whether a caller may act as admin.
pub struct SessionGate {
    verifier: Box<dyn CredentialVerifier>,
    max_age_secs: i64,
}

impl Default for SessionGate {
    fn default() -> Self {
        SessionGate::new(StoredCredentialVerifier, DEFAULT_SESSION_MAX_AGE_SECS)
    }
}

impl SessionGate {
    pub fn new(verifier: impl CredentialVerifier + 'static, max_age_secs: i64) -> Self {
        SessionGate {
            verifier: Box::new(verifier),
            max_age_secs,
        }
    }

    /// True only when both fields match the admin record. An admin record with
    /// an empty username or password matches nothing.
    pub fn validate(&self, admin: &Admin, username: &str, password: &str) -> bool {
        if admin.username.is_empty() || admin.password.is_empty() {
            return false;
        }
        admin.username == username && self.verifier.verify(password, &admin.password)
    }

    /// Check credentials against the store's admin record.
    pub fn login(&self, store: &ContentStore, username: &str, password: &str) -> Result<Admin> {
        if username.is_empty() || password.is_empty() {
            return Err(FolioError::Validation(
                "Username and password are required".into(),
            ));
        }
        let admin = store.read()?.admin;
        if self.validate(&admin, username, password) {
            log::info!("Admin '{username}' logged in");
            Ok(admin)
        } else {
            log::warn!("Failed login attempt for '{username}'");
            Err(FolioError::Auth("Invalid username or password".into()))
        }
    }

    /// Issue a session marker.
    pub fn create_session(&self) -> SessionMarker {
        SessionMarker {
            name: SESSION_COOKIE,
            value: SESSION_MARKER.to_string(),
            max_age_secs: self.max_age_secs,
        }
    }

    /// True iff a non-empty marker was presented.
    pub fn is_authenticated(&self, marker: Option<&str>) -> bool {
        matches!(marker, Some(value) if !value.is_empty())
    }

    pub fn state(&self, marker: Option<&str>) -> SessionState {
        if self.is_authenticated(marker) {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    /// Fail with an auth error unless a marker was presented.
    pub fn require(&self, marker: Option<&str>) -> Result<()> {
        if self.is_authenticated(marker) {
            Ok(())
        } else {
            Err(FolioError::Auth("Authentication required".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin(password: &str) -> Admin {
        Admin {
            username: "admin".into(),
            password: password.into(),
        }
    }

    #[test]
    fn test_validate_plaintext() {
        let gate = SessionGate::default();
        let stored = admin("hunter2");
        assert!(gate.validate(&stored, "admin", "hunter2"));
        assert!(!gate.validate(&stored, "admin", "hunter3"));
        assert!(!gate.validate(&stored, "Admin", "hunter2"));
        assert!(!gate.validate(&stored, "", ""));
    }

    #[test]
    fn test_validate_hashed() {
        let gate = SessionGate::default();
        let hash = hash_password("correct-horse").unwrap();
        assert!(hash.starts_with("$argon2"));

        let stored = admin(&hash);
        assert!(gate.validate(&stored, "admin", "correct-horse"));
        assert!(!gate.validate(&stored, "admin", "wrong"));
        // The hash itself is not a valid password.
        assert!(!gate.validate(&stored, "admin", &hash));
    }

    #[test]
    fn test_empty_stored_credential_matches_nothing() {
        let gate = SessionGate::default();
        assert!(!gate.validate(&admin(""), "admin", ""));
        assert!(!gate.validate(&Admin::default(), "", ""));
    }

    #[test]
    fn test_broken_hash_never_verifies() {
        assert!(!StoredCredentialVerifier.verify("x", "$argon2id$garbage"));
    }

    #[test]
    fn test_login_against_store() {
        let store = ContentStore::in_memory(admin("pw")).unwrap();
        let gate = SessionGate::default();

        assert_eq!(gate.login(&store, "admin", "pw").unwrap().username, "admin");
        assert!(matches!(
            gate.login(&store, "admin", "nope").unwrap_err(),
            FolioError::Auth(_)
        ));
        assert!(matches!(
            gate.login(&store, "admin", "").unwrap_err(),
            FolioError::Validation(_)
        ));
    }

    #[test]
    fn test_session_states() {
        let gate = SessionGate::new(StoredCredentialVerifier, 60);
        let marker = gate.create_session();
        assert_eq!(marker.name, SESSION_COOKIE);
        assert_eq!(marker.max_age_secs, 60);

        assert_eq!(gate.state(None), SessionState::Anonymous);
        assert_eq!(gate.state(Some("")), SessionState::Anonymous);
        assert_eq!(gate.state(Some(&marker.value)), SessionState::Authenticated);
        // Any non-empty value passes; the marker is not verified.
        assert_eq!(gate.state(Some("forged")), SessionState::Authenticated);

        let cleared = SessionMarker::cleared();
        assert_eq!(gate.state(Some(&cleared.value)), SessionState::Anonymous);
        assert!(gate.require(None).is_err());
    }
}
