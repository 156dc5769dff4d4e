//! Credential backend capability and the in-process mock used by default.
//!
//! `AuthStore` only talks to `CredentialBackend`, so a real identity provider
//! can replace `MockCredentials` without touching the store.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use taskdeck_core::AuthError;

/// Authenticated identity. Never carries a password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Clone)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone)]
pub struct SignupCredentials {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl SignupCredentials {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Debug for SignupCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

/// Identity provider seen by the auth store.
pub trait CredentialBackend: Send + Sync {
    /// Check an email/password pair.
    ///
    /// # Errors
    /// `AuthError::InvalidCredentials` unless both fields match a record exactly.
    fn verify(&self, email: &str, password: &str) -> Result<User, AuthError>;

    /// Register a new account.
    ///
    /// # Errors
    /// `AuthError::AlreadyExists` if the email is taken.
    fn create(&self, signup: &SignupCredentials) -> Result<User, AuthError>;

    /// Opaque session token for a freshly authenticated user.
    fn issue_token(&self, user: &User) -> String;

    /// Identity behind a stored session token.
    ///
    /// # Errors
    /// `AuthError::NoSession` if the token is not accepted.
    fn resolve(&self, token: &str) -> Result<User, AuthError>;

    /// Forget a session token.
    fn invalidate(&self, token: &str);
}

/// Token handed out by `MockCredentials`.
pub const MOCK_TOKEN: &str = "mock_token";

#[derive(Clone)]
struct CredentialRecord {
    user: User,
    password: String,
}

/// In-memory credential table seeded with one demo account.
///
/// Signups are additive and live only as long as the process. Any stored
/// token resolves to the demo identity; there is no real validation.
pub struct MockCredentials {
    records: Mutex<Vec<CredentialRecord>>,
}

impl MockCredentials {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(vec![CredentialRecord {
                user: Self::demo_user(),
                password: "password".to_string(),
            }]),
        }
    }

    /// Fixed identity every session token resolves to.
    pub fn demo_user() -> User {
        User {
            id: "1".to_string(),
            email: "user@example.com".to_string(),
            name: "Demo User".to_string(),
        }
    }
}

impl Default for MockCredentials {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialBackend for MockCredentials {
    fn verify(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.records
            .lock()
            .iter()
            .find(|r| r.user.email == email)
            .filter(|r| r.password == password)
            .map(|r| r.user.clone())
            .ok_or(AuthError::InvalidCredentials)
    }

    fn create(&self, signup: &SignupCredentials) -> Result<User, AuthError> {
        let mut records = self.records.lock();

        if records.iter().any(|r| r.user.email == signup.email) {
            return Err(AuthError::AlreadyExists(signup.email.clone()));
        }

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email: signup.email.clone(),
            name: signup.name.clone(),
        };
        records.push(CredentialRecord {
            user: user.clone(),
            password: signup.password.clone(),
        });

        tracing::info!("Registered account for {}", user.email);
        Ok(user)
    }

    fn issue_token(&self, _user: &User) -> String {
        MOCK_TOKEN.to_string()
    }

    fn resolve(&self, token: &str) -> Result<User, AuthError> {
        if token.is_empty() {
            return Err(AuthError::NoSession);
        }
        Ok(Self::demo_user())
    }

    fn invalidate(&self, _token: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_demo_account() {
        let backend = MockCredentials::new();
        let user = backend.verify("user@example.com", "password").unwrap();
        assert_eq!(user, MockCredentials::demo_user());
    }

    #[test]
    fn test_verify_requires_exact_match() {
        let backend = MockCredentials::new();
        assert_eq!(
            backend.verify("user@example.com", "Password"),
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            backend.verify("USER@example.com", "password"),
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            backend.verify("nobody@example.com", "password"),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn test_create_then_verify() {
        let backend = MockCredentials::new();
        let user = backend
            .create(&SignupCredentials::new("new@example.com", "hunter2", "New"))
            .unwrap();

        assert_eq!(user.email, "new@example.com");
        assert_ne!(user.id, "1");
        assert_eq!(backend.verify("new@example.com", "hunter2").unwrap(), user);
    }

    #[test]
    fn test_create_duplicate_leaves_record_alone() {
        let backend = MockCredentials::new();
        let err = backend
            .create(&SignupCredentials::new("user@example.com", "other", "Impostor"))
            .unwrap_err();

        assert_eq!(err, AuthError::AlreadyExists("user@example.com".into()));
        assert_eq!(
            backend.verify("user@example.com", "other"),
            Err(AuthError::InvalidCredentials)
        );
        let user = backend.verify("user@example.com", "password").unwrap();
        assert_eq!(user.name, "Demo User");
    }

    #[test]
    fn test_any_token_resolves_to_demo_user() {
        let backend = MockCredentials::new();
        assert_eq!(backend.resolve("whatever").unwrap(), MockCredentials::demo_user());
        assert_eq!(backend.resolve(""), Err(AuthError::NoSession));
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = LoginCredentials::new("a@b.c", "secret");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("a@b.c"));
    }
}
