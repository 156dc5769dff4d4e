//! Session persistence and backend substitution tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use taskdeck_auth::{
    AuthStore, CredentialBackend, LoginCredentials, MockCredentials, SignupCredentials, User,
};
use taskdeck_core::{AuthError, LatencyConfig, LocalStorage, Notifier, OpStatus};
use tempfile::TempDir;

fn mock_store(storage: LocalStorage) -> AuthStore {
    AuthStore::with_mock_backend(storage, Notifier::detached(), LatencyConfig::none())
}

#[tokio::test]
async fn test_session_survives_restart() {
    let dir = TempDir::new().unwrap();

    {
        let store = mock_store(LocalStorage::open(dir.path()).unwrap());
        store
            .login(LoginCredentials::new("user@example.com", "password"))
            .await
            .unwrap();
    }

    let store = mock_store(LocalStorage::open(dir.path()).unwrap());
    let user = store.check_session().await.unwrap();
    assert_eq!(user.email, "user@example.com");
    assert!(store.is_authenticated());
}

#[tokio::test]
async fn test_logout_ends_session_for_next_start() {
    let dir = TempDir::new().unwrap();

    {
        let store = mock_store(LocalStorage::open(dir.path()).unwrap());
        store
            .login(LoginCredentials::new("user@example.com", "password"))
            .await
            .unwrap();
        store.logout().await;
    }

    let store = mock_store(LocalStorage::open(dir.path()).unwrap());
    assert_eq!(store.check_session().await.unwrap_err(), AuthError::NoSession);
}

#[tokio::test]
async fn test_signed_up_account_is_not_persisted() {
    let dir = TempDir::new().unwrap();

    {
        let store = mock_store(LocalStorage::open(dir.path()).unwrap());
        store
            .signup(SignupCredentials::new("ada@example.com", "engine", "Ada"))
            .await
            .unwrap();
        store.logout().await;
    }

    let store = mock_store(LocalStorage::open(dir.path()).unwrap());
    let err = store
        .login(LoginCredentials::new("ada@example.com", "engine"))
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::InvalidCredentials);
}

#[tokio::test]
async fn test_unwritable_storage_keeps_in_memory_session() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    let storage = LocalStorage::open(&data).unwrap();
    std::fs::remove_dir_all(&data).unwrap();

    let store = mock_store(storage);
    let user = store
        .login(LoginCredentials::new("user@example.com", "password"))
        .await
        .unwrap();

    assert_eq!(user.id, "1");
    assert!(store.is_authenticated());
    assert_eq!(store.state().status, OpStatus::Succeeded);
}

/// Backend that counts invalidations and validates its own tokens.
struct CountingBackend {
    inner: MockCredentials,
    invalidated: AtomicUsize,
}

impl CredentialBackend for CountingBackend {
    fn verify(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.inner.verify(email, password)
    }

    fn create(&self, signup: &SignupCredentials) -> Result<User, AuthError> {
        self.inner.create(signup)
    }

    fn issue_token(&self, user: &User) -> String {
        format!("token-for-{}", user.id)
    }

    fn resolve(&self, token: &str) -> Result<User, AuthError> {
        if token == "token-for-1" {
            Ok(MockCredentials::demo_user())
        } else {
            Err(AuthError::NoSession)
        }
    }

    fn invalidate(&self, _token: &str) {
        self.invalidated.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_custom_backend_drives_store() {
    let backend = Arc::new(CountingBackend {
        inner: MockCredentials::new(),
        invalidated: AtomicUsize::new(0),
    });
    let storage = LocalStorage::in_memory();
    let store = AuthStore::new(
        backend.clone(),
        storage.clone(),
        Notifier::detached(),
        LatencyConfig::none(),
    );

    store
        .login(LoginCredentials::new("user@example.com", "password"))
        .await
        .unwrap();
    assert_eq!(
        storage.get_item("auth_token").unwrap().as_deref(),
        Some("token-for-1")
    );

    store.logout().await;
    assert_eq!(backend.invalidated.load(Ordering::SeqCst), 1);

    storage.set_item("auth_token", "forged").unwrap();
    assert_eq!(store.check_session().await.unwrap_err(), AuthError::NoSession);
    assert!(!store.is_authenticated());
}
