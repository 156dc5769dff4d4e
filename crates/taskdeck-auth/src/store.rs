//! Auth store: current user, session flag and async operation status.

use std::sync::Arc;

use parking_lot::Mutex;
use taskdeck_core::{simulate_latency, AuthError, LatencyConfig, LocalStorage, Notifier, OpStatus};

use crate::credentials::{
    CredentialBackend, LoginCredentials, MockCredentials, SignupCredentials, User,
};
use crate::storage::SessionStorage;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub status: OpStatus,
    pub error: Option<String>,
}

pub struct AuthStore {
    state: Mutex<AuthState>,
    backend: Arc<dyn CredentialBackend>,
    session: SessionStorage,
    notifier: Notifier,
    latency: LatencyConfig,
}

impl AuthStore {
    pub fn new(
        backend: Arc<dyn CredentialBackend>,
        storage: LocalStorage,
        notifier: Notifier,
        latency: LatencyConfig,
    ) -> Self {
        Self {
            state: Mutex::new(AuthState::default()),
            backend,
            session: SessionStorage::new(storage),
            notifier,
            latency,
        }
    }

    /// Store backed by the in-process mock credential table.
    pub fn with_mock_backend(
        storage: LocalStorage,
        notifier: Notifier,
        latency: LatencyConfig,
    ) -> Self {
        Self::new(Arc::new(MockCredentials::new()), storage, notifier, latency)
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AuthState {
        self.state.lock().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.lock().is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().status.is_loading()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.lock().user.clone()
    }

    pub fn clear_error(&self) {
        self.state.lock().error = None;
    }

    /// Sign in with an email/password pair.
    ///
    /// # Errors
    /// `AuthError::InvalidCredentials` if no record matches both fields.
    pub async fn login(&self, credentials: LoginCredentials) -> Result<User, AuthError> {
        self.begin();
        simulate_latency(self.latency.auth()).await;

        let result = self
            .backend
            .verify(&credentials.email, &credentials.password)
            .map(|user| self.open_session(user));

        self.settle_sign_in(result, "Successfully signed in")
    }

    /// Create an account and sign in with it.
    ///
    /// # Errors
    /// `AuthError::AlreadyExists` if the email is already registered.
    pub async fn signup(&self, credentials: SignupCredentials) -> Result<User, AuthError> {
        self.begin();
        simulate_latency(self.latency.auth()).await;

        let result = self
            .backend
            .create(&credentials)
            .map(|user| self.open_session(user));

        self.settle_sign_in(result, "Account created successfully")
    }

    /// Clear the session. Always succeeds.
    pub async fn logout(&self) {
        self.state.lock().status = OpStatus::Loading;
        simulate_latency(self.latency.logout()).await;

        match self.session.retrieve_token() {
            Ok(Some(token)) => self.backend.invalidate(&token),
            Ok(None) => {}
            Err(e) => tracing::error!("Failed to read session token on logout: {}", e),
        }
        if let Err(e) = self.session.delete_token() {
            tracing::error!("Failed to remove session token: {}", e);
        }

        {
            let mut state = self.state.lock();
            state.status = OpStatus::Idle;
            state.user = None;
            state.is_authenticated = false;
        }

        tracing::info!("Signed out");
        self.notifier.success("Successfully signed out");
    }

    /// Restore a session from the stored token at startup.
    ///
    /// # Errors
    /// `AuthError::NoSession` if no token is stored or the backend rejects it;
    /// the store is left unauthenticated and idle.
    pub async fn check_session(&self) -> Result<User, AuthError> {
        self.state.lock().status = OpStatus::Loading;

        let token = match self.session.retrieve_token() {
            Ok(token) => token,
            Err(e) => {
                tracing::error!("Failed to read session token: {}", e);
                None
            }
        };

        let result = token
            .ok_or(AuthError::NoSession)
            .and_then(|token| self.backend.resolve(&token));

        let mut state = self.state.lock();
        match &result {
            Ok(user) => {
                tracing::info!("Restored session for {}", user.email);
                state.status = OpStatus::Succeeded;
                state.user = Some(user.clone());
                state.is_authenticated = true;
            }
            Err(_) => {
                tracing::debug!("No stored session");
                state.status = OpStatus::Idle;
                state.user = None;
                state.is_authenticated = false;
            }
        }
        result
    }

    fn begin(&self) {
        let mut state = self.state.lock();
        state.status = OpStatus::Loading;
        state.error = None;
    }

    // Token persistence is best-effort: the in-memory session stands even if
    // the write fails.
    fn open_session(&self, user: User) -> User {
        let token = self.backend.issue_token(&user);
        if let Err(e) = self.session.store_token(&token) {
            tracing::error!("Failed to persist session token: {}", e);
        }
        user
    }

    fn settle_sign_in(
        &self,
        result: Result<User, AuthError>,
        success_message: &str,
    ) -> Result<User, AuthError> {
        {
            let mut state = self.state.lock();
            match &result {
                Ok(user) => {
                    state.status = OpStatus::Succeeded;
                    state.user = Some(user.clone());
                    state.is_authenticated = true;
                    state.error = None;
                }
                Err(e) => {
                    state.status = OpStatus::Failed;
                    state.error = Some(e.to_string());
                }
            }
        }

        match &result {
            Ok(user) => {
                tracing::info!("Signed in as {}", user.email);
                self.notifier.success(success_message);
            }
            Err(e) => {
                tracing::warn!("Sign-in failed: {}", e);
                self.notifier.error(e.user_message());
            }
        }
        result
    }
}
