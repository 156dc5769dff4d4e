//! Authentication for Taskdeck: a mocked credential check behind a pluggable
//! backend, plus the session-aware auth store.

pub mod credentials;
pub mod storage;
pub mod store;

pub use credentials::{
    CredentialBackend, LoginCredentials, MockCredentials, SignupCredentials, User, MOCK_TOKEN,
};
pub use storage::SessionStorage;
pub use store::{AuthState, AuthStore};
