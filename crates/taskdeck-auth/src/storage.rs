use taskdeck_core::{LocalStorage, StorageError, AUTH_TOKEN_KEY};

/// Session token persistence on top of local storage.
///
/// Presence of the token is what marks a device as signed in.
#[derive(Debug, Clone)]
pub struct SessionStorage {
    storage: LocalStorage,
}

impl SessionStorage {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    /// Store the session token
    pub fn store_token(&self, token: &str) -> Result<(), StorageError> {
        self.storage.set_item(AUTH_TOKEN_KEY, token)?;
        tracing::info!("Stored session token");
        Ok(())
    }

    /// Retrieve the session token, if any
    pub fn retrieve_token(&self) -> Result<Option<String>, StorageError> {
        Ok(self
            .storage
            .get_item(AUTH_TOKEN_KEY)?
            .filter(|token| !token.is_empty()))
    }

    /// Delete the session token. Deleting a missing token is fine.
    pub fn delete_token(&self) -> Result<(), StorageError> {
        self.storage.remove_item(AUTH_TOKEN_KEY)?;
        tracing::info!("Deleted session token");
        Ok(())
    }
}
