//! Stored login.
//!
//! The access token issued by login or register is kept in the
//! [`KeyValueStore`] under [`TOKEN_KEY`] and installed on the [`ApiClient`]
//! so identity calls carry it. The token is opaque here.

use std::sync::Arc;

use pricewise_api::{ApiClient, ApiError, Credentials, Registration, TokenResponse, User};

use crate::store::KeyValueStore;

/// Store key holding the raw access token.
pub const TOKEN_KEY: &str = "token";

pub struct AuthSession<K> {
    store: Arc<K>,
}

impl<K: KeyValueStore> AuthSession<K> {
    pub fn new(store: Arc<K>) -> Self {
        Self { store }
    }

    /// The saved token, if any. Unreadable storage counts as logged out.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        match self.store.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "could not read saved token");
                None
            }
        }
    }

    /// Installs the saved token on `client` unless it already carries one
    /// (e.g. from configuration). Returns whether the client is now
    /// authenticated.
    pub fn restore(&self, client: &ApiClient) -> bool {
        if client.has_bearer_token() {
            return true;
        }
        match self.token() {
            Some(token) => {
                tracing::debug!("restored saved token");
                client.set_bearer_token(Some(token));
                true
            }
            None => false,
        }
    }

    /// Logs in and keeps the issued token.
    ///
    /// # Errors
    ///
    /// Propagates [`ApiClient::login`] failures; nothing is stored then.
    pub async fn login(
        &self,
        client: &ApiClient,
        credentials: &Credentials,
    ) -> Result<User, ApiError> {
        let issued = client.login(credentials).await?;
        Ok(self.adopt(client, issued))
    }

    /// Registers and keeps the issued token.
    ///
    /// # Errors
    ///
    /// Propagates [`ApiClient::register`] failures; nothing is stored then.
    pub async fn register(
        &self,
        client: &ApiClient,
        registration: &Registration,
    ) -> Result<User, ApiError> {
        let issued = client.register(registration).await?;
        Ok(self.adopt(client, issued))
    }

    fn adopt(&self, client: &ApiClient, issued: TokenResponse) -> User {
        if let Err(e) = self.store.set(TOKEN_KEY, &issued.access_token) {
            tracing::warn!(error = %e, "could not persist token; login lasts for this session only");
        }
        client.set_bearer_token(Some(issued.access_token));
        tracing::info!(user_id = %issued.user.id, "logged in");
        issued.user
    }

    /// Forgets the token on the client and in the store.
    pub fn logout(&self, client: &ApiClient) {
        client.set_bearer_token(None);
        if let Err(e) = self.store.remove(TOKEN_KEY) {
            tracing::warn!(error = %e, "could not remove saved token");
        }
        tracing::info!("logged out");
    }
}
