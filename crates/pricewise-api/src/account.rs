//! Identity, favorites and alert endpoints.
//!
//! Login and register are anonymous and return a [`TokenResponse`]; the
//! caller decides where to keep the token and installs it with
//! [`ApiClient::set_bearer_token`]. Everything else requires that token.

use reqwest::Method;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::types::{
    Ack, Alert, Credentials, EntityKind, Favorites, NewAlert, Registration, TokenResponse, User,
};

impl ApiClient {
    /// Exchanges credentials for a token.
    ///
    /// # Errors
    ///
    /// [`ApiError::Rejected`] with the backend's message on bad credentials;
    /// [`ApiError::Http`] on network failure.
    pub async fn login(&self, credentials: &Credentials) -> Result<TokenResponse, ApiError> {
        let url = self.endpoint(&["auth", "login"], &[]);
        self.post_json(url, credentials).await
    }

    /// Creates an account and returns a token for it.
    ///
    /// # Errors
    ///
    /// [`ApiError::Rejected`] when the email is taken or a field fails
    /// validation; [`ApiError::Http`] on network failure.
    pub async fn register(&self, registration: &Registration) -> Result<TokenResponse, ApiError> {
        let url = self.endpoint(&["auth", "register"], &[]);
        self.post_json(url, registration).await
    }

    /// Returns the user the current token belongs to.
    ///
    /// # Errors
    ///
    /// [`ApiError::Unauthenticated`] without a token; [`ApiError::Rejected`]
    /// (401) when the token is invalid.
    pub async fn me(&self) -> Result<User, ApiError> {
        let url = self.endpoint(&["auth", "me"], &[]);
        self.authed_json(Method::GET, url, None::<&()>).await
    }

    /// # Errors
    ///
    /// As [`ApiClient::me`].
    pub async fn favorites(&self) -> Result<Favorites, ApiError> {
        let url = self.endpoint(&["users", "me", "favorites"], &[]);
        self.authed_json(Method::GET, url, None::<&()>).await
    }

    /// # Errors
    ///
    /// As [`ApiClient::me`]; [`ApiError::Rejected`] if already a favorite.
    pub async fn add_favorite(&self, kind: EntityKind, entity_id: &str) -> Result<Ack, ApiError> {
        let url = self.endpoint(
            &["users", "me", "favorites"],
            &[("entity_type", kind.as_str()), ("entity_id", entity_id)],
        );
        self.authed_json(Method::POST, url, None::<&()>).await
    }

    /// # Errors
    ///
    /// As [`ApiClient::me`].
    pub async fn remove_favorite(
        &self,
        kind: EntityKind,
        entity_id: &str,
    ) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["users", "me", "favorites", kind.as_str(), entity_id], &[]);
        self.authed_json(Method::DELETE, url, None::<&()>).await
    }

    /// Lists the user's active alerts.
    ///
    /// # Errors
    ///
    /// As [`ApiClient::me`].
    pub async fn alerts(&self) -> Result<Vec<Alert>, ApiError> {
        let url = self.endpoint(&["users", "me", "alerts"], &[]);
        self.authed_json(Method::GET, url, None::<&()>).await
    }

    /// # Errors
    ///
    /// As [`ApiClient::me`]; [`ApiError::NotFound`] for an unknown product.
    pub async fn create_alert(&self, alert: &NewAlert) -> Result<Alert, ApiError> {
        let url = self.endpoint(&["users", "me", "alerts"], &[]);
        self.authed_json(Method::POST, url, Some(alert)).await
    }

    /// Deactivates an alert.
    ///
    /// # Errors
    ///
    /// As [`ApiClient::me`]; [`ApiError::NotFound`] for an unknown alert.
    pub async fn delete_alert(&self, alert_id: &str) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["users", "me", "alerts", alert_id], &[]);
        self.authed_json(Method::DELETE, url, None::<&()>).await
    }
}
