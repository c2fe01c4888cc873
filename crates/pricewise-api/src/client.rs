//! HTTP client for the price-comparison backend.
//!
//! Wraps `reqwest` with URL construction under `<base>/api/`, bearer-token
//! attachment for identity calls, typed error mapping and retry of transient
//! failures. Endpoint methods live in [`crate::catalog`] and
//! [`crate::account`].

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use pricewise_core::AppConfig;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{extract_detail, ApiError};
use crate::retry::{send_with_retry, RetryPolicy};

const DEFAULT_USER_AGENT: &str = "pricewise/0.1 (price-comparison)";

/// Client for the backend REST API.
///
/// Use [`ApiClient::new`] for a plain client or [`ApiClient::from_config`] to
/// apply timeouts, user agent and retry policy from [`AppConfig`].
pub struct ApiClient {
    client: Client,
    api_root: Url,
    bearer: RwLock<Option<String>>,
    retry: RetryPolicy,
}

impl ApiClient {
    /// Creates a client rooted at `<base_url>/api/` with no retries.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` cannot be
    /// constructed, or [`ApiError::InvalidBaseUrl`] if `base_url` is not an
    /// absolute http(s) URL.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ApiError> {
        Self::with_user_agent(base_url, timeout_secs, DEFAULT_USER_AGENT)
    }

    /// Like [`ApiClient::new`] with a custom `User-Agent`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::new`].
    pub fn with_user_agent(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so joined segments land under /api/.
        let normalised = format!("{}/api/", base_url.trim_end_matches('/'));
        let api_root = Url::parse(&normalised).map_err(|e| ApiError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if api_root.cannot_be_a_base() || !matches!(api_root.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: "expected an absolute http(s) URL".to_owned(),
            });
        }

        Ok(Self {
            client,
            api_root,
            bearer: RwLock::new(None),
            retry: RetryPolicy::default(),
        })
    }

    /// Builds a client from application configuration, including the
    /// configured bearer token if any.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        let client = Self::with_user_agent(
            &config.api_url,
            config.request_timeout_secs,
            &config.user_agent,
        )?
        .with_retries(config.max_retries, config.retry_backoff_base_ms);
        if let Some(token) = &config.api_token {
            client.set_bearer_token(Some(token.clone()));
        }
        Ok(client)
    }

    /// Enables retry of transient failures for idempotent requests (GET,
    /// DELETE). POSTs are always sent once.
    #[must_use]
    pub fn with_retries(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.retry = RetryPolicy::new(max_retries, backoff_base_ms);
        self
    }

    /// Sets or clears the token attached as `Authorization: Bearer <token>`.
    pub fn set_bearer_token(&self, token: Option<String>) {
        *self.bearer.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    #[must_use]
    pub fn has_bearer_token(&self) -> bool {
        self.bearer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn bearer_token(&self) -> Result<String, ApiError> {
        self.bearer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(ApiError::Unauthenticated)
    }

    /// Builds an endpoint URL from path segments and query pairs.
    ///
    /// Segments are percent-encoded individually, so ids containing `/` stay
    /// inside one segment.
    pub(crate) fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Url {
        let mut url = self.api_root.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    /// Anonymous GET returning JSON.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        self.execute(Method::GET, url, None::<&()>, None).await
    }

    /// Authenticated request with an optional JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthenticated`] without sending anything when no
    /// bearer token is set.
    pub(crate) async fn authed_json<T, B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let token = self.bearer_token()?;
        self.execute(method, url, body, Some(&token)).await
    }

    /// Anonymous request with a JSON body (login/register).
    pub(crate) async fn post_json<T, B>(&self, url: Url, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(Method::POST, url, Some(body), None).await
    }

    async fn execute<T, B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let context = format!("{method} {}", url.path());
        tracing::debug!(%method, url = %url, "backend request");

        send_with_retry(self.retry, &method, || {
            let mut request = self.client.request(method.clone(), url.clone());
            if let Some(token) = token {
                request = request.bearer_auth(token);
            }
            if let Some(body) = body {
                request = request.json(body);
            }
            let context = context.as_str();
            async move { Self::read_json(request, context).await }
        })
        .await
    }

    /// Sends the request and maps the response: 404 → [`ApiError::NotFound`],
    /// other 4xx → [`ApiError::Rejected`] with the payload's detail message,
    /// anything else non-2xx → [`ApiError::Status`].
    async fn read_json<T: DeserializeOwned>(
        request: RequestBuilder,
        context: &str,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().to_string();

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound { url });
        }
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            let message = extract_detail(&body);
            tracing::debug!(status = status.as_u16(), %message, "backend rejected request");
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
