use thiserror::Error;

/// Message shown when a rejected request carries no usable `detail`.
pub const GENERIC_FAILURE_MESSAGE: &str = "Unable to process request";

/// Errors returned by [`crate::ApiClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the request (4xx other than 404). `message` comes
    /// from the payload's `detail` field, or the generic fallback.
    #[error("request rejected with HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("resource not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    /// An identity-bearing call was attempted without a bearer token.
    #[error("not authenticated: log in first")]
    Unauthenticated,

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl ApiError {
    /// Whether the failure is transient (network trouble or a 5xx) and worth
    /// retrying.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ApiError::Status { status, .. } => *status >= 500,
            ApiError::Rejected { .. }
            | ApiError::NotFound { .. }
            | ApiError::Unauthenticated
            | ApiError::Deserialize { .. }
            | ApiError::InvalidBaseUrl { .. } => false,
        }
    }

    /// Text suitable for showing to the user.
    ///
    /// Rejections surface the backend's own message; everything else maps to
    /// the generic fallback.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected { message, .. } => message.clone(),
            ApiError::Unauthenticated => self.to_string(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Pulls a human-readable message out of an error payload.
///
/// FastAPI-style bodies carry either `{"detail": "..."}` or a validation list
/// `{"detail": [{"msg": "..."}]}`.
pub(crate) fn extract_detail(body: &str) -> String {
    use serde_json::Value;

    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|payload| match payload.get("detail") {
            Some(Value::String(detail)) => Some(detail.clone()),
            Some(Value::Array(items)) => items
                .iter()
                .find_map(|item| item.get("msg").and_then(Value::as_str))
                .map(str::to_owned),
            _ => None,
        })
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
}
