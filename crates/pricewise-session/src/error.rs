use thiserror::Error;

/// Errors from a [`crate::KeyValueStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid store key \"{0}\"")]
    InvalidKey(String),

    #[error("could not encode value for key {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
