use thiserror::Error;

/// Failures of the injected key/value storage.
///
/// The player never aborts on these; they are logged and the affected
/// value falls back to its configured default.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The page has no usable local storage (disabled, sandboxed iframe, ...).
    #[error("local storage is not available")]
    Unavailable,

    /// The browser rejected the operation, usually a quota or security error.
    #[error("storage rejected `{key}`: {reason}")]
    Backend { key: String, reason: String },

    /// A stored JSON record could not be decoded.
    #[error("stored value for `{key}` is malformed: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The stored volume is not a finite number.
    #[error("stored volume `{0}` is not a number")]
    InvalidVolume(String),
}

/// Failures while turning page-provided options into a player configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid player options: {0}")]
    Json(#[from] serde_json::Error),

    #[error("player options are not a plain object")]
    NotAnObject,
}
