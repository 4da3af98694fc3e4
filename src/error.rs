//! Error types for catalog loading, configuration, host calls and saved state.
//!
//! Gameplay mistakes (wrong pick, already found) are not errors; they are
//! reported through `session::AttemptOutcome`.

use thiserror::Error;

/// Problems found while validating the character catalog or its assets.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("character catalog is empty")]
    Empty,

    #[error("duplicate character id '{0}'")]
    DuplicateId(String),

    #[error("character '{id}' has invalid level {level} (levels start at 1)")]
    InvalidLevel { id: String, level: u32 },

    #[error("missing {kind} asset for '{owner}'")]
    MissingAsset { owner: String, kind: &'static str },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Failures talking to the external host SDK. Always logged, never fatal.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("host SDK call '{action}' failed: {message}")]
    Call {
        action: &'static str,
        message: String,
    },

    #[error("could not encode payload for host: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("saved game state is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}
