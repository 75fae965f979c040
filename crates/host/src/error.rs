//! Error types for host-facing operations.

use thiserror::Error;

/// Result type alias for host-facing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can surface from the background service.
///
/// The taxonomy is deliberately small: a tab URL that cannot be rewritten,
/// a failure reported by the host browser, and payloads that refuse to
/// decode. Everything else (missing tabs, blocked injections, silent
/// content scripts) resolves to a neutral value instead of an error.
#[derive(Debug, Error)]
pub enum Error {
    /// A tab URL was not a well-formed absolute URL.
    #[error(transparent)]
    InvalidUrl(#[from] devbar_protocol::InvalidUrl),

    /// The host browser rejected or failed an API call.
    #[error("host API error: {0}")]
    Api(String),

    /// A message payload could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
