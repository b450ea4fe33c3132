//! Error types for Mailindex API operations.

use std::path::PathBuf;

use reqwest::StatusCode;

/// Result type alias for Mailindex operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by request construction, signing, and execution.
///
/// Every execution resolves to exactly one typed success value or one of
/// these variants. Nothing is retried and nothing is swallowed; the only
/// internal recovery is temp-file cleanup when a download fails.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A request was malformed before any network call was attempted,
    /// e.g. an account-scoped path was requested with no account id set.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// A URL could not be parsed or resolved against the base URL.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Transport-level failure: DNS, connection reset, timeout. Use
    /// [`reqwest::Error::is_timeout`] on the source to distinguish timeouts.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Local file I/O failed during a download.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server answered with a success status but the body could not be
    /// decoded as JSON.
    #[error("malformed response body (HTTP {status})")]
    MalformedResponse {
        /// HTTP status of the undecodable response.
        status: StatusCode,
    },

    /// The body decoded, but its top-level JSON shape does not match the
    /// shape declared by the request descriptor.
    #[error("response shape mismatch: expected {expected}, got {found}")]
    ShapeMismatch {
        /// Shape the descriptor declared.
        expected: &'static str,
        /// Shape the server actually returned.
        found: &'static str,
    },

    /// A business-level error reported by the API (4xx, or an error object
    /// delivered alongside a success status).
    #[error("API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status of the response.
        status: StatusCode,
        /// Server-supplied message when present, otherwise status-derived.
        message: String,
    },

    /// Credentials are missing, expired, or insufficient (401/403).
    /// Callers should re-authorize rather than retry.
    #[error("authorization failed (HTTP {status}): {message}")]
    Authorization {
        /// HTTP status of the response.
        status: StatusCode,
        /// Server-supplied message when present, otherwise status-derived.
        message: String,
    },

    /// The server failed (5xx).
    #[error("server error (HTTP {status})")]
    Server {
        /// HTTP status of the response.
        status: StatusCode,
    },

    /// A download was asked to write to a path that already exists. No
    /// network call is made and the existing file is left untouched.
    #[error("destination file already exists: {}", .0.display())]
    DestinationExists(PathBuf),
}
