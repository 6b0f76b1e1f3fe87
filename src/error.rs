//! Error types for client operations
//!
//! Every failure a caller can observe is a variant here; nothing is
//! swallowed. Status-code mapping from the wire lives in the client layer,
//! which builds these variants.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by client operations, the manifest loader, and the
/// mock API server.
#[derive(Debug, Error)]
pub enum Error {
    /// A wire body or manifest document could not be decoded.
    #[error("failed to decode body: {0}")]
    Decode(String),

    /// The server reported no object for the bound name/namespace.
    #[error("{kind} \"{name}\" not found")]
    NotFound { kind: String, name: String },

    /// Create was rejected because an object with that name already exists.
    #[error("{kind} \"{name}\" already exists")]
    AlreadyExists { kind: String, name: String },

    /// Update or patch was rejected, typically a resourceVersion mismatch.
    #[error("conflict writing {kind} \"{name}\"")]
    Conflict { kind: String, name: String },

    /// A manifest document names a kind that is not registered.
    #[error("manifest document {index}: unknown kind {api_version}/{kind}")]
    UnknownKind {
        index: usize,
        api_version: String,
        kind: String,
    },

    /// The operation needs a bound resource name but the scope has none.
    #[error("{operation} requires a resource name but none is bound")]
    Scope { operation: &'static str },

    /// Connectivity or timeout failure reported by the transport.
    #[error("transport error: {0}")]
    Transport(String),

    /// The mock API server received a request with no matching expectation.
    #[error("unexpected request: {method} {path} (no expectation matched)")]
    UnexpectedRequest { method: String, path: String },

    /// Any other non-success response from the server.
    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },

    /// A manifest item failed to apply; remaining items were not attempted.
    #[error("manifest document {index} ({kind}) failed to apply: {source}")]
    ManifestApply {
        index: usize,
        kind: String,
        #[source]
        source: Box<Error>,
    },

    /// Filesystem failure while reading or writing configuration.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}
