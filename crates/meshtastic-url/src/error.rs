//! Error types for meshtastic-url.

use thiserror::Error;

/// Errors surfaced by the URL codec.
///
/// Per-candidate parse failures never appear here; the decoder records them
/// in its attempt log instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UrlError {
    /// The payload text is not valid base64 in either alphabet.
    #[error("Failed to decode base64 data: {0}")]
    MalformedEncoding(String),

    /// The URL has neither a fragment nor a `c` query parameter.
    #[error("No encoded channel data found in URL")]
    NoEncodedData,

    /// Every candidate schema was tried and none was plausible.
    #[error("Unable to decode protobuf data ({} schemas attempted)", attempts.len())]
    AllCandidatesExhausted {
        /// One `"<Schema> failed: <reason>"` entry per rejected candidate.
        attempts: Vec<String>,
    },

    /// An encoder input value could not be cast to its target type.
    #[error("Invalid value for {field}: expected {expected}, got {value}")]
    FieldCoercion {
        /// Field name as given in the request.
        field: String,
        /// Target type, e.g. `integer`.
        expected: &'static str,
        /// The offending value, rendered as JSON.
        value: String,
    },

    /// The encode request is structurally wrong (missing channels, not an object).
    #[error("Invalid encode request: {0}")]
    InvalidSpec(String),

    /// The encoder produced a URL its own decoder rejects.
    #[error("Self-check failed: {0}")]
    SelfCheckFailed(String),

    /// QR rendering or scanning failed.
    #[error("QR error: {0}")]
    Qr(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl UrlError {
    /// Create a coercion error for `value`.
    pub fn coercion(field: &str, expected: &'static str, value: &serde_json::Value) -> Self {
        UrlError::FieldCoercion {
            field: field.to_string(),
            expected,
            value: value.to_string(),
        }
    }

    /// Whether this error aborts a decode before any schema is tried.
    pub fn is_hard_decode_failure(&self) -> bool {
        matches!(self, UrlError::MalformedEncoding(_) | UrlError::NoEncodedData)
    }
}

impl From<serde_yaml::Error> for UrlError {
    fn from(err: serde_yaml::Error) -> Self {
        UrlError::Config(err.to_string())
    }
}

/// Result type alias for URL codec operations.
pub type UrlResult<T> = Result<T, UrlError>;
