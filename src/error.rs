//! Taleforge Error Types
//!
//! Caller-facing error taxonomy plus the raw upstream failures that feed the
//! classifier in [`crate::classify`].

use crate::classify::Operation;

/// Main error type for Taleforge operations
#[derive(Debug, thiserror::Error)]
pub enum TaleforgeError {
    /// No usable credential, unreadable settings, and similar setup problems
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Caller input rejected before anything was sent upstream
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The image API refuses accounts without billing enabled
    #[error(
        "The image generation API requires billing to be enabled on the account used for {operation}."
    )]
    BillingRequired { operation: Operation },

    /// The upstream model is temporarily overloaded or unavailable
    #[error("The AI model is currently overloaded. Please wait a moment and try again.")]
    UpstreamOverloaded { operation: Operation },

    /// The credential used for this call ran out of quota
    #[error(
        "The current API key has exhausted its quota. Try again; the next attempt will use a different key."
    )]
    QuotaExceeded { operation: Operation },

    /// Anything the classifier has no specific rule for
    #[error("{message}")]
    OperationFailed { operation: Operation, message: String },
}

impl TaleforgeError {
    /// Returns true if a caller-driven retry is likely to succeed.
    ///
    /// Quota errors count as retryable because the pool cursor has already
    /// moved on, so the retry draws a different credential.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::UpstreamOverloaded { .. } | Self::QuotaExceeded { .. }
        )
    }

    /// The operation that failed, for errors raised by the classifier.
    pub fn operation(&self) -> Option<&Operation> {
        match self {
            Self::BillingRequired { operation }
            | Self::UpstreamOverloaded { operation }
            | Self::QuotaExceeded { operation }
            | Self::OperationFailed { operation, .. } => Some(operation),
            Self::Configuration(_) | Self::InvalidRequest(_) => None,
        }
    }
}

impl From<std::io::Error> for TaleforgeError {
    fn from(err: std::io::Error) -> Self {
        TaleforgeError::Configuration(format!("IO error: {}", err))
    }
}

/// Raw failure from the generation service or from decoding its output.
///
/// Never returned to callers directly; [`crate::classify::normalize`] turns
/// each one into exactly one [`TaleforgeError`].
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Non-success HTTP status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Connection, TLS, timeout or body read failure
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response did not match the declared shape
    #[error("failed to parse response: {0}")]
    Json(#[from] serde_json::Error),

    /// A 2xx response carrying no usable content
    #[error("empty response: {0}")]
    EmptyResponse(String),

    /// Image generation returned zero images
    #[error("no images were returned by the image model")]
    NoImages,

    /// Credential could not be encoded as a request header
    #[error("invalid API key format: {0}")]
    InvalidCredential(String),
}

/// Result type alias for Taleforge operations
pub type Result<T> = std::result::Result<T, TaleforgeError>;
