//! Error types for ClipFetch
//!
//! This module defines error types using thiserror for ergonomic error handling.
//! Every channel operation returns [`Result`]; errors are caught at the
//! channel boundary and surfaced through that channel's banner, so one
//! channel failing never affects the other.
//!
//! ## Taxonomy
//!
//! - `Validation` - empty or malformed user input, never reaches the network
//! - `Resolution` - metadata fetch failed or returned unusable data
//! - `Precondition` - download attempted before a successful resolution
//! - `Transfer` - download request, body stream or local save failed
//! - `InvalidState` - a second job was started while one is in flight

use thiserror::Error;

/// Result type alias using our ClipFetchError type
pub type Result<T> = std::result::Result<T, ClipFetchError>;

/// Generic message used when the resolution endpoint gives no reason
pub const GENERIC_RESOLUTION_MESSAGE: &str = "Failed to fetch media info";

/// Generic message used when the download endpoint gives no reason
pub const GENERIC_TRANSFER_MESSAGE: &str = "Download failed";

/// Main error type for ClipFetch
#[derive(Error, Debug)]
pub enum ClipFetchError {
    // ===== User Input =====

    /// Input rejected before any network call
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Operation attempted out of order (e.g. download before resolve)
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Channel is busy with another job
    #[error("Invalid state: {0}")]
    InvalidState(String),

    // ===== Service Errors =====

    /// Metadata resolution failed
    #[error("Resolution failed: {message}")]
    Resolution {
        message: String,
        /// HTTP status code if the server answered
        status_code: Option<u16>,
    },

    /// Download request or stream failed after starting
    #[error("Transfer failed: {message}")]
    Transfer {
        message: String,
        /// HTTP status code if the server answered
        status_code: Option<u16>,
    },

    // ===== Configuration =====

    /// Configuration is invalid or incomplete
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    // ===== External Library Errors =====

    /// HTTP client error from reqwest
    #[error("HTTP client error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed URL
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),
}

// Helper methods for creating common errors
impl ClipFetchError {
    /// Create a Validation error with a message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        ClipFetchError::Validation(message.into())
    }

    /// Create a Precondition error with a message
    pub fn precondition<S: Into<String>>(message: S) -> Self {
        ClipFetchError::Precondition(message.into())
    }

    /// Create a Resolution error, preferring the server message when present
    pub fn resolution(server_message: Option<String>, status_code: Option<u16>) -> Self {
        ClipFetchError::Resolution {
            message: non_empty_or(server_message, GENERIC_RESOLUTION_MESSAGE),
            status_code,
        }
    }

    /// Create a Transfer error, preferring the server message when present
    pub fn transfer(server_message: Option<String>, status_code: Option<u16>) -> Self {
        ClipFetchError::Transfer {
            message: non_empty_or(server_message, GENERIC_TRANSFER_MESSAGE),
            status_code,
        }
    }

    /// Re-classify a low-level error raised while talking to the resolution endpoint
    pub fn into_resolution(self) -> Self {
        match self {
            e @ ClipFetchError::Resolution { .. } => e,
            ClipFetchError::ReqwestError(e) => ClipFetchError::Resolution {
                message: format!("Network request failed: {}", e),
                status_code: e.status().map(|s| s.as_u16()),
            },
            other => ClipFetchError::Resolution {
                message: other.to_string(),
                status_code: None,
            },
        }
    }

    /// Re-classify a low-level error raised during a download
    pub fn into_transfer(self) -> Self {
        match self {
            e @ ClipFetchError::Transfer { .. } => e,
            ClipFetchError::ReqwestError(e) => ClipFetchError::Transfer {
                message: format!("Network request failed: {}", e),
                status_code: e.status().map(|s| s.as_u16()),
            },
            other => ClipFetchError::Transfer {
                message: other.to_string(),
                status_code: None,
            },
        }
    }

    /// Short machine-readable category, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            ClipFetchError::Validation(_) => "validation",
            ClipFetchError::Precondition(_) => "precondition",
            ClipFetchError::InvalidState(_) => "invalid_state",
            ClipFetchError::Resolution { .. } => "resolution",
            ClipFetchError::Transfer { .. } => "transfer",
            ClipFetchError::InvalidConfiguration(_) | ClipFetchError::UrlError(_) => "configuration",
            ClipFetchError::ReqwestError(_) => "network",
            ClipFetchError::SerdeJsonError(_) => "serialization",
            ClipFetchError::IoError(_) => "io",
        }
    }

    /// Get user-friendly error message suitable for a banner
    ///
    /// Server-supplied messages are returned verbatim.
    pub fn user_message(&self) -> String {
        match self {
            ClipFetchError::Resolution { message, .. } | ClipFetchError::Transfer { message, .. } => {
                message.clone()
            }
            ClipFetchError::Validation(message)
            | ClipFetchError::Precondition(message)
            | ClipFetchError::InvalidState(message) => message.clone(),
            _ => self.to_string(),
        }
    }
}

fn non_empty_or(message: Option<String>, fallback: &str) -> String {
    message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
