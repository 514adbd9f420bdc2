//! Market API error types

use reqwest::StatusCode;
use thiserror::Error;

/// Client error type
///
/// The view only ever shows the display text, so every variant renders as a
/// message a visitor can read.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend rejected the request with a message
    #[error("{message}")]
    Api { status: StatusCode, message: String },

    /// No login token for an authorized call
    #[error("Authentication required")]
    Unauthorized,

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Request could not be built from the current view state
    #[error("{0}")]
    Validation(String),

    /// Booking after a successful purchase failed; the purchase was rolled back
    #[error("Booking failed: {0}")]
    Booking(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for market API operations
pub type ClientResult<T> = Result<T, ClientError>;
