/*!
 * Error types for the locsync application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The envelope was well formed but carried no assistant text
    #[error("Invalid API response: {0}")]
    MissingContent(String),

    /// The provider configuration cannot address a backend (missing region, endpoint...)
    #[error("Provider configuration error: {0}")]
    Configuration(String),
}

impl ProviderError {
    /// Build the error matching an HTTP status and the backend's own message
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }

    /// Map a reqwest transport failure
    pub fn from_transport(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors raised while reading or validating a string catalog
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The catalog text is not valid catalog JSON
    #[error("Failed to parse string catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// The catalog does not declare which locale holds the source text
    #[error("String catalog has no source language")]
    MissingSourceLanguage,

    /// Reading or writing the catalog file failed
    #[error("String catalog I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during translation
///
/// Everything except `Document` is recorded per item by the batch scheduler
/// and never aborts a run.
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The provider answered with text that is not the expected JSON contract
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A batch response had no entry for this unit's index
    #[error("No translation returned for item {index}")]
    MissingFromResponse {
        /// Positional index of the unit inside its batch
        index: usize,
    },

    /// A translation dropped or reordered a format specifier
    #[error("Placeholder mismatch for {locale}: expected [{}], found [{}]", .expected.join(", "), .found.join(", "))]
    PlaceholderViolation {
        /// Locale whose translation was rejected
        locale: String,
        /// Tokens scanned from the source text
        expected: Vec<String>,
        /// Tokens scanned from the candidate translation
        found: Vec<String>,
    },

    /// The run was cancelled before this item's wave was dispatched
    #[error("Translation cancelled")]
    Cancelled,

    /// The input document could not be turned into translation work
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from catalog handling
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
