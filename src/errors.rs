/*!
 * Error types for the report translator.
 *
 * This module contains custom error types for the different seams of the pipeline,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::time::Duration;
use thiserror::Error;

/// Errors raised by a translation backend
///
/// Every variant carries the target language the call was made for.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// The request could not be sent or no response was received
    #[error("translation request to [{language}] failed: {message}")]
    RequestFailed {
        /// Target language of the failed call
        language: String,
        /// Underlying cause
        message: String,
    },

    /// The service answered with a non-success status
    #[error("translation service responded for [{language}] with {status_code}: {message}")]
    ApiError {
        /// Target language of the failed call
        language: String,
        /// HTTP status code
        status_code: u16,
        /// Error body returned by the service
        message: String,
    },

    /// The response body could not be understood
    #[error("malformed translation response for [{language}]: {message}")]
    ParseError {
        /// Target language of the failed call
        language: String,
        /// Parser message
        message: String,
    },

    /// The service returned a different number of strings than requested
    #[error("translation backend returned {actual} strings for [{language}], expected {expected}")]
    BatchLengthMismatch {
        /// Target language of the failed call
        language: String,
        /// Number of strings sent
        expected: usize,
        /// Number of strings received
        actual: usize,
    },
}

impl BackendError {
    /// Target language of the failed call
    pub fn language(&self) -> &str {
        match self {
            Self::RequestFailed { language, .. }
            | Self::ApiError { language, .. }
            | Self::ParseError { language, .. }
            | Self::BatchLengthMismatch { language, .. } => language,
        }
    }

    /// Whether retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RequestFailed { .. } => true,
            Self::ApiError { status_code, .. } => *status_code == 429 || *status_code >= 500,
            Self::ParseError { .. } | Self::BatchLengthMismatch { .. } => false,
        }
    }
}

/// Errors raised by the report and translation stores
#[derive(Error, Debug)]
pub enum StoreError {
    /// The database could not be opened or initialized
    #[error("storage connection failed: {0}")]
    Connection(String),

    /// A read query failed
    #[error("storage query failed: {0}")]
    Query(String),

    /// A write failed
    #[error("storage write failed: {0}")]
    Write(String),

    /// A stored document could not be decoded
    #[error("stored document is invalid: {0}")]
    Corrupt(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Query(error.to_string())
    }
}

/// Failure of a single translation job
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JobError {
    /// The backend call failed
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The job did not complete within the configured timeout
    #[error("translation job timed out after {0:?}")]
    Timeout(Duration),

    /// The worker running the job panicked or was cancelled
    #[error("translation worker aborted: {0}")]
    Aborted(String),
}

/// Configuration errors
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// No target language configured
    #[error("at least one target language must be configured")]
    NoLanguages,

    /// The same language code appears twice
    #[error("language [{0}] is configured more than once")]
    DuplicateLanguage(String),

    /// The language code is not a recognised ISO 639 code
    #[error("invalid language code: {0}")]
    InvalidLanguage(String),

    /// A concurrency ceiling is zero
    #[error("{0} must be at least 1")]
    InvalidConcurrency(&'static str),

    /// Too many retries configured for the backend
    #[error("retry_count must be at most {max}, got {value}")]
    InvalidRetryCount { value: u32, max: u32 },

    /// The backend endpoint is not a valid URL
    #[error("invalid backend endpoint '{0}'")]
    InvalidEndpoint(String),

    /// Production mode without credentials
    #[error("an API key is required when dry-run is disabled")]
    MissingApiKey,
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the storage layer
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Error from the translation backend
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

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
