//! Error handling for the storage HTTP client
//!
//! This module defines the error types returned by every client operation,
//! covering transport failures as well as problems decoding the service's
//! response stream.

use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, StorageError>;

/// Error types that can occur when talking to the storage service
#[derive(Error, Debug)]
pub enum StorageError {
    /// The service answered with a non-success status
    #[error("Request failed: {status} {status_text}")]
    RequestFailed { status: u16, status_text: String },

    /// A response line could not be parsed as a JSON record
    #[error("Malformed response line {line}: {message}")]
    MalformedResponse { line: usize, message: String },

    /// A record's size field is missing or not a base-10 integer
    #[error("Invalid size in response: {value:?}")]
    InvalidSize { value: String },

    /// A record's identifier was rejected by the CID parser
    #[error("Invalid content identifier {value:?}: {message}")]
    InvalidIdentifier { value: String, message: String },

    /// The service returned no record carrying an identifier
    #[error("Response contained no added files")]
    EmptyResponse,

    /// Operation was cancelled
    #[error("Operation cancelled: {operation}")]
    Cancelled { operation: String },

    /// Operation timed out
    #[error("Operation timed out: {operation}")]
    Timeout { operation: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Invalid parameter
    #[error("Invalid parameter: {parameter} - {message}")]
    InvalidParameter { parameter: String, message: String },

    /// Transport-level error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StorageError {
    /// Create a new request failed error
    pub fn request_failed(status: u16, status_text: impl Into<String>) -> Self {
        StorageError::RequestFailed {
            status,
            status_text: status_text.into(),
        }
    }

    /// Create a new malformed response error
    pub fn malformed_response(line: usize, message: impl Into<String>) -> Self {
        StorageError::MalformedResponse {
            line,
            message: message.into(),
        }
    }

    /// Create a new invalid size error
    pub fn invalid_size(value: impl Into<String>) -> Self {
        StorageError::InvalidSize {
            value: value.into(),
        }
    }

    /// Create a new invalid identifier error
    pub fn invalid_identifier(value: impl Into<String>, message: impl Into<String>) -> Self {
        StorageError::InvalidIdentifier {
            value: value.into(),
            message: message.into(),
        }
    }

    /// Create a new cancelled error
    pub fn cancelled(operation: impl Into<String>) -> Self {
        StorageError::Cancelled {
            operation: operation.into(),
        }
    }

    /// Create a new timeout error
    pub fn timeout(operation: impl Into<String>) -> Self {
        StorageError::Timeout {
            operation: operation.into(),
        }
    }

    /// Create a new configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        StorageError::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        StorageError::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Map a transport error, surfacing timeouts as their own variant
    pub fn from_transport(operation: impl Into<String>, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StorageError::timeout(operation)
        } else {
            StorageError::Http(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = StorageError::request_failed(500, "Internal Server Error");
        assert!(matches!(err, StorageError::RequestFailed { status: 500, .. }));

        let err = StorageError::invalid_size("abc");
        assert!(matches!(err, StorageError::InvalidSize { .. }));

        let err = StorageError::cancelled("add");
        assert!(matches!(err, StorageError::Cancelled { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = StorageError::request_failed(500, "Internal Server Error");
        assert_eq!(err.to_string(), "Request failed: 500 Internal Server Error");

        let err = StorageError::malformed_response(2, "expected value");
        assert_eq!(
            err.to_string(),
            "Malformed response line 2: expected value"
        );

        let err = StorageError::invalid_size("12a");
        assert_eq!(err.to_string(), "Invalid size in response: \"12a\"");
    }
}
