//! Error types for lifeline.
//!
//! This module defines all error types used throughout the lifeline crate,
//! providing detailed context for debugging and user-friendly error messages.

use thiserror::Error;

/// The main error type for lifeline operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Provider Errors ===
    /// A request to the network capability provider failed to complete.
    #[error("provider request for {operation} failed: {source}")]
    ProviderRequest {
        /// The provider operation that was attempted.
        operation: &'static str,
        /// The underlying transport or decoding error.
        #[source]
        source: reqwest::Error,
    },

    /// The network capability provider rejected a request.
    #[error("provider returned HTTP {status} for {operation}: {body}")]
    ProviderStatus {
        /// The provider operation that was attempted.
        operation: &'static str,
        /// The HTTP status code the provider returned.
        status: u16,
        /// The response body, verbatim.
        body: String,
    },

    /// The provider response was missing an expected field.
    #[error("provider response for {operation} missing {field}")]
    ProviderDecode {
        /// The provider operation that was attempted.
        operation: &'static str,
        /// The field that was absent.
        field: &'static str,
    },

    // === Store Errors ===
    /// A document store operation failed.
    #[error("store operation failed: {0}")]
    Store(#[from] mongodb::error::Error),

    /// A record could not be encoded as a store document.
    #[error("failed to encode document: {0}")]
    DocumentEncode(#[from] mongodb::bson::ser::Error),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// A socket or file system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for lifeline operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a provider transport error for the given operation.
    #[must_use]
    pub fn provider_request(operation: &'static str, source: reqwest::Error) -> Self {
        Self::ProviderRequest { operation, source }
    }

    /// Create a provider rejection error from a non-success response.
    #[must_use]
    pub fn provider_status(operation: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self::ProviderStatus {
            operation,
            status,
            body: body.into(),
        }
    }

    /// Create a provider decode error for a missing response field.
    #[must_use]
    pub fn provider_decode(operation: &'static str, field: &'static str) -> Self {
        Self::ProviderDecode { operation, field }
    }

    /// Create a configuration validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Check if this error originated at the network capability provider.
    #[must_use]
    pub fn is_provider_error(&self) -> bool {
        matches!(
            self,
            Self::ProviderRequest { .. } | Self::ProviderStatus { .. } | Self::ProviderDecode { .. }
        )
    }

    /// Check if this error originated at the document store.
    #[must_use]
    pub fn is_store_error(&self) -> bool {
        matches!(self, Self::Store(_) | Self::DocumentEncode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_status_display() {
        let err = Error::provider_status("connectivity", 403, "quota exceeded");
        let msg = err.to_string();
        assert!(msg.contains("connectivity"));
        assert!(msg.contains("403"));
        assert!(msg.contains("quota exceeded"));
    }

    #[test]
    fn test_provider_decode_display() {
        let err = Error::provider_decode("location", "area.center");
        assert_eq!(
            err.to_string(),
            "provider response for location missing area.center"
        );
    }

    #[test]
    fn test_validation_display() {
        let err = Error::validation("port must be greater than 0");
        assert_eq!(
            err.to_string(),
            "invalid configuration: port must be greater than 0"
        );
    }

    #[test]
    fn test_is_provider_error() {
        assert!(Error::provider_status("qod", 500, "oops").is_provider_error());
        assert!(Error::provider_decode("location", "area").is_provider_error());
        assert!(!Error::validation("bad").is_provider_error());
    }

    #[test]
    fn test_is_store_error() {
        assert!(!Error::validation("bad").is_store_error());
        assert!(!Error::provider_status("qod", 500, "oops").is_store_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("address in use"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_from_bson_error() {
        // A bare string cannot become a BSON document
        if let Err(bson_err) = mongodb::bson::to_document(&"not a map") {
            let err: Error = bson_err.into();
            assert!(matches!(err, Error::DocumentEncode(_)));
            assert!(err.is_store_error());
        }
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "store.username is not set".to_string(),
        };
        assert!(err.to_string().contains("store.username"));
    }
}
