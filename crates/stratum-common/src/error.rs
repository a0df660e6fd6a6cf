//! Unified error types for the Stratum workspace.
//!
//! Each higher-level crate defines its own domain-specific error enum that wraps
//! these common variants when appropriate.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum StratumError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// The remote platform rejected the credentials or the operation.
    #[error("permission denied: {message}")]
    PermissionDenied {
        /// Description of the denied operation.
        message: String,
    },

    /// The remote platform answered with a non-success status.
    #[error("HTTP {status} from {url}: {message}")]
    Http {
        /// Response status code (0 when the request never got a response).
        status: u16,
        /// Request URL.
        url: String,
        /// Response body or transport error description.
        message: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// A YAML document could not be parsed.
    #[error("YAML error: {source}")]
    Yaml {
        /// Underlying YAML error.
        #[from]
        source: serde_yaml::Error,
    },
}

impl StratumError {
    /// Returns whether the error reports a missing remote or local resource.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, StratumError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_detected() {
        let err = StratumError::NotFound {
            kind: "dashboard",
            id: "d1".into(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "dashboard not found: d1");
    }

    #[test]
    fn http_error_names_status_and_url() {
        let err = StratumError::Http {
            status: 500,
            url: "https://env.example.com/api".into(),
            message: "boom".into(),
        };
        assert!(!err.is_not_found());
        let msg = err.to_string();
        assert!(msg.contains("500"), "got: {msg}");
        assert!(msg.contains("env.example.com"), "got: {msg}");
    }
}
