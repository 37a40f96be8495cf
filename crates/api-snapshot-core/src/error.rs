//! Error types for api-snapshot.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Main error type for snapshot operations.
///
/// A snapshot mismatch is not an error: it is a regular test outcome and is
/// reported through the matcher's report instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or contradictory configuration (fatal at setup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Suite or test-case identifier that cannot become a path segment
    #[error("Invalid snapshot key: {0}")]
    InvalidKey(String),

    /// Filesystem failure, always tied to the path that caused it
    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        /// Offending path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Payload could not be canonicalized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored snapshot body is not decodable
    #[error("Invalid snapshot {}: {reason}", path.display())]
    InvalidSnapshot {
        /// Snapshot file path
        path: PathBuf,
        /// Why decoding failed
        reason: String,
    },

    /// Placeholder with a known type but a malformed expander chain
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// Configuration file could not be parsed
    #[error("YAML error: {0}")]
    Yaml(String),
}

impl Error {
    /// Wrap an I/O error with the path it happened on.
    pub fn fs(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Error::Filesystem {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = Error::Config("tests_dir is not set".to_string());
        assert_eq!(err.to_string(), "Configuration error: tests_dir is not set");
    }

    #[test]
    fn test_invalid_key_error() {
        let err = Error::InvalidKey("case name is empty".to_string());
        assert_eq!(err.to_string(), "Invalid snapshot key: case name is empty");
    }

    #[test]
    fn test_filesystem_error_names_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::fs("/tmp/snaps/test.json", io_err);
        let display = err.to_string();
        assert!(display.contains("/tmp/snaps/test.json"));
        assert!(display.contains("denied"));
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<i32>("not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_invalid_snapshot_error() {
        let err = Error::InvalidSnapshot {
            path: PathBuf::from("a/b.json"),
            reason: "expected value at line 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid snapshot a/b.json: expected value at line 1"
        );
    }

    #[test]
    fn test_invalid_pattern_error() {
        let err = Error::InvalidPattern("@string@.startsWith(".to_string());
        assert_eq!(err.to_string(), "Invalid pattern: @string@.startsWith(");
    }
}
