//! Error types for dataflow-shell
//!
//! Uses `thiserror` for ergonomic error definitions with automatic `Display` and `Error` impls.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for dataflow-shell
#[derive(Error, Debug)]
pub enum Error {
    #[error("Target error: {0}")]
    Target(#[from] TargetError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Classification of a failed targeting attempt
///
/// The label of each kind is what `info` shows in front of the failure
/// message, so it must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetErrorKind {
    /// The target (or proxy) URI was rejected locally; no request was sent
    InvalidTarget,
    /// The request failed at the transport level (DNS, refused, timeout, TLS, HTTP status, body)
    ConnectionError,
    /// The server answered but reports an API revision this shell does not speak
    VersionMismatch,
}

impl TargetErrorKind {
    /// Stable display label for this kind
    pub fn label(&self) -> &'static str {
        match self {
            Self::InvalidTarget => "InvalidTarget",
            Self::ConnectionError => "ConnectionError",
            Self::VersionMismatch => "VersionMismatch",
        }
    }
}

impl fmt::Display for TargetErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A failed targeting attempt: kind tag plus the original message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct TargetError {
    pub kind: TargetErrorKind,
    pub message: String,
}

impl TargetError {
    pub fn new(kind: TargetErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_target(message: impl Into<String>) -> Self {
        Self::new(TargetErrorKind::InvalidTarget, message)
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(TargetErrorKind::ConnectionError, message)
    }

    pub fn version_mismatch(message: impl Into<String>) -> Self {
        Self::new(TargetErrorKind::VersionMismatch, message)
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TargetError::connection("FooBar");
        assert_eq!(err.to_string(), "ConnectionError: FooBar");

        let err = TargetError::invalid_target("relative URI");
        assert!(err.to_string().starts_with("InvalidTarget: "));

        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/foo.toml"));
        assert!(err.to_string().contains("/tmp/foo.toml"));
    }

    #[test]
    fn test_kind_labels_are_variant_names() {
        assert_eq!(TargetErrorKind::InvalidTarget.label(), "InvalidTarget");
        assert_eq!(TargetErrorKind::ConnectionError.label(), "ConnectionError");
        assert_eq!(TargetErrorKind::VersionMismatch.to_string(), "VersionMismatch");
    }

    #[test]
    fn test_error_conversion() {
        let target_err = TargetError::version_mismatch("drift");
        let top: Error = target_err.into();
        assert!(matches!(top, Error::Target(_)));

        let config_err = ConfigError::LoadFailed("bad toml".to_string());
        let _top_err: Error = config_err.into();
    }
}
