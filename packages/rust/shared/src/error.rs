//! Error types for SoapBridge.
//!
//! Library crates use [`SoapBridgeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Note that the retrieval core never returns these for a bad reference
//! document; those degrade to inline placeholder text instead.

use std::path::PathBuf;

/// Top-level error type for all SoapBridge operations.
#[derive(Debug, thiserror::Error)]
pub enum SoapBridgeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// HTTP transport error talking to the model provider.
    #[error("network error: {0}")]
    Network(String),

    /// Structured content could not be parsed.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// The model provider rejected the request or returned an unusable reply.
    #[error("model error: {0}")]
    Model(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input validation error (blank SOAP text, unsupported file type, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SoapBridgeError>;

impl SoapBridgeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = SoapBridgeError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = SoapBridgeError::validation("unsupported reference file: notes.docx");
        assert!(err.to_string().contains("notes.docx"));

        let err = SoapBridgeError::Model("HTTP 429".into());
        assert_eq!(err.to_string(), "model error: HTTP 429");
    }

    #[test]
    fn io_error_carries_path() {
        let err = SoapBridgeError::io(
            "/tmp/missing.wsdl",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        let msg = err.to_string();
        assert!(msg.contains("missing.wsdl"));
        assert!(msg.contains("no such file"));
    }
}
