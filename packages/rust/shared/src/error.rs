//! Error types for the Living Textbook exporter.
//!
//! Library crates use [`LtbExportError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all export operations.
#[derive(Debug, thiserror::Error)]
pub enum LtbExportError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// The content repository could not answer a query.
    #[error("repository error: {0}")]
    Repository(String),

    /// Site dump or rich-text parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON encoding of the export document failed.
    #[error("encoding error: {0}")]
    Encoding(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LtbExportError>;

impl LtbExportError {
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

    /// Create a repository error from any displayable message.
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
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
        let err = LtbExportError::config("invalid legacy_code_pattern");
        assert_eq!(err.to_string(), "config error: invalid legacy_code_pattern");

        let err = LtbExportError::repository("record 17 not found");
        assert!(err.to_string().contains("record 17"));
    }

    #[test]
    fn variants_carry_their_prefix() {
        let cases = [
            (LtbExportError::config("bad"), "config error: bad"),
            (LtbExportError::repository("gone"), "repository error: gone"),
            (LtbExportError::parse("eof"), "parse error: eof"),
            (LtbExportError::Encoding("nan".into()), "encoding error: nan"),
        ];
        for (err, expected) in cases {
            assert_eq!(err.to_string(), expected);
        }
    }

    #[test]
    fn io_error_keeps_path() {
        let err = LtbExportError::io(
            "/tmp/out.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/out.json"));
        assert!(msg.contains("denied"));
    }
}
