//! Unified error handling for scenedump
//!
//! Crate-specific failures (dump, texture export, loading) have their own
//! error enums; this type covers what the scene model and shared
//! configuration can report.

use thiserror::Error;

/// Unified error type for scene model operations
#[derive(Error, Debug)]
pub enum Error {
    /// Scene data violates a structural invariant
    #[error("Invalid scene: {message}")]
    InvalidScene {
        message: String,
    },

    /// Unknown or unsupported file/image format
    #[error("Unsupported format: {format}")]
    UnsupportedFormat {
        format: String,
    },

    /// Custom error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

/// Result type using the unified Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error with additional context
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Error::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create an invalid scene error
    pub fn invalid_scene(message: impl Into<String>) -> Self {
        Error::InvalidScene {
            message: message.into(),
        }
    }

    /// Create an unsupported format error
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Error::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Check if this error (or the error it wraps) is a scene validation failure
    pub fn is_invalid_scene(&self) -> bool {
        match self {
            Error::InvalidScene { .. } => true,
            Error::WithContext { source, .. } => source.is_invalid_scene(),
            _ => false,
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_with_context() {
        let err = Error::invalid_scene("face 3 references vertex 9");
        let contextualized = err.with_context("mesh 0");

        assert_eq!(
            contextualized.to_string(),
            "mesh 0: Invalid scene: face 3 references vertex 9"
        );
    }

    #[test]
    fn test_is_invalid_scene_sees_through_context() {
        let err = Error::invalid_scene("bad").with_context("outer");
        assert!(err.is_invalid_scene());
        assert!(!Error::unsupported_format("xyz").is_invalid_scene());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::unsupported_format("gif"));
        let with_context = result.context("parsing image format");

        let err = with_context.unwrap_err();
        assert!(err.to_string().contains("parsing image format"));
        assert!(err.to_string().contains("gif"));
    }
}
