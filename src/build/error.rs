//! Error types for stage and pipeline execution.

use std::path::PathBuf;
use thiserror::Error;

/// Error raised by a single stage invocation.
#[derive(Debug, Error)]
pub enum StageError {
    /// A configured glob does not parse
    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    /// An external transform (compiler, minifier, optimizer) rejected its input
    #[error("Failed to transform {}: {message}", path.display())]
    Transform { path: PathBuf, message: String },
    /// A source file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// An output could not be written or removed
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StageError {
    pub(crate) fn transform(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        StageError::Transform { path: path.into(), message: message.to_string() }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StageError::Read { path: path.into(), source }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StageError::Write { path: path.into(), source }
    }

    /// Whether this is a transform failure (the only kind watch mode tolerates).
    pub fn is_transform(&self) -> bool {
        matches!(self, StageError::Transform { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_error_display() {
        let err = StageError::transform("app/styles/SASS/main.scss", "expected \";\"");
        assert_eq!(
            err.to_string(),
            "Failed to transform app/styles/SASS/main.scss: expected \";\""
        );
        assert!(err.is_transform());
    }

    #[test]
    fn test_write_error_is_not_transform() {
        let err = StageError::write(
            "build/js/main.js",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!err.is_transform());
        assert!(err.to_string().starts_with("Failed to write build/js/main.js"));
    }
}
