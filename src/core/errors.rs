//! Error types for the envinline library.
//!
//! Every failure the pipeline can surface to the host is one of these
//! variants. Per-file failures (parse and write) keep the originating path so
//! the orchestrator can name the broken file in its single failure report.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Main result type for envinline operations.
pub type Result<T> = std::result::Result<T, InlineError>;

/// Comprehensive error type for all envinline operations.
#[derive(Error, Debug)]
pub enum InlineError {
    /// I/O related errors not tied to a specific pipeline stage
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error description
        message: String,
        /// Configuration field that caused the error
        field: Option<String>,
    },

    /// The host function registry could not be enumerated
    #[error("Discovery error: {message}")]
    Discovery {
        /// Error description
        message: String,
        /// Underlying cause reported by the registry
        #[source]
        source: Option<Box<InlineError>>,
    },

    /// The recursive scan could not stat or list an entry
    #[error("Failed to read directory entry {}: {source}", path.display())]
    DirectoryRead {
        /// Entry that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A source file could not be parsed
    #[error("Parse error in {language}: {message}")]
    Parse {
        /// Source kind being parsed
        language: String,
        /// Error description
        message: String,
        /// File path where error occurred
        file_path: Option<PathBuf>,
        /// Line number (1-based, if available)
        line: Option<usize>,
        /// Column number (1-based, if available)
        column: Option<usize>,
    },

    /// A source file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A rewritten file could not be written back
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error description
        message: String,
        /// Data format being handled
        data_type: Option<String>,
        /// Underlying serialization error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Generic internal errors (task failures and the like)
    #[error("Internal error: {message}")]
    Internal {
        /// Error description
        message: String,
        /// Additional context
        context: Option<String>,
    },

    /// Unsupported operation or source kind
    #[error("Unsupported: {message}")]
    Unsupported {
        /// Error description
        message: String,
    },
}

impl InlineError {
    /// Create a new I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new configuration error with field context
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a discovery error wrapping the registry's own failure
    pub fn discovery_caused_by(message: impl Into<String>, cause: InlineError) -> Self {
        Self::Discovery {
            message: message.into(),
            source: Some(Box::new(cause)),
        }
    }

    /// Create a new directory read error
    pub fn directory_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::DirectoryRead {
            path: path.into(),
            source,
        }
    }

    /// Create a new parse error
    pub fn parse(language: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            language: language.into(),
            message: message.into(),
            file_path: None,
            line: None,
            column: None,
        }
    }

    /// Create a new parse error with file context
    pub fn parse_with_location(
        language: impl Into<String>,
        message: impl Into<String>,
        file_path: impl Into<PathBuf>,
        line: Option<usize>,
        column: Option<usize>,
    ) -> Self {
        Self::Parse {
            language: language.into(),
            message: message.into(),
            file_path: Some(file_path.into()),
            line,
            column,
        }
    }

    /// Create a new read error
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Create a new write error
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            context: None,
        }
    }

    /// Create a new unsupported error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Add context to an existing error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        if let Self::Internal { context: ctx, .. } = &mut self {
            *ctx = Some(context.into());
        }
        self
    }

    /// Attach the originating file to a parse error that was raised without one.
    pub fn in_file(mut self, path: &Path) -> Self {
        if let Self::Parse { file_path, .. } = &mut self {
            if file_path.is_none() {
                *file_path = Some(path.to_path_buf());
            }
        }
        self
    }

    /// The source file a per-file failure originated from, if any.
    pub fn file_path(&self) -> Option<&Path> {
        match self {
            Self::Parse { file_path, .. } => file_path.as_deref(),
            Self::Read { path, .. } | Self::Write { path, .. } | Self::DirectoryRead { path, .. } => {
                Some(path)
            }
            _ => None,
        }
    }
}

impl From<io::Error> for InlineError {
    fn from(err: io::Error) -> Self {
        Self::io("I/O operation failed", err)
    }
}

impl From<serde_json::Error> for InlineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON serialization failed: {err}"),
            data_type: Some("JSON".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_yaml::Error> for InlineError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML serialization failed: {err}"),
            data_type: Some("YAML".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<tokio::task::JoinError> for InlineError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::internal(format!("Background task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = InlineError::config("Invalid configuration");
        assert!(matches!(err, InlineError::Config { .. }));

        let err = InlineError::parse("javascript", "Syntax error");
        assert!(matches!(err, InlineError::Parse { .. }));
    }

    #[test]
    fn test_internal_with_context() {
        let err = InlineError::internal("Task panicked").with_context("While rewriting a.js");

        if let InlineError::Internal { context, .. } = err {
            assert_eq!(context, Some("While rewriting a.js".to_string()));
        } else {
            panic!("Expected Internal error");
        }
    }

    #[test]
    fn test_with_context_leaves_other_variants_alone() {
        let err = InlineError::config("Bad config").with_context("ignored");

        if let InlineError::Config { message, .. } = err {
            assert_eq!(message, "Bad config");
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_parse_with_location() {
        let err = InlineError::parse_with_location(
            "typescript",
            "Unexpected token",
            "/functions/hello.ts",
            Some(3),
            Some(7),
        );

        if let InlineError::Parse {
            language,
            file_path,
            line,
            column,
            ..
        } = &err
        {
            assert_eq!(language, "typescript");
            assert_eq!(file_path.as_deref(), Some(Path::new("/functions/hello.ts")));
            assert_eq!(*line, Some(3));
            assert_eq!(*column, Some(7));
        } else {
            panic!("Expected Parse error");
        }
        assert_eq!(err.file_path(), Some(Path::new("/functions/hello.ts")));
    }

    #[test]
    fn test_in_file_fills_missing_path_only() {
        let err = InlineError::parse("javascript", "boom").in_file(Path::new("/a.js"));
        assert_eq!(err.file_path(), Some(Path::new("/a.js")));

        let err = InlineError::parse_with_location("javascript", "boom", "/b.js", None, None)
            .in_file(Path::new("/a.js"));
        assert_eq!(err.file_path(), Some(Path::new("/b.js")));
    }

    #[test]
    fn test_write_error_reports_path() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "Access denied");
        let err = InlineError::write("/functions/a.js", io_err);

        assert_eq!(err.file_path(), Some(Path::new("/functions/a.js")));
        assert!(err.to_string().contains("/functions/a.js"));
    }

    #[test]
    fn test_discovery_error_keeps_cause() {
        let cause = InlineError::config("functions directory does not exist");
        let err = InlineError::discovery_caused_by("registry failed", cause);

        assert!(matches!(err, InlineError::Discovery { .. }));
        let source = std::error::Error::source(&err).expect("cause");
        assert!(source.to_string().contains("functions directory"));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<i32>("invalid json").unwrap_err();
        let err: InlineError = json_err.into();

        if let InlineError::Serialization { data_type, .. } = err {
            assert_eq!(data_type, Some("JSON".to_string()));
        } else {
            panic!("Expected Serialization error");
        }
    }

    #[test]
    fn test_from_yaml_error() {
        let yaml_err = serde_yaml::from_str::<i32>("invalid: yaml: content").unwrap_err();
        let err: InlineError = yaml_err.into();

        assert!(matches!(err, InlineError::Serialization { .. }));
    }
}
