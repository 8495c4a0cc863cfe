//! Error types for the dialect layer.

use thiserror::Error;

/// Boxed driver error carried through unmodified from an execution backend.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for introspection and translation operations.
///
/// A missing table is not an error: [`SchemaIntrospector::load_table`]
/// reports it as `Ok(None)`.
///
/// [`SchemaIntrospector::load_table`]: crate::drivers::SchemaIntrospector::load_table
#[derive(Error, Debug)]
pub enum DialectError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller passed a semantically invalid argument.
    #[error("Invalid parameter: {0}")]
    Parameter(String),

    /// Requested translation cannot be expressed by the engine.
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Execution failure reported by the database backend.
    #[error("Database error while {context}: {source}")]
    Database {
        context: String,
        #[source]
        source: BoxError,
    },

    /// Catalog rows did not have the expected shape.
    #[error("Schema extraction failed: {0}")]
    SchemaExtraction(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ODBC driver manager or driver error
    #[cfg(feature = "odbc")]
    #[error("ODBC error: {0}")]
    Odbc(#[from] odbc_api::Error),
}

impl DialectError {
    /// Wrap a backend error with context about where it occurred.
    pub fn database(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        DialectError::Database {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Create a Parameter error.
    pub fn parameter(message: impl Into<String>) -> Self {
        DialectError::Parameter(message.into())
    }

    /// Create a NotSupported error.
    pub fn not_supported(message: impl Into<String>) -> Self {
        DialectError::NotSupported(message.into())
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            DialectError::Config(_) | DialectError::Yaml(_) => 2,
            DialectError::Parameter(_) | DialectError::NotSupported(_) => 3,
            DialectError::Io(_) => 4,
            _ => 1,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for dialect operations.
pub type Result<T> = std::result::Result<T, DialectError>;
