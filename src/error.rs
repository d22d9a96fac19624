//! Error types for relation resolution with actionable messages.
//!
//! Errors carry a code for programmatic handling plus optional context
//! (the path or SQL involved, suggestions for fixing the problem).
//!
//! # Error Codes
//!
//! Error codes follow a pattern: J{category}{number}
//! - 5xxx: Execution errors (database, engine)
//! - 6xxx: Data errors (deserialization)
//! - 7xxx: Configuration errors (malformed paths, connection strings)
//! - 9xxx: Internal errors
//!
//! ```rust
//! use jsonfk::error::{ErrorCode, RelationError};
//!
//! let err = RelationError::invalid_path("options->", "empty trailing segment");
//! assert_eq!(err.code, ErrorCode::InvalidPath);
//! assert_eq!(err.code.code(), "J7001");
//! ```

use std::fmt;
use thiserror::Error;

/// Result type for relation operations.
pub type RelationResult<T> = Result<T, RelationError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// General database error reported by the query engine (J5001).
    DatabaseError = 5001,
    /// Row data could not be deserialized into a record (J6001).
    DeserializationError = 6001,
    /// Malformed foreign-key path string (J7001).
    InvalidPath = 7001,
    /// Invalid connection string (J7002).
    InvalidConnectionString = 7002,
    /// Internal error (J9001).
    Internal = 9001,
}

impl ErrorCode {
    /// Get the error code string (e.g., "J7001").
    pub fn code(&self) -> String {
        format!("J{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::DatabaseError => "Database error",
            Self::DeserializationError => "Deserialization error",
            Self::InvalidPath => "Malformed foreign-key path",
            Self::InvalidConnectionString => "Invalid connection string",
            Self::Internal => "Internal error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation that was being performed.
    pub operation: Option<String>,
    /// The foreign-key path involved.
    pub path: Option<String>,
    /// The SQL query (if available).
    pub sql: Option<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<String>,
}

/// Errors that can occur while defining or resolving a JSON relation.
#[derive(Error, Debug)]
pub struct RelationError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for RelationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl RelationError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add context about the operation.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    /// Attach the foreign-key path involved.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.context.path = Some(path.into());
        self
    }

    /// Attach the SQL query that failed.
    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.context.sql = Some(sql.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(suggestion.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// Create a malformed-path error. Raised at relation-definition time.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(
            ErrorCode::InvalidPath,
            format!("Invalid foreign-key path '{}': {}", path, reason.into()),
        )
        .with_path(path)
        .with_suggestion("Use 'column->key' for arrays of scalar keys")
        .with_suggestion("Use 'column->records[]->key' for arrays of objects")
    }

    /// Create a database error from an engine failure.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::DatabaseError,
            format!("Database error: {}", message.into()),
        )
    }

    /// Create a deserialization error for a row that is not a JSON object.
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DeserializationError, message)
    }

    /// Create an invalid connection string error.
    pub fn invalid_connection_string(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InvalidConnectionString,
            format!("Invalid connection string '{}': {}", url.into(), reason.into()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_string() {
        assert_eq!(ErrorCode::InvalidPath.code(), "J7001");
        assert_eq!(ErrorCode::DatabaseError.code(), "J5001");
    }

    #[test]
    fn test_invalid_path_carries_context() {
        let err = RelationError::invalid_path("options", "missing '->' separator");
        assert_eq!(err.code, ErrorCode::InvalidPath);
        assert_eq!(err.context.path.as_deref(), Some("options"));
        assert!(!err.context.suggestions.is_empty());
        assert!(err.to_string().starts_with("[J7001]"));
    }

    #[test]
    fn test_builder_methods() {
        let err = RelationError::database("connection refused")
            .with_operation("eager_load")
            .with_sql("SELECT 1");
        assert_eq!(err.context.operation.as_deref(), Some("eager_load"));
        assert_eq!(err.context.sql.as_deref(), Some("SELECT 1"));
    }
}
