//! Error types for repository operations.
//!
//! Every variant carries a human-readable message plus an [`ErrorContext`]
//! describing where the failure happened, so a single log line is enough to
//! trace it back to an operation and record.

use std::fmt;

use crate::context::ContextError;

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Structured context for repository errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// The operation being performed (e.g., "get_by_id", "update")
    pub operation: Option<String>,
    /// The entity type involved (e.g., "person")
    pub entity: Option<String>,
    /// The entity ID if applicable
    pub entity_id: Option<String>,
    /// Additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with an operation name.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn with_entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref entity) = self.entity {
            parts.push(format!("entity={}", entity));
        }
        if let Some(ref id) = self.entity_id {
            parts.push(format!("id={}", id));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// No record matched the requested key.
    #[error("Not found: {message} {context}")]
    NotFound {
        message: String,
        context: ErrorContext,
    },

    /// A write touched zero or more than one row. Always a hard failure.
    #[error("Row count mismatch: expected {expected} row(s), affected {actual} {context}")]
    RowCountMismatch {
        expected: usize,
        actual: usize,
        context: ErrorContext,
    },

    /// Opening or reaching the store failed.
    #[error("Connection error: {message} {context}")]
    ConnectionError {
        message: String,
        context: ErrorContext,
    },

    /// SQL preparation, execution or row decoding failed.
    #[error("Query error: {message} {context}")]
    QueryError {
        message: String,
        context: ErrorContext,
    },

    /// The request deadline elapsed before the store answered.
    #[error("Timeout error: {message} {context}")]
    TimeoutError {
        message: String,
        context: ErrorContext,
    },

    /// The caller gave up on the request.
    #[error("Cancelled: {message} {context}")]
    Cancelled {
        message: String,
        context: ErrorContext,
    },

    /// Configuration or initialization error.
    #[error("Configuration error: {message} {context}")]
    ConfigurationError {
        message: String,
        context: ErrorContext,
    },

    /// Internal/unexpected errors.
    #[error("Internal error: {message} {context}")]
    InternalError {
        message: String,
        context: ErrorContext,
    },
}

impl RepositoryError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn not_found_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::NotFound {
            message: message.into(),
            context,
        }
    }

    /// Create a row count error for a write expected to touch exactly one row.
    pub fn row_count(actual: usize, context: ErrorContext) -> Self {
        Self::RowCountMismatch {
            expected: 1,
            actual,
            context,
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn connection_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::ConnectionError {
            message: message.into(),
            context,
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::QueryError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::TimeoutError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::Cancelled {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn internal_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::InternalError {
            message: message.into(),
            context,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True for failures caused by the request context ending (deadline or cancellation).
    pub fn is_deadline(&self) -> bool {
        matches!(self, Self::TimeoutError { .. } | Self::Cancelled { .. })
    }

    /// Get the error context.
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::NotFound { context, .. }
            | Self::RowCountMismatch { context, .. }
            | Self::ConnectionError { context, .. }
            | Self::QueryError { context, .. }
            | Self::TimeoutError { context, .. }
            | Self::Cancelled { context, .. }
            | Self::ConfigurationError { context, .. }
            | Self::InternalError { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::NotFound { context, .. }
            | Self::RowCountMismatch { context, .. }
            | Self::ConnectionError { context, .. }
            | Self::QueryError { context, .. }
            | Self::TimeoutError { context, .. }
            | Self::Cancelled { context, .. }
            | Self::ConfigurationError { context, .. }
            | Self::InternalError { context, .. } => context,
        }
    }

    /// Add or update the operation in the error context.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Fill in the entity fields of the error context.
    pub fn for_entity(mut self, entity: impl Into<String>, id: impl ToString) -> Self {
        let context = self.context_mut();
        context.entity = Some(entity.into());
        context.entity_id = Some(id.to_string());
        self
    }
}

impl From<ContextError> for RepositoryError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::DeadlineExceeded => RepositoryError::timeout(err.to_string()),
            ContextError::Cancelled => RepositoryError::cancelled(err.to_string()),
        }
    }
}

#[cfg(feature = "sqlite-repo")]
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::not_found("Record not found"),
            rusqlite::Error::SqliteFailure(code, message) => {
                let context = ErrorContext::default()
                    .with_details(format!("sqlite_error_code={:?}", code.code));
                let message = message.unwrap_or_else(|| code.to_string());
                match code.code {
                    rusqlite::ErrorCode::CannotOpen | rusqlite::ErrorCode::NotADatabase => {
                        RepositoryError::ConnectionError { message, context }
                    }
                    _ => RepositoryError::QueryError { message, context },
                }
            }
            rusqlite::Error::FromSqlConversionFailure(column, kind, source) => {
                RepositoryError::query(format!(
                    "Failed to decode column {} ({}): {}",
                    column, kind, source
                ))
            }
            rusqlite::Error::InvalidColumnType(column, name, kind) => RepositoryError::query(
                format!("Invalid type {} for column {} ({})", kind, column, name),
            ),
            other => RepositoryError::query(other.to_string()),
        }
    }
}
