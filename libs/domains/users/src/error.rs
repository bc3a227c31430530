use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by user operations.
///
/// "Not found" is not an error: lookups return `None`, deletes return `false`.
/// Driver faults are kept as `source` for diagnostics but stay out of `Display`.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Query failed while {operation}")]
    Query {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("Query timed out while {operation}")]
    Timeout { operation: &'static str },
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        UserError::InvalidArgument(message.into())
    }

    pub fn query(operation: &'static str, source: impl Into<BoxError>) -> Self {
        UserError::Query {
            operation,
            source: source.into(),
        }
    }

    /// True for store-side failures (including timeouts), false for caller mistakes
    pub fn is_query_failure(&self) -> bool {
        matches!(self, UserError::Query { .. } | UserError::Timeout { .. })
    }
}
