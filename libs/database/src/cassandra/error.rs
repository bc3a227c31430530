use scylla::errors::ExecutionError;

/// Error type for Cassandra connection and schema operations
#[derive(Debug, thiserror::Error)]
pub enum CassandraError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Schema step '{step}' failed: {details}")]
    Schema { step: &'static str, details: String },

    #[error(
        "Invalid identifier '{0}': expected a letter followed by up to 47 ASCII letters, digits or underscores"
    )]
    InvalidIdentifier(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Session is not connected")]
    NotConnected,

    #[error("Unexpected response: {0}")]
    Response(String),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),
}

impl CassandraError {
    pub(crate) fn schema(step: &'static str, err: impl std::fmt::Display) -> Self {
        CassandraError::Schema {
            step,
            details: err.to_string(),
        }
    }

    /// Whether repeating the start-up sequence could succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CassandraError::Connection(_)
                | CassandraError::Schema { .. }
                | CassandraError::Execution(_)
                | CassandraError::Response(_)
        )
    }
}
