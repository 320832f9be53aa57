//! Error types for readr-store

use std::time::Duration;
use thiserror::Error;

/// Result type alias for readr-store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Error kinds surfaced by the store.
///
/// Every variant is returned to the immediate caller; nothing is retried
/// inside the crate.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed value at a boundary (wire JSON or database column)
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Record type shape is invalid (missing/duplicate identity, bad column)
    #[error("Schema error: {0}")]
    Schema(String),

    /// Unique constraint violation on insert
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// No row matched the identity predicate
    #[error("Not found: {0}")]
    NotFound(String),

    /// More than one row was affected by an identity-keyed write
    #[error("Integrity violation on '{table}': identity predicate affected {affected} rows")]
    IntegrityViolation { table: String, affected: u64 },

    /// Partial update selected no column to SET
    #[error("Empty update on '{table}': no present field to SET")]
    EmptyUpdate { table: String },

    /// Any other driver-level failure, timeouts included
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionFailure),
}

/// The cause behind [`StoreError::Execution`].
#[derive(Debug, Error)]
pub enum ExecutionFailure {
    #[error("{0}")]
    Driver(#[from] tokio_postgres::Error),

    #[error("query timeout after {0:?}")]
    Timeout(Duration),

    #[error("pool error: {0}")]
    Pool(String),

    #[error("connection error: {0}")]
    Connection(String),
}

impl StoreError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn timeout(after: Duration) -> Self {
        Self::Execution(ExecutionFailure::Timeout(after))
    }

    pub fn pool(message: impl Into<String>) -> Self {
        Self::Execution(ExecutionFailure::Pool(message.into()))
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Execution(ExecutionFailure::Connection(message.into()))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a unique violation error
    pub fn is_duplicate_entry(&self) -> bool {
        matches!(self, Self::DuplicateEntry(_))
    }

    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, Self::IntegrityViolation { .. })
    }

    /// Check if this is an execution error (driver, pool, or timeout)
    pub fn is_execution_error(&self) -> bool {
        matches!(self, Self::Execution(_))
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Execution(ExecutionFailure::Timeout(_)))
    }

    /// Classify a tokio_postgres error into a store outcome.
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            if db_err.code().code() == "23505" {
                let constraint = db_err.constraint().unwrap_or("unknown");
                return Self::DuplicateEntry(format!("{}: {}", constraint, db_err.message()));
            }
        }
        Self::Execution(ExecutionFailure::Driver(err))
    }
}

impl From<tokio_postgres::Error> for StoreError {
    fn from(err: tokio_postgres::Error) -> Self {
        Self::from_db_error(err)
    }
}

impl From<deadpool_postgres::PoolError> for StoreError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::pool(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::decode("<body>", err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_an_execution_error() {
        let err = StoreError::timeout(Duration::from_millis(250));
        assert!(err.is_execution_error());
        assert!(err.is_timeout());
        assert!(!err.is_not_found());
    }

    #[test]
    fn integrity_violation_message_names_row_count() {
        let err = StoreError::IntegrityViolation {
            table: "members".into(),
            affected: 3,
        };
        assert!(err.is_integrity_violation());
        assert_eq!(
            err.to_string(),
            "Integrity violation on 'members': identity predicate affected 3 rows"
        );
    }

    #[test]
    fn json_errors_become_decode_errors() {
        let err: StoreError = serde_json::from_str::<i64>("\"x\"").unwrap_err().into();
        assert!(matches!(err, StoreError::Decode { ref column, .. } if column == "<body>"));
    }
}
