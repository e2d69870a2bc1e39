//! Error types for goosey-db

use thiserror::Error;

/// Ledger store errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Script or query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Transaction management error (D003)
    #[error("[D003] Transaction failed: {0}")]
    TransactionError(String),

    /// Ledger already holds a row for this identifier (D004)
    #[error("[D004] Migration '{0}' is already recorded in the ledger")]
    DuplicateIdentifier(String),

    /// Ledger holds no row for this identifier (D005)
    #[error("[D005] Migration '{0}' is not recorded in the ledger")]
    NotFound(String),

    /// A ledger row could not be decoded (D006)
    #[error("[D006] Invalid ledger row: {0}")]
    InvalidRow(String),

    /// Script manages its own transaction (D007)
    #[error("[D007] Script contains a {0} statement; migration scripts must not begin, commit or roll back transactions")]
    TransactionControl(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        DbError::ExecutionError(err.to_string())
    }
}
