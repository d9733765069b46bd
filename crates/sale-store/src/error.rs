use common::{SaleId, Version};
use thiserror::Error;

/// Errors that can occur when interacting with the sale store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The stored version did not match the version the caller loaded.
    #[error(
        "Concurrency conflict for sale {sale_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        sale_id: SaleId,
        expected: Version,
        actual: Version,
    },

    /// The sale to update does not exist (any more).
    #[error("Sale not found: {0}")]
    NotFound(SaleId),

    /// Another sale already uses this business number.
    #[error("Sale number already in use: {0}")]
    DuplicateSaleNumber(String),

    /// The operation observed a cancellation request before completing.
    #[error("Operation cancelled")]
    Cancelled,

    /// Stored data could not be mapped back to the domain.
    #[error("Corrupt sale record: {0}")]
    Corrupt(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for sale store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
