//! Lifecycle service error types.

use common::{SaleId, Version};
use domain::SaleError;
use sale_store::StoreError;
use thiserror::Error;

/// Errors returned by the lifecycle service.
///
/// "Not found" is not an error: reads return `None`, updates return `None`
/// and deletes return `false`.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was rejected before anything was persisted.
    #[error(transparent)]
    Validation(#[from] SaleError),

    /// Another sale already uses this business number.
    #[error("Sale number already in use: {0}")]
    DuplicateSaleNumber(String),

    /// The sale changed between load and write.
    #[error(
        "Concurrency conflict for sale {sale_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        sale_id: SaleId,
        expected: Version,
        actual: Version,
    },

    /// Cancellation was requested before the write committed.
    #[error("Operation cancelled")]
    Cancelled,

    /// The store failed.
    #[error("Store error: {0}")]
    Store(#[source] StoreError),
}

impl ServiceError {
    /// Returns true for errors caused by the request itself.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ServiceError::Validation(_) | ServiceError::DuplicateSaleNumber(_)
        )
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateSaleNumber(number) => ServiceError::DuplicateSaleNumber(number),
            StoreError::ConcurrencyConflict {
                sale_id,
                expected,
                actual,
            } => ServiceError::ConcurrencyConflict {
                sale_id,
                expected,
                actual,
            },
            StoreError::Cancelled => ServiceError::Cancelled,
            other => ServiceError::Store(other),
        }
    }
}

/// Result type for lifecycle service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_keep_their_meaning() {
        let sale_id = SaleId::new();

        let err: ServiceError = StoreError::DuplicateSaleNumber("S-1".into()).into();
        assert!(matches!(err, ServiceError::DuplicateSaleNumber(ref n) if n == "S-1"));
        assert!(err.is_validation());

        let err: ServiceError = StoreError::ConcurrencyConflict {
            sale_id,
            expected: Version::first(),
            actual: Version::new(2),
        }
        .into();
        assert!(matches!(err, ServiceError::ConcurrencyConflict { .. }));
        assert!(!err.is_validation());

        let err: ServiceError = StoreError::Cancelled.into();
        assert!(matches!(err, ServiceError::Cancelled));

        let err: ServiceError = StoreError::Corrupt("bad row".into()).into();
        assert!(matches!(err, ServiceError::Store(StoreError::Corrupt(_))));
    }

    #[test]
    fn validation_message_is_the_domain_message() {
        let err = ServiceError::from(SaleError::InvalidHeader {
            field: "sale_number",
        });
        assert_eq!(
            err.to_string(),
            "Invalid sale header: sale_number is required"
        );
    }
}
