use async_trait::async_trait;
use common::SaleId;
use domain::Sale;
use tokio_util::sync::CancellationToken;

use crate::{DateRange, Result};

/// Durable CRUD storage for the sale aggregate.
///
/// Sales are keyed by id and by their unique business number. Every
/// operation takes a cancellation token and returns
/// [`StoreError::Cancelled`](crate::StoreError::Cancelled) if it fires before
/// the operation commits. All implementations must be thread-safe.
#[async_trait]
pub trait SaleStore: Send + Sync {
    /// Persists a new sale at [`Version::first`](common::Version::first).
    ///
    /// Fails with `DuplicateSaleNumber` if the business number is taken.
    async fn create(&self, sale: Sale, cancel: &CancellationToken) -> Result<Sale>;

    /// Loads a sale by id.
    async fn get_by_id(&self, id: SaleId, cancel: &CancellationToken) -> Result<Option<Sale>>;

    /// Loads a sale by its business number.
    async fn get_by_number(
        &self,
        sale_number: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Sale>>;

    /// Loads every sale, ordered by sale date then number.
    async fn get_all(&self, cancel: &CancellationToken) -> Result<Vec<Sale>>;

    /// Loads the sales whose date lies in `range`, ordered by sale date then number.
    async fn get_by_date_range(
        &self,
        range: DateRange,
        cancel: &CancellationToken,
    ) -> Result<Vec<Sale>>;

    /// Replaces a stored sale, header and lines.
    ///
    /// The sale's version must equal the stored version, otherwise the update
    /// fails with `ConcurrencyConflict`. Returns the sale at its new version.
    async fn update(&self, sale: Sale, cancel: &CancellationToken) -> Result<Sale>;

    /// Hard-deletes a sale and its lines. Returns false if it did not exist.
    async fn delete(&self, id: SaleId, cancel: &CancellationToken) -> Result<bool>;
}
