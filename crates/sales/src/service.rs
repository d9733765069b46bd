//! Sale lifecycle service.

use std::future::Future;

use chrono::{DateTime, Utc};
use common::SaleId;
use domain::{CreateSale, Sale, UpdateSale};
use event_sink::{EventSink, EventSinkExt};
use read_cache::CacheBackend;
use sale_store::{DateRange, SaleStore, StoreError};
use tokio_util::sync::CancellationToken;

use crate::cache::{SaleCache, id_key, number_key};
use crate::{Result, SaleDto, ServiceError};

/// Orchestrates reads and writes of sales.
///
/// The service holds no state of its own between calls and takes no locks:
/// concurrent updates of one sale are resolved by the store's version check.
///
/// Every operation takes a cancellation token. It is honoured up to the
/// store write; once a write has committed, cache invalidation and event
/// publication always run.
pub struct SaleLifecycleService<S, C, E>
where
    S: SaleStore,
    C: CacheBackend,
    E: EventSink,
{
    store: S,
    cache: SaleCache<C>,
    events: E,
}

impl<S, C, E> SaleLifecycleService<S, C, E>
where
    S: SaleStore,
    C: CacheBackend,
    E: EventSink,
{
    /// Creates a new lifecycle service.
    pub fn new(store: S, cache: C, events: E) -> Self {
        Self {
            store,
            cache: SaleCache::new(cache),
            events,
        }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a reference to the sale cache.
    pub fn cache(&self) -> &SaleCache<C> {
        &self.cache
    }

    /// Returns a reference to the event sink.
    pub fn events(&self) -> &E {
        &self.events
    }

    /// Gets a sale by id, from the cache when possible.
    #[tracing::instrument(skip(self, cancel))]
    pub async fn get_by_id(
        &self,
        id: SaleId,
        cancel: &CancellationToken,
    ) -> Result<Option<SaleDto>> {
        ensure_active(cancel)?;
        self.read_through(id_key(id), self.store.get_by_id(id, cancel))
            .await
    }

    /// Gets a sale by business number, from the cache when possible.
    #[tracing::instrument(skip(self, cancel))]
    pub async fn get_by_number(
        &self,
        sale_number: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<SaleDto>> {
        ensure_active(cancel)?;
        self.read_through(
            number_key(sale_number),
            self.store.get_by_number(sale_number, cancel),
        )
        .await
    }

    /// Gets every sale. Always reads the store.
    #[tracing::instrument(skip(self, cancel))]
    pub async fn get_all(&self, cancel: &CancellationToken) -> Result<Vec<SaleDto>> {
        ensure_active(cancel)?;
        let sales = self.store.get_all(cancel).await?;
        Ok(sales.iter().map(SaleDto::from).collect())
    }

    /// Gets the sales dated within `[start, end]`. Always reads the store.
    #[tracing::instrument(skip(self, cancel))]
    pub async fn get_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<Vec<SaleDto>> {
        let range = DateRange::new(start, end)?;
        ensure_active(cancel)?;
        let sales = self.store.get_by_date_range(range, cancel).await?;
        Ok(sales.iter().map(SaleDto::from).collect())
    }

    /// Creates a sale, pricing every line with the discount policy.
    ///
    /// Nothing is persisted if the header or any line is invalid.
    #[tracing::instrument(skip(self, cmd, cancel), fields(sale_number = %cmd.sale_number))]
    pub async fn create(&self, cmd: CreateSale, cancel: &CancellationToken) -> Result<SaleDto> {
        ensure_active(cancel)?;

        let mut sale = Sale::new(cmd.sale_number, cmd.sale_date, cmd.customer, cmd.branch)?;
        sale.replace_items(Sale::price_items(&cmd.items)?);

        ensure_active(cancel)?;
        let sale = self.store.create(sale, cancel).await?;

        metrics::counter!("sales_created_total").increment(1);
        tracing::info!(sale_id = %sale.id(), total = %sale.total_amount(), "sale created");

        self.cache.invalidate(sale.id(), sale.sale_number()).await;
        self.report(
            "SaleCreated",
            sale.id(),
            self.events.publish_sale_created(sale.id()).await,
        );

        Ok(SaleDto::from(&sale))
    }

    /// Updates the cancellation flag and, if `cmd.items` is non-empty,
    /// replaces every line.
    ///
    /// Returns `None` if the sale does not exist.
    #[tracing::instrument(skip(self, cmd, cancel), fields(sale_id = %cmd.sale_id))]
    pub async fn update(
        &self,
        cmd: UpdateSale,
        cancel: &CancellationToken,
    ) -> Result<Option<SaleDto>> {
        ensure_active(cancel)?;

        let Some(mut sale) = self.store.get_by_id(cmd.sale_id, cancel).await? else {
            return Ok(None);
        };

        let was_cancelled = sale.is_cancelled();
        sale.set_cancelled(cmd.is_cancelled);

        // Lines dropped by the replacement list must be found before it is applied.
        let removed = if cmd.replaces_items() {
            let items = Sale::price_items(&cmd.items)?;
            let removed = sale.removed_lines(&cmd.items);
            sale.replace_items(items);
            removed
        } else {
            Vec::new()
        };

        ensure_active(cancel)?;
        let sale = match self.store.update(sale, cancel).await {
            Ok(sale) => sale,
            Err(StoreError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        metrics::counter!("sales_updated_total").increment(1);
        tracing::info!(
            sale_id = %sale.id(),
            version = %sale.version(),
            removed_lines = removed.len(),
            "sale updated"
        );

        self.cache.invalidate(sale.id(), sale.sale_number()).await;

        for item_id in removed {
            self.report(
                "ItemCancelled",
                sale.id(),
                self.events.publish_item_cancelled(sale.id(), item_id).await,
            );
        }

        if !was_cancelled && sale.is_cancelled() {
            metrics::counter!("sales_cancelled_total").increment(1);
            self.report(
                "SaleCancelled",
                sale.id(),
                self.events.publish_sale_cancelled(sale.id()).await,
            );
        } else {
            self.report(
                "SaleModified",
                sale.id(),
                self.events.publish_sale_modified(sale.id()).await,
            );
        }

        Ok(Some(SaleDto::from(&sale)))
    }

    /// Cancels a sale, leaving its lines untouched.
    ///
    /// Cancelling an already cancelled sale counts as a modification.
    pub async fn cancel(&self, id: SaleId, cancel: &CancellationToken) -> Result<Option<SaleDto>> {
        self.update(UpdateSale::cancel(id), cancel).await
    }

    /// Hard-deletes a sale. Returns false if it did not exist.
    ///
    /// No event is published for deletions.
    #[tracing::instrument(skip(self, cancel))]
    pub async fn delete(&self, id: SaleId, cancel: &CancellationToken) -> Result<bool> {
        ensure_active(cancel)?;

        // The number is needed to derive the second cache key.
        let existing = self.store.get_by_id(id, cancel).await?;

        ensure_active(cancel)?;
        let deleted = match self.store.delete(id, cancel).await {
            Ok(deleted) => deleted,
            Err(StoreError::Cancelled) => {
                // The delete may have committed before cancellation was seen.
                if let Some(sale) = existing {
                    self.cache.invalidate(id, sale.sale_number()).await;
                }
                return Err(ServiceError::Cancelled);
            }
            Err(e) => return Err(e.into()),
        };

        if deleted {
            metrics::counter!("sales_deleted_total").increment(1);
            tracing::info!(sale_id = %id, "sale deleted");
        }

        if let Some(sale) = existing {
            self.cache.invalidate(id, sale.sale_number()).await;
        }

        Ok(deleted)
    }

    async fn read_through<F>(&self, key: String, fetch: F) -> Result<Option<SaleDto>>
    where
        F: Future<Output = sale_store::Result<Option<Sale>>>,
    {
        if let Some(dto) = self.cache.lookup(&key).await {
            return Ok(Some(dto));
        }

        let Some(sale) = fetch.await? else {
            return Ok(None);
        };

        let dto = SaleDto::from(&sale);
        self.cache.populate(&key, &dto).await;
        Ok(Some(dto))
    }

    fn report(&self, event_type: &'static str, sale_id: SaleId, result: event_sink::Result<()>) {
        if let Err(e) = result {
            metrics::counter!("sales_side_effect_failures_total", "kind" => "event").increment(1);
            tracing::warn!(
                event_type,
                sale_id = %sale_id,
                error = %e,
                "event publication failed"
            );
        }
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(ServiceError::Cancelled);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{BranchId, CustomerId, ProductId};
    use domain::{BranchRef, CustomerRef, DomainEvent, Money, SaleError, SaleItemInput};
    use event_sink::RecordingEventSink;
    use read_cache::InMemoryReadCache;
    use sale_store::InMemorySaleStore;

    type TestService =
        SaleLifecycleService<InMemorySaleStore, InMemoryReadCache, RecordingEventSink>;

    fn service() -> TestService {
        SaleLifecycleService::new(
            InMemorySaleStore::new(),
            InMemoryReadCache::new(),
            RecordingEventSink::new(),
        )
    }

    fn create_cmd(number: &str) -> CreateSale {
        CreateSale::new(
            number,
            Utc::now(),
            CustomerRef::new(CustomerId::new(), "Acme Ltd"),
            BranchRef::new(BranchId::new(), "Downtown"),
        )
    }

    fn item(product_id: ProductId, quantity: u32, dollars: i64) -> SaleItemInput {
        SaleItemInput::new(product_id, "Widget", quantity, Money::from_dollars(dollars))
    }

    #[tokio::test]
    async fn test_create_prices_lines_and_emits_created() {
        let service = service();
        let token = CancellationToken::new();
        let cmd = create_cmd("S-1")
            .with_item(item(ProductId::new(), 5, 100))
            .with_item(item(ProductId::new(), 15, 50));

        let dto = service.create(cmd, &token).await.unwrap();

        assert_eq!(dto.items[0].discount, Money::from_dollars(50));
        assert_eq!(dto.items[0].total_amount, Money::from_dollars(450));
        assert_eq!(dto.items[1].discount, Money::from_dollars(150));
        assert_eq!(dto.items[1].total_amount, Money::from_dollars(600));
        assert_eq!(dto.total_amount, Money::from_dollars(1050));

        let events = service.events().events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "SaleCreated");
        assert_eq!(events[0].sale_id(), dto.id);
    }

    #[tokio::test]
    async fn test_create_over_limit_persists_nothing() {
        let service = service();
        let token = CancellationToken::new();
        let cmd = create_cmd("S-1")
            .with_item(item(ProductId::new(), 2, 10))
            .with_item(item(ProductId::new(), 21, 10));

        let result = service.create(cmd, &token).await;

        assert!(matches!(
            result,
            Err(ServiceError::Validation(SaleError::QuantityLimitExceeded { quantity: 21, .. }))
        ));
        assert!(service.store().is_empty().await);
        assert!(service.events().is_empty());
    }

    #[tokio::test]
    async fn test_blank_header_is_a_validation_error() {
        let service = service();
        let token = CancellationToken::new();

        let result = service.create(create_cmd(" "), &token).await;

        assert!(matches!(
            result,
            Err(ServiceError::Validation(SaleError::InvalidHeader { .. }))
        ));
        assert!(service.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_read_populates_cache() {
        let service = service();
        let token = CancellationToken::new();
        let created = service.create(create_cmd("S-1"), &token).await.unwrap();

        assert!(!service.cache().backend().contains(&id_key(created.id)));
        let read = service.get_by_id(created.id, &token).await.unwrap();

        assert_eq!(read, Some(created.clone()));
        assert!(service.cache().backend().contains(&id_key(created.id)));
        assert!(!service.cache().backend().contains(&number_key("S-1")));
    }

    #[tokio::test]
    async fn test_update_missing_sale_returns_none() {
        let service = service();
        let token = CancellationToken::new();

        let result = service
            .update(UpdateSale::new(SaleId::new(), true), &token)
            .await
            .unwrap();

        assert!(result.is_none());
        assert!(service.events().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_emits_cancelled_only() {
        let service = service();
        let token = CancellationToken::new();
        let created = service.create(create_cmd("S-1"), &token).await.unwrap();
        service.events().clear();

        let cancelled = service.cancel(created.id, &token).await.unwrap().unwrap();

        assert!(cancelled.is_cancelled);
        let types: Vec<_> = service
            .events()
            .events()
            .iter()
            .map(|e| e.event_type())
            .collect();
        assert_eq!(types, vec!["SaleCancelled"]);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_false() {
        let service = service();
        let token = CancellationToken::new();

        assert!(!service.delete(SaleId::new(), &token).await.unwrap());
        assert!(service.events().is_empty());
    }

    #[tokio::test]
    async fn test_inverted_date_range_rejected() {
        let service = service();
        let token = CancellationToken::new();
        let now = Utc::now();

        let result = service
            .get_by_date_range(now, now - chrono::Duration::days(1), &token)
            .await;

        assert!(matches!(
            result,
            Err(ServiceError::Validation(SaleError::InvalidDateRange { .. }))
        ));
    }
}
