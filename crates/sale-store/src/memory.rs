use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{SaleId, Version};
use domain::Sale;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::{DateRange, Result, SaleStore, StoreError};

/// In-memory sale store for testing and local runs.
///
/// Behaves like the PostgreSQL implementation: unique sale numbers,
/// version compare-and-swap on update, cancellation checked on entry.
#[derive(Clone, Default)]
pub struct InMemorySaleStore {
    sales: Arc<RwLock<HashMap<SaleId, Sale>>>,
}

impl InMemorySaleStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored sales.
    pub async fn len(&self) -> usize {
        self.sales.read().await.len()
    }

    /// Returns true if no sales are stored.
    pub async fn is_empty(&self) -> bool {
        self.sales.read().await.is_empty()
    }

    /// Removes every sale.
    pub async fn clear(&self) {
        self.sales.write().await.clear();
    }

    fn sorted(mut sales: Vec<Sale>) -> Vec<Sale> {
        sales.sort_by(|a, b| {
            a.sale_date()
                .cmp(&b.sale_date())
                .then_with(|| a.sale_number().cmp(b.sale_number()))
        });
        sales
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(StoreError::Cancelled);
    }
    Ok(())
}

#[async_trait]
impl SaleStore for InMemorySaleStore {
    async fn create(&self, mut sale: Sale, cancel: &CancellationToken) -> Result<Sale> {
        ensure_active(cancel)?;
        let mut sales = self.sales.write().await;

        if let Some(existing) = sales.get(&sale.id()) {
            return Err(StoreError::ConcurrencyConflict {
                sale_id: sale.id(),
                expected: Version::initial(),
                actual: existing.version(),
            });
        }

        if sales
            .values()
            .any(|existing| existing.sale_number() == sale.sale_number())
        {
            return Err(StoreError::DuplicateSaleNumber(
                sale.sale_number().to_string(),
            ));
        }

        sale.set_version(Version::first());
        sales.insert(sale.id(), sale.clone());
        tracing::debug!(sale_id = %sale.id(), "sale stored");

        Ok(sale)
    }

    async fn get_by_id(&self, id: SaleId, cancel: &CancellationToken) -> Result<Option<Sale>> {
        ensure_active(cancel)?;
        Ok(self.sales.read().await.get(&id).cloned())
    }

    async fn get_by_number(
        &self,
        sale_number: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Sale>> {
        ensure_active(cancel)?;
        let sales = self.sales.read().await;
        Ok(sales
            .values()
            .find(|sale| sale.sale_number() == sale_number)
            .cloned())
    }

    async fn get_all(&self, cancel: &CancellationToken) -> Result<Vec<Sale>> {
        ensure_active(cancel)?;
        let sales = self.sales.read().await;
        Ok(Self::sorted(sales.values().cloned().collect()))
    }

    async fn get_by_date_range(
        &self,
        range: DateRange,
        cancel: &CancellationToken,
    ) -> Result<Vec<Sale>> {
        ensure_active(cancel)?;
        let sales = self.sales.read().await;
        Ok(Self::sorted(
            sales
                .values()
                .filter(|sale| range.contains(sale.sale_date()))
                .cloned()
                .collect(),
        ))
    }

    async fn update(&self, mut sale: Sale, cancel: &CancellationToken) -> Result<Sale> {
        ensure_active(cancel)?;
        let mut sales = self.sales.write().await;

        let current = sales
            .get(&sale.id())
            .ok_or(StoreError::NotFound(sale.id()))?;

        if current.version() != sale.version() {
            return Err(StoreError::ConcurrencyConflict {
                sale_id: sale.id(),
                expected: sale.version(),
                actual: current.version(),
            });
        }

        if sales.values().any(|other| {
            other.id() != sale.id() && other.sale_number() == sale.sale_number()
        }) {
            return Err(StoreError::DuplicateSaleNumber(
                sale.sale_number().to_string(),
            ));
        }

        sale.set_version(sale.version().next());
        sales.insert(sale.id(), sale.clone());
        tracing::debug!(sale_id = %sale.id(), version = %sale.version(), "sale updated");

        Ok(sale)
    }

    async fn delete(&self, id: SaleId, cancel: &CancellationToken) -> Result<bool> {
        ensure_active(cancel)?;
        Ok(self.sales.write().await.remove(&id).is_some())
    }
}
