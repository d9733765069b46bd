//! Cache keys and cache-aside helpers for sale views.

use std::time::Duration;

use common::SaleId;
use read_cache::{CacheBackend, ReadCache};

use crate::SaleDto;

/// How long a cached sale view stays valid.
pub const SALE_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Cache key of a sale looked up by id.
pub fn id_key(id: SaleId) -> String {
    format!("sale:id:{id}")
}

/// Cache key of a sale looked up by business number.
pub fn number_key(sale_number: &str) -> String {
    format!("sale:number:{sale_number}")
}

/// Sale-view cache on top of any backend.
///
/// Every method is infallible: backend errors are logged and counted, and a
/// failed lookup is reported as a miss.
pub struct SaleCache<C> {
    backend: C,
    ttl: Duration,
}

impl<C: CacheBackend> SaleCache<C> {
    /// Wraps `backend` with the default TTL.
    pub fn new(backend: C) -> Self {
        Self {
            backend,
            ttl: SALE_CACHE_TTL,
        }
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &C {
        &self.backend
    }

    /// Returns the cached view under `key`, if any.
    pub async fn lookup(&self, key: &str) -> Option<SaleDto> {
        match self.backend.get(key).await {
            Ok(Some(dto)) => {
                metrics::counter!("sales_cache_hits_total").increment(1);
                Some(dto)
            }
            Ok(None) => {
                metrics::counter!("sales_cache_misses_total").increment(1);
                None
            }
            Err(e) => {
                metrics::counter!("sales_cache_misses_total").increment(1);
                record_failure();
                tracing::warn!(key, error = %e, "cache lookup failed, reading from store");
                None
            }
        }
    }

    /// Stores `dto` under `key` for the cache TTL.
    pub async fn populate(&self, key: &str, dto: &SaleDto) {
        if let Err(e) = self.backend.set(key, dto, Some(self.ttl)).await {
            record_failure();
            tracing::warn!(key, error = %e, "cache population failed");
        }
    }

    /// Removes both keys of a sale. Each removal is attempted on its own.
    pub async fn invalidate(&self, id: SaleId, sale_number: &str) {
        for key in [number_key(sale_number), id_key(id)] {
            if let Err(e) = self.backend.remove(&key).await {
                record_failure();
                tracing::warn!(
                    sale_id = %id,
                    key = %key,
                    error = %e,
                    "cache invalidation failed"
                );
            }
        }
    }
}

fn record_failure() {
    metrics::counter!("sales_side_effect_failures_total", "kind" => "cache").increment(1);
}
