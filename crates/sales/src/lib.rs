//! Sale lifecycle orchestration.
//!
//! [`SaleLifecycleService`] ties the discount policy, a [`sale_store::SaleStore`],
//! a [`read_cache::CacheBackend`] and an [`event_sink::EventSink`] together:
//!
//! - point reads go through the cache and fall back to the store
//! - writes price lines, persist, invalidate both cache keys of the sale and
//!   publish what changed
//! - failures of the cache or the sink after a write are logged, never returned

pub mod cache;
pub mod dto;
pub mod error;
pub mod service;

pub use cache::{SALE_CACHE_TTL, SaleCache, id_key, number_key};
pub use dto::{SaleDto, SaleItemDto};
pub use error::{Result, ServiceError};
pub use service::SaleLifecycleService;
