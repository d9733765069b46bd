use async_trait::async_trait;
use common::{SaleId, SaleItemId};
use domain::SaleEvent;

use crate::Result;

/// Fire-and-forget destination for sale lifecycle events.
///
/// A successful return means the event was submitted, nothing more. All
/// implementations must be thread-safe.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Submits one event.
    async fn publish(&self, event: SaleEvent) -> Result<()>;
}

/// One publication method per event variant.
#[async_trait]
pub trait EventSinkExt: EventSink {
    /// Publishes a SaleCreated event stamped now.
    async fn publish_sale_created(&self, sale_id: SaleId) -> Result<()> {
        self.publish(SaleEvent::sale_created(sale_id)).await
    }

    /// Publishes a SaleModified event stamped now.
    async fn publish_sale_modified(&self, sale_id: SaleId) -> Result<()> {
        self.publish(SaleEvent::sale_modified(sale_id)).await
    }

    /// Publishes a SaleCancelled event stamped now.
    async fn publish_sale_cancelled(&self, sale_id: SaleId) -> Result<()> {
        self.publish(SaleEvent::sale_cancelled(sale_id)).await
    }

    /// Publishes an ItemCancelled event stamped now.
    async fn publish_item_cancelled(&self, sale_id: SaleId, item_id: SaleItemId) -> Result<()> {
        self.publish(SaleEvent::item_cancelled(sale_id, item_id))
            .await
    }
}

// Blanket implementation for all EventSink implementations
impl<T: EventSink + ?Sized> EventSinkExt for T {}
