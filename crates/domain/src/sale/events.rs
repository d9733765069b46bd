//! Sale lifecycle events.

use chrono::{DateTime, Utc};
use common::{SaleId, SaleItemId};
use serde::{Deserialize, Serialize};

use crate::event::DomainEvent;

/// Events emitted as a sale moves through its lifecycle.
///
/// Events are not stored; they are handed to an event sink once the
/// corresponding write has been persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SaleEvent {
    /// Sale was created.
    SaleCreated(SaleCreatedData),

    /// Sale was changed without being cancelled.
    SaleModified(SaleModifiedData),

    /// Sale went from active to cancelled.
    SaleCancelled(SaleCancelledData),

    /// A line was dropped from a sale by an update.
    ItemCancelled(ItemCancelledData),
}

impl DomainEvent for SaleEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SaleEvent::SaleCreated(_) => "SaleCreated",
            SaleEvent::SaleModified(_) => "SaleModified",
            SaleEvent::SaleCancelled(_) => "SaleCancelled",
            SaleEvent::ItemCancelled(_) => "ItemCancelled",
        }
    }

    fn sale_id(&self) -> SaleId {
        match self {
            SaleEvent::SaleCreated(data) => data.sale_id,
            SaleEvent::SaleModified(data) => data.sale_id,
            SaleEvent::SaleCancelled(data) => data.sale_id,
            SaleEvent::ItemCancelled(data) => data.sale_id,
        }
    }
}

/// Data for SaleCreated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleCreatedData {
    /// The new sale.
    pub sale_id: SaleId,

    /// When the event was generated.
    pub created_at: DateTime<Utc>,
}

/// Data for SaleModified event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleModifiedData {
    pub sale_id: SaleId,
    pub modified_at: DateTime<Utc>,
}

/// Data for SaleCancelled event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleCancelledData {
    pub sale_id: SaleId,
    pub cancelled_at: DateTime<Utc>,
}

/// Data for ItemCancelled event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCancelledData {
    /// Sale the line belonged to.
    pub sale_id: SaleId,

    /// Line id of the removed item.
    pub item_id: SaleItemId,

    /// When the event was generated.
    pub cancelled_at: DateTime<Utc>,
}

// Convenience constructors for events
impl SaleEvent {
    /// Creates a SaleCreated event.
    pub fn sale_created(sale_id: SaleId) -> Self {
        SaleEvent::SaleCreated(SaleCreatedData {
            sale_id,
            created_at: Utc::now(),
        })
    }

    /// Creates a SaleModified event.
    pub fn sale_modified(sale_id: SaleId) -> Self {
        SaleEvent::SaleModified(SaleModifiedData {
            sale_id,
            modified_at: Utc::now(),
        })
    }

    /// Creates a SaleCancelled event.
    pub fn sale_cancelled(sale_id: SaleId) -> Self {
        SaleEvent::SaleCancelled(SaleCancelledData {
            sale_id,
            cancelled_at: Utc::now(),
        })
    }

    /// Creates an ItemCancelled event.
    pub fn item_cancelled(sale_id: SaleId, item_id: SaleItemId) -> Self {
        SaleEvent::ItemCancelled(ItemCancelledData {
            sale_id,
            item_id,
            cancelled_at: Utc::now(),
        })
    }

    /// Returns the removed line id for ItemCancelled events.
    pub fn item_id(&self) -> Option<SaleItemId> {
        match self {
            SaleEvent::ItemCancelled(data) => Some(data.item_id),
            _ => None,
        }
    }

    /// Returns when the event was generated.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            SaleEvent::SaleCreated(data) => data.created_at,
            SaleEvent::SaleModified(data) => data.modified_at,
            SaleEvent::SaleCancelled(data) => data.cancelled_at,
            SaleEvent::ItemCancelled(data) => data.cancelled_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type() {
        let sale_id = SaleId::new();

        assert_eq!(SaleEvent::sale_created(sale_id).event_type(), "SaleCreated");
        assert_eq!(
            SaleEvent::sale_modified(sale_id).event_type(),
            "SaleModified"
        );
        assert_eq!(
            SaleEvent::sale_cancelled(sale_id).event_type(),
            "SaleCancelled"
        );
        assert_eq!(
            SaleEvent::item_cancelled(sale_id, SaleItemId::new()).event_type(),
            "ItemCancelled"
        );
    }

    #[test]
    fn test_every_variant_carries_sale_id() {
        let sale_id = SaleId::new();
        let events = [
            SaleEvent::sale_created(sale_id),
            SaleEvent::sale_modified(sale_id),
            SaleEvent::sale_cancelled(sale_id),
            SaleEvent::item_cancelled(sale_id, SaleItemId::new()),
        ];
        for event in events {
            assert_eq!(event.sale_id(), sale_id);
        }
    }

    #[test]
    fn test_item_cancelled_serialization() {
        let sale_id = SaleId::new();
        let item_id = SaleItemId::new();
        let event = SaleEvent::item_cancelled(sale_id, item_id);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "ItemCancelled");
        assert_eq!(json["data"]["item_id"], item_id.to_string());

        let deserialized: SaleEvent = serde_json::from_value(json).unwrap();
        assert_eq!(deserialized.item_id(), Some(item_id));
        assert_eq!(deserialized, event);
    }
}
