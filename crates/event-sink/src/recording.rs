use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use domain::{DomainEvent, SaleEvent};

use crate::{EventSink, Result, SinkError};

#[derive(Debug, Default)]
struct RecordingState {
    events: Vec<SaleEvent>,
    fail_on_publish: bool,
}

/// Keeps published events in memory, in publication order.
///
/// Used by tests and embedders that want to inspect what a write emitted.
#[derive(Debug, Clone, Default)]
pub struct RecordingEventSink {
    state: Arc<RwLock<RecordingState>>,
}

impl RecordingEventSink {
    /// Creates a new empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the sink to reject every publish.
    pub fn set_fail_on_publish(&self, fail: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_on_publish = fail;
    }

    /// Returns every recorded event.
    pub fn events(&self) -> Vec<SaleEvent> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .events
            .clone()
    }

    /// Returns the recorded events of one type.
    pub fn events_of_type(&self, event_type: &str) -> Vec<SaleEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.event_type() == event_type)
            .collect()
    }

    /// Returns the number of recorded events.
    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .events
            .len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets every recorded event.
    pub fn clear(&self) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .events
            .clear();
    }
}

#[async_trait]
impl EventSink for RecordingEventSink {
    async fn publish(&self, event: SaleEvent) -> Result<()> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if state.fail_on_publish {
            return Err(SinkError::Unavailable(format!(
                "{} rejected",
                event.event_type()
            )));
        }

        state.events.push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventSinkExt;
    use common::{SaleId, SaleItemId};

    #[tokio::test]
    async fn test_records_in_order() {
        let sink = RecordingEventSink::new();
        let sale_id = SaleId::new();
        let item_id = SaleItemId::new();

        sink.publish_sale_created(sale_id).await.unwrap();
        sink.publish_item_cancelled(sale_id, item_id).await.unwrap();
        sink.publish_sale_modified(sale_id).await.unwrap();

        let types: Vec<_> = sink.events().iter().map(|e| e.event_type()).collect();
        assert_eq!(types, vec!["SaleCreated", "ItemCancelled", "SaleModified"]);
        assert_eq!(
            sink.events_of_type("ItemCancelled")[0].item_id(),
            Some(item_id)
        );
    }

    #[tokio::test]
    async fn test_fail_on_publish() {
        let sink = RecordingEventSink::new();
        sink.set_fail_on_publish(true);

        let result = sink.publish_sale_cancelled(SaleId::new()).await;

        assert!(matches!(result, Err(SinkError::Unavailable(_))));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let sink = RecordingEventSink::new();
        sink.publish_sale_created(SaleId::new()).await.unwrap();
        sink.clear();
        assert_eq!(sink.len(), 0);
    }
}
