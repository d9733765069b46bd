use async_trait::async_trait;
use domain::{DomainEvent, SaleEvent};

use crate::{EventSink, Result};

/// Writes every event to the tracing log at `info`.
///
/// The default sink when no bus is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventSink;

impl LoggingEventSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn publish(&self, event: SaleEvent) -> Result<()> {
        let payload = serde_json::to_string(&event)?;
        tracing::info!(
            event_type = event.event_type(),
            sale_id = %event.sale_id(),
            occurred_at = %event.occurred_at(),
            payload = %payload,
            "sale event published"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventSinkExt;
    use common::SaleId;

    #[tokio::test]
    async fn test_publish_always_succeeds() {
        let sink = LoggingEventSink::new();
        assert!(sink.publish_sale_created(SaleId::new()).await.is_ok());
    }
}
