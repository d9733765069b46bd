use async_trait::async_trait;
use domain::{DomainEvent, SaleEvent};
use tokio::sync::broadcast;

use crate::{EventSink, Result};

/// Default buffer of a [`ChannelEventSink`].
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Fans events out to in-process subscribers over a broadcast channel.
///
/// Publishing never waits. With no live subscriber the event is dropped;
/// subscribers that fall more than the channel capacity behind lose the
/// oldest events.
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    sender: broadcast::Sender<SaleEvent>,
}

impl ChannelEventSink {
    /// Creates a sink buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Returns a new subscription that sees events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SaleEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChannelEventSink {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

#[async_trait]
impl EventSink for ChannelEventSink {
    async fn publish(&self, event: SaleEvent) -> Result<()> {
        let event_type = event.event_type();
        let sale_id = event.sale_id();

        match self.sender.send(event) {
            Ok(receivers) => {
                tracing::debug!(event_type, %sale_id, receivers, "sale event broadcast");
            }
            Err(_) => {
                tracing::debug!(event_type, %sale_id, "no subscribers, sale event dropped");
            }
        }
        Ok(())
    }
}
