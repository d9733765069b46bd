//! Domain event trait.

use common::SaleId;
use serde::{Serialize, de::DeserializeOwned};

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and should be named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Returns the event type name.
    ///
    /// Used as the routing key by event sinks and in log output.
    fn event_type(&self) -> &'static str;

    /// Returns the sale the event refers to.
    fn sale_id(&self) -> SaleId;
}
