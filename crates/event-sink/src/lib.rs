//! One-way publication of sale lifecycle events.
//!
//! The lifecycle service hands events to an [`EventSink`] after a write has
//! been persisted. Delivery beyond "submitted" is the sink's business.
//!
//! - [`LoggingEventSink`] writes every event to the tracing log
//! - [`ChannelEventSink`] fans events out to in-process subscribers
//! - [`RecordingEventSink`] keeps events in memory for tests

pub mod channel;
pub mod error;
pub mod logging;
pub mod recording;
pub mod sink;

pub use channel::ChannelEventSink;
pub use error::{Result, SinkError};
pub use logging::LoggingEventSink;
pub use recording::RecordingEventSink;
pub use sink::{EventSink, EventSinkExt};
