use thiserror::Error;

/// Errors that can occur when publishing an event.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The event could not be encoded for the transport.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The transport refused the event.
    #[error("Event sink unavailable: {0}")]
    Unavailable(String),
}

/// Result type for event sink operations.
pub type Result<T> = std::result::Result<T, SinkError>;
