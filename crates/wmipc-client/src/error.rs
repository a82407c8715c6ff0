use std::time::Duration;

/// Errors that can occur in client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level error (discovery, connect).
    #[error("transport error: {0}")]
    Transport(#[from] wmipc_transport::TransportError),

    /// Frame-level error: encoding a request or decoding its reply.
    #[error("frame error: {0}")]
    Frame(#[from] wmipc_frame::FrameError),

    /// No reply arrived within the configured window.
    #[error("no reply within {0:?}")]
    ReplyTimeout(Duration),

    /// The reply decoded fine but reports `success: false`.
    #[error("window manager reported failure: {error}")]
    ApplicationFailure {
        /// The `error` text from the reply, if any.
        error: String,
        /// The complete reply body.
        reply: serde_json::Value,
    },

    /// The connection is gone; no reply will ever arrive.
    #[error("connection closed")]
    ConnectionClosed,

    /// The event name cannot be subscribed to.
    #[error("cannot subscribe to event '{0}'")]
    InvalidSubscription(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
