/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The frame header does not start with the protocol magic.
    #[error("invalid frame magic (expected \"i3-ipc\", found {found:02x?})")]
    InvalidMagic { found: [u8; 6] },

    /// A frame buffer holds fewer bytes than its header declares.
    #[error("truncated frame ({available} bytes, need {needed})")]
    Truncated { available: usize, needed: usize },

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A well-framed message carried a payload that is not valid JSON.
    #[error("invalid JSON payload for type word {type_word:#010x}: {source}")]
    Payload {
        type_word: u32,
        #[source]
        source: serde_json::Error,
    },

    /// An outgoing payload could not be serialized.
    #[error("payload encoding failed: {0}")]
    Encoding(#[source] serde_json::Error),

    /// An outgoing message type collides with the event flag.
    #[error("message type {0:#x} does not fit in 31 bits")]
    InvalidCode(u32),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

impl FrameError {
    /// Whether the byte stream can no longer be trusted after this error.
    ///
    /// Framing corruption leaves no way to find the next frame boundary.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FrameError::InvalidMagic { .. }
                | FrameError::Truncated { .. }
                | FrameError::PayloadTooLarge { .. }
                | FrameError::Io(_)
                | FrameError::ConnectionClosed
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
