use std::time::Duration;

use wmipc_frame::FrameConfig;

/// Default time to wait for a reply.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default size of a single socket read.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 8 * 1024;

/// Per-connection behavior.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// How long an in-flight request may wait for its reply.
    pub reply_timeout: Duration,
    /// Frame decoding limits.
    pub frame: FrameConfig,
    /// Bytes requested from the socket per read.
    pub read_chunk_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            frame: FrameConfig::default(),
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
        }
    }
}
