use bytes::BytesMut;
use tracing::trace;

use crate::codec::{decode_frame, Frame, FrameConfig};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Rebuilds frame boundaries from an unstructured byte stream.
///
/// A transport delivery may hold part of a frame, exactly one, or several.
/// Bytes that do not yet form a complete frame stay in the residual buffer
/// until the next [`push`](Self::push).
///
/// After a framing error the stream position is unknown and the assembler
/// must not be fed again; callers drop the connection.
#[derive(Debug)]
pub struct FrameAssembler {
    buf: BytesMut,
    config: FrameConfig,
}

impl FrameAssembler {
    /// Create an assembler with default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create an assembler with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Append a chunk and return every frame it completes, in stream order.
    ///
    /// Frames that precede corrupt bytes in the same chunk are still
    /// returned, next to the error that stopped assembly.
    pub fn push(&mut self, chunk: &[u8]) -> Assembled {
        self.buf.extend_from_slice(chunk);

        let mut frames = Vec::new();
        let error = loop {
            match decode_frame(&mut self.buf, self.config.max_payload_size) {
                Ok(Some(frame)) => frames.push(frame),
                Ok(None) => break None,
                Err(err) => break Some(err),
            }
        };

        trace!(
            chunk = chunk.len(),
            frames = frames.len(),
            residual = self.buf.len(),
            failed = error.is_some(),
            "assembled frames"
        );
        Assembled { frames, error }
    }

    /// Bytes buffered toward the next, still incomplete, frame.
    pub fn residual_len(&self) -> usize {
        self.buf.len()
    }

    /// Discard any buffered partial frame.
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Current assembler configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

/// Outcome of one [`FrameAssembler::push`].
#[derive(Debug)]
pub struct Assembled {
    /// Complete frames, in stream order.
    pub frames: Vec<Frame>,
    /// Framing error hit after `frames`; the stream cannot be resynchronized.
    pub error: Option<FrameError>,
}

impl Assembled {
    /// The frames, or the error if assembly stopped early.
    pub fn into_result(self) -> Result<Vec<Frame>> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.frames),
        }
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}
