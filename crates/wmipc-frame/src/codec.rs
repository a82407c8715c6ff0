use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header: magic (6) + length (4) + type word (4) = 14 bytes.
pub const HEADER_SIZE: usize = 14;

/// Magic bytes: "i3-ipc".
pub const MAGIC: [u8; 6] = *b"i3-ipc";

/// Default maximum payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

const LENGTH_OFFSET: usize = 6;
const TYPE_OFFSET: usize = 10;

/// The 32-bit type field of a frame header.
///
/// Bit 31 marks server-pushed events; bits 0-30 carry the message or event code.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeWord(u32);

impl TypeWord {
    /// High bit set on every event frame.
    pub const EVENT_FLAG: u32 = 1 << 31;

    /// Wrap a raw header value.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Type word of a request or reply with the given code.
    pub const fn message(code: u32) -> Self {
        Self(code & !Self::EVENT_FLAG)
    }

    /// Type word of an event with the given code.
    pub const fn event(code: u32) -> Self {
        Self(code | Self::EVENT_FLAG)
    }

    /// The raw header value, flag included.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Whether the event flag is set.
    pub const fn is_event(self) -> bool {
        self.0 & Self::EVENT_FLAG != 0
    }

    /// The code with the event flag masked off.
    pub const fn code(self) -> u32 {
        self.0 & !Self::EVENT_FLAG
    }
}

impl fmt::Debug for TypeWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeWord")
            .field("event", &self.is_event())
            .field("code", &self.code())
            .finish()
    }
}

/// One complete wire frame with its header already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Type word from the header.
    pub type_word: TypeWord,
    /// The raw payload bytes.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(type_word: TypeWord, payload: impl Into<Bytes>) -> Self {
        Self {
            type_word,
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// Encode this frame into a fresh buffer.
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut dst = BytesMut::with_capacity(self.wire_size());
        encode_frame(self.type_word, &self.payload, &mut dst)?;
        Ok(dst.freeze())
    }
}

/// Encode a frame into the wire format.
///
/// Wire format (all integers little-endian regardless of host):
/// ```text
/// ┌──────────────┬───────────┬───────────┬─────────────────┐
/// │ Magic (6B)   │ Length    │ Type word │ Payload          │
/// │ "i3-ipc"     │ (4B LE)   │ (4B LE)   │ (Length bytes)   │
/// └──────────────┴───────────┴───────────┴─────────────────┘
/// ```
pub fn encode_frame(type_word: TypeWord, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > u32::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: u32::MAX as usize,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_slice(&MAGIC);
    dst.put_u32_le(payload.len() as u32);
    dst.put_u32_le(type_word.raw());
    dst.put_slice(payload);
    Ok(())
}

/// Decode a frame from the front of a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes exactly the frame bytes from the buffer and leaves
/// any following bytes in place.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Frame>> {
    let Some(header) = peek_header(src)? else {
        return Ok(None); // Need more data
    };

    if header.payload_len > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: header.payload_len,
            max: max_payload,
        });
    }

    if src.len() < HEADER_SIZE + header.payload_len {
        return Ok(None); // Need more data
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(header.payload_len).freeze();

    Ok(Some(Frame {
        type_word: header.type_word,
        payload,
    }))
}

/// Header fields of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Declared payload length.
    pub payload_len: usize,
    /// Type word.
    pub type_word: TypeWord,
}

/// Validate and read the header at the front of `src` without consuming it.
///
/// Returns `Ok(None)` while fewer than [`HEADER_SIZE`] bytes are buffered.
pub fn peek_header(src: &[u8]) -> Result<Option<FrameHeader>> {
    if src.len() < HEADER_SIZE {
        return Ok(None);
    }

    if src[..LENGTH_OFFSET] != MAGIC {
        let mut found = [0u8; 6];
        found.copy_from_slice(&src[..LENGTH_OFFSET]);
        return Err(FrameError::InvalidMagic { found });
    }

    let payload_len = read_u32_le(&src[LENGTH_OFFSET..TYPE_OFFSET]) as usize;
    let type_word = TypeWord::from_raw(read_u32_le(&src[TYPE_OFFSET..HEADER_SIZE]));

    Ok(Some(FrameHeader {
        payload_len,
        type_word,
    }))
}

fn read_u32_le(bytes: &[u8]) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(raw)
}

/// Configuration for frame decoding.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 16 MiB.
    pub max_payload_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}
