//! Typed messages on top of raw frames.
//!
//! Outgoing payloads follow the i3 convention: structured values travel as
//! JSON text, plain strings as their literal text. Incoming payloads are
//! always JSON.

use bytes::{Bytes, BytesMut};
use serde::Serialize;
use serde_json::Value;

use crate::codec::{encode_frame, peek_header, Frame, TypeWord, HEADER_SIZE};
use crate::error::{FrameError, Result};

/// A decoded server message.
///
/// The reply/event split is decided once, from the header's event flag.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Answer to the request sent before it.
    Reply { code: u32, body: Value },
    /// Unsolicited notification for a subscribed event.
    Event { code: u32, body: Value },
}

impl Message {
    /// Decode a frame whose header has already been validated.
    pub fn from_frame(frame: &Frame) -> Result<Self> {
        let body = parse_body(frame.type_word, &frame.payload)?;
        Ok(Self::classify(frame.type_word, body))
    }

    fn classify(type_word: TypeWord, body: Value) -> Self {
        let code = type_word.code();
        if type_word.is_event() {
            Message::Event { code, body }
        } else {
            Message::Reply { code, body }
        }
    }

    /// The message or event code, without the event flag.
    pub fn code(&self) -> u32 {
        match self {
            Message::Reply { code, .. } | Message::Event { code, .. } => *code,
        }
    }

    /// Whether this message was pushed as an event.
    pub fn is_event(&self) -> bool {
        matches!(self, Message::Event { .. })
    }

    /// Header type word that carries this message.
    pub fn type_word(&self) -> TypeWord {
        match self {
            Message::Reply { code, .. } => TypeWord::message(*code),
            Message::Event { code, .. } => TypeWord::event(*code),
        }
    }

    /// Borrow the JSON body.
    pub fn body(&self) -> &Value {
        match self {
            Message::Reply { body, .. } | Message::Event { body, .. } => body,
        }
    }

    /// Take the JSON body.
    pub fn into_body(self) -> Value {
        match self {
            Message::Reply { body, .. } | Message::Event { body, .. } => body,
        }
    }
}

/// Render an outgoing payload to bytes.
///
/// Strings are sent as their literal text; every other value as JSON text
/// (so numbers and booleans end up as their plain string form).
pub fn render_payload<T: Serialize + ?Sized>(payload: &T) -> Result<Vec<u8>> {
    match serde_json::to_value(payload).map_err(FrameError::Encoding)? {
        Value::String(text) => Ok(text.into_bytes()),
        other => serde_json::to_vec(&other).map_err(FrameError::Encoding),
    }
}

/// Build the frame for a request with the given message code.
///
/// Fails before anything reaches the wire if the code collides with the
/// event flag or the payload cannot be serialized.
pub fn request_frame<T: Serialize + ?Sized>(code: u32, payload: &T) -> Result<Frame> {
    if code & TypeWord::EVENT_FLAG != 0 {
        return Err(FrameError::InvalidCode(code));
    }
    let body = render_payload(payload)?;
    Ok(Frame::new(TypeWord::message(code), body))
}

/// Encode a request with the given message code into one wire frame.
pub fn encode_message<T: Serialize + ?Sized>(code: u32, payload: &T) -> Result<Bytes> {
    let frame = request_frame(code, payload)?;
    let mut dst = BytesMut::with_capacity(frame.wire_size());
    encode_frame(frame.type_word, &frame.payload, &mut dst)?;
    Ok(dst.freeze())
}

/// Decode one complete frame, header included.
///
/// Bytes past the declared payload length are ignored.
pub fn decode(frame_bytes: &[u8]) -> Result<Message> {
    let header = peek_header(frame_bytes)?.ok_or(FrameError::Truncated {
        available: frame_bytes.len(),
        needed: HEADER_SIZE,
    })?;

    let end = HEADER_SIZE + header.payload_len;
    if frame_bytes.len() < end {
        return Err(FrameError::Truncated {
            available: frame_bytes.len(),
            needed: end,
        });
    }

    let body = parse_body(header.type_word, &frame_bytes[HEADER_SIZE..end])?;
    Ok(Message::classify(header.type_word, body))
}

fn parse_body(type_word: TypeWord, payload: &[u8]) -> Result<Value> {
    if payload.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(payload).map_err(|source| FrameError::Payload {
        type_word: type_word.raw(),
        source,
    })
}
