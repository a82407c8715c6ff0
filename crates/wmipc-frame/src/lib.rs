//! i3-ipc wire codec and stream frame assembly.
//!
//! This is the core layer of wmipc. Every message is framed with:
//! - The 6-byte magic string "i3-ipc"
//! - A 4-byte little-endian payload length
//! - A 4-byte little-endian type word (bit 31 flags events)
//!
//! The [`FrameAssembler`] turns an arbitrary byte stream back into frames,
//! and [`Message`] classifies them as replies or events.

pub mod assembler;
pub mod codec;
pub mod error;
#[cfg(feature = "async")]
pub mod ipc_codec;
pub mod message;
pub mod types;

pub use assembler::{Assembled, FrameAssembler};
pub use codec::{
    decode_frame, encode_frame, peek_header, Frame, FrameConfig, FrameHeader, TypeWord,
    DEFAULT_MAX_PAYLOAD, HEADER_SIZE, MAGIC,
};
pub use error::{FrameError, Result};
#[cfg(feature = "async")]
pub use ipc_codec::IpcCodec;
pub use message::{decode, encode_message, render_payload, request_frame, Message};
