//! Asynchronous client for i3-compatible window-manager IPC.
//!
//! This is the "just works" layer. Connect to the window manager, send
//! commands and queries, and listen for the events you subscribed to.
//!
//! Requests are answered strictly in order, so one request is on the wire at
//! a time and the rest wait in a FIFO queue. Events can arrive between any
//! two replies and are fanned out to listeners by [`EventKind`].

pub mod command;
pub mod config;
pub mod connection;
pub mod connector;
pub mod error;
pub mod event;
pub mod hub;
pub mod queue;
pub mod router;

pub use command::{check_success, join_command};
pub use config::{ClientConfig, DEFAULT_READ_CHUNK_SIZE, DEFAULT_REPLY_TIMEOUT};
pub use connection::Connection;
pub use connector::{connect, connect_discovered, connect_with_config};
pub use error::{ClientError, Result};
pub use event::{Event, EventKind};
pub use hub::{EventHub, Listener, ListenerId};
pub use queue::{QueuedRequest, ReplyOutcome, ReplySlot, RequestQueue};
pub use router::{Routed, Router};
