use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use wmipc_frame::types::{
    self, EVENT_BARCONFIG_UPDATE, EVENT_BINDING, EVENT_MODE, EVENT_OUTPUT, EVENT_SHUTDOWN,
    EVENT_TICK, EVENT_WINDOW, EVENT_WORKSPACE,
};

use crate::error::ClientError;

/// Named event channel.
///
/// `Unknown` collects every event code outside the known table, so newer
/// servers degrade gracefully instead of erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Workspace,
    Output,
    Mode,
    Window,
    BarconfigUpdate,
    Binding,
    Shutdown,
    Tick,
    Unknown,
}

impl EventKind {
    /// Every kind a client can subscribe to.
    pub const SUBSCRIBABLE: [EventKind; 8] = [
        EventKind::Workspace,
        EventKind::Output,
        EventKind::Mode,
        EventKind::Window,
        EventKind::BarconfigUpdate,
        EventKind::Binding,
        EventKind::Shutdown,
        EventKind::Tick,
    ];

    /// Map an event code (flag already masked) to its channel.
    pub fn from_code(code: u32) -> Self {
        match code {
            EVENT_WORKSPACE => EventKind::Workspace,
            EVENT_OUTPUT => EventKind::Output,
            EVENT_MODE => EventKind::Mode,
            EVENT_WINDOW => EventKind::Window,
            EVENT_BARCONFIG_UPDATE => EventKind::BarconfigUpdate,
            EVENT_BINDING => EventKind::Binding,
            EVENT_SHUTDOWN => EventKind::Shutdown,
            EVENT_TICK => EventKind::Tick,
            _ => EventKind::Unknown,
        }
    }

    /// Wire code, `None` for [`EventKind::Unknown`].
    pub fn code(self) -> Option<u32> {
        let code = match self {
            EventKind::Workspace => EVENT_WORKSPACE,
            EventKind::Output => EVENT_OUTPUT,
            EventKind::Mode => EVENT_MODE,
            EventKind::Window => EVENT_WINDOW,
            EventKind::BarconfigUpdate => EVENT_BARCONFIG_UPDATE,
            EventKind::Binding => EVENT_BINDING,
            EventKind::Shutdown => EVENT_SHUTDOWN,
            EventKind::Tick => EVENT_TICK,
            EventKind::Unknown => return None,
        };
        Some(code)
    }

    /// Protocol name, as used in SUBSCRIBE payloads.
    pub fn name(self) -> &'static str {
        self.code().and_then(types::event_name).unwrap_or("unknown")
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EventKind {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name == "unknown" {
            return Ok(EventKind::Unknown);
        }
        EventKind::SUBSCRIBABLE
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| ClientError::InvalidSubscription(name.to_string()))
    }
}

/// An event pushed by the window manager.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Channel the event was routed to.
    pub kind: EventKind,
    /// Raw event code, flag masked off.
    pub code: u32,
    /// Event body, uninterpreted.
    pub body: Value,
}
