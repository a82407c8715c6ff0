use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, trace};

use crate::event::{Event, EventKind};

/// Callback invoked for each event on a channel.
pub type Listener = Box<dyn FnMut(&Event) + Send + 'static>;

/// Handle for removing a listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

/// Fans events out to the listeners of their channel.
#[derive(Default)]
pub struct EventHub {
    listeners: HashMap<EventKind, Vec<(ListenerId, Listener)>>,
}

impl EventHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener on a channel.
    pub fn add(&mut self, kind: EventKind, id: ListenerId, listener: Listener) {
        self.listeners.entry(kind).or_default().push((id, listener));
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        for listeners in self.listeners.values_mut() {
            if let Some(pos) = listeners.iter().position(|(lid, _)| *lid == id) {
                let _removed = listeners.remove(pos);
                return true;
            }
        }
        false
    }

    /// Number of listeners on a channel.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    /// Deliver an event to every listener of its channel, in registration
    /// order. Returns how many listeners ran.
    pub fn dispatch(&mut self, code: u32, body: Value) -> usize {
        let kind = EventKind::from_code(code);
        let event = Event { kind, code, body };

        let Some(listeners) = self.listeners.get_mut(&kind) else {
            trace!(%kind, code, "event without listeners");
            return 0;
        };

        for (_, listener) in listeners.iter_mut() {
            listener(&event);
        }
        debug!(%kind, code, listeners = listeners.len(), "event dispatched");
        listeners.len()
    }

    /// Drop every listener.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl std::fmt::Debug for EventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<_, _> = self
            .listeners
            .iter()
            .map(|(kind, listeners)| (*kind, listeners.len()))
            .collect();
        f.debug_struct("EventHub").field("listeners", &counts).finish()
    }
}
