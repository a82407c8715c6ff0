//! Message and event codes of the i3 IPC protocol.
//!
//! Requests and their replies share one code space; events use a second one
//! and are told apart by the header's event flag.

/// Run the payload as a command list.
pub const RUN_COMMAND: u32 = 0;
/// List workspaces.
pub const GET_WORKSPACES: u32 = 1;
/// Subscribe to the JSON array of event names in the payload.
pub const SUBSCRIBE: u32 = 2;
/// List outputs.
pub const GET_OUTPUTS: u32 = 3;
/// Dump the layout tree.
pub const GET_TREE: u32 = 4;
/// List window marks.
pub const GET_MARKS: u32 = 5;
/// Bar ids, or the config of the bar named in the payload.
pub const GET_BAR_CONFIG: u32 = 6;
/// Window manager version.
pub const GET_VERSION: u32 = 7;
/// List binding modes.
pub const GET_BINDING_MODES: u32 = 8;
/// Loaded configuration file.
pub const GET_CONFIG: u32 = 9;
/// Broadcast a tick event with the payload.
pub const SEND_TICK: u32 = 10;
/// Round-trip through the X server.
pub const SYNC: u32 = 11;

/// Event code: workspace changes.
pub const EVENT_WORKSPACE: u32 = 0;
/// Event code: output changes.
pub const EVENT_OUTPUT: u32 = 1;
/// Event code: binding mode changes.
pub const EVENT_MODE: u32 = 2;
/// Event code: window changes.
pub const EVENT_WINDOW: u32 = 3;
/// Event code: bar config updates.
pub const EVENT_BARCONFIG_UPDATE: u32 = 4;
/// Event code: a binding ran.
pub const EVENT_BINDING: u32 = 5;
/// Event code: the window manager is exiting or restarting.
pub const EVENT_SHUTDOWN: u32 = 6;
/// Event code: tick broadcast.
pub const EVENT_TICK: u32 = 7;

/// Human-readable name for a message code.
pub fn message_name(code: u32) -> &'static str {
    match code {
        RUN_COMMAND => "RUN_COMMAND",
        GET_WORKSPACES => "GET_WORKSPACES",
        SUBSCRIBE => "SUBSCRIBE",
        GET_OUTPUTS => "GET_OUTPUTS",
        GET_TREE => "GET_TREE",
        GET_MARKS => "GET_MARKS",
        GET_BAR_CONFIG => "GET_BAR_CONFIG",
        GET_VERSION => "GET_VERSION",
        GET_BINDING_MODES => "GET_BINDING_MODES",
        GET_CONFIG => "GET_CONFIG",
        SEND_TICK => "SEND_TICK",
        SYNC => "SYNC",
        _ => "UNKNOWN",
    }
}

/// Parse a message name (`get_tree`, `GET_TREE`, or the bare `tree`).
pub fn message_code(name: &str) -> Option<u32> {
    let upper = name.trim().to_ascii_uppercase();
    let code = match upper.as_str() {
        "RUN_COMMAND" | "COMMAND" => RUN_COMMAND,
        "GET_WORKSPACES" | "WORKSPACES" => GET_WORKSPACES,
        "SUBSCRIBE" => SUBSCRIBE,
        "GET_OUTPUTS" | "OUTPUTS" => GET_OUTPUTS,
        "GET_TREE" | "TREE" => GET_TREE,
        "GET_MARKS" | "MARKS" => GET_MARKS,
        "GET_BAR_CONFIG" | "BAR_CONFIG" => GET_BAR_CONFIG,
        "GET_VERSION" | "VERSION" => GET_VERSION,
        "GET_BINDING_MODES" | "BINDING_MODES" => GET_BINDING_MODES,
        "GET_CONFIG" | "CONFIG" => GET_CONFIG,
        "SEND_TICK" | "TICK" => SEND_TICK,
        "SYNC" => SYNC,
        _ => return None,
    };
    Some(code)
}

/// Protocol name of an event code, `None` for codes outside the known set.
pub fn event_name(code: u32) -> Option<&'static str> {
    let name = match code {
        EVENT_WORKSPACE => "workspace",
        EVENT_OUTPUT => "output",
        EVENT_MODE => "mode",
        EVENT_WINDOW => "window",
        EVENT_BARCONFIG_UPDATE => "barconfig_update",
        EVENT_BINDING => "binding",
        EVENT_SHUTDOWN => "shutdown",
        EVENT_TICK => "tick",
        _ => return None,
    };
    Some(name)
}
