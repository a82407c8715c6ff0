//! Client for i3-compatible window-manager IPC.
//!
//! wmipc talks the i3-ipc protocol (as spoken by i3 and sway) over the
//! window manager's Unix socket: run commands, query state, and follow
//! events.
//!
//! # Crate Structure
//!
//! - [`transport`]: socket discovery and the Unix-socket stream
//! - [`frame`]: the `i3-ipc` wire codec and frame assembly
//! - [`client`]: the connection, request queue and event routing
//!
//! ```no_run
//! # async fn demo() -> wmipc::client::Result<()> {
//! let conn = wmipc::client::connect_discovered(Default::default()).await?;
//! conn.send_command("workspace 2", &[]).await?;
//! let tree = conn.get_tree().await?;
//! println!("{}", tree["name"]);
//! conn.close().await;
//! # Ok(())
//! # }
//! ```

/// Re-export transport types.
pub mod transport {
    pub use wmipc_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use wmipc_frame::*;
}

/// Re-export client types.
pub mod client {
    pub use wmipc_client::*;
}
