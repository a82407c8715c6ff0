//! Transport layer for window-manager IPC.
//!
//! Finds the window manager's IPC socket and opens a stream to it. The rest of
//! wmipc only sees the connected stream through the [`IpcStream`] bound: an
//! ordered byte stream with no message boundaries.

pub mod discovery;
pub mod error;
pub mod traits;

#[cfg(unix)]
pub mod uds;

pub use discovery::{discover_socket_path, SocketDiscovery, I3SOCK_ENV, SWAYSOCK_ENV};
pub use error::{Result, TransportError};
pub use traits::IpcStream;

#[cfg(unix)]
pub use uds::UnixDomainSocket;
