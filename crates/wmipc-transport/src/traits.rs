use tokio::io::{AsyncRead, AsyncWrite};

/// A connected IPC byte stream.
///
/// Anything that reads and writes bytes in order qualifies: a Unix domain
/// socket in production, an in-memory duplex pipe in tests. Deliveries carry
/// no message boundaries; framing is rebuilt one layer up.
pub trait IpcStream: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

impl<T> IpcStream for T where T: AsyncRead + AsyncWrite + Send + Unpin + 'static {}
