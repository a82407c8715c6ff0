use std::path::Path;

use tracing::debug;
use wmipc_transport::SocketDiscovery;
#[cfg(unix)]
use wmipc_transport::UnixDomainSocket;

use crate::config::ClientConfig;
use crate::connection::Connection;
use crate::error::Result;

/// Connect to the IPC socket at `path` with default settings.
pub async fn connect(path: impl AsRef<Path>) -> Result<Connection> {
    connect_with_config(path, ClientConfig::default()).await
}

/// Connect to the IPC socket at `path`.
pub async fn connect_with_config(
    path: impl AsRef<Path>,
    config: ClientConfig,
) -> Result<Connection> {
    #[cfg(not(unix))]
    {
        let _ = config;
        return Err(wmipc_transport::TransportError::Connect {
            path: path.as_ref().to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "window-manager IPC requires Unix domain sockets",
            ),
        }
        .into());
    }

    #[cfg(unix)]
    {
        let stream = UnixDomainSocket::connect(path).await?;
        debug!(
            transport = UnixDomainSocket::transport_name(),
            reply_timeout = ?config.reply_timeout,
            "starting connection"
        );
        Ok(Connection::from_stream(stream, config))
    }
}

/// Find the socket through `I3SOCK`, `SWAYSOCK` or `i3 --get-socketpath`,
/// then connect to it.
pub async fn connect_discovered(config: ClientConfig) -> Result<Connection> {
    let path = SocketDiscovery::default().discover().await?;
    connect_with_config(path, config).await
}
