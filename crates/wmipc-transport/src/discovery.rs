//! Socket path discovery.
//!
//! i3 and sway export their IPC socket path in the environment of every
//! process they spawn. When that is missing, the window manager binary itself
//! can be asked with `--get-socketpath`.

use std::ffi::OsString;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{Result, TransportError};

/// Environment variable set by i3 for its children.
pub const I3SOCK_ENV: &str = "I3SOCK";
/// Environment variable set by sway for its children.
pub const SWAYSOCK_ENV: &str = "SWAYSOCK";

/// Where to look for the IPC socket, in order.
#[derive(Debug, Clone)]
pub struct SocketDiscovery {
    /// Environment variables checked first, in order.
    pub env_vars: Vec<String>,
    /// Program invoked as `<program> --get-socketpath` when no variable is set.
    pub program: String,
}

impl Default for SocketDiscovery {
    fn default() -> Self {
        Self {
            env_vars: vec![I3SOCK_ENV.to_string(), SWAYSOCK_ENV.to_string()],
            program: "i3".to_string(),
        }
    }
}

impl SocketDiscovery {
    /// Resolve the socket path from the process environment or the window manager.
    pub async fn discover(&self) -> Result<PathBuf> {
        if let Some(path) = self.lookup_env(|name| std::env::var_os(name)) {
            return Ok(path);
        }
        self.query_program().await
    }

    /// First non-empty variable from `env_vars`, looked up through `lookup`.
    pub fn lookup_env(&self, lookup: impl Fn(&str) -> Option<OsString>) -> Option<PathBuf> {
        self.env_vars.iter().find_map(|name| {
            let value = lookup(name)?;
            if value.is_empty() {
                return None;
            }
            debug!(var = %name, "socket path taken from environment");
            Some(PathBuf::from(value))
        })
    }

    async fn query_program(&self) -> Result<PathBuf> {
        let output = tokio::process::Command::new(&self.program)
            .arg("--get-socketpath")
            .output()
            .await
            .map_err(|err| {
                TransportError::Discovery(format!("failed to run {}: {err}", self.program))
            })?;

        if !output.status.success() {
            return Err(TransportError::Discovery(format!(
                "{} --get-socketpath exited with {}",
                self.program, output.status
            )));
        }

        let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if path.is_empty() {
            return Err(TransportError::Discovery(format!(
                "{} --get-socketpath printed nothing",
                self.program
            )));
        }

        debug!(program = %self.program, %path, "socket path reported by window manager");
        Ok(PathBuf::from(path))
    }
}

/// Discover the socket path with the default lookup order.
pub async fn discover_socket_path() -> Result<PathBuf> {
    SocketDiscovery::default().discover().await
}
