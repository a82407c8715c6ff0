use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use tracing::debug;
use wmipc_client::{connect_discovered, connect_with_config, ClientConfig, Connection};

use crate::exit::{client_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod command;
pub mod query;
pub mod socketpath;
pub mod subscribe;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a window-manager command (RUN_COMMAND).
    Command(CommandArgs),
    /// Send any message type and print the reply.
    Query(QueryArgs),
    /// Subscribe to events and print them as they arrive.
    Subscribe(SubscribeArgs),
    /// Print the discovered IPC socket path.
    Socketpath,
    /// Show version information.
    Version(VersionArgs),
}

pub async fn run(
    command: Command,
    connect: &ConnectArgs,
    format: OutputFormat,
) -> CliResult<i32> {
    match command {
        Command::Command(args) => command::run(args, connect, format).await,
        Command::Query(args) => query::run(args, connect, format).await,
        Command::Subscribe(args) => subscribe::run(args, connect, format).await,
        Command::Socketpath => socketpath::run(connect, format).await,
        Command::Version(args) => version::run(args),
    }
}

/// How to reach the window manager. Shared by every subcommand.
#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// IPC socket path. Falls back to SWAYSOCK, then `i3 --get-socketpath`.
    #[arg(long, short = 's', env = "I3SOCK", value_name = "PATH", global = true)]
    pub socket: Option<PathBuf>,
    /// How long to wait for each reply (e.g. 2s, 500ms).
    #[arg(long, default_value = "5s", global = true)]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct CommandArgs {
    /// Command words, e.g. `workspace 2`.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub words: Vec<String>,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Message type: a name such as `get_tree` or `tree`, or a numeric code.
    #[arg(value_name = "TYPE")]
    pub message: String,
    /// Payload text sent with the message.
    #[arg(long)]
    pub payload: Option<String>,
}

#[derive(Args, Debug)]
pub struct SubscribeArgs {
    /// Events to follow (e.g. `window workspace` or `window,tick`).
    #[arg(required = true, value_delimiter = ',')]
    pub events: Vec<String>,
    /// Exit after printing N events.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show build details.
    #[arg(long)]
    pub extended: bool,
}

/// Open a connection using the global socket and timeout flags.
pub async fn connect(args: &ConnectArgs) -> CliResult<Connection> {
    let config = ClientConfig {
        reply_timeout: parse_duration(&args.timeout)?,
        ..ClientConfig::default()
    };

    let result = match &args.socket {
        Some(path) => {
            debug!(path = %path.display(), "connecting");
            connect_with_config(path, config).await
        }
        None => connect_discovered(config).await,
    };
    result.map_err(|err| client_error("connect failed", err))
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
