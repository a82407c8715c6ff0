use wmipc_transport::discover_socket_path;

use crate::cmd::ConnectArgs;
use crate::exit::{transport_error, CliResult, SUCCESS};
use crate::output::{print_path, OutputFormat};

pub async fn run(connect_args: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let path = match &connect_args.socket {
        Some(path) => path.clone(),
        None => discover_socket_path()
            .await
            .map_err(|err| transport_error("socket discovery failed", err))?,
    };
    print_path(&path, format);
    Ok(SUCCESS)
}
