use wmipc_frame::types::message_code;

use crate::cmd::{connect, ConnectArgs, QueryArgs};
use crate::exit::{client_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_value, OutputFormat};

pub async fn run(
    args: QueryArgs,
    connect_args: &ConnectArgs,
    format: OutputFormat,
) -> CliResult<i32> {
    let code = resolve_message(&args.message)?;
    let conn = connect(connect_args).await?;
    let result = conn.query(code, args.payload.as_deref().unwrap_or("")).await;
    conn.close().await;

    let reply = result.map_err(|err| client_error("query failed", err))?;
    print_value(&reply, format);
    Ok(SUCCESS)
}

fn resolve_message(name: &str) -> CliResult<u32> {
    message_code(name)
        .or_else(|| name.parse().ok())
        .ok_or_else(|| CliError::new(USAGE, format!("unknown message type: {name}")))
}

#[cfg(test)]
mod tests {
    use wmipc_frame::types::{GET_TREE, GET_VERSION};

    use super::*;

    #[test]
    fn resolves_names_and_numbers() {
        assert_eq!(resolve_message("get_tree").unwrap(), GET_TREE);
        assert_eq!(resolve_message("version").unwrap(), GET_VERSION);
        assert_eq!(resolve_message("42").unwrap(), 42);
    }

    #[test]
    fn unknown_name_is_usage_error() {
        assert_eq!(resolve_message("bogus").unwrap_err().code, USAGE);
    }
}
