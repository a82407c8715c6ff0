use serde_json::Value;
use wmipc_client::ClientError;

use crate::cmd::{connect, CommandArgs, ConnectArgs};
use crate::exit::{client_error, CliResult, FAILURE, SUCCESS};
use crate::output::{print_value, OutputFormat};

pub async fn run(
    args: CommandArgs,
    connect_args: &ConnectArgs,
    format: OutputFormat,
) -> CliResult<i32> {
    let (command, rest) = split_words(&args.words);
    let conn = connect(connect_args).await?;
    let result = conn.send_command(command, &rest).await;
    conn.close().await;

    match result {
        Ok(reply) => {
            print_value(&reply, format);
            Ok(SUCCESS)
        }
        // The outcomes are still worth showing: they say which command failed.
        Err(ClientError::ApplicationFailure { error, reply }) => {
            print_value(&reply, format);
            eprintln!("error: command failed: {error}");
            Ok(FAILURE)
        }
        Err(err) => Err(client_error("command failed", err)),
    }
}

fn split_words(words: &[String]) -> (&str, Vec<Value>) {
    match words.split_first() {
        Some((first, rest)) => (
            first.as_str(),
            rest.iter().cloned().map(Value::String).collect(),
        ),
        None => ("", Vec::new()),
    }
}
