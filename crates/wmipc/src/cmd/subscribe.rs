use tokio::sync::mpsc;
use wmipc_client::{Event, EventKind};

use crate::cmd::{connect, ConnectArgs, SubscribeArgs};
use crate::exit::{client_error, io_error, CliError, CliResult, FAILURE, SUCCESS};
use crate::output::{print_event, OutputFormat};

pub async fn run(
    args: SubscribeArgs,
    connect_args: &ConnectArgs,
    format: OutputFormat,
) -> CliResult<i32> {
    let kinds = args
        .events
        .iter()
        .map(|name| name.parse::<EventKind>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| client_error("invalid event", err))?;

    let conn = connect(connect_args).await?;

    // Listeners run on the connection task; hand events over to this one.
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    for kind in &kinds {
        let tx = tx.clone();
        conn.on(*kind, move |event: &Event| {
            let _ = tx.send(event.clone());
        });
    }
    drop(tx);

    conn.subscribe(&kinds)
        .await
        .map_err(|err| client_error("subscribe failed", err))?;

    let mut printed = 0usize;
    while args.count.is_none_or(|count| printed < count) {
        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => {
                    print_event(&event, format);
                    printed = printed.saturating_add(1);
                }
                // Listeners are dropped when the connection shuts down.
                None => return Err(CliError::new(FAILURE, "connection closed by window manager")),
            },
            signal = tokio::signal::ctrl_c() => {
                signal.map_err(|err| io_error("signal handler setup failed", err))?;
                break;
            }
        }
    }

    conn.close().await;
    Ok(SUCCESS)
}
