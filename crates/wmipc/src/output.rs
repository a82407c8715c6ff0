use std::io::IsTerminal;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serde_json::Value;
use wmipc_client::Event;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Pretty,
    Table,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct EventOutput<'a> {
    event: &'a str,
    code: u32,
    body: &'a Value,
    timestamp: String,
}

/// Print a reply body.
pub fn print_value(value: &Value, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", to_json(value)),
        OutputFormat::Pretty => println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
        ),
        OutputFormat::Table => println!("{}", value_table(value)),
    }
}

/// Print one received event. JSON output is one object per line.
pub fn print_event(event: &Event, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = EventOutput {
                event: event.kind.name(),
                code: event.code,
                body: &event.body,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Pretty => {
            println!(
                "event={} code={} change={} body={}",
                event.kind,
                event.code,
                cell(event.body.get("change")),
                to_json(&event.body)
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["EVENT", "CODE", "CHANGE", "BODY"])
                .add_row(vec![
                    event.kind.to_string(),
                    event.code.to_string(),
                    cell(event.body.get("change")),
                    to_json(&event.body),
                ]);
            println!("{table}");
        }
    }
}

pub fn print_path(path: &Path, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!(
            "{}",
            to_json(&serde_json::json!({ "socket_path": path.display().to_string() }))
        ),
        OutputFormat::Pretty | OutputFormat::Table => println!("{}", path.display()),
    }
}

fn value_table(value: &Value) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    match value {
        Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_object) => {
            let columns = scalar_columns(items);
            table.set_header(
                columns
                    .iter()
                    .map(|column| column.to_uppercase())
                    .collect::<Vec<_>>(),
            );
            for item in items {
                table.add_row(
                    columns
                        .iter()
                        .map(|column| cell(item.get(column.as_str())))
                        .collect::<Vec<_>>(),
                );
            }
        }
        Value::Array(items) => {
            table.set_header(vec!["VALUE"]);
            for item in items {
                table.add_row(vec![cell(Some(item))]);
            }
        }
        Value::Object(map) => {
            table.set_header(vec!["KEY", "VALUE"]);
            for (key, value) in map {
                table.add_row(vec![key.clone(), cell(Some(value))]);
            }
        }
        other => {
            table.set_header(vec!["VALUE"]);
            table.add_row(vec![cell(Some(other))]);
        }
    }

    table
}

/// Keys that hold a scalar in at least one row, in first-seen order.
fn scalar_columns(rows: &[Value]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows.iter().filter_map(Value::as_object) {
        for (key, value) in row {
            if !(value.is_array() || value.is_object()) && !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => to_json(other),
    }
}

fn to_json(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
