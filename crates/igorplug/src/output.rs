use std::fmt::Write as _;
use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use igorplug_stream::Message;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct MessageOutput {
    message_index: Option<u8>,
    is_new: bool,
    length: usize,
    diagram: String,
    timestamp: String,
}

pub fn print_message(message: &Message, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                message_index: message.message_index,
                is_new: message.is_new,
                length: message.diagram.len(),
                diagram: hex(&message.diagram),
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["INDEX", "NEW", "LENGTH", "DIAGRAM"])
                .add_row(vec![
                    index_text(message.message_index),
                    message.is_new.to_string(),
                    message.diagram.len().to_string(),
                    hex_spaced(&message.diagram),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            if message.is_new {
                println!(
                    "index={} length={} diagram={}",
                    index_text(message.message_index),
                    message.diagram.len(),
                    hex_spaced(&message.diagram)
                );
            } else {
                println!("no new message");
            }
        }
        OutputFormat::Raw => {
            print_raw(&message.diagram);
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// Lowercase hex, two digits per byte, no separators.
pub fn hex(data: &[u8]) -> String {
    data.iter().fold(String::with_capacity(data.len() * 2), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}

fn hex_spaced(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn index_text(index: Option<u8>) -> String {
    index.map_or_else(|| "-".to_string(), |i| i.to_string())
}

pub fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
