//! Replay command: run an existing client log through the classifier.
//!
//! Nothing is sent; the notifications `watch` would have fired are printed
//! instead. Area membership is tracked across the whole file, so the output
//! matches what a live session over the same lines would produce.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use poeha_core::{Dispatch, Dispatcher, Notification};

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Client log to read from the beginning.
    pub file: PathBuf,

    /// Print one JSON object per event instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Runs the replay command.
pub fn run<W: Write>(writer: &mut W, args: &ReplayArgs, player_name: &str) -> Result<()> {
    let file = File::open(&args.file)
        .with_context(|| format!("failed to open {}", args.file.display()))?;
    replay(writer, BufReader::new(file), &args.file, args.json, player_name)
}

fn replay<W: Write, R: BufRead>(
    writer: &mut W,
    reader: R,
    path: &Path,
    json: bool,
    player_name: &str,
) -> Result<()> {
    let mut dispatcher = Dispatcher::new(player_name, Vec::<Notification>::new());

    for (index, bytes) in reader.split(b'\n').enumerate() {
        let bytes = bytes.with_context(|| format!("failed to read {}", path.display()))?;
        let line = String::from_utf8_lossy(&bytes);

        if !matches!(dispatcher.handle_line(line.trim()), Dispatch::Forwarded(_)) {
            continue;
        }
        let Some(notification) = dispatcher.sink().last() else {
            continue;
        };
        print_notification(writer, index + 1, notification, json)?;
    }

    if !json {
        let stats = dispatcher.stats();
        let members = dispatcher.members().names();
        writeln!(writer, "{} lines, {} events", stats.lines, stats.forwarded)?;
        if !members.is_empty() {
            writeln!(writer, "still in area: {}", members.join(", "))?;
        }
    }

    Ok(())
}

fn print_notification<W: Write>(
    writer: &mut W,
    line_number: usize,
    notification: &Notification,
    json: bool,
) -> Result<()> {
    if json {
        let output = serde_json::json!({
            "line": line_number,
            "event": notification.event,
            "payload": notification.payload,
        });
        writeln!(writer, "{output}")?;
        return Ok(());
    }

    let fields = notification
        .payload
        .iter()
        .filter(|(key, _)| key.as_str() != "player_name")
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(writer, "{line_number}: {} {fields}", notification.event)?;
    Ok(())
}
