//! statedb-parser: decode one RESP command into dispatcher JSON
//!
//! Reads a raw RESP buffer from a file or stdin, or builds one from words on
//! the command line, and prints the result envelope:
//!
//! ```text
//! {"success":true,"err":null,"json_result":"{\"command\":\"PING\",\"args\":[]}"}
//! ```
//!
//! Exits with status 1 when the command is rejected.

mod config;

use config::{Config, InputSource};
use serde::Serialize;
use statedb_parser::protocols::resp::parser::encode_command;
use statedb_parser::ParseOutcome;
use std::io::Read;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Printable mirror of the C envelope
#[derive(Debug, Serialize)]
struct EnvelopeView {
    success: bool,
    err: Option<String>,
    json_result: Option<String>,
}

impl From<&ParseOutcome> for EnvelopeView {
    fn from(outcome: &ParseOutcome) -> Self {
        EnvelopeView {
            success: outcome.is_success(),
            err: outcome.error().map(|e| e.to_string()),
            json_result: outcome.json().map(str::to_string),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    debug!(
        input = ?config.input,
        max_elements = config.limits.max_elements,
        max_bulk_len = config.limits.max_bulk_len,
        "Starting statedb-parser"
    );

    let buffer = read_input(&config.input)?;
    let outcome = statedb_parser::parse_with_limits(&buffer, config.limits);
    info!(bytes = buffer.len(), success = outcome.is_success(), "Parsed command");

    let view = EnvelopeView::from(&outcome);
    let text = if config.pretty {
        serde_json::to_string_pretty(&view)?
    } else {
        serde_json::to_string(&view)?
    };
    println!("{text}");

    if !outcome.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn read_input(source: &InputSource) -> std::io::Result<Vec<u8>> {
    match source {
        InputSource::Words(words) => Ok(encode_command(words.as_slice()).to_vec()),
        InputSource::File(path) => std::fs::read(path),
        InputSource::Stdin => {
            let mut buffer = Vec::new();
            std::io::stdin().read_to_end(&mut buffer)?;
            Ok(buffer)
        }
    }
}
