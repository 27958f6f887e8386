//! Parse pipeline and its owned result.
//!
//! `parse` runs decode, validate and encode over one buffer and hands back a
//! [`ParseOutcome`] that the caller owns outright. Dropping it releases
//! everything; there is no separate release step.

use crate::encoder;
use crate::error::ParseError;
use crate::protocols::resp::{Command, Decoder, DecoderLimits};
use tracing::debug;

/// A successfully parsed command and its JSON text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    command: Command,
    json: String,
}

impl Parsed {
    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn json(&self) -> &str {
        &self.json
    }

    pub fn into_json(self) -> String {
        self.json
    }
}

/// Result of one parse call: exactly one of a command or an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Success(Parsed),
    Failure(ParseError),
}

impl ParseOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ParseOutcome::Success(_))
    }

    pub fn json(&self) -> Option<&str> {
        match self {
            ParseOutcome::Success(parsed) => Some(parsed.json()),
            ParseOutcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ParseError> {
        match self {
            ParseOutcome::Success(_) => None,
            ParseOutcome::Failure(err) => Some(err),
        }
    }

    pub fn into_result(self) -> Result<Parsed, ParseError> {
        match self {
            ParseOutcome::Success(parsed) => Ok(parsed),
            ParseOutcome::Failure(err) => Err(err),
        }
    }
}

impl From<Result<Parsed, ParseError>> for ParseOutcome {
    fn from(result: Result<Parsed, ParseError>) -> Self {
        match result {
            Ok(parsed) => ParseOutcome::Success(parsed),
            Err(err) => ParseOutcome::Failure(err),
        }
    }
}

/// Parse one command with the default decoder limits
pub fn parse(buffer: &[u8]) -> ParseOutcome {
    parse_with_limits(buffer, DecoderLimits::default())
}

pub fn parse_with_limits(buffer: &[u8], limits: DecoderLimits) -> ParseOutcome {
    let outcome = run(buffer, limits);
    if let Err(ref err) = outcome {
        debug!(kind = ?err.kind(), error = %err, "Command rejected");
    }
    outcome.into()
}

fn run(buffer: &[u8], limits: DecoderLimits) -> Result<Parsed, ParseError> {
    let decoded = Decoder::with_limits(buffer, limits).decode()?;
    let command = Command::try_from(decoded)?;
    let json = encoder::encode(&command)?;
    Ok(Parsed { command, json })
}
