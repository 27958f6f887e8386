//! JSON encoding of decoded commands.
//!
//! Output shape is fixed: `{"command":"<verb>","args":["<arg>",...]}`.
//! Bulk strings must be valid UTF-8; anything else is rejected with
//! [`ParseError::InvalidUtf8`] instead of being escaped or replaced.

use crate::error::ParseError;
use crate::protocols::resp::Command;
use serde::Serialize;

/// Borrowed JSON view of a command. Field order is the output key order.
#[derive(Debug, Serialize)]
pub struct JsonCommand<'a> {
    pub command: &'a str,
    pub args: Vec<&'a str>,
}

impl<'a> JsonCommand<'a> {
    pub fn from_command(command: &'a Command) -> Result<Self, ParseError> {
        let verb = as_text(0, command.verb())?;
        let args = command
            .args()
            .iter()
            .enumerate()
            .map(|(i, arg)| as_text(i + 1, arg))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(JsonCommand {
            command: verb,
            args,
        })
    }
}

fn as_text(index: usize, bytes: &[u8]) -> Result<&str, ParseError> {
    std::str::from_utf8(bytes).map_err(|e| ParseError::InvalidUtf8 {
        index,
        valid_up_to: e.valid_up_to(),
    })
}

/// Serialize a command as compact JSON text
pub fn encode(command: &Command) -> Result<String, ParseError> {
    let view = JsonCommand::from_command(command)?;
    serde_json::to_string(&view).map_err(|e| ParseError::Json(e.to_string()))
}
