//! Decoded client commands.
//!
//! Only the generic shape is checked here. Verb lookup, case folding and
//! arity belong to the dispatcher that consumes the JSON output.

use super::parser::Decoded;
use crate::error::ParseError;
use bytes::Bytes;

/// A non-empty command: verb followed by its arguments in wire order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    verb: Bytes,
    args: Vec<Bytes>,
}

impl Command {
    /// Build a command from decoded elements, rejecting an empty array.
    pub fn from_elements(elements: Vec<Bytes>) -> Result<Self, ParseError> {
        let mut elements = elements.into_iter();
        let verb = elements.next().ok_or(ParseError::EmptyCommand)?;
        Ok(Command {
            verb,
            args: elements.collect(),
        })
    }

    /// Verb bytes exactly as received
    pub fn verb(&self) -> &[u8] {
        &self.verb
    }

    pub fn args(&self) -> &[Bytes] {
        &self.args
    }

    /// Verb followed by arguments
    pub fn elements(&self) -> impl Iterator<Item = &[u8]> {
        std::iter::once(&self.verb[..]).chain(self.args.iter().map(|arg| &arg[..]))
    }

    pub fn len(&self) -> usize {
        1 + self.args.len()
    }

    /// A command always holds its verb.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl TryFrom<Decoded> for Command {
    type Error = ParseError;

    fn try_from(decoded: Decoded) -> Result<Self, Self::Error> {
        Command::from_elements(decoded.elements)
    }
}
