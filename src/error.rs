//! Error taxonomy for command parsing.
//!
//! Every failure is reported as a value; nothing here is raised across the
//! C boundary. Messages name the expected token and the byte position where
//! decoding stopped.

use std::fmt;

/// Which length header a length error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthField {
    /// The `*<N>` element count
    ArrayCount,
    /// A `$<L>` bulk string length
    BulkLength,
}

impl LengthField {
    fn describe(self) -> &'static str {
        match self {
            LengthField::ArrayCount => "array length",
            LengthField::BulkLength => "bulk string length",
        }
    }
}

/// Coarse error category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed framing
    Syntax,
    /// Well-formed zero element array
    EmptyCommand,
    /// Payload cannot be carried as JSON text
    Encoding,
}

/// Command parsing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A `*` or `$` type marker was expected
    MissingMarker {
        expected: u8,
        found: Option<u8>,
        position: usize,
    },
    /// Length header is empty, negative or non-numeric
    InvalidLength {
        field: LengthField,
        text: String,
        position: usize,
    },
    /// Length header exceeds the configured limit
    LengthLimit {
        field: LengthField,
        length: usize,
        limit: usize,
        position: usize,
    },
    /// The buffer ends before the token starting at `position` is complete
    Truncated {
        expected: &'static str,
        position: usize,
        needed: usize,
        available: usize,
    },
    /// A CRLF was expected at `position`
    MissingTerminator { position: usize },
    /// The array holds no elements
    EmptyCommand,
    /// Element `index` is not valid UTF-8
    InvalidUtf8 { index: usize, valid_up_to: usize },
    /// JSON serialization failed
    Json(String),
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::MissingMarker { .. }
            | ParseError::InvalidLength { .. }
            | ParseError::LengthLimit { .. }
            | ParseError::Truncated { .. }
            | ParseError::MissingTerminator { .. } => ErrorKind::Syntax,
            ParseError::EmptyCommand => ErrorKind::EmptyCommand,
            ParseError::InvalidUtf8 { .. } | ParseError::Json(_) => ErrorKind::Encoding,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingMarker {
                expected,
                found: Some(found),
                position,
            } => write!(
                f,
                "Protocol error: expected '{}' at byte {}, found {}",
                *expected as char,
                position,
                printable(*found)
            ),
            ParseError::MissingMarker {
                expected,
                found: None,
                position,
            } => write!(
                f,
                "Protocol error: expected '{}' at byte {}, found end of input",
                *expected as char, position
            ),
            ParseError::InvalidLength {
                field,
                text,
                position,
            } => write!(
                f,
                "Protocol error: invalid {} '{}' at byte {}",
                field.describe(),
                text,
                position
            ),
            ParseError::LengthLimit {
                field,
                length,
                limit,
                position,
            } => write!(
                f,
                "Protocol error: {} {} at byte {} exceeds limit of {}",
                field.describe(),
                length,
                position,
                limit
            ),
            ParseError::Truncated {
                expected,
                position,
                needed,
                available,
            } => write!(
                f,
                "Protocol error: truncated {} at byte {} (needed {} bytes, {} available)",
                expected, position, needed, available
            ),
            ParseError::MissingTerminator { position } => {
                write!(f, "Protocol error: expected CRLF at byte {}", position)
            }
            ParseError::EmptyCommand => write!(f, "Protocol error: empty command"),
            ParseError::InvalidUtf8 { index, valid_up_to } => write!(
                f,
                "Encoding error: element {} is not valid UTF-8 (invalid byte at offset {})",
                index, valid_up_to
            ),
            ParseError::Json(e) => write!(f, "Encoding error: {}", e),
        }
    }
}

impl std::error::Error for ParseError {}

fn printable(byte: u8) -> String {
    if byte.is_ascii_graphic() {
        format!("'{}'", byte as char)
    } else {
        format!("0x{:02x}", byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let syntax = ParseError::MissingTerminator { position: 3 };
        assert_eq!(syntax.kind(), ErrorKind::Syntax);
        assert_eq!(ParseError::EmptyCommand.kind(), ErrorKind::EmptyCommand);
        let encoding = ParseError::InvalidUtf8 {
            index: 1,
            valid_up_to: 0,
        };
        assert_eq!(encoding.kind(), ErrorKind::Encoding);
    }

    #[test]
    fn test_missing_marker_message() {
        let err = ParseError::MissingMarker {
            expected: b'*',
            found: Some(b'h'),
            position: 0,
        };
        assert_eq!(
            err.to_string(),
            "Protocol error: expected '*' at byte 0, found 'h'"
        );

        let err = ParseError::MissingMarker {
            expected: b'$',
            found: Some(b'\n'),
            position: 4,
        };
        assert!(err.to_string().ends_with("found 0x0a"));
    }

    #[test]
    fn test_invalid_length_message() {
        let err = ParseError::InvalidLength {
            field: LengthField::BulkLength,
            text: "-1".to_string(),
            position: 5,
        };
        assert_eq!(
            err.to_string(),
            "Protocol error: invalid bulk string length '-1' at byte 5"
        );
    }
}
