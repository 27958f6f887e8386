//! RESP (Redis Serialization Protocol) command decoder.
//!
//! Decodes exactly one client command: an array of bulk strings.
//!
//! ```text
//! *<N>\r\n
//! $<L>\r\n<L raw bytes>\r\n     (repeated N times)
//! ```
//!
//! Bulk strings are binary-safe. The decoder never reads past the end of the
//! supplied buffer; a short buffer is reported as a truncation error rather
//! than as a request for more data. Bytes following the command are ignored.

use crate::error::{LengthField, ParseError};
use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};

/// Default maximum number of elements in one command
pub const DEFAULT_MAX_ELEMENTS: usize = 1024 * 1024;

/// Default maximum length of one bulk string
pub const DEFAULT_MAX_BULK_LEN: usize = 512 * 1024 * 1024;

/// Smallest possible encoded element: `$0\r\n\r\n`
const MIN_ELEMENT_LEN: usize = 6;

/// Longest slice of a bad length header echoed back in an error
const MAX_ECHO_LEN: usize = 32;

/// Upper bounds applied to length headers before anything is allocated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderLimits {
    pub max_elements: usize,
    pub max_bulk_len: usize,
}

impl Default for DecoderLimits {
    fn default() -> Self {
        Self {
            max_elements: DEFAULT_MAX_ELEMENTS,
            max_bulk_len: DEFAULT_MAX_BULK_LEN,
        }
    }
}

/// A decoded array with the number of bytes it occupied
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    /// Elements in wire order
    pub elements: Vec<Bytes>,
    /// Bytes consumed from the start of the buffer
    pub consumed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    ReadArrayHeader,
    ReadElementHeader,
    ReadElementBody { len: usize },
    Complete,
}

/// Single-use decoder over a borrowed buffer
pub struct Decoder<'a> {
    buffer: &'a [u8],
    limits: DecoderLimits,
    state: State,
    pos: usize,
    remaining: usize,
    elements: Vec<Bytes>,
}

impl<'a> Decoder<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self::with_limits(buffer, DecoderLimits::default())
    }

    pub fn with_limits(buffer: &'a [u8], limits: DecoderLimits) -> Self {
        Decoder {
            buffer,
            limits,
            state: State::Start,
            pos: 0,
            remaining: 0,
            elements: Vec::new(),
        }
    }

    /// Run the state machine to completion or to the first malformed token.
    pub fn decode(mut self) -> Result<Decoded, ParseError> {
        loop {
            self.state = match self.state {
                State::Start => {
                    self.expect_marker(b'*')?;
                    State::ReadArrayHeader
                }
                State::ReadArrayHeader => {
                    let count = self.read_length(LengthField::ArrayCount)?;
                    // Every element needs at least MIN_ELEMENT_LEN bytes, so the
                    // remaining input bounds the preallocation.
                    let rest = self.buffer.len() - self.pos;
                    self.elements = Vec::with_capacity(count.min(rest / MIN_ELEMENT_LEN));
                    self.remaining = count;
                    if count == 0 {
                        State::Complete
                    } else {
                        State::ReadElementHeader
                    }
                }
                State::ReadElementHeader => {
                    if self.pos >= self.buffer.len() {
                        return Err(ParseError::Truncated {
                            expected: "bulk string header",
                            position: self.pos,
                            needed: 1,
                            available: 0,
                        });
                    }
                    self.expect_marker(b'$')?;
                    let len = self.read_length(LengthField::BulkLength)?;
                    State::ReadElementBody { len }
                }
                State::ReadElementBody { len } => {
                    let data = self.read_body(len)?;
                    trace!(index = self.elements.len(), len, "Decoded bulk string");
                    self.elements.push(data);
                    self.remaining -= 1;
                    if self.remaining == 0 {
                        State::Complete
                    } else {
                        State::ReadElementHeader
                    }
                }
                State::Complete => break,
            };
        }

        let trailing = self.buffer.len() - self.pos;
        if trailing > 0 {
            debug!(consumed = self.pos, trailing, "Ignoring bytes after command");
        }

        Ok(Decoded {
            elements: self.elements,
            consumed: self.pos,
        })
    }

    fn expect_marker(&mut self, marker: u8) -> Result<(), ParseError> {
        match self.buffer.get(self.pos) {
            Some(&byte) if byte == marker => {
                self.pos += 1;
                Ok(())
            }
            found => Err(ParseError::MissingMarker {
                expected: marker,
                found: found.copied(),
                position: self.pos,
            }),
        }
    }

    /// Read an unsigned decimal terminated by CRLF. `self.pos` is just past
    /// the type marker.
    fn read_length(&mut self, field: LengthField) -> Result<usize, ParseError> {
        let marker_pos = self.pos - 1;
        let start = self.pos;
        let digits = self.buffer[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        let end = start + digits;

        let truncated = |buffer: &[u8]| ParseError::Truncated {
            expected: match field {
                LengthField::ArrayCount => "array header",
                LengthField::BulkLength => "bulk string header",
            },
            position: marker_pos,
            needed: end + 2 - marker_pos,
            available: buffer.len() - marker_pos,
        };

        match self.buffer.get(end) {
            None => return Err(truncated(self.buffer)),
            Some(b'\r') if digits > 0 => {}
            Some(_) => {
                return Err(ParseError::InvalidLength {
                    field,
                    text: self.header_text(start),
                    position: start,
                })
            }
        }

        match self.buffer.get(end + 1) {
            None => return Err(truncated(self.buffer)),
            Some(b'\n') => {}
            Some(_) => return Err(ParseError::MissingTerminator { position: end }),
        }

        let text = &self.buffer[start..end];
        let length = std::str::from_utf8(text)
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or_else(|| ParseError::InvalidLength {
                field,
                text: self.header_text(start),
                position: start,
            })?;

        let limit = match field {
            LengthField::ArrayCount => self.limits.max_elements,
            LengthField::BulkLength => self.limits.max_bulk_len,
        };
        if length > limit {
            return Err(ParseError::LengthLimit {
                field,
                length,
                limit,
                position: start,
            });
        }

        self.pos = end + 2;
        Ok(length)
    }

    fn read_body(&mut self, len: usize) -> Result<Bytes, ParseError> {
        let start = self.pos;
        let available = self.buffer.len() - start;
        if available < len {
            return Err(ParseError::Truncated {
                expected: "bulk string",
                position: start,
                needed: len + 2,
                available,
            });
        }

        let term = start + len;
        match (self.buffer.get(term), self.buffer.get(term + 1)) {
            (Some(b'\r'), Some(b'\n')) => {}
            (None, _) | (Some(b'\r'), None) => {
                return Err(ParseError::Truncated {
                    expected: "bulk string",
                    position: start,
                    needed: len + 2,
                    available,
                })
            }
            _ => return Err(ParseError::MissingTerminator { position: term }),
        }

        self.pos = term + 2;
        Ok(Bytes::copy_from_slice(&self.buffer[start..term]))
    }

    fn header_text(&self, start: usize) -> String {
        let line = &self.buffer[start..];
        let line_end = line
            .iter()
            .position(|&b| b == b'\r')
            .unwrap_or(line.len())
            .min(MAX_ECHO_LEN);
        line[..line_end].escape_ascii().to_string()
    }
}

/// Decode one command with the default limits
pub fn decode(buffer: &[u8]) -> Result<Decoded, ParseError> {
    Decoder::new(buffer).decode()
}

/// Encode a command as an array of bulk strings
pub fn encode_command<T: AsRef<[u8]>>(parts: &[T]) -> BytesMut {
    let mut buf = BytesMut::new();
    encode_command_into(parts, &mut buf);
    buf
}

/// Encode a command into an existing buffer
pub fn encode_command_into<T: AsRef<[u8]>>(parts: &[T], buf: &mut BytesMut) {
    buf.extend_from_slice(b"*");
    buf.extend_from_slice(parts.len().to_string().as_bytes());
    buf.extend_from_slice(b"\r\n");
    for part in parts {
        let data = part.as_ref();
        buf.extend_from_slice(b"$");
        buf.extend_from_slice(data.len().to_string().as_bytes());
        buf.extend_from_slice(b"\r\n");
        buf.extend_from_slice(data);
        buf.extend_from_slice(b"\r\n");
    }
}
