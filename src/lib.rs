//! statedb-parser: RESP command decoding for an external dispatcher
//!
//! One call takes one complete command buffer (`*<N>\r\n` followed by N bulk
//! strings) and produces either JSON text of the form
//! `{"command":"<verb>","args":[...]}` or a descriptive error.
//!
//! - [`parse`] is the in-process entry point and returns an owned
//!   [`ParseOutcome`].
//! - [`abi`] exposes the same pipeline over a C boundary with an explicit
//!   release function.

pub mod abi;
pub mod encoder;
pub mod envelope;
pub mod error;
pub mod protocols;

pub use envelope::{parse, parse_with_limits, ParseOutcome, Parsed};
pub use error::{ErrorKind, ParseError};
pub use protocols::resp::{Command, DecoderLimits};
