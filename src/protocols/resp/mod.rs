//! RESP (Redis Serialization Protocol) implementation.
//!
//! Supports the request form only: one array of bulk strings per call.

pub mod command;
pub mod parser;

pub use command::Command;
pub use parser::{decode, Decoded, Decoder, DecoderLimits};
