//! Protocol implementations.
//!
//! ## Protocols
//! - `resp`: Redis RESP request decoding

pub mod resp;
