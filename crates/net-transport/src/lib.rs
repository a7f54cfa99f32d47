//! Network Transport - UDP delivery for cryptomessages
//!
//! Moves exactly one sealed datagram per call. Each send or receive opens
//! its own socket and drops it before returning, on success and on error.

mod channel;
mod error;
mod transport;

pub use channel::*;
pub use error::*;
pub use transport::*;

pub use wire_format::MAX_DATAGRAM_SIZE;
