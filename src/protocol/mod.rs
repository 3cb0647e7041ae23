//! Length-prefixed lookup protocol
//!
//! The wire format the external runtime drives lookups through: a request
//! is a 1-byte length header followed by a key of fewer than 255 bytes,
//! a response is a 1-byte length header followed by the resolved server
//! address. The codec is independent from every other module.

mod frame;

pub use frame::{FrameEncoder, FrameError, FrameParser};
