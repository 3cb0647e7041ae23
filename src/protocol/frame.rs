//! Frame parser and encoder
//!
//! Parsing works over an owned growable buffer: `Ok(None)` means more
//! bytes are needed, errors are unrecoverable for the connection (the
//! driver terminates its read loop on them).

use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Highest length-header value accepted for a key. A 255 header is a
/// framing error rather than a length, matching the libketama port driver.
const MAX_KEY_LEN: usize = 254;

/// Framing errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// Request length header at or above the 255 sentinel
    #[error("key length {0} exceeds the 254-byte frame limit")]
    KeyTooLong(usize),

    /// Response address does not fit a 1-byte length header
    #[error("address length {0} exceeds the 254-byte frame limit")]
    AddressTooLong(usize),
}

/// Parser for length-prefixed key frames.
pub struct FrameParser;

impl FrameParser {
    /// Parse one key frame from a buffer.
    ///
    /// Returns `Ok(Some(key))` when a complete frame was consumed,
    /// `Ok(None)` when more data is needed, and an error on an oversized
    /// length header.
    pub fn parse(buf: &mut BytesMut) -> Result<Option<Bytes>, FrameError> {
        if buf.is_empty() {
            return Ok(None);
        }

        let len = buf[0] as usize;
        if len > MAX_KEY_LEN {
            return Err(FrameError::KeyTooLong(len));
        }

        if buf.len() < 1 + len {
            // Header seen but the key is still in flight.
            return Ok(None);
        }

        buf.advance(1);
        Ok(Some(buf.split_to(len).freeze()))
    }
}

/// Encoder for length-prefixed address responses.
pub struct FrameEncoder;

impl FrameEncoder {
    /// Encode an address response into an existing buffer.
    pub fn encode_to(buf: &mut BytesMut, address: &str) -> Result<(), FrameError> {
        let len = address.len();
        if len > MAX_KEY_LEN {
            return Err(FrameError::AddressTooLong(len));
        }

        buf.put_u8(len as u8);
        buf.put_slice(address.as_bytes());
        Ok(())
    }

    /// Encode an address response as a standalone byte string.
    pub fn encode(address: &str) -> Result<Bytes, FrameError> {
        let mut buf = BytesMut::with_capacity(1 + address.len());
        Self::encode_to(&mut buf, address)?;
        Ok(buf.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_complete_frame() {
        let mut buf = BytesMut::from(&b"\x04aab0"[..]);
        let key = FrameParser::parse(&mut buf).unwrap();
        assert_eq!(key, Some(Bytes::from("aab0")));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_parse_empty_buffer_needs_more() {
        let mut buf = BytesMut::new();
        assert_eq!(FrameParser::parse(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_parse_partial_key_needs_more() {
        let mut buf = BytesMut::from(&b"\x05aab"[..]);
        assert_eq!(FrameParser::parse(&mut buf).unwrap(), None);
        // Nothing consumed while incomplete.
        assert_eq!(buf.len(), 4);

        buf.put_slice(b"12");
        let key = FrameParser::parse(&mut buf).unwrap();
        assert_eq!(key, Some(Bytes::from("aab12")));
    }

    #[test]
    fn test_parse_two_pipelined_frames() {
        let mut buf = BytesMut::from(&b"\x03foo\x03bar"[..]);
        assert_eq!(FrameParser::parse(&mut buf).unwrap(), Some(Bytes::from("foo")));
        assert_eq!(FrameParser::parse(&mut buf).unwrap(), Some(Bytes::from("bar")));
        assert_eq!(FrameParser::parse(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_parse_rejects_255_header() {
        let mut buf = BytesMut::from(&b"\xff"[..]);
        assert_eq!(
            FrameParser::parse(&mut buf).unwrap_err(),
            FrameError::KeyTooLong(255)
        );
    }

    #[test]
    fn test_parse_zero_length_key() {
        // The core imposes no lower bound on key length.
        let mut buf = BytesMut::from(&b"\x00"[..]);
        assert_eq!(FrameParser::parse(&mut buf).unwrap(), Some(Bytes::new()));
    }

    #[test]
    fn test_encode_address() {
        let encoded = FrameEncoder::encode("node1:11211").unwrap();
        assert_eq!(&encoded[..], b"\x0bnode1:11211");
    }

    #[test]
    fn test_encode_rejects_oversized_address() {
        let long = "x".repeat(300);
        assert_eq!(
            FrameEncoder::encode(&long).unwrap_err(),
            FrameError::AddressTooLong(300)
        );
    }

    #[test]
    fn test_encode_empty_address() {
        // Zero-length response frame: the driver's "no server" answer.
        let encoded = FrameEncoder::encode("").unwrap();
        assert_eq!(&encoded[..], b"\x00");
    }
}
