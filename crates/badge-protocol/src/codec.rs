//! Read-UID request/response codec
//!
//! The reader answers every read-UID command with a fixed-layout frame. The
//! frame is inspected in its hex-encoded form:
//!
//! ```text
//! hex:    c d d c 0 0 8 1 0 4 1 a 2 b 3 c 4 d ...
//! index:  0 1 2 3 4 5 6 7 8 9 10 ...        17
//!                     ^^^     ^^^^^^^^^^^^^^^
//!                  status        badge code
//! ```
//!
//! Anything that does not carry the valid-UID status is "no tag present".

use std::fmt;
use std::io::{ErrorKind, Read, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::ProtocolError;

/// Command frame asking the reader for the UID of the tag in its field
pub const READ_UID_COMMAND: [u8; 6] = [0xAB, 0xBA, 0x00, 0x10, 0x00, 0x10];

/// Upper bound on the bytes collected for one response
pub const MAX_RESPONSE_LEN: usize = 2405;

/// Byte offset of the status field
pub const STATUS_OFFSET: usize = 3;

/// Status value reported when a UID was read
pub const VALID_UID_STATUS: u8 = 0x81;

/// Byte offset of the first UID byte
pub const CODE_OFFSET: usize = 5;

/// Number of UID bytes carried in a badge code
pub const CODE_LEN: usize = 4;

/// Shortest frame that can hold a status field and a full badge code
pub const MIN_FRAME_LEN: usize = CODE_OFFSET + CODE_LEN;

/// Hex-encoded status marker for a valid UID
const VALID_UID_MARKER: &str = "81";

/// Fixed-width lowercase hexadecimal badge identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BadgeCode(String);

impl BadgeCode {
    /// Width of the code in hex digits
    pub const WIDTH: usize = CODE_LEN * 2;

    /// Build a code from raw UID bytes
    pub fn from_bytes(uid: [u8; CODE_LEN]) -> Self {
        Self(hex::encode(uid))
    }

    /// The code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BadgeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BadgeCode {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let well_formed = s.len() == Self::WIDTH
            && s
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if well_formed {
            Ok(Self(s.to_string()))
        } else {
            Err(ProtocolError::InvalidCode(s.to_string()))
        }
    }
}

impl TryFrom<String> for BadgeCode {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BadgeCode> for String {
    fn from(code: BadgeCode) -> Self {
        code.0
    }
}

/// Validate a raw response frame and extract the badge code
///
/// Returns `None` for empty or short frames and for any status other than
/// the valid-UID marker.
pub fn decode_response(frame: &[u8]) -> Option<BadgeCode> {
    if frame.len() < MIN_FRAME_LEN {
        return None;
    }

    let encoded = hex::encode(&frame[..MIN_FRAME_LEN]);
    let status = &encoded[STATUS_OFFSET * 2..(STATUS_OFFSET + 1) * 2];
    if status != VALID_UID_MARKER {
        trace!("Response status {} is not a UID read", status);
        return None;
    }

    Some(BadgeCode(encoded[CODE_OFFSET * 2..].to_string()))
}

/// Collect one response from the port
///
/// Reads until the port times out, reports end of stream, or
/// [`MAX_RESPONSE_LEN`] bytes have arrived.
pub fn read_response<R>(port: &mut R) -> Result<Vec<u8>, ProtocolError>
where
    R: Read + ?Sized,
{
    let mut buf = vec![0u8; MAX_RESPONSE_LEN];
    let mut filled = 0;

    while filled < MAX_RESPONSE_LEN {
        match port.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => break,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(ProtocolError::Detached(e)),
        }
    }

    buf.truncate(filled);
    Ok(buf)
}

/// Ask the reader for the tag in its field
///
/// `Ok(None)` means no tag (or an unreadable answer). An I/O failure is
/// reported as [`ProtocolError::Detached`].
pub fn poll<P>(port: &mut P) -> Result<Option<BadgeCode>, ProtocolError>
where
    P: Read + Write + ?Sized,
{
    port.write_all(&READ_UID_COMMAND)?;
    port.flush()?;

    let response = read_response(port)?;
    if response.is_empty() {
        return Ok(None);
    }

    trace!(
        "Reader response ({} bytes): {:02X?}",
        response.len(),
        &response[..response.len().min(16)]
    );
    Ok(decode_response(&response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;

    /// Port that replays canned reads and records writes
    struct ScriptedPort {
        reads: VecDeque<io::Result<Vec<u8>>>,
        written: Vec<u8>,
        fail_writes: bool,
    }

    impl ScriptedPort {
        fn new(reads: Vec<io::Result<Vec<u8>>>) -> Self {
            Self {
                reads: reads.into(),
                written: Vec::new(),
                fail_writes: false,
            }
        }
    }

    impl Read for ScriptedPort {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.reads.pop_front() {
                Some(Ok(data)) => {
                    buf[..data.len()].copy_from_slice(&data);
                    Ok(data.len())
                }
                Some(Err(e)) => Err(e),
                None => Err(io::Error::new(ErrorKind::TimedOut, "timed out")),
            }
        }
    }

    impl Write for ScriptedPort {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.fail_writes {
                return Err(io::Error::new(ErrorKind::BrokenPipe, "unplugged"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn valid_frame(uid: [u8; 4]) -> Vec<u8> {
        let mut frame = vec![0xCD, 0xDC, 0x00, VALID_UID_STATUS, 0x04];
        frame.extend_from_slice(&uid);
        frame.push(0x5E);
        frame
    }

    #[test]
    fn test_decode_valid_frame() {
        let code = decode_response(&valid_frame([0x1A, 0x2B, 0x3C, 0x4D])).unwrap();
        assert_eq!(code.as_str(), "1a2b3c4d");
    }

    #[test]
    fn test_decode_wrong_status() {
        let mut frame = valid_frame([0x1A, 0x2B, 0x3C, 0x4D]);
        frame[STATUS_OFFSET] = 0x80;
        assert!(decode_response(&frame).is_none());
    }

    #[test]
    fn test_decode_short_frame() {
        let frame = valid_frame([0x1A, 0x2B, 0x3C, 0x4D]);
        assert!(decode_response(&frame[..MIN_FRAME_LEN - 1]).is_none());
        assert!(decode_response(&[]).is_none());
    }

    #[test]
    fn test_decode_exact_minimum_frame() {
        let frame = valid_frame([0xDE, 0xAD, 0xBE, 0xEF]);
        let code = decode_response(&frame[..MIN_FRAME_LEN]).unwrap();
        assert_eq!(code.as_str(), "deadbeef");
    }

    #[test]
    fn test_badge_code_parse() {
        assert!("1a2b3c4d".parse::<BadgeCode>().is_ok());
        assert!("1A2B3C4D".parse::<BadgeCode>().is_err());
        assert!("1a2b3c".parse::<BadgeCode>().is_err());
        assert!("1a2b3c4g".parse::<BadgeCode>().is_err());
    }

    #[test]
    fn test_poll_writes_command_and_decodes() {
        let frame = valid_frame([0x01, 0x02, 0x03, 0x04]);
        let mut port = ScriptedPort::new(vec![Ok(frame[..4].to_vec()), Ok(frame[4..].to_vec())]);

        let code = poll(&mut port).unwrap();

        assert_eq!(port.written, READ_UID_COMMAND);
        assert_eq!(code.unwrap().as_str(), "01020304");
    }

    #[test]
    fn test_poll_timeout_is_no_tag() {
        let mut port = ScriptedPort::new(vec![]);
        assert!(poll(&mut port).unwrap().is_none());
    }

    #[test]
    fn test_poll_interrupted_read_is_retried() {
        let frame = valid_frame([0x01, 0x02, 0x03, 0x04]);
        let mut port = ScriptedPort::new(vec![
            Err(io::Error::new(ErrorKind::Interrupted, "signal")),
            Ok(frame),
        ]);
        assert!(poll(&mut port).unwrap().is_some());
    }

    #[test]
    fn test_poll_read_failure_is_detach() {
        let mut port = ScriptedPort::new(vec![Err(io::Error::new(
            ErrorKind::BrokenPipe,
            "device gone",
        ))]);
        let err = poll(&mut port).unwrap_err();
        assert!(err.is_detach());
    }

    #[test]
    fn test_poll_write_failure_is_detach() {
        let mut port = ScriptedPort::new(vec![]);
        port.fail_writes = true;
        let err = poll(&mut port).unwrap_err();
        assert!(err.is_detach());
    }
}
