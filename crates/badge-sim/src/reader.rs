//! Virtual badge reader for testing
//!
//! This module provides a simulated 7941W-class reader that answers the
//! read-UID command the way the hardware does. Useful for exercising the
//! polling loop, port manager, and codec without a device attached.

use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use badge_protocol::codec::{READ_UID_COMMAND, VALID_UID_STATUS};
use tracing::trace;

/// Frame header the reader starts every reply with
const REPLY_HEADER: [u8; 3] = [0xCD, 0xDC, 0x00];

/// Status the reader reports when no tag is in its field
const NO_TAG_STATUS: u8 = 0x80;

#[derive(Debug, Default)]
struct ReaderState {
    tag: Option<[u8; 4]>,
    unplugged: bool,
    /// Bytes received but not yet recognised as a command
    rx: Vec<u8>,
    /// Reply bytes waiting to be read
    tx: VecDeque<u8>,
    commands_received: usize,
}

/// Simulated badge reader
///
/// Cloning yields another handle to the same device, so a test can keep one
/// handle to move tags in and out while the code under test owns another.
#[derive(Debug, Clone, Default)]
pub struct VirtualReader {
    state: Arc<Mutex<ReaderState>>,
}

impl VirtualReader {
    /// Create a reader with an empty field
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ReaderState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Place a tag with the given UID in the reader's field
    pub fn present(&self, uid: [u8; 4]) {
        self.lock().tag = Some(uid);
    }

    /// Take the tag out of the field
    pub fn remove(&self) {
        self.lock().tag = None;
    }

    /// Pull the cable: every later read or write fails
    pub fn unplug(&self) {
        let mut state = self.lock();
        state.unplugged = true;
        state.tx.clear();
    }

    /// Plug the cable back in, with an empty line
    pub fn replug(&self) {
        let mut state = self.lock();
        state.unplugged = false;
        state.rx.clear();
        state.tx.clear();
    }

    /// Whether the device has been unplugged
    pub fn is_unplugged(&self) -> bool {
        self.lock().unplugged
    }

    /// Number of read-UID commands the reader has answered
    pub fn commands_received(&self) -> usize {
        self.lock().commands_received
    }

    /// Reply frame for the current field contents
    fn reply(tag: Option<[u8; 4]>) -> Vec<u8> {
        let mut frame = REPLY_HEADER.to_vec();
        match tag {
            Some(uid) => {
                frame.push(VALID_UID_STATUS);
                frame.push(uid.len() as u8);
                frame.extend_from_slice(&uid);
            }
            None => {
                frame.push(NO_TAG_STATUS);
                frame.push(0x00);
            }
        }
        let checksum = frame.iter().fold(0u8, |acc, b| acc ^ b);
        frame.push(checksum);
        frame
    }
}

fn detached() -> io::Error {
    io::Error::new(ErrorKind::BrokenPipe, "virtual reader unplugged")
}

impl Read for VirtualReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.lock();
        if state.unplugged {
            return Err(detached());
        }
        if state.tx.is_empty() {
            return Err(io::Error::new(ErrorKind::TimedOut, "no data"));
        }

        let n = buf.len().min(state.tx.len());
        for (slot, byte) in buf.iter_mut().zip(state.tx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for VirtualReader {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.lock();
        if state.unplugged {
            return Err(detached());
        }

        state.rx.extend_from_slice(buf);
        while let Some(pos) = state
            .rx
            .windows(READ_UID_COMMAND.len())
            .position(|w| w == READ_UID_COMMAND)
        {
            state.rx.drain(..pos + READ_UID_COMMAND.len());
            state.commands_received += 1;
            let reply = Self::reply(state.tag);
            trace!("Virtual reader replying {:02X?}", reply);
            state.tx.extend(reply);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.lock().unplugged {
            return Err(detached());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use badge_protocol::codec::{decode_response, poll};

    #[test]
    fn test_reply_with_tag_decodes() {
        let frame = VirtualReader::reply(Some([0x1A, 0x2B, 0x3C, 0x4D]));
        assert_eq!(decode_response(&frame).unwrap().as_str(), "1a2b3c4d");
    }

    #[test]
    fn test_reply_without_tag_is_rejected() {
        let frame = VirtualReader::reply(None);
        assert!(decode_response(&frame).is_none());
    }

    #[test]
    fn test_poll_against_virtual_reader() {
        let mut reader = VirtualReader::new();
        let handle = reader.clone();

        assert!(poll(&mut reader).unwrap().is_none());

        handle.present([0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(poll(&mut reader).unwrap().unwrap().as_str(), "deadbeef");

        handle.remove();
        assert!(poll(&mut reader).unwrap().is_none());
        assert_eq!(handle.commands_received(), 3);
    }

    #[test]
    fn test_command_split_across_writes() {
        let mut reader = VirtualReader::new();
        reader.present([1, 2, 3, 4]);
        reader.write_all(&READ_UID_COMMAND[..2]).unwrap();
        assert_eq!(reader.commands_received(), 0);
        reader.write_all(&READ_UID_COMMAND[2..]).unwrap();
        assert_eq!(reader.commands_received(), 1);
    }

    #[test]
    fn test_unplugged_reader_fails_io() {
        let mut reader = VirtualReader::new();
        reader.unplug();
        assert!(reader.is_unplugged());
        assert!(poll(&mut reader).unwrap_err().is_detach());
    }
}
