//! Badge Reader Protocol Library
//!
//! This crate provides the wire protocol spoken by 7941W-class USB RFID
//! readers and the messages that describe a badge scan to the outside world:
//!
//! - **Codec**: the fixed read-UID command frame and validation of the
//!   reader's reply into a [`BadgeCode`]
//! - **Events**: the immutable [`ScanEvent`] produced for an accepted read
//! - **Messages**: JSON shapes exchanged with the duplex peer and the
//!   registration API
//!
//! # Frame Format
//!
//! ```text
//! request:  AB BA 00 10 00 10
//! response: [0..3 header] [status] [len] [uid0 uid1 uid2 uid3] ...
//! ```
//!
//! A status byte of `0x81` marks a valid UID read.
//!
//! # Example
//!
//! ```rust
//! use badge_protocol::codec::decode_response;
//!
//! let frame = [0xCD, 0xDC, 0x00, 0x81, 0x04, 0x1A, 0x2B, 0x3C, 0x4D, 0x00];
//! let code = decode_response(&frame).unwrap();
//! assert_eq!(code.as_str(), "1a2b3c4d");
//! ```

pub mod codec;
pub mod error;
pub mod event;
pub mod message;

pub use codec::{decode_response, poll, BadgeCode, READ_UID_COMMAND};
pub use error::ProtocolError;
pub use event::ScanEvent;
pub use message::{ControlCommand, Outbound, RegistrationRequest, RegistrationResponse};
