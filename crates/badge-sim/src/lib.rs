//! Badge Reader Simulation Library
//!
//! This crate provides a simulation layer for testing the reader bridge
//! without physical hardware.
//!
//! # Example
//!
//! ```rust
//! use badge_sim::VirtualReader;
//! use badge_protocol::poll;
//!
//! let mut reader = VirtualReader::new();
//! reader.present([0x1A, 0x2B, 0x3C, 0x4D]);
//!
//! let code = poll(&mut reader).unwrap();
//! assert_eq!(code.unwrap().as_str(), "1a2b3c4d");
//! ```

pub mod reader;

pub use reader::VirtualReader;
