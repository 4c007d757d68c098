//! Badge Reader Port Detection Library
//!
//! This crate provides serial port enumeration and the strategies used to
//! pick the port an RFID badge reader is attached to.
//!
//! # Example
//!
//! ```rust,no_run
//! use badge_detect::{PortLocator, SystemLocator};
//!
//! let mut locator = SystemLocator::for_host();
//! if let Some(port) = locator.locate() {
//!     println!("Reader on {}", port);
//! }
//! ```

pub mod error;
pub mod locator;
pub mod scanner;

pub use error::DetectError;
pub use locator::{MatchStrategy, PortLocator, SystemLocator};
pub use scanner::{PortScanner, SerialPortInfo};
