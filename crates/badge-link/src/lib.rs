//! Badge Reader Link
//!
//! This crate connects a USB RFID badge reader to a network-facing
//! transport. It owns the device side of the system:
//!
//! - **Port lifecycle**: following the reader across unplug/replug, opening
//!   with bounded retry ([`PortManager`])
//! - **Debouncing**: holding back repeated reads of a badge left on the
//!   reader ([`DebounceFilter`])
//! - **Handoff**: a lock-guarded, last-write-wins mailbox pair between the
//!   polling thread and the async side ([`ScanBridge`])
//! - **Polling loop**: the dedicated thread tying it together ([`ScanWorker`])
//!
//! # Threading
//!
//! The serial handle never leaves the polling thread. The transport only
//! calls the bridge, whose operations hold the lock for a slot access and
//! never block waiting for data.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use badge_detect::SystemLocator;
//! use badge_link::{ScanBridge, ScanWorker, ScannerConfig, SerialOpener, WorkerConfig};
//!
//! let bridge = Arc::new(ScanBridge::new(ScannerConfig::default()));
//! let worker = ScanWorker::new(
//!     SystemLocator::for_host(),
//!     SerialOpener,
//!     Arc::clone(&bridge),
//!     WorkerConfig::default(),
//! );
//! let handle = worker.spawn().unwrap();
//!
//! // The transport drains the bridge
//! if let Some(message) = bridge.try_take() {
//!     println!("{:?}", message);
//! }
//!
//! handle.shutdown(Duration::from_secs(2));
//! ```

pub mod bridge;
pub mod debounce;
pub mod error;
pub mod mailbox;
pub mod poller;
pub mod port;
pub mod state;

pub use bridge::ScanBridge;
pub use debounce::DebounceFilter;
pub use error::LinkError;
pub use mailbox::Mailbox;
pub use poller::{ScanSink, ScanWorker, WorkerConfig, WorkerHandle};
pub use port::{PortManager, PortOpener, RetryPolicy, SerialOpener};
pub use state::{PortState, ScannerConfig};
