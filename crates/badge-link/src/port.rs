//! Reader port lifecycle
//!
//! The [`PortManager`] is the only owner of the reader's serial handle. It
//! follows the identifier the locator reports:
//!
//! ```text
//! Absent --locate--> Identified --open--> Opening --ok--> Connected
//!                                            |
//!                                          error --> Failed --retry--> Opening
//!                                                      |
//!                                               budget spent --> Absent
//! Connected --detach / port gone / port changed--> Absent
//! ```
//!
//! A freshly enumerated device node is often not accessible for a moment, so
//! opening is retried on a fixed [`RetryPolicy`].

use std::io::{self, Read, Write};
use std::thread;
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, error, info, warn};

use crate::error::LinkError;
use crate::state::PortState;

/// Reader line speed
pub const BAUD_RATE: u32 = 115_200;

/// Read timeout; bounds how long one poll can block
pub const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Capability to open a port by identifier
pub trait PortOpener: Send {
    /// Open handle type
    type Port: Read + Write + Send;

    /// Open the port, failing if it is not accessible yet
    fn open(&mut self, port: &str) -> io::Result<Self::Port>;
}

/// Opens real serial ports with the reader's fixed line settings
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialOpener;

impl PortOpener for SerialOpener {
    type Port = Box<dyn SerialPort>;

    fn open(&mut self, port: &str) -> io::Result<Self::Port> {
        let port = serialport::new(port, BAUD_RATE)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(READ_TIMEOUT)
            .open()?;
        Ok(port)
    }
}

/// Bounded retry schedule for opening a port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total open attempts
    pub attempts: u32,
    /// Pause between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 10,
            delay: Duration::from_secs(1),
        }
    }
}

/// Owner of the reader's serial handle
pub struct PortManager<O: PortOpener> {
    opener: O,
    policy: RetryPolicy,
    state: PortState,
    current: Option<String>,
    handle: Option<O::Port>,
    /// Set once the move to Absent has been logged
    absent_logged: bool,
}

impl<O: PortOpener> PortManager<O> {
    /// Create a manager with the default retry policy
    pub fn new(opener: O) -> Self {
        Self::with_policy(opener, RetryPolicy::default())
    }

    /// Create a manager with a custom retry policy
    pub fn with_policy(opener: O, policy: RetryPolicy) -> Self {
        Self {
            opener,
            policy,
            state: PortState::Absent,
            current: None,
            handle: None,
            absent_logged: false,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> PortState {
        self.state
    }

    /// Whether an open handle is available
    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Identifier of the open port
    pub fn current_port(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// The open handle, if connected
    pub fn port_mut(&mut self) -> Option<&mut O::Port> {
        self.handle.as_mut()
    }

    /// Follow the latest identification result
    pub fn sync(&mut self, located: Option<String>) -> PortState {
        match located {
            Some(port) => {
                if self.handle.is_some() && self.current.as_deref() == Some(port.as_str()) {
                    return self.state;
                }
                if let Some(old) = self.current.take() {
                    info!("Reader moved from {} to {}", old, port);
                }
                self.close();
                self.state = PortState::Identified;
                debug!("Reader identified on {}", port);

                match self.open_with_retry(&port) {
                    Ok(handle) => {
                        info!("Set serial port, id {}", port);
                        self.handle = Some(handle);
                        self.current = Some(port);
                        self.state = PortState::Connected;
                        self.absent_logged = false;
                    }
                    Err(e) => {
                        error!("{}", e);
                        self.state = PortState::Absent;
                    }
                }
            }
            None => {
                self.close();
                self.current = None;
                self.state = PortState::Absent;
                if !self.absent_logged {
                    info!("Disable serial port");
                    self.absent_logged = true;
                }
            }
        }
        self.state
    }

    /// Drop the handle after an I/O failure on it
    ///
    /// The next identification that reports a port opens it afresh.
    pub fn detach(&mut self) {
        if let Some(port) = self.current.take() {
            warn!("Port detached, {}", port);
        }
        self.close();
        self.state = PortState::Absent;
    }

    /// Close the handle if one is open
    pub fn close(&mut self) {
        if self.handle.take().is_some() {
            debug!("Closed serial port");
        }
    }

    fn open_with_retry(&mut self, port: &str) -> Result<O::Port, LinkError> {
        let attempts = self.policy.attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            self.state = PortState::Opening;
            match self.opener.open(port) {
                Ok(handle) => {
                    if attempt > 1 {
                        debug!("Opened {} on attempt {}", port, attempt);
                    }
                    return Ok(handle);
                }
                Err(e) => {
                    self.state = PortState::Failed;
                    debug!("Open attempt {}/{} on {} failed: {}", attempt, attempts, port, e);
                    if attempt >= attempts {
                        return Err(LinkError::OpenFailed {
                            port: port.to_string(),
                            attempts,
                            source: e,
                        });
                    }
                    thread::sleep(self.policy.delay);
                }
            }
        }
    }
}

impl<O: PortOpener> Drop for PortManager<O> {
    fn drop(&mut self) {
        self.close();
    }
}
