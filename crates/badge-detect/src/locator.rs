//! Reader port identification
//!
//! A reader shows up differently per platform. On Unix hosts the CH340
//! bridge enumerates as a `ttyUSB*`/`ttyACM*`/`cu.usbserial*` node; on
//! Windows it is only recognisable by its friendly name, which carries the
//! COM port in parentheses. Only the first match is used, so two attached
//! readers are not told apart.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::scanner::{PortScanner, SerialPortInfo};

/// Directory Unix device nodes live in
const DEV_PREFIX: &str = "/dev/";

/// Substring identifying a USB serial node on Unix hosts
const USB_NAME_MARKER: &str = "usb";

/// Substring identifying the reader's USB-serial controller in a description
const CH340_MARKER: &str = "ch340";

/// Capability to find the port a reader is attached to
pub trait PortLocator: Send {
    /// Identify the reader's port, if one is attached
    fn locate(&mut self) -> Option<String>;
}

/// How a port is recognised in the OS device list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// First device file whose name contains "usb"; identifier is `/dev/<name>`
    UsbName,
    /// First device described as a CH340; identifier is the parenthesised port
    Ch340Description,
}

impl MatchStrategy {
    /// Strategy for the platform this binary runs on
    pub fn for_host() -> Self {
        if cfg!(unix) {
            MatchStrategy::UsbName
        } else {
            MatchStrategy::Ch340Description
        }
    }

    /// Pick the reader's port identifier from an enumerated list
    pub fn select(&self, ports: &[SerialPortInfo]) -> Option<String> {
        match self {
            MatchStrategy::UsbName => ports
                .iter()
                .map(SerialPortInfo::file_name)
                .find(|name| name.to_lowercase().contains(USB_NAME_MARKER))
                .map(|name| format!("{}{}", DEV_PREFIX, name)),
            MatchStrategy::Ch340Description => {
                let description = ports
                    .iter()
                    .map(|p| p.description.as_str())
                    .find(|d| d.to_lowercase().contains(CH340_MARKER))?;
                bracketed_port(description)
            }
        }
    }
}

// Literal pattern: construction cannot fail
static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((.*)\)").expect("bracket pattern is a valid regex"));

/// Extract the text between the first '(' and the last ')'
fn bracketed_port(description: &str) -> Option<String> {
    BRACKETED
        .captures(description)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Locator backed by the operating system's serial port list
#[derive(Debug)]
pub struct SystemLocator {
    scanner: PortScanner,
    strategy: MatchStrategy,
}

impl SystemLocator {
    /// Create a locator with an explicit strategy
    pub fn new(strategy: MatchStrategy) -> Self {
        Self {
            scanner: PortScanner::new(),
            strategy,
        }
    }

    /// Create a locator using the strategy for this platform
    pub fn for_host() -> Self {
        Self::new(MatchStrategy::for_host())
    }

    /// Strategy in use
    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }
}

impl PortLocator for SystemLocator {
    fn locate(&mut self) -> Option<String> {
        match self.scanner.enumerate_ports() {
            Ok(ports) => self.strategy.select(&ports),
            Err(e) => {
                warn!("Port enumeration failed: {}", e);
                None
            }
        }
    }
}
