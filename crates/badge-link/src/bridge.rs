//! Handoff between the polling thread and the network side
//!
//! The polling loop and the async transport never share anything but a
//! [`ScanBridge`]. Every operation takes the one lock for the length of a
//! slot or field access and returns immediately; nothing waits for data and
//! no I/O happens under the lock.

use std::sync::{Mutex, MutexGuard};

use badge_protocol::{ControlCommand, Outbound};
use tracing::{debug, info};

use crate::mailbox::Mailbox;
use crate::state::ScannerConfig;

#[derive(Debug, Default)]
struct BridgeInner {
    outbound: Mailbox<Outbound>,
    inbound: Mailbox<ControlCommand>,
    config: ScannerConfig,
    port: Option<String>,
}

/// Lock-guarded mailbox pair plus the shared scanner configuration
#[derive(Debug, Default)]
pub struct ScanBridge {
    inner: Mutex<BridgeInner>,
}

impl ScanBridge {
    /// Create a bridge with the given starting configuration
    pub fn new(config: ScannerConfig) -> Self {
        Self {
            inner: Mutex::new(BridgeInner {
                config,
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BridgeInner> {
        // A panic on the other side must not take the link down with it
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    // -------------------------------------------------------------------------
    // Outbound slot (polling loop -> transport)
    // -------------------------------------------------------------------------

    /// Offer a message to the transport, replacing any unread one
    pub fn publish(&self, message: Outbound) {
        let displaced = self.lock().outbound.put(message);
        if let Some(old) = displaced {
            debug!("Dropped undelivered message: {:?}", old);
        }
    }

    /// Take the pending outbound message, if any
    pub fn try_take(&self) -> Option<Outbound> {
        self.lock().outbound.take()
    }

    // -------------------------------------------------------------------------
    // Inbound slot (transport -> polling loop)
    // -------------------------------------------------------------------------

    /// Hand a control command to the polling loop, replacing any unread one
    pub fn submit_command(&self, command: ControlCommand) {
        let displaced = self.lock().inbound.put(command);
        if let Some(old) = displaced {
            debug!("Dropped unapplied command: {:?}", old);
        }
    }

    /// Take the pending control command, if any
    pub fn try_take_command(&self) -> Option<ControlCommand> {
        self.lock().inbound.take()
    }

    // -------------------------------------------------------------------------
    // Shared configuration
    // -------------------------------------------------------------------------

    /// Consistent copy of the current configuration
    pub fn config(&self) -> ScannerConfig {
        self.lock().config.clone()
    }

    /// Set the location key
    pub fn set_location(&self, location: impl Into<String>) {
        let location = location.into();
        info!("Set location, {}", location);
        self.lock().config.location_key = location;
    }

    /// Set the registration API base URL
    pub fn set_target_url(&self, url: impl Into<String>) {
        let url = url.into();
        info!("Set registration URL, {}", url);
        self.lock().config.target_url = url;
    }

    /// Set the registration API credential
    pub fn set_api_key(&self, key: impl Into<String>) {
        info!("Set registration API key");
        self.lock().config.api_key = key.into();
    }

    /// Enable or disable scanning
    pub fn set_active(&self, active: bool) {
        let mut inner = self.lock();
        if inner.config.active != active {
            info!("Scanning {}", if active { "enabled" } else { "disabled" });
        }
        inner.config.active = active;
    }

    /// Port the reader is currently identified on
    pub fn port(&self) -> Option<String> {
        self.lock().port.clone()
    }

    /// Record the identified port (polling loop only)
    pub fn set_port(&self, port: Option<String>) {
        self.lock().port = port;
    }
}
