//! Serial port scanner
//!
//! This module provides serial port enumeration.

use serialport::{available_ports, SerialPortType};
use tracing::trace;

use crate::error::DetectError;

/// Information about a serial port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialPortInfo {
    /// Port name (e.g., /dev/ttyUSB0, COM3)
    pub port: String,
    /// Human-readable description (e.g., "USB-SERIAL CH340 (COM3)")
    pub description: String,
}

impl SerialPortInfo {
    /// Create from serialport crate's port info
    pub fn from_serialport(name: String, port_type: &SerialPortType) -> Self {
        match port_type {
            SerialPortType::UsbPort(usb) => {
                let product = usb
                    .product
                    .clone()
                    .or_else(|| usb.manufacturer.clone())
                    .unwrap_or_else(|| "USB Serial Device".to_string());
                Self {
                    description: friendly_description(&product, &name),
                    port: name,
                }
            }
            _ => Self {
                description: "n/a".to_string(),
                port: name,
            },
        }
    }

    /// The device file name without its directory (ttyUSB0 for /dev/ttyUSB0)
    pub fn file_name(&self) -> &str {
        self.port.rsplit('/').next().unwrap_or(&self.port)
    }
}

/// Product string in the OS friendly-name form, "<product> (<port>)"
fn friendly_description(product: &str, port: &str) -> String {
    if product.contains('(') {
        product.to_string()
    } else {
        format!("{} ({})", product, port)
    }
}

/// Serial port scanner
#[derive(Debug, Default)]
pub struct PortScanner;

impl PortScanner {
    /// Create a new scanner
    pub fn new() -> Self {
        Self
    }

    /// Enumerate all available serial ports
    pub fn enumerate_ports(&self) -> Result<Vec<SerialPortInfo>, DetectError> {
        let ports = available_ports()?;

        let result: Vec<_> = ports
            .into_iter()
            .map(|p| SerialPortInfo::from_serialport(p.port_name, &p.port_type))
            .collect();

        trace!("Found {} serial port(s)", result.len());
        for port in &result {
            trace!("  {} - {}", port.port, port.description);
        }

        Ok(result)
    }
}
