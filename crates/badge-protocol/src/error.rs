//! Error types for the badge reader protocol

use thiserror::Error;

/// Errors that can occur while talking to the reader
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The port failed mid-exchange; the device is treated as unplugged
    #[error("device detached: {0}")]
    Detached(#[from] std::io::Error),

    /// A badge code string was not 8 lowercase hex digits
    #[error("invalid badge code: {0:?}")]
    InvalidCode(String),
}

impl ProtocolError {
    /// Whether the error means the port handle must be discarded
    pub fn is_detach(&self) -> bool {
        matches!(self, ProtocolError::Detached(_))
    }
}
