//! Error types for the reader link

use thiserror::Error;

/// Errors that can occur in the reader link
#[derive(Debug, Error)]
pub enum LinkError {
    /// The port could not be opened within the retry budget
    #[error("failed to open port {port} after {attempts} attempts: {source}")]
    OpenFailed {
        /// Port identifier
        port: String,
        /// Attempts made
        attempts: u32,
        /// Error from the last attempt
        #[source]
        source: std::io::Error,
    },

    /// The polling thread could not be started
    #[error("failed to start polling thread: {0}")]
    Spawn(#[source] std::io::Error),
}
