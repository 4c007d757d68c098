//! Push delivery to the registration API
//!
//! Every accepted scan is posted once, synchronously, from the polling
//! thread. Failures are logged and the scan is dropped; there is no queue and
//! no retry.

use std::time::Duration;

use badge_link::{ScanSink, ScannerConfig};
use badge_protocol::{RegistrationRequest, RegistrationResponse, ScanEvent};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::cue::{AudibleCue, ACCEPTED_CUE, CUE_FREQUENCY_HZ, REJECTED_CUE};

/// Path of the registration endpoint below the configured base URL
pub const REGISTRATION_PATH: &str = "/api/registration/add";

/// Per-request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-api-key";

/// Why a scan could not be registered
#[derive(Error, Debug)]
pub enum PushError {
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Registration API answered {0}")]
    Status(StatusCode),

    #[error("Unreadable registration response: {0}")]
    Body(#[source] reqwest::Error),
}

/// Registration API verdict for one scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected,
}

/// Blocking client for the registration API
pub struct RegistrationClient {
    client: Client,
    cue: Box<dyn AudibleCue>,
}

impl RegistrationClient {
    /// Build the client
    ///
    /// Must be called outside an async runtime; the blocking client runs its
    /// own.
    pub fn new(cue: Box<dyn AudibleCue>) -> Result<Self, PushError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(PushError::Request)?;
        Ok(Self { client, cue })
    }

    /// Post one scan and read the verdict
    pub fn register(&self, event: &ScanEvent, config: &ScannerConfig) -> Result<Verdict, PushError> {
        let url = format!(
            "{}{}",
            config.target_url.trim_end_matches('/'),
            REGISTRATION_PATH
        );
        let request = RegistrationRequest::new(&config.location_key, event);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &config.api_key)
            .json(&request)
            .send()
            .map_err(PushError::Request)?;

        if response.status() != StatusCode::OK {
            return Err(PushError::Status(response.status()));
        }

        let verdict: RegistrationResponse = response.json().map_err(PushError::Body)?;
        Ok(if verdict.status {
            Verdict::Accepted
        } else {
            Verdict::Rejected
        })
    }
}

impl ScanSink for RegistrationClient {
    fn deliver(&mut self, event: &ScanEvent, config: &ScannerConfig) {
        match self.register(event, config) {
            Ok(Verdict::Accepted) => {
                info!("OK, {} at {}", event.code, event.timestamp);
                self.cue.beep(CUE_FREQUENCY_HZ, ACCEPTED_CUE);
            }
            Ok(Verdict::Rejected) => {
                error!("Rejected, {} at {}", event.code, event.timestamp);
                self.cue.beep(CUE_FREQUENCY_HZ, REJECTED_CUE);
            }
            Err(e) => warn!("Dropped scan {}: {}", event.code, e),
        }
    }
}
