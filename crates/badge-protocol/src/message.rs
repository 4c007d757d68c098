//! JSON messages exchanged with the network side
//!
//! Duplex peer:
//! - outbound `{"read": {"timestamp": "...", "code": "..."}}`
//! - outbound `{"scanner_state": {"state": true}}`
//! - inbound `{"status": false}`
//!
//! Registration API:
//! - request `{"location_key": "...", "badge_code": "...", "timestamp": "..."}`
//! - response `{"status": true}`

use serde::{Deserialize, Serialize};

use crate::codec::BadgeCode;
use crate::event::ScanEvent;

/// Message from the reader side to the duplex peer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outbound {
    /// A badge was read
    Read(ScanEvent),
    /// The reader became usable (`true`) or went away (`false`)
    ScannerState {
        /// Connected state
        state: bool,
    },
}

/// Control message from the duplex peer
///
/// Unknown fields are ignored; a message without `status` changes nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlCommand {
    /// Enable (`true`) or disable (`false`) scanning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
}

impl ControlCommand {
    /// Command setting the scanning state
    pub fn set_active(active: bool) -> Self {
        Self {
            status: Some(active),
        }
    }
}

/// Body posted to the registration API for each accepted scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    /// Location the reader is installed at
    pub location_key: String,
    /// Badge code
    pub badge_code: BadgeCode,
    /// ISO-8601 timestamp of the read
    pub timestamp: String,
}

impl RegistrationRequest {
    /// Build a request for a scan at a location
    pub fn new(location_key: &str, event: &ScanEvent) -> Self {
        Self {
            location_key: location_key.to_string(),
            badge_code: event.code.clone(),
            timestamp: event.timestamp.clone(),
        }
    }
}

/// Registration API verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationResponse {
    /// Whether the registration was accepted
    pub status: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event() -> ScanEvent {
        ScanEvent {
            timestamp: "2024-03-09T08:05:07.042".to_string(),
            code: "1a2b3c4d".parse().unwrap(),
        }
    }

    #[test]
    fn test_read_message_shape() {
        let value = serde_json::to_value(Outbound::Read(event())).unwrap();
        assert_eq!(
            value,
            json!({"read": {"timestamp": "2024-03-09T08:05:07.042", "code": "1a2b3c4d"}})
        );
    }

    #[test]
    fn test_scanner_state_message_shape() {
        let value = serde_json::to_value(Outbound::ScannerState { state: false }).unwrap();
        assert_eq!(value, json!({"scanner_state": {"state": false}}));
    }

    #[test]
    fn test_control_command_parsing() {
        let cmd: ControlCommand = serde_json::from_str(r#"{"status": false}"#).unwrap();
        assert_eq!(cmd, ControlCommand::set_active(false));

        let other: ControlCommand = serde_json::from_str(r#"{"hello": 1}"#).unwrap();
        assert_eq!(other.status, None);
    }

    #[test]
    fn test_registration_request_shape() {
        let request = RegistrationRequest::new("hall-a", &event());
        let value = serde_json::to_value(request).unwrap();
        assert_eq!(
            value,
            json!({
                "location_key": "hall-a",
                "badge_code": "1a2b3c4d",
                "timestamp": "2024-03-09T08:05:07.042"
            })
        );
    }

    #[test]
    fn test_registration_response_requires_status() {
        assert!(serde_json::from_str::<RegistrationResponse>(r#"{"status": true}"#).is_ok());
        assert!(serde_json::from_str::<RegistrationResponse>(r#"{"ok": true}"#).is_err());
        assert!(serde_json::from_str::<RegistrationResponse>(r#"{"status": "yes"}"#).is_err());
    }

    #[test]
    fn test_badge_code_rejected_on_deserialize() {
        let bad = r#"{"timestamp": "t", "code": "XYZ"}"#;
        assert!(serde_json::from_str::<ScanEvent>(bad).is_err());
    }
}
