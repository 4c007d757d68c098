//! Reader link state

/// Lifecycle of the reader's serial port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PortState {
    /// No reader identified
    #[default]
    Absent,
    /// A port was identified but is not open yet
    Identified,
    /// An open attempt is in progress
    Opening,
    /// The port is open and owned by the polling loop
    Connected,
    /// The last open attempt failed; more attempts may follow
    Failed,
}

impl PortState {
    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Absent => "Absent",
            Self::Identified => "Identified",
            Self::Opening => "Opening",
            Self::Connected => "Connected",
            Self::Failed => "Failed",
        }
    }

    /// Whether scans can be taken in this state
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// Settings shared between the network side and the polling loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Location the reader is installed at
    pub location_key: String,
    /// Whether scanning is enabled
    pub active: bool,
    /// Base URL of the registration API (push delivery is off when empty)
    pub target_url: String,
    /// Credential sent to the registration API
    pub api_key: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            location_key: String::new(),
            active: true,
            target_url: String::new(),
            api_key: String::new(),
        }
    }
}

impl ScannerConfig {
    /// Whether each scan should be pushed to the registration API
    pub fn push_enabled(&self) -> bool {
        !self.target_url.is_empty()
    }

    /// Whether the reader should be polled this cycle
    ///
    /// Push delivery needs a location to register the scan against.
    pub fn should_scan(&self) -> bool {
        self.active && (!self.push_enabled() || !self.location_key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_scans() {
        let config = ScannerConfig::default();
        assert!(config.active);
        assert!(!config.push_enabled());
        assert!(config.should_scan());
    }

    #[test]
    fn test_push_requires_location() {
        let mut config = ScannerConfig {
            target_url: "http://registry.local".to_string(),
            ..Default::default()
        };
        assert!(!config.should_scan());

        config.location_key = "hall-a".to_string();
        assert!(config.should_scan());

        config.active = false;
        assert!(!config.should_scan());
    }

    #[test]
    fn test_port_state_names() {
        assert_eq!(PortState::default(), PortState::Absent);
        assert!(PortState::Connected.is_connected());
        assert!(!PortState::Failed.is_connected());
        assert_eq!(PortState::Opening.name(), "Opening");
    }
}
