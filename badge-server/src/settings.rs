//! Persistent settings

use std::path::{Path, PathBuf};

use badge_link::ScannerConfig;
use serde::{Deserialize, Serialize};

/// Settings kept across restarts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Location the reader is installed at
    #[serde(default)]
    pub location_key: String,
    /// Base URL of the registration API
    #[serde(default)]
    pub target_url: String,
    /// Registration API credential
    #[serde(default)]
    pub api_key: String,
    /// Whether scanning is enabled
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self::from(&ScannerConfig::default())
    }
}

impl From<&ScannerConfig> for Settings {
    fn from(config: &ScannerConfig) -> Self {
        Self {
            location_key: config.location_key.clone(),
            target_url: config.target_url.clone(),
            api_key: config.api_key.clone(),
            active: config.active,
        }
    }
}

impl From<Settings> for ScannerConfig {
    fn from(settings: Settings) -> Self {
        Self {
            location_key: settings.location_key,
            active: settings.active,
            target_url: settings.target_url,
            api_key: settings.api_key,
        }
    }
}

impl Settings {
    /// Get the XDG config directory for badgelink
    /// Uses $XDG_CONFIG_HOME/badgelink, falls back to ~/.config/badgelink
    fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("badgelink"));
            }
        }

        dirs::home_dir().map(|h| h.join(".config").join("badgelink"))
    }

    /// Default settings file path
    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from `path`, falling back to defaults
    pub fn load(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save settings to `path`
    pub fn save(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create settings directory: {}", e))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;

        std::fs::write(path, json).map_err(|e| format!("Failed to write settings: {}", e))?;

        Ok(())
    }
}
