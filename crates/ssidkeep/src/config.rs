//! User configuration.
//!
//! Loaded from `~/.config/ssidkeep/config.toml` (or the path given with
//! `--config`). Every field has a default, so a missing file and an empty
//! file behave identically. A file that exists but does not parse is
//! reported as an error rather than silently ignored; a stale typo in the
//! poll interval should not demote the tool to defaults without the user
//! noticing.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use ssidkeep_core::InterfaceNames;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeeperConfig {
    /// Seconds between monitoring poll cycles.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Seconds to wait after a radio or connect action before trusting
    /// subsequent queries.
    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,

    /// Per-invocation timeout for the underlying OS tools.
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,

    /// Name of the WLAN adapter as Windows knows it.
    #[serde(default = "default_windows_interface")]
    pub windows_interface: String,

    /// BSD device name of the Wi-Fi interface on macOS.
    #[serde(default = "default_macos_device")]
    pub macos_device: String,

    /// When set, `monitor` pins to this network without prompting.
    #[serde(default)]
    pub target_ssid: Option<String>,
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_settle_secs() -> u64 {
    5
}

fn default_command_timeout_secs() -> u64 {
    30
}

fn default_windows_interface() -> String {
    "Wi-Fi".to_string()
}

fn default_macos_device() -> String {
    "en0".to_string()
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            settle_secs: default_settle_secs(),
            command_timeout_secs: default_command_timeout_secs(),
            windows_interface: default_windows_interface(),
            macos_device: default_macos_device(),
            target_ssid: None,
        }
    }
}

impl KeeperConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("ssidkeep").join("config.toml"))
    }

    /// Load from `path`, or from the default location when `path` is None.
    /// A missing file yields defaults; an unreadable or invalid file is an
    /// error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) => p,
                None => {
                    debug!("no config directory on this system, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        if !path.exists() {
            debug!("no config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn interface_names(&self) -> InterfaceNames {
        InterfaceNames {
            windows_interface: self.windows_interface.clone(),
            macos_device: self.macos_device.clone(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let config = KeeperConfig::load(Some(&path)).unwrap();
        assert_eq!(config.poll_interval_secs, 10);
        assert_eq!(config.windows_interface, "Wi-Fi");
        assert!(config.target_ssid.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "poll_interval_secs = 3").unwrap();
        writeln!(f, "target_ssid = \"HomeNet\"").unwrap();

        let config = KeeperConfig::load(Some(&path)).unwrap();
        assert_eq!(config.poll_interval_secs, 3);
        assert_eq!(config.target_ssid.as_deref(), Some("HomeNet"));
        assert_eq!(config.settle_secs, 5);
        assert_eq!(config.macos_device, "en0");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "poll_interval_secs = \"often\"").unwrap();
        assert!(KeeperConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn test_interface_names_carry_overrides() {
        let config = KeeperConfig {
            windows_interface: "WLAN 2".to_string(),
            macos_device: "en1".to_string(),
            ..Default::default()
        };
        let names = config.interface_names();
        assert_eq!(names.windows_interface, "WLAN 2");
        assert_eq!(names.macos_device, "en1");
    }
}
