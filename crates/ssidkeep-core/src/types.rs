//! Shared wire-level types: radio state, association status, scan records.

use serde::{Deserialize, Serialize};

/// Administrative power state of the wireless interface, independent of
/// whether it is associated to anything. Re-derived on every poll, never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RadioState {
    Enabled,
    Disabled,
    /// The platform tool produced output we could not classify. Callers
    /// decide how conservative to be with this.
    Unknown,
}

impl RadioState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::Unknown => "unknown",
        }
    }
}

/// Current association as reported by the platform. `ssid: None` means no
/// association; a blank SSID reported while half-connected folds into the
/// same case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub ssid: Option<String>,
}

impl ConnectionStatus {
    pub fn disconnected() -> Self {
        Self { ssid: None }
    }

    pub fn connected_to(ssid: impl Into<String>) -> Self {
        Self {
            ssid: Some(ssid.into()),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.ssid.is_some()
    }
}

/// One visible network. The same SSID can appear multiple times when several
/// access points broadcast it; identity is the (ssid, bssid) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRecord {
    pub ssid: String,
    pub bssid: String,
}

impl NetworkRecord {
    pub fn new(ssid: impl Into<String>, bssid: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            bssid: bssid.into(),
        }
    }
}

/// Trim an SSID as reported by an OS tool, mapping blank values to None.
/// Some platforms emit an all-whitespace SSID field while still claiming to
/// be connected; we treat that the same as disconnected.
pub fn normalize_ssid(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_ssid_trims() {
        assert_eq!(normalize_ssid("  HomeNet  "), Some("HomeNet".to_string()));
    }

    #[test]
    fn test_normalize_ssid_blank_is_none() {
        assert_eq!(normalize_ssid(""), None);
        assert_eq!(normalize_ssid("   \t"), None);
    }
}
