//! Output parsers for the platform network tools.
//!
//! Parses stdout from netsh, airport/networksetup and nmcli into the shared
//! types. All functions here are pure and defensive: the OS tools emit
//! inconsistent formats across versions, so unrecognized lines are skipped
//! and a completely unparseable result degrades to "unknown"/"disconnected"/
//! empty instead of erroring. A long-running monitor must never crash on
//! output it does not recognize.

use crate::platform::Platform;
use crate::types::{normalize_ssid, ConnectionStatus, NetworkRecord, RadioState};
use regex::Regex;
use std::sync::OnceLock;

/// MAC-address shaped token, used to locate the BSSID column in airport -s
/// output (the SSID column can contain spaces, so position alone is not
/// enough).
fn bssid_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[0-9A-Fa-f]{2}(:[0-9A-Fa-f]{2}){5}$").expect("static regex")
    })
}

/// Extract the currently associated SSID, or None when disconnected.
pub fn current_ssid(platform: Platform, raw: &str) -> Option<String> {
    match platform {
        Platform::Windows => windows_current_ssid(raw),
        Platform::MacOs => macos_current_ssid(raw),
        Platform::Linux => linux_current_ssid(raw),
    }
}

/// The same association query as [`current_ssid`], packaged as a status
/// record.
pub fn connection_status(platform: Platform, raw: &str) -> ConnectionStatus {
    match current_ssid(platform, raw) {
        Some(ssid) => ConnectionStatus::connected_to(ssid),
        None => ConnectionStatus::disconnected(),
    }
}

/// Classify the radio power state. Anything unrecognized is Unknown; the
/// radio controller decides what to do with that.
pub fn radio_state(platform: Platform, raw: &str) -> RadioState {
    match platform {
        Platform::Windows => windows_radio_state(raw),
        Platform::MacOs => macos_radio_state(raw),
        Platform::Linux => linux_radio_state(raw),
    }
}

/// Extract visible networks, order-preserving. Empty on anything
/// unparseable, an empty scan is a valid result, not a fault.
pub fn visible_networks(platform: Platform, raw: &str) -> Vec<NetworkRecord> {
    match platform {
        Platform::Windows => windows_visible_networks(raw),
        Platform::MacOs => macos_visible_networks(raw),
        Platform::Linux => linux_visible_networks(raw),
    }
}

// ---- Windows (netsh) ----

/// `netsh wlan show interfaces`: the SSID line carries the association, the
/// State line says "disconnected" when there is none. The BSSID line also
/// matches "SSID" as a substring and must be excluded.
fn windows_current_ssid(raw: &str) -> Option<String> {
    for line in raw.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("State") {
            if let Some(value) = label_value(trimmed) {
                if value.to_ascii_lowercase().contains("disconnected") {
                    return None;
                }
            }
        }
        if trimmed.starts_with("SSID") && !trimmed.contains("BSSID") {
            return label_value(trimmed).and_then(|v| normalize_ssid(v));
        }
    }
    None
}

/// `netsh interface show interface <name>`: look for the administrative
/// state label. netsh localizes and reformats this across Windows versions,
/// hence the loose match.
fn windows_radio_state(raw: &str) -> RadioState {
    for line in raw.lines() {
        let lower = line.to_ascii_lowercase();
        if lower.contains("admin") && lower.contains("state") {
            let value = label_value(line).unwrap_or(line).to_ascii_lowercase();
            if value.contains("disable") {
                return RadioState::Disabled;
            }
            if value.contains("enable") {
                return RadioState::Enabled;
            }
        }
    }
    RadioState::Unknown
}

/// `netsh wlan show networks mode=bssid`: SSID header lines followed by one
/// or more indented BSSID lines. A BSSID before any SSID header is dropped.
fn windows_visible_networks(raw: &str) -> Vec<NetworkRecord> {
    let mut records = Vec::new();
    let mut current_ssid: Option<String> = None;

    for line in raw.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("BSSID") {
            if let (Some(ssid), Some(bssid)) = (&current_ssid, label_value(trimmed)) {
                let bssid = bssid.trim();
                if !bssid.is_empty() {
                    records.push(NetworkRecord::new(ssid.clone(), bssid));
                }
            }
        } else if trimmed.starts_with("SSID") {
            current_ssid = label_value(trimmed).and_then(normalize_ssid);
        }
    }

    records
}

// ---- macOS (airport / networksetup) ----

/// `airport -I`: one `SSID: <name>` line when associated. "AirPort: Off"
/// means the radio is down, which for association purposes is disconnected.
fn macos_current_ssid(raw: &str) -> Option<String> {
    for line in raw.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("AirPort:") && trimmed.contains("Off") {
            return None;
        }
        if trimmed.starts_with("SSID:") {
            return label_value(trimmed).and_then(normalize_ssid);
        }
    }
    None
}

/// `networksetup -getairportpower en0` → "Wi-Fi Power (en0): On" / "Off".
fn macos_radio_state(raw: &str) -> RadioState {
    if raw.contains("Off") {
        RadioState::Disabled
    } else if raw.contains("On") {
        RadioState::Enabled
    } else {
        RadioState::Unknown
    }
}

/// `airport -s`: whitespace columns where the SSID itself may contain
/// spaces. The BSSID is the anchor: find the MAC-shaped token, everything
/// before it is the SSID. The header line has no MAC token and drops out
/// naturally.
fn macos_visible_networks(raw: &str) -> Vec<NetworkRecord> {
    let mut records = Vec::new();

    for line in raw.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(pos) = tokens.iter().position(|t| bssid_pattern().is_match(t)) else {
            continue;
        };
        let ssid = tokens[..pos].join(" ");
        if let Some(ssid) = normalize_ssid(&ssid) {
            records.push(NetworkRecord::new(ssid, tokens[pos]));
        }
    }

    records
}

// ---- Linux (nmcli) ----

/// `nmcli -t -f active,ssid dev wifi`: terse `yes:<ssid>` / `no:<ssid>`
/// rows, colons inside values escaped as `\:`.
fn linux_current_ssid(raw: &str) -> Option<String> {
    for line in raw.lines() {
        let fields = split_terse(line);
        if fields.first().map(String::as_str) == Some("yes") {
            return fields.get(1).and_then(|s| normalize_ssid(s));
        }
    }
    None
}

/// `nmcli radio wifi` → "enabled" / "disabled".
fn linux_radio_state(raw: &str) -> RadioState {
    let lower = raw.to_ascii_lowercase();
    if lower.contains("disabled") {
        RadioState::Disabled
    } else if lower.contains("enabled") {
        RadioState::Enabled
    } else {
        RadioState::Unknown
    }
}

/// `nmcli -t -f ssid,bssid dev wifi`: terse `<ssid>:<bssid>` rows. Hidden
/// networks report an empty SSID and are skipped.
fn linux_visible_networks(raw: &str) -> Vec<NetworkRecord> {
    let mut records = Vec::new();

    for line in raw.lines() {
        let fields = split_terse(line);
        if fields.len() < 2 {
            continue;
        }
        let Some(ssid) = normalize_ssid(&fields[0]) else {
            continue;
        };
        let bssid = fields[1..].join(":");
        if !bssid.trim().is_empty() {
            records.push(NetworkRecord::new(ssid, bssid.trim()));
        }
    }

    records
}

/// Take the text after the first ':' in a `Label : value` line.
fn label_value(line: &str) -> Option<&str> {
    line.split_once(':').map(|(_, v)| v.trim())
}

/// Split a terse nmcli row on unescaped colons, unescaping `\:` and `\\`
/// inside each field.
fn split_terse(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    field.push(next);
                }
            }
            ':' => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}
