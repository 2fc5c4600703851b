//! Platform command tables.
//!
//! Each supported OS family maps every query and action kind to exactly one
//! argv-array invocation, resolved once at startup. The only per-call
//! substitution is the target SSID, which is always passed as its own argv
//! element, no shell is involved anywhere, so SSIDs containing quotes or
//! metacharacters cannot break out of the command.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Private-framework airport binary; Apple never shipped a public CLI for
/// association info.
const AIRPORT_BIN: &str =
    "/System/Library/PrivateFrameworks/Apple80211.framework/Versions/Current/Resources/airport";

/// Closed set of supported network stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    /// Pick the platform this binary was compiled for.
    pub fn detect() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Linux
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::MacOs => "macos",
            Self::Linux => "linux",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "windows" | "win" => Ok(Self::Windows),
            "macos" | "mac" | "darwin" => Ok(Self::MacOs),
            "linux" => Ok(Self::Linux),
            other => Err(format!(
                "unknown platform `{}` (expected windows, macos or linux)",
                other
            )),
        }
    }
}

/// State queries the core issues against the OS network stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// What are we associated to right now?
    CurrentConnection,
    /// Is the radio administratively enabled?
    RadioPower,
    /// Which networks are in range?
    VisibleNetworks,
}

/// Mutating actions the core issues against the OS network stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    EnableRadio,
    DisableRadio,
    Connect { ssid: String },
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnableRadio => "enable radio",
            Self::DisableRadio => "disable radio",
            Self::Connect { .. } => "connect",
        }
    }
}

/// Interface naming that varies per host rather than per OS. Windows lets
/// users rename the WLAN adapter and macOS hosts can have Wi-Fi on a device
/// other than en0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceNames {
    pub windows_interface: String,
    pub macos_device: String,
}

impl Default for InterfaceNames {
    fn default() -> Self {
        Self {
            windows_interface: "Wi-Fi".to_string(),
            macos_device: "en0".to_string(),
        }
    }
}

/// One resolved external command: program plus argv.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// The per-platform invocation table. Built once at startup; after that the
/// rest of the core never branches on platform strings again.
#[derive(Debug, Clone)]
pub struct CommandSet {
    platform: Platform,
    names: InterfaceNames,
}

impl CommandSet {
    pub fn new(platform: Platform, names: InterfaceNames) -> Self {
        Self { platform, names }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn query(&self, kind: QueryKind) -> Invocation {
        match (self.platform, kind) {
            (Platform::Windows, QueryKind::CurrentConnection) => {
                Invocation::new("netsh", &["wlan", "show", "interfaces"])
            }
            (Platform::Windows, QueryKind::RadioPower) => Invocation::new(
                "netsh",
                &[
                    "interface",
                    "show",
                    "interface",
                    &self.names.windows_interface,
                ],
            ),
            (Platform::Windows, QueryKind::VisibleNetworks) => {
                Invocation::new("netsh", &["wlan", "show", "networks", "mode=bssid"])
            }
            (Platform::MacOs, QueryKind::CurrentConnection) => {
                Invocation::new(AIRPORT_BIN, &["-I"])
            }
            (Platform::MacOs, QueryKind::RadioPower) => Invocation::new(
                "networksetup",
                &["-getairportpower", &self.names.macos_device],
            ),
            (Platform::MacOs, QueryKind::VisibleNetworks) => Invocation::new(AIRPORT_BIN, &["-s"]),
            (Platform::Linux, QueryKind::CurrentConnection) => {
                Invocation::new("nmcli", &["-t", "-f", "active,ssid", "dev", "wifi"])
            }
            (Platform::Linux, QueryKind::RadioPower) => {
                Invocation::new("nmcli", &["radio", "wifi"])
            }
            (Platform::Linux, QueryKind::VisibleNetworks) => {
                Invocation::new("nmcli", &["-t", "-f", "ssid,bssid", "dev", "wifi"])
            }
        }
    }

    pub fn action(&self, action: &Action) -> Invocation {
        match (self.platform, action) {
            (Platform::Windows, Action::EnableRadio) => Invocation::new(
                "netsh",
                &[
                    "interface",
                    "set",
                    "interface",
                    &self.names.windows_interface,
                    "enable",
                ],
            ),
            (Platform::Windows, Action::DisableRadio) => Invocation::new(
                "netsh",
                &[
                    "interface",
                    "set",
                    "interface",
                    &self.names.windows_interface,
                    "disable",
                ],
            ),
            (Platform::Windows, Action::Connect { ssid }) => Invocation::new(
                "netsh",
                &[
                    "wlan",
                    "connect",
                    &format!("name={}", ssid),
                    &format!("ssid={}", ssid),
                ],
            ),
            (Platform::MacOs, Action::EnableRadio) => Invocation::new(
                "networksetup",
                &["-setairportpower", &self.names.macos_device, "on"],
            ),
            (Platform::MacOs, Action::DisableRadio) => Invocation::new(
                "networksetup",
                &["-setairportpower", &self.names.macos_device, "off"],
            ),
            (Platform::MacOs, Action::Connect { ssid }) => Invocation::new(
                "networksetup",
                &["-setairportnetwork", &self.names.macos_device, ssid],
            ),
            (Platform::Linux, Action::EnableRadio) => {
                Invocation::new("nmcli", &["radio", "wifi", "on"])
            }
            (Platform::Linux, Action::DisableRadio) => {
                Invocation::new("nmcli", &["radio", "wifi", "off"])
            }
            (Platform::Linux, Action::Connect { ssid }) => {
                Invocation::new("nmcli", &["dev", "wifi", "connect", ssid])
            }
        }
    }
}
