//! ssidkeep core, connectivity enforcement for a single wireless network.
//!
//! Normalizes radio-state queries, scans and connect/enable/disable actions
//! across the Windows, macOS and Linux network stacks, and runs the
//! monitoring state machine that keeps a host pinned to one SSID.

pub mod enforcer;
pub mod error;
pub mod parse;
pub mod platform;
pub mod radio;
pub mod runner;
pub mod scan;
pub mod status;
pub mod types;

pub use enforcer::{ConnectionEnforcer, EnforcementTarget, EnforcerState, DEFAULT_POLL_INTERVAL};
pub use error::KeeperError;
pub use platform::{Action, CommandSet, InterfaceNames, Invocation, Platform, QueryKind};
pub use radio::{RadioController, DEFAULT_SETTLE};
pub use runner::{CommandRunner, ShellRunner, DEFAULT_COMMAND_TIMEOUT};
pub use scan::NetworkScanner;
pub use status::{EventRing, StampedEvent, StatusEvent};
pub use types::{ConnectionStatus, NetworkRecord, RadioState};
