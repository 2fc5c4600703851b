//! Error types for ssidkeep.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeeperError {
    /// The OS tool could not be started at all (missing binary, permission
    /// denied). Distinct from "ran but returned no data".
    #[error("command `{command}` could not be run: {source}")]
    CommandUnavailable {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command `{command}` exited with status {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("command `{command}` timed out after {timeout_secs}s")]
    CommandTimeout { command: String, timeout_secs: u64 },

    /// Monitoring was requested without a target SSID.
    #[error("no target SSID configured")]
    EmptyTarget,
}
