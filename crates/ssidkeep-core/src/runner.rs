//! Command execution layer.
//!
//! `CommandRunner` is the seam between the enforcement logic and the real
//! OS: production code goes through `ShellRunner`, tests script a mock. The
//! runner reports exactly what happened (spawn failure, non-zero exit,
//! timeout) and never interprets output, parsing is a separate, pure layer.

use crate::error::KeeperError;
use crate::platform::{Action, CommandSet, Invocation, QueryKind};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Default per-invocation timeout. The OS tools are normally fast but have
/// been observed to hang on wedged drivers; a hung query must not stall the
/// monitoring loop forever.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Capability interface over the platform's network-stack primitives.
///
/// `query` returns raw stdout text for the parsers; `act` only reports
/// whether the invocation ran cleanly. Implementations must not retry -
/// the poll loop is the retry mechanism.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    async fn query(&self, kind: QueryKind) -> Result<String, KeeperError>;
    async fn act(&self, action: &Action) -> Result<(), KeeperError>;
}

/// Real runner: spawns the platform tool resolved from the command table.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    commands: CommandSet,
    timeout: Duration,
}

impl ShellRunner {
    pub fn new(commands: CommandSet) -> Self {
        Self {
            commands,
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(&self, invocation: &Invocation) -> Result<String, KeeperError> {
        debug!("executing: {}", invocation);

        let child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(KeeperError::CommandUnavailable {
                    command: invocation.to_string(),
                    source: e,
                });
            }
            Err(_) => {
                warn!("command timed out: {}", invocation);
                return Err(KeeperError::CommandTimeout {
                    command: invocation.to_string(),
                    timeout_secs: self.timeout.as_secs(),
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(KeeperError::CommandFailed {
                command: invocation.to_string(),
                code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl CommandRunner for ShellRunner {
    async fn query(&self, kind: QueryKind) -> Result<String, KeeperError> {
        self.run(&self.commands.query(kind)).await
    }

    async fn act(&self, action: &Action) -> Result<(), KeeperError> {
        self.run(&self.commands.action(action)).await.map(|_| ())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted stand-in for the OS command layer, shared by the radio,
    //! scanner and enforcer tests. Query outputs are queued per kind; the
    //! last queued output repeats once its queue drains, so a scenario only
    //! scripts the polls where something changes.

    use super::CommandRunner;
    use crate::error::KeeperError;
    use crate::platform::{Action, QueryKind};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub(crate) struct ScriptedRunner {
        radio: Mutex<VecDeque<String>>,
        conn: Mutex<VecDeque<String>>,
        scan: Mutex<VecDeque<String>>,
        acts: Mutex<Vec<Action>>,
        fail_radio: AtomicBool,
        fail_conn: AtomicBool,
        fail_scan: AtomicBool,
        fail_acts: AtomicBool,
    }

    impl ScriptedRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn script_radio(&self, outputs: &[&str]) {
            fill(&self.radio, outputs);
        }

        pub fn script_connection(&self, outputs: &[&str]) {
            fill(&self.conn, outputs);
        }

        pub fn script_scan(&self, outputs: &[&str]) {
            fill(&self.scan, outputs);
        }

        pub fn fail_radio_queries(&self) {
            self.fail_radio.store(true, Ordering::SeqCst);
        }

        pub fn fail_connection_queries(&self) {
            self.fail_conn.store(true, Ordering::SeqCst);
        }

        pub fn fail_scan_queries(&self) {
            self.fail_scan.store(true, Ordering::SeqCst);
        }

        pub fn fail_actions(&self) {
            self.fail_acts.store(true, Ordering::SeqCst);
        }

        /// Every mutating action issued so far, in order.
        pub fn actions(&self) -> Vec<Action> {
            self.acts.lock().unwrap().clone()
        }
    }

    fn fill(queue: &Mutex<VecDeque<String>>, outputs: &[&str]) {
        let mut q = queue.lock().unwrap();
        q.clear();
        q.extend(outputs.iter().map(|s| s.to_string()));
    }

    fn next(queue: &Mutex<VecDeque<String>>) -> String {
        let mut q = queue.lock().unwrap();
        if q.len() > 1 {
            q.pop_front().unwrap_or_default()
        } else {
            q.front().cloned().unwrap_or_default()
        }
    }

    fn scripted_failure() -> KeeperError {
        KeeperError::CommandFailed {
            command: "scripted".to_string(),
            code: 1,
            stderr: "scripted failure".to_string(),
        }
    }

    impl CommandRunner for ScriptedRunner {
        async fn query(&self, kind: QueryKind) -> Result<String, KeeperError> {
            let (flag, queue) = match kind {
                QueryKind::RadioPower => (&self.fail_radio, &self.radio),
                QueryKind::CurrentConnection => (&self.fail_conn, &self.conn),
                QueryKind::VisibleNetworks => (&self.fail_scan, &self.scan),
            };
            if flag.load(Ordering::SeqCst) {
                return Err(scripted_failure());
            }
            Ok(next(queue))
        }

        async fn act(&self, action: &Action) -> Result<(), KeeperError> {
            if self.fail_acts.load(Ordering::SeqCst) {
                return Err(scripted_failure());
            }
            self.acts.lock().unwrap().push(action.clone());
            Ok(())
        }
    }
}
