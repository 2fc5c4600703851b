//! The connection enforcer: the monitoring state machine that keeps the
//! host on its target network.
//!
//! One enforcer owns one monitoring session: the target SSID, the radio
//! controller and the poll loop. Cycles run strictly sequentially, a cycle
//! never starts before the previous one's actions and settle delays finish,
//! because overlapping toggle/connect commands against the same radio have
//! undefined OS-level ordering. Cancellation takes effect between cycles,
//! never inside an in-flight remediation sequence.

use crate::error::KeeperError;
use crate::parse;
use crate::platform::{Action, Platform, QueryKind};
use crate::radio::RadioController;
use crate::runner::CommandRunner;
use crate::status::{EventRing, StampedEvent, StatusEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

/// Default wait between poll cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// How many recent status events the session retains for display.
const EVENT_RING_CAPACITY: usize = 64;

/// The network this session is pinned to. Validated non-empty at
/// construction, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnforcementTarget {
    desired_ssid: String,
}

impl EnforcementTarget {
    pub fn new(ssid: impl Into<String>) -> Result<Self, KeeperError> {
        let desired_ssid = ssid.into().trim().to_string();
        if desired_ssid.is_empty() {
            return Err(KeeperError::EmptyTarget);
        }
        Ok(Self { desired_ssid })
    }

    pub fn ssid(&self) -> &str {
        &self.desired_ssid
    }
}

/// Session lifecycle. Idle until `run` is entered, Stopped only via
/// external cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnforcerState {
    Idle,
    Connecting,
    Monitoring,
    Stopped,
}

pub struct ConnectionEnforcer<R> {
    target: EnforcementTarget,
    runner: Arc<R>,
    radio: RadioController<R>,
    platform: Platform,
    poll_interval: Duration,
    state: EnforcerState,
    ring: EventRing,
    events_tx: Option<mpsc::UnboundedSender<StampedEvent>>,
}

impl<R: CommandRunner> ConnectionEnforcer<R> {
    pub fn new(runner: Arc<R>, platform: Platform, target: EnforcementTarget) -> Self {
        let radio = RadioController::new(Arc::clone(&runner), platform);
        Self {
            target,
            runner,
            radio,
            platform,
            poll_interval: DEFAULT_POLL_INTERVAL,
            state: EnforcerState::Idle,
            ring: EventRing::new(EVENT_RING_CAPACITY),
            events_tx: None,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.radio = RadioController::new(Arc::clone(&self.runner), self.platform)
            .with_settle(settle);
        self
    }

    /// Subscribe to the per-cycle status stream. Fire-and-forget on the
    /// sending side: a dropped receiver never stalls the loop.
    pub fn events(&mut self) -> mpsc::UnboundedReceiver<StampedEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events_tx = Some(tx);
        rx
    }

    pub fn state(&self) -> EnforcerState {
        self.state
    }

    pub fn target(&self) -> &EnforcementTarget {
        &self.target
    }

    /// Recent events, oldest first.
    pub fn recent_events(&self) -> impl Iterator<Item = &StampedEvent> {
        self.ring.iter()
    }

    /// Run the monitoring session until `shutdown` flips to true.
    ///
    /// The first connect attempt moves the session into Monitoring whether
    /// or not it succeeds, the first poll cycle is what judges it.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        self.state = EnforcerState::Connecting;
        info!(target = %self.target.ssid(), "starting connection enforcement");

        if let Err(e) = self.connect().await {
            warn!("initial connect attempt failed: {}", e);
        }
        self.state = EnforcerState::Monitoring;

        loop {
            if *shutdown.borrow() {
                break;
            }

            let event = self.poll_cycle().await;
            self.emit(event);

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        // Cancellation handle dropped; nobody can stop us
                        // anymore. Keep polling at the normal cadence.
                        tokio::time::sleep(self.poll_interval).await;
                    }
                }
            }
        }

        self.state = EnforcerState::Stopped;
        info!("connection enforcement stopped");
    }

    /// One poll cycle: observe, remediate if needed, report.
    ///
    /// A powered-down radio makes SSID queries meaningless, so the power
    /// check runs first. A wrong-network association is then treated the
    /// same as a full disconnect: power-cycle, then reconnect, which also
    /// clears stuck driver state a plain reconnect cannot.
    pub async fn poll_cycle(&self) -> StatusEvent {
        if self.radio.is_powered_down().await {
            info!("radio is powered down; powering up and reconnecting");
            return match self.power_up_and_connect().await {
                Ok(()) => StatusEvent::PoweredDown {
                    target: self.target.ssid().to_string(),
                },
                Err(e) => cycle_error(e),
            };
        }

        match self.current_ssid().await {
            Err(e) => cycle_error(e),
            Ok(None) => {
                info!("no association; toggling and reconnecting");
                match self.toggle_and_connect().await {
                    Ok(()) => StatusEvent::Disconnected {
                        target: self.target.ssid().to_string(),
                    },
                    Err(e) => cycle_error(e),
                }
            }
            Ok(Some(actual)) if actual != self.target.ssid() => {
                info!(actual = %actual, "associated to the wrong network; switching");
                match self.toggle_and_connect().await {
                    Ok(()) => StatusEvent::WrongNetwork {
                        actual,
                        target: self.target.ssid().to_string(),
                    },
                    Err(e) => cycle_error(e),
                }
            }
            Ok(Some(_)) => StatusEvent::AllGood {
                target: self.target.ssid().to_string(),
            },
        }
    }

    async fn power_up_and_connect(&self) -> Result<(), KeeperError> {
        self.radio.power_up().await?;
        self.connect().await
    }

    async fn toggle_and_connect(&self) -> Result<(), KeeperError> {
        self.radio.toggle().await?;
        self.connect().await
    }

    /// Issue the platform connect for the target, then settle.
    ///
    /// Fire-and-forget: the tools report success even when association
    /// ultimately fails or takes longer than the call, so the next poll
    /// cycle is the only verification. Only command-level failures surface
    /// here.
    async fn connect(&self) -> Result<(), KeeperError> {
        info!(target = %self.target.ssid(), "issuing connect");
        self.runner
            .act(&Action::Connect {
                ssid: self.target.ssid().to_string(),
            })
            .await?;
        self.radio.settle().await;
        Ok(())
    }

    async fn current_ssid(&self) -> Result<Option<String>, KeeperError> {
        let raw = self.runner.query(QueryKind::CurrentConnection).await?;
        Ok(parse::current_ssid(self.platform, &raw))
    }

    fn emit(&mut self, event: StatusEvent) {
        info!("{}", event);
        let stamped = StampedEvent::now(event);
        if let Some(tx) = &self.events_tx {
            let _ = tx.send(stamped.clone());
        }
        self.ring.push(stamped);
    }
}

fn cycle_error(e: KeeperError) -> StatusEvent {
    warn!("poll cycle failed: {}", e);
    StatusEvent::CycleError {
        detail: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::testing::ScriptedRunner;

    fn enforcer(runner: Arc<ScriptedRunner>, ssid: &str) -> ConnectionEnforcer<ScriptedRunner> {
        ConnectionEnforcer::new(
            runner,
            Platform::Linux,
            EnforcementTarget::new(ssid).unwrap(),
        )
        .with_settle(Duration::ZERO)
        .with_poll_interval(Duration::from_millis(5))
    }

    fn connect_to(ssid: &str) -> Action {
        Action::Connect {
            ssid: ssid.to_string(),
        }
    }

    #[test]
    fn test_empty_target_is_a_configuration_error() {
        assert!(matches!(
            EnforcementTarget::new(""),
            Err(KeeperError::EmptyTarget)
        ));
        assert!(matches!(
            EnforcementTarget::new("   "),
            Err(KeeperError::EmptyTarget)
        ));
    }

    #[test]
    fn test_target_ssid_is_trimmed() {
        let target = EnforcementTarget::new("  HomeNet ").unwrap();
        assert_eq!(target.ssid(), "HomeNet");
    }

    #[tokio::test]
    async fn test_powered_down_powers_up_before_connect() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.script_radio(&["disabled"]);
        let enf = enforcer(Arc::clone(&runner), "HomeNet");

        let event = enf.poll_cycle().await;

        assert_eq!(
            event,
            StatusEvent::PoweredDown {
                target: "HomeNet".to_string()
            }
        );
        assert_eq!(
            runner.actions(),
            vec![Action::EnableRadio, connect_to("HomeNet")]
        );
    }

    #[tokio::test]
    async fn test_all_good_cycle_issues_no_actions() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.script_radio(&["enabled"]);
        runner.script_connection(&["yes:HomeNet"]);
        let enf = enforcer(Arc::clone(&runner), "HomeNet");

        // Repeated identical inputs stay action-free.
        for _ in 0..3 {
            let event = enf.poll_cycle().await;
            assert_eq!(
                event,
                StatusEvent::AllGood {
                    target: "HomeNet".to_string()
                }
            );
        }
        assert!(runner.actions().is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_then_recovery_scenario() {
        // Polls 1 and 2 see no association, poll 3 sees the target again:
        // toggle+connect twice, then a pure observation.
        let runner = Arc::new(ScriptedRunner::new());
        runner.script_radio(&["enabled"]);
        runner.script_connection(&["", "", "yes:HomeNet"]);
        let enf = enforcer(Arc::clone(&runner), "HomeNet");

        assert_eq!(
            enf.poll_cycle().await,
            StatusEvent::Disconnected {
                target: "HomeNet".to_string()
            }
        );
        assert_eq!(
            enf.poll_cycle().await,
            StatusEvent::Disconnected {
                target: "HomeNet".to_string()
            }
        );
        assert_eq!(
            enf.poll_cycle().await,
            StatusEvent::AllGood {
                target: "HomeNet".to_string()
            }
        );

        let toggle_connect = vec![
            Action::DisableRadio,
            Action::EnableRadio,
            connect_to("HomeNet"),
        ];
        let mut expected = toggle_connect.clone();
        expected.extend(toggle_connect);
        assert_eq!(runner.actions(), expected);
    }

    #[tokio::test]
    async fn test_powered_down_then_wrong_network_scenario() {
        // Poll 1: radio down -> power_up + connect. Poll 2: radio up but
        // associated elsewhere -> full toggle + connect.
        let runner = Arc::new(ScriptedRunner::new());
        runner.script_radio(&["disabled", "enabled"]);
        runner.script_connection(&["yes:CafeGuest"]);
        let enf = enforcer(Arc::clone(&runner), "HomeNet");

        assert_eq!(
            enf.poll_cycle().await,
            StatusEvent::PoweredDown {
                target: "HomeNet".to_string()
            }
        );
        assert_eq!(
            enf.poll_cycle().await,
            StatusEvent::WrongNetwork {
                actual: "CafeGuest".to_string(),
                target: "HomeNet".to_string()
            }
        );

        assert_eq!(
            runner.actions(),
            vec![
                Action::EnableRadio,
                connect_to("HomeNet"),
                Action::DisableRadio,
                Action::EnableRadio,
                connect_to("HomeNet"),
            ]
        );
    }

    #[tokio::test]
    async fn test_connection_query_failure_is_absorbed_without_action() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.script_radio(&["enabled"]);
        runner.fail_connection_queries();
        let enf = enforcer(Arc::clone(&runner), "HomeNet");

        let event = enf.poll_cycle().await;
        assert!(matches!(event, StatusEvent::CycleError { .. }));
        assert!(runner.actions().is_empty());
    }

    #[tokio::test]
    async fn test_failed_remediation_reports_cycle_error() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.script_radio(&["enabled"]);
        runner.script_connection(&[""]);
        runner.fail_actions();
        let enf = enforcer(Arc::clone(&runner), "HomeNet");

        let event = enf.poll_cycle().await;
        assert!(matches!(event, StatusEvent::CycleError { .. }));
    }

    #[tokio::test]
    async fn test_run_stops_on_cancellation() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.script_radio(&["enabled"]);
        runner.script_connection(&["yes:HomeNet"]);

        let (tx, rx) = watch::channel(false);
        let mut enf = enforcer(Arc::clone(&runner), "HomeNet");
        let mut events = enf.events();

        let handle = tokio::spawn(async move {
            enf.run(rx).await;
            enf
        });

        // Let a few cycles happen, then cancel.
        let first = events.recv().await.expect("at least one event");
        assert_eq!(
            first.event,
            StatusEvent::AllGood {
                target: "HomeNet".to_string()
            }
        );
        tx.send(true).unwrap();

        let enf = handle.await.unwrap();
        assert_eq!(enf.state(), EnforcerState::Stopped);

        // The initial Connecting-phase attempt is the only connect issued.
        assert_eq!(runner.actions(), vec![connect_to("HomeNet")]);
    }
}
