//! Per-cycle status events and the bounded ring that retains them.
//!
//! Consumption is fire-and-forget: events describe what the enforcer saw
//! and did, once per poll cycle, for whatever presentation layer cares to
//! listen. Nothing in the core depends on anyone reading them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// What one poll cycle observed and, where applicable, which remediation it
/// started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusEvent {
    /// Radio reported administratively down; powering up and reconnecting.
    PoweredDown { target: String },
    /// No association; power-cycling and reconnecting.
    Disconnected { target: String },
    /// Associated, but to the wrong network; power-cycling and switching.
    WrongNetwork { actual: String, target: String },
    /// Associated to the target; nothing to do.
    AllGood { target: String },
    /// A query or remediation action failed this cycle. The loop carries
    /// on; the next cycle is the retry.
    CycleError { detail: String },
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PoweredDown { target } => {
                write!(f, "radio powered down, bringing it up and reconnecting to {}", target)
            }
            Self::Disconnected { target } => {
                write!(f, "disconnected, reconnecting to {}", target)
            }
            Self::WrongNetwork { actual, target } => {
                write!(f, "connected to {} instead of {}, switching back", actual, target)
            }
            Self::AllGood { target } => write!(f, "connected to {} - all good", target),
            Self::CycleError { detail } => write!(f, "cycle failed: {}", detail),
        }
    }
}

/// A status event with the time it was observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StampedEvent {
    pub at: DateTime<Utc>,
    pub event: StatusEvent,
}

impl StampedEvent {
    pub fn now(event: StatusEvent) -> Self {
        Self {
            at: Utc::now(),
            event,
        }
    }
}

/// Keeps the most recent N events for display; older ones fall off the
/// front.
#[derive(Debug, Clone)]
pub struct EventRing {
    capacity: usize,
    entries: VecDeque<StampedEvent>,
}

impl EventRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::with_capacity(capacity.max(1)),
        }
    }

    pub fn push(&mut self, event: StampedEvent) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(event);
    }

    pub fn latest(&self) -> Option<&StampedEvent> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StampedEvent> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_drops_oldest() {
        let mut ring = EventRing::new(2);
        for target in ["a", "b", "c"] {
            ring.push(StampedEvent::now(StatusEvent::AllGood {
                target: target.to_string(),
            }));
        }
        assert_eq!(ring.len(), 2);
        let targets: Vec<_> = ring
            .iter()
            .map(|e| match &e.event {
                StatusEvent::AllGood { target } => target.clone(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(targets, vec!["b", "c"]);
    }

    #[test]
    fn test_event_display_names_both_networks() {
        let event = StatusEvent::WrongNetwork {
            actual: "CafeGuest".to_string(),
            target: "HomeNet".to_string(),
        };
        let text = event.to_string();
        assert!(text.contains("CafeGuest"));
        assert!(text.contains("HomeNet"));
    }
}
