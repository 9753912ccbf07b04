//! Collaborators the monitoring loop reports to and asks

use async_trait::async_trait;

use super::session::{MonitorReport, MonitorSettings};
use super::transition::Transition;
use crate::domain::departure::DepartureSnapshot;
use crate::shared::errors::LocateError;

/// Everything observable about a running session
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEvent {
    Started {
        session_id: String,
        settings: MonitorSettings,
    },
    /// One successful reading with its classification
    Reading {
        check: u64,
        transition: Transition,
        departure: DepartureSnapshot,
    },
    /// A poll that produced no reading
    ReadFailed {
        attempt: u64,
        error: LocateError,
    },
    /// Outcome of the single notification attempt for a refund
    Notification {
        subject: String,
        outcome: Result<(), String>,
    },
    Stopped {
        report: MonitorReport,
    },
}

/// Presentation sink for monitor events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &MonitorEvent);
}

/// Operator decision after a refund alert
#[async_trait]
pub trait DecisionProvider: Send + Sync {
    /// `true` keeps monitoring
    async fn continue_after_alert(&self, departure: &DepartureSnapshot) -> bool;
}

/// Decision provider with a fixed answer
pub struct FixedDecision(pub bool);

#[async_trait]
impl DecisionProvider for FixedDecision {
    async fn continue_after_alert(&self, _departure: &DepartureSnapshot) -> bool {
        self.0
    }
}
