//! Monitoring session state machine

use chrono::NaiveDate;
use std::time::Duration;

use super::transition::{Transition, TransitionEvent};
use crate::shared::errors::AppError;
use crate::shared::utils::generate_id;

/// Settings supplied once when a session is created
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSettings {
    pub date: NaiveDate,
    pub departure_time: String,
    pub interval: Duration,
    pub alert_threshold: u32,
}

impl MonitorSettings {
    pub fn new(
        date: NaiveDate,
        departure_time: impl Into<String>,
        interval: Duration,
        alert_threshold: u32,
    ) -> Result<Self, AppError> {
        if interval.is_zero() {
            return Err(AppError::InvalidInput("poll interval must be positive".into()));
        }
        if alert_threshold == 0 {
            return Err(AppError::InvalidInput("alert threshold must be at least 1".into()));
        }

        Ok(Self {
            date,
            departure_time: departure_time.into(),
            interval,
            alert_threshold,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Running,
    PausedForDecision,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Interrupted by the operator (Ctrl-C)
    Cancelled,
    /// Two equal nonzero readings: tickets are on sale, polling is moot
    TicketsAlreadyAvailable,
    /// Operator answered anything but yes after a refund alert
    OperatorDeclined,
}

impl StopReason {
    pub fn describe(&self) -> &'static str {
        match self {
            StopReason::Cancelled => "interrupted by user",
            StopReason::TicketsAlreadyAvailable => "tickets already available",
            StopReason::OperatorDeclined => "operator declined to continue",
        }
    }
}

/// What the loop does after a successful reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    AwaitDecision,
    Stop(StopReason),
}

/// Summary emitted when a session ends
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorReport {
    pub session_id: String,
    pub checks: u64,
    pub attempts: u64,
    pub alerts: u64,
    pub last_seen: Option<u32>,
    pub stop_reason: StopReason,
}

/// Mutable state of one monitoring invocation.
///
/// `is_monitoring` is set by [`MonitorSession::start`] and cleared by
/// [`MonitorSession::stop`]; `last_seen` only moves on successful readings.
#[derive(Debug, Clone)]
pub struct MonitorSession {
    id: String,
    settings: MonitorSettings,
    last_seen: Option<u32>,
    check_count: u64,
    attempt_count: u64,
    alerts: u64,
    state: MonitorState,
    is_monitoring: bool,
}

impl MonitorSession {
    pub fn new(settings: MonitorSettings) -> Self {
        Self {
            id: generate_id(),
            settings,
            last_seen: None,
            check_count: 0,
            attempt_count: 0,
            alerts: 0,
            state: MonitorState::Idle,
            is_monitoring: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn is_monitoring(&self) -> bool {
        self.is_monitoring
    }

    pub fn last_seen(&self) -> Option<u32> {
        self.last_seen
    }

    pub fn check_count(&self) -> u64 {
        self.check_count
    }

    pub fn attempt_count(&self) -> u64 {
        self.attempt_count
    }

    pub fn start(&mut self) {
        self.state = MonitorState::Running;
        self.is_monitoring = true;
        self.check_count = 0;
        self.attempt_count = 0;
    }

    /// Count a poll attempt, successful or not
    pub fn begin_attempt(&mut self) -> u64 {
        self.attempt_count += 1;
        self.attempt_count
    }

    /// Record a successful reading and decide what happens next
    pub fn record_reading(&mut self, seats: u32) -> (Transition, Verdict) {
        self.check_count += 1;

        let transition = Transition::between(self.last_seen, seats, self.settings.alert_threshold);
        self.last_seen = Some(seats);

        let verdict = match transition.event {
            TransitionEvent::NoChange if seats > 0 => Verdict::Stop(StopReason::TicketsAlreadyAvailable),
            TransitionEvent::RefundDetected => {
                self.state = MonitorState::PausedForDecision;
                Verdict::AwaitDecision
            }
            _ => Verdict::Continue,
        };

        (transition, verdict)
    }

    pub fn record_alert(&mut self) {
        self.alerts += 1;
    }

    /// Leave the decision pause; counters and baseline are kept
    pub fn resume(&mut self) {
        if self.state == MonitorState::PausedForDecision {
            self.state = MonitorState::Running;
        }
    }

    pub fn stop(&mut self, reason: StopReason) -> MonitorReport {
        self.state = MonitorState::Stopped;
        self.is_monitoring = false;

        MonitorReport {
            session_id: self.id.clone(),
            checks: self.check_count,
            attempts: self.attempt_count,
            alerts: self.alerts,
            last_seen: self.last_seen,
            stop_reason: reason,
        }
    }
}
