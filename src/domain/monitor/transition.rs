//! Seat count transition classification

use std::fmt;

/// Classification of one successful reading against the previous one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEvent {
    /// First successful reading, recorded as the baseline
    Initial,
    NoChange,
    Increase,
    Decrease,
    /// Seats reappeared on a sold-out departure
    RefundDetected,
}

impl TransitionEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionEvent::Initial => "initial",
            TransitionEvent::NoChange => "no_change",
            TransitionEvent::Increase => "increase",
            TransitionEvent::Decrease => "decrease",
            TransitionEvent::RefundDetected => "refund_detected",
        }
    }

    /// Whether the count differs from the previous reading
    pub fn is_change(&self) -> bool {
        matches!(
            self,
            TransitionEvent::Increase | TransitionEvent::Decrease | TransitionEvent::RefundDetected
        )
    }
}

impl fmt::Display for TransitionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified pair of consecutive successful readings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub event: TransitionEvent,
    pub previous: Option<u32>,
    pub current: u32,
}

impl Transition {
    pub fn between(previous: Option<u32>, current: u32, threshold: u32) -> Self {
        Self {
            event: classify(previous, current, threshold),
            previous,
            current,
        }
    }

    /// Signed seat delta, zero for the baseline
    pub fn delta(&self) -> i64 {
        self.previous
            .map(|previous| self.current as i64 - previous as i64)
            .unwrap_or(0)
    }
}

/// Classify `current` against the last successful reading.
///
/// `RefundDetected` requires the previous reading to be exactly zero and the
/// current one to reach `threshold`; a rise from zero that stays below the
/// threshold is an ordinary `Increase`.
pub fn classify(previous: Option<u32>, current: u32, threshold: u32) -> TransitionEvent {
    match previous {
        None => TransitionEvent::Initial,
        Some(previous) if previous == current => TransitionEvent::NoChange,
        Some(0) if current >= threshold => TransitionEvent::RefundDetected,
        Some(previous) if current > previous => TransitionEvent::Increase,
        Some(_) => TransitionEvent::Decrease,
    }
}
