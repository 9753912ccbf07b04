//! Monitor domain - seat count transitions and the session state machine

mod hooks;
mod session;
mod transition;

pub use hooks::{DecisionProvider, EventSink, FixedDecision, MonitorEvent};
pub use session::{MonitorReport, MonitorSession, MonitorSettings, MonitorState, StopReason, Verdict};
pub use transition::{classify, Transition, TransitionEvent};
