//! Refund Watch - bus refund ticket watcher
//! Built with Domain-Driven Design principles

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export main types for convenience
pub use application::{RefundMonitor, ScheduleService};
pub use domain::monitor::{MonitorReport, MonitorSession, MonitorSettings, TransitionEvent};
pub use shared::config::ConfigLoader;
pub use shared::errors::AppError;
