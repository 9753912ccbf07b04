//! Application layer - use cases and services

pub mod commands;
pub mod refund_monitor;
pub mod services;

pub use commands::{Cli, CommandExecutor, Commands};
pub use refund_monitor::RefundMonitor;
pub use services::ScheduleService;
