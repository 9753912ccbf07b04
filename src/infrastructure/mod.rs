//! Infrastructure layer - booking service client, mail delivery and console I/O

pub mod api_clients;
pub mod console;
pub mod mail;

pub use api_clients::{BookingScheduleClient, ScheduleSource};
pub use mail::SmtpNotifier;
