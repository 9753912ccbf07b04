//! Domain layer - core business logic and entities

pub mod departure;
pub mod monitor;
pub mod notification;
