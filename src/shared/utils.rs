//! Utility functions and helpers

use chrono::{Local, NaiveDate, NaiveTime};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).ok()
}

/// Validate a `HH:MM` departure time and return it normalised
pub fn parse_departure_time(input: &str) -> Option<String> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M")
        .ok()
        .map(|t| t.format("%H:%M").to_string())
}

/// Wall-clock timestamp for status lines
pub fn clock_now() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

/// Format a price the way the booking service displays it
pub fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("¥{:.0}", price)
    } else {
        format!("¥{:.2}", price)
    }
}

/// Generate unique ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
