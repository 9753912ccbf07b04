//! Notification domain - alert content and the delivery interface

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::departure::DepartureSnapshot;
use crate::shared::errors::NotificationError;
use crate::shared::utils::{format_price, DATE_FORMAT};

/// Out-of-band alert delivery
#[async_trait]
pub trait Notifier: Send + Sync {
    fn channel_type(&self) -> &'static str;

    /// Deliver one plain-text message; failures are returned, never retried
    async fn notify(&self, subject: &str, body: &str) -> Result<(), NotificationError>;
}

/// Subject and body of an alert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub subject: String,
    pub body: String,
}

impl AlertMessage {
    pub fn refund(date: NaiveDate, departure: &DepartureSnapshot) -> Self {
        let day = date.format(DATE_FORMAT);
        let subject = format!("[Refund ticket] {} {} departure", day, departure.departure_time);
        let body = format!(
            "Refund tickets found!\n\
             Date: {}\n\
             Departure: {} -> {}\n\
             Seats available: {}\n\
             Price: {}\n\
             Running time: {} min\n\
             Book now!\n",
            day,
            departure.departure_time,
            departure.arrival_time,
            departure.available_seats,
            format_price(departure.price),
            departure.running_minutes,
        );

        Self { subject, body }
    }

    pub fn test() -> Self {
        Self {
            subject: "[Refund ticket] Test notification".to_string(),
            body: "Email delivery for refund ticket alerts is working.\n".to_string(),
        }
    }
}
