pub mod schedule_client;

pub use schedule_client::BookingScheduleClient;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::departure::DaySchedule;
use crate::shared::errors::FetchError;

/// Source of day schedules for the configured route
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// Fetch every route line the booking service returns for `date`
    async fn fetch_day(&self, date: NaiveDate) -> Result<DaySchedule, FetchError>;
}
