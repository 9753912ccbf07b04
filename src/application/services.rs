//! Schedule queries used by the interactive commands

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::departure::{list_departures, partition_by_availability, DepartureSnapshot};
use crate::infrastructure::api_clients::ScheduleSource;
use crate::shared::errors::{AppError, LocateError};
use crate::shared::types::RouteConfig;

/// One day of the watched route, split by ticket availability
#[derive(Debug, Clone, Default)]
pub struct DayDepartures {
    pub available: Vec<DepartureSnapshot>,
    pub sold_out: Vec<DepartureSnapshot>,
}

impl DayDepartures {
    pub fn is_empty(&self) -> bool {
        self.available.is_empty() && self.sold_out.is_empty()
    }

    pub fn total(&self) -> usize {
        self.available.len() + self.sold_out.len()
    }

    /// Sold-out departure leaving at `time`
    pub fn sold_out_at(&self, time: &str) -> Option<&DepartureSnapshot> {
        self.sold_out.iter().find(|d| d.departure_time == time)
    }
}

/// Application service for schedule lookups
pub struct ScheduleService {
    source: Arc<dyn ScheduleSource>,
    route: RouteConfig,
}

impl ScheduleService {
    pub fn new(source: Arc<dyn ScheduleSource>, route: RouteConfig) -> Self {
        Self { source, route }
    }

    /// Fetch the day and partition the route's departures
    pub async fn day_departures(&self, date: NaiveDate) -> Result<DayDepartures, AppError> {
        info!(route = %self.route.describe(), %date, "Fetching departures");

        let schedule = self.source.fetch_day(date).await?;
        // The service omits a route with no departures that day
        let departures = match list_departures(&schedule, &self.route, date) {
            Ok(departures) => departures,
            Err(LocateError::RouteNotFound { start, arrival }) => {
                warn!(%start, %arrival, %date, "Route not in schedule");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };
        let (available, sold_out) = partition_by_availability(departures);

        debug!(available = available.len(), sold_out = sold_out.len(), "Departures partitioned");
        Ok(DayDepartures { available, sold_out })
    }
}
