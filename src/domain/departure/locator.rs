//! Departure lookup over a day schedule

use chrono::NaiveDate;

use super::{DaySchedule, DepartureSnapshot, RouteEntry};
use crate::shared::errors::LocateError;
use crate::shared::types::RouteConfig;

fn find_route<'a>(schedule: &'a DaySchedule, route: &RouteConfig) -> Result<&'a RouteEntry, LocateError> {
    schedule
        .routes
        .iter()
        .find(|entry| entry.serves(&route.start_node_name, &route.arrival_node_name))
        .ok_or_else(|| LocateError::RouteNotFound {
            start: route.start_node_name.clone(),
            arrival: route.arrival_node_name.clone(),
        })
}

/// All departures of the configured route on `date`
pub fn list_departures(
    schedule: &DaySchedule,
    route: &RouteConfig,
    date: NaiveDate,
) -> Result<Vec<DepartureSnapshot>, LocateError> {
    find_route(schedule, route)?.departures_on(date)
}

/// The departure leaving at exactly `departure_time`
pub fn locate(
    schedule: &DaySchedule,
    route: &RouteConfig,
    date: NaiveDate,
    departure_time: &str,
) -> Result<DepartureSnapshot, LocateError> {
    list_departures(schedule, route, date)?
        .into_iter()
        .find(|departure| departure.departure_time == departure_time)
        .ok_or_else(|| LocateError::DepartureNotFound(departure_time.to_string()))
}

/// Split departures into `(with tickets, sold out)`, keeping schedule order
pub fn partition_by_availability(
    departures: Vec<DepartureSnapshot>,
) -> (Vec<DepartureSnapshot>, Vec<DepartureSnapshot>) {
    departures.into_iter().partition(DepartureSnapshot::has_tickets)
}
