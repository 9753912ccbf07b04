//! Departure domain - schedule snapshots and the departures they contain

pub mod locator;

pub use locator::{list_departures, locate, partition_by_availability};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::shared::errors::LocateError;
use crate::shared::utils::DATE_FORMAT;

const UNKNOWN_TIME: &str = "--:--";

/// One departure as seen at one poll instant
#[derive(Debug, Clone, PartialEq)]
pub struct DepartureSnapshot {
    pub departure_time: String,
    pub arrival_time: String,
    pub available_seats: u32,
    pub total_seats: u32,
    pub running_minutes: u32,
    pub price: f64,
    pub id: Option<String>,
}

impl DepartureSnapshot {
    pub fn has_tickets(&self) -> bool {
        self.available_seats > 0
    }
}

/// One route line of a snapshot
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteEntry {
    #[serde(rename = "StartNodeName", default)]
    pub start_node_name: String,
    #[serde(rename = "ArrivalNodeName", default)]
    pub arrival_node_name: String,
    /// JSON-encoded array of class records, encoded separately from the envelope
    #[serde(rename = "ClassList", default = "RouteEntry::empty_class_list")]
    pub class_list: String,
}

impl RouteEntry {
    fn empty_class_list() -> String {
        "[]".to_string()
    }

    pub fn serves(&self, start: &str, arrival: &str) -> bool {
        self.start_node_name == start && self.arrival_node_name == arrival
    }

    /// Decode the nested class list, keeping only classes running on `date`
    pub fn departures_on(&self, date: NaiveDate) -> Result<Vec<DepartureSnapshot>, LocateError> {
        let records: Vec<ClassRecord> = serde_json::from_str(&self.class_list)
            .map_err(|e| LocateError::Payload(e.to_string()))?;

        let day = date.format(DATE_FORMAT).to_string();
        Ok(records
            .into_iter()
            .filter(|record| record.class_date.as_deref() == Some(day.as_str()))
            .map(DepartureSnapshot::from)
            .collect())
    }
}

/// Every route line returned for one date query
#[derive(Debug, Clone, PartialEq)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub routes: Vec<RouteEntry>,
}

impl DaySchedule {
    pub fn new(date: NaiveDate, routes: Vec<RouteEntry>) -> Self {
        Self { date, routes }
    }
}

#[derive(Debug, Deserialize)]
struct ClassRecord {
    #[serde(rename = "ClassDate")]
    class_date: Option<String>,
    #[serde(rename = "ClassTime")]
    class_time: Option<String>,
    #[serde(rename = "ArrivalTime")]
    arrival_time: Option<String>,
    #[serde(rename = "CanSaleCount")]
    can_sale_count: Option<i64>,
    #[serde(rename = "SeatCount")]
    seat_count: Option<i64>,
    #[serde(rename = "RunTime")]
    run_time: Option<i64>,
    #[serde(rename = "MinFullPrice")]
    min_full_price: Option<f64>,
    #[serde(rename = "GID")]
    gid: Option<serde_json::Value>,
}

fn non_negative(value: Option<i64>) -> u32 {
    value.unwrap_or(0).clamp(0, u32::MAX as i64) as u32
}

impl From<ClassRecord> for DepartureSnapshot {
    fn from(record: ClassRecord) -> Self {
        let id = match record.gid {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(serde_json::Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };

        Self {
            departure_time: record.class_time.unwrap_or_else(|| UNKNOWN_TIME.to_string()),
            arrival_time: record.arrival_time.unwrap_or_else(|| UNKNOWN_TIME.to_string()),
            available_seats: non_negative(record.can_sale_count),
            total_seats: non_negative(record.seat_count),
            running_minutes: non_negative(record.run_time),
            price: record.min_full_price.unwrap_or(0.0),
            id,
        }
    }
}
