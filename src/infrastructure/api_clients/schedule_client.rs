use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::ScheduleSource;
use crate::domain::departure::{DaySchedule, RouteEntry};
use crate::shared::errors::{AppError, FetchError};
use crate::shared::types::{ApiConfig, RouteConfig};
use crate::shared::utils::DATE_FORMAT;

/// Response envelope of the class search endpoint
#[derive(Debug, Deserialize)]
struct ScheduleResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<Vec<RouteEntry>>,
}

/// Booking service client for day schedules
pub struct BookingScheduleClient {
    client: Client,
    endpoint: String,
    route: RouteConfig,
}

impl BookingScheduleClient {
    pub fn new(api: &ApiConfig, route: RouteConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .danger_accept_invalid_certs(api.accept_invalid_certs)
            .default_headers(build_headers(api)?)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: api.endpoint.clone(),
            route,
        })
    }

    /// Query parameters for one day, including the `_JsonText` search blob
    fn query_params(&self, date: NaiveDate, now_millis: i64) -> Vec<(&'static str, String)> {
        let day = date.format(DATE_FORMAT).to_string();
        let route = &self.route;
        let location = &route.location;

        let json_text = json!({
            "IsNewSearch": true,
            "HasLocation": true,
            "InTiimeStamp": now_millis,
            "LocationGis": location.gis,
            "LocationDistrict": location.district,
            "LocationCityCode": location.city_code,
            "LocationCityName": location.city_name,
            "LocationTownship": location.township,
            "LocationAddress": location.address,
            "LocationProvince": location.province,
            "SearchStartDistrict": location.search_start_district,
            "SearchEndDistrict": location.search_end_district,
        });

        vec![
            ("StartNodeGis", route.start_node_gis.clone()),
            ("ArrivalNodeGis", route.arrival_node_gis.clone()),
            ("StartCityCode", route.start_city_code.clone()),
            ("ArrivalCityCode", route.arrival_city_code.clone()),
            ("StartNodeName", route.start_node_name.clone()),
            ("StartNodeDistrictName", route.start_node_district_name.clone()),
            ("ArrivalNodeName", route.arrival_node_name.clone()),
            ("ArrivalNodeDistrictName", route.arrival_node_district_name.clone()),
            ("BeginDate", format!("{} 00:00", day)),
            ("EndDate", format!("{} 23:59", day)),
            ("_JsonText", json_text.to_string()),
        ]
    }
}

fn build_headers(api: &ApiConfig) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &api.headers {
        if value.is_empty() {
            continue;
        }
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| AppError::ConfigError(format!("Invalid header name {}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| AppError::ConfigError(format!("Invalid value for header {}: {}", name, e)))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

/// Decode a response body into a day schedule
fn parse_schedule(date: NaiveDate, body: &str) -> Result<DaySchedule, FetchError> {
    let response: ScheduleResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Payload(e.to_string()))?;

    if !response.success {
        return Err(FetchError::Api(
            response.msg.unwrap_or_else(|| "unknown error".to_string()),
        ));
    }

    Ok(DaySchedule::new(date, response.data.unwrap_or_default()))
}

#[async_trait]
impl ScheduleSource for BookingScheduleClient {
    async fn fetch_day(&self, date: NaiveDate) -> Result<DaySchedule, FetchError> {
        let start = Instant::now();
        let params = self.query_params(date, Utc::now().timestamp_millis());

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Schedule request failed");
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(FetchError::from)?;
        debug!(
            bytes = body.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Schedule response received"
        );

        parse_schedule(date, &body).map_err(|e| {
            if let FetchError::Payload(reason) = &e {
                warn!(
                    "Failed to parse schedule response: {} - body: {}",
                    reason,
                    body.chars().take(500).collect::<String>()
                );
            }
            e
        })
    }
}
