//! Departure tables

use colored::Colorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::domain::departure::DepartureSnapshot;
use crate::shared::utils::format_price;

#[derive(Tabled)]
struct DepartureRow {
    #[tabled(rename = "No.")]
    index: usize,
    #[tabled(rename = "Departs")]
    departure: String,
    #[tabled(rename = "Arrives")]
    arrival: String,
    #[tabled(rename = "Seats")]
    seats: String,
    #[tabled(rename = "Running")]
    running: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl DepartureRow {
    fn new(index: usize, departure: &DepartureSnapshot, colored: bool) -> Self {
        let status = if departure.has_tickets() { "Available" } else { "Sold out" };
        let status = match (colored, departure.has_tickets()) {
            (false, _) => status.to_string(),
            (true, true) => status.green().to_string(),
            (true, false) => status.red().to_string(),
        };

        Self {
            index,
            departure: departure.departure_time.clone(),
            arrival: departure.arrival_time.clone(),
            seats: format!("{}/{}", departure.available_seats, departure.total_seats),
            running: format!("{} min", departure.running_minutes),
            price: format_price(departure.price),
            status,
        }
    }
}

/// Render departures as a numbered table; indices start at 1
pub fn render_departures(departures: &[DepartureSnapshot], colored: bool) -> String {
    let rows: Vec<DepartureRow> = departures
        .iter()
        .enumerate()
        .map(|(i, departure)| DepartureRow::new(i + 1, departure, colored))
        .collect();

    Table::new(rows).with(Style::modern()).to_string()
}

/// Print a titled table; nothing is printed for an empty list
pub fn print_departures(title: &str, departures: &[DepartureSnapshot]) {
    if departures.is_empty() {
        return;
    }
    println!("\n{}", title.bold());
    println!("{}", render_departures(departures, true));
}

/// Detail block shown before the start confirmation
pub fn render_details(departure: &DepartureSnapshot) -> String {
    format!(
        "  Departs:     {}\n  Arrives:     {}\n  Running:     {} min\n  Price:       {}\n  Total seats: {}",
        departure.departure_time,
        departure.arrival_time,
        departure.running_minutes,
        format_price(departure.price),
        departure.total_seats,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn departure(time: &str, seats: u32) -> DepartureSnapshot {
        DepartureSnapshot {
            departure_time: time.into(),
            arrival_time: "12:00".into(),
            available_seats: seats,
            total_seats: 45,
            running_minutes: 150,
            price: 88.0,
            id: None,
        }
    }

    #[test]
    fn test_render_departures_numbers_rows() {
        let table = render_departures(&[departure("08:00", 0), departure("09:30", 3)], false);

        assert!(table.contains("No."));
        assert!(table.contains("08:00"));
        assert!(table.contains("3/45"));
        assert!(table.contains("Sold out"));
        assert!(table.contains("Available"));
        assert!(table.contains("150 min"));
    }

    #[test]
    fn test_render_details() {
        let details = render_details(&departure("08:00", 0));
        assert!(details.contains("Departs:     08:00"));
        assert!(details.contains("Total seats: 45"));
        assert!(details.contains("¥88"));
    }
}
