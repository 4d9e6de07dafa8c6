//! Parsing of the semicolon-delimited CSV archives (historical prices and
//! events).

use super::DataSourceError;
use crate::domain::{parse_day, Event, PricePoint};
use std::path::Path;

fn reader(bytes: &[u8]) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes)
}

/// Read a whole archive file into memory.
pub async fn read_file(path: &Path) -> Result<Vec<u8>, DataSourceError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| DataSourceError::Io(format!("{}: {}", path.display(), e)))
}

/// Parse the historical price archive.
///
/// Only the `Start` (date) and `Close` (price) columns are used; any other
/// columns are ignored. The result is sorted ascending by date.
pub fn parse_historical(csv_bytes: &[u8]) -> Result<Vec<PricePoint>, DataSourceError> {
    #[derive(Debug, serde::Deserialize)]
    struct Row {
        #[serde(rename = "Start")]
        start: String,
        #[serde(rename = "Close")]
        close: String,
    }

    let mut points = Vec::new();
    for record in reader(csv_bytes).deserialize::<Row>() {
        let row = record.map_err(|e| DataSourceError::ParseError(e.to_string()))?;
        let date = parse_day(&row.start)
            .ok_or_else(|| DataSourceError::ParseError(format!("invalid Start: {}", row.start)))?;
        let price = row
            .close
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p > 0.0)
            .ok_or_else(|| DataSourceError::ParseError(format!("invalid Close: {}", row.close)))?;
        points.push(PricePoint::new(date, price));
    }

    points.sort_by_key(|p| p.date);
    Ok(points)
}

/// Parse the events archive (`date;event;impact`), sorted ascending by date.
pub fn parse_events(csv_bytes: &[u8]) -> Result<Vec<Event>, DataSourceError> {
    #[derive(Debug, serde::Deserialize)]
    struct Row {
        date: String,
        event: String,
        impact: String,
    }

    let mut events = Vec::new();
    for record in reader(csv_bytes).deserialize::<Row>() {
        let row = record.map_err(|e| DataSourceError::ParseError(e.to_string()))?;
        let date = parse_day(&row.date)
            .ok_or_else(|| DataSourceError::ParseError(format!("invalid date: {}", row.date)))?;
        events.push(Event::new(date, row.event, row.impact));
    }

    // Stable: events on the same day keep archive order.
    events.sort_by_key(|e| e.date);
    Ok(events)
}
