//! Ingestion of the four tabular feed files (`stops.txt`, `routes.txt`,
//! `trips.txt`, `stop_times.txt`) into row structs the index builder
//! consumes.
//!
//! Parsing is deliberately decoupled from CSV I/O: [`read_table`] does the
//! (inherently sequential) file read, and each table's row-parsing closure
//! runs over the resulting records with `rayon`, since validating and
//! converting one row never depends on another.

use std::collections::HashMap;
use std::path::Path;

use rayon::prelude::*;

use crate::error::FeedError;
use crate::time::Time;

/// A parsed `stops.txt` row.
#[derive(Debug, Clone)]
pub struct StopRow {
    pub stop_id: i64,
    pub latitude: f64,
    pub longitude: f64,
}

/// A parsed `routes.txt` row. The core engine only needs the id to exist;
/// everything else is left to callers who want the raw feed.
#[derive(Debug, Clone)]
pub struct RouteRow {
    pub route_id: String,
}

/// A parsed `trips.txt` row, carrying every column as string metadata the
/// way the original loader does (so reporting code can surface
/// `trip_short_name`, `service_id`, etc. without the core needing to know
/// about them).
#[derive(Debug, Clone)]
pub struct TripRow {
    pub route_id: String,
    pub trip_id: String,
    pub metadata: HashMap<String, String>,
}

/// A parsed `stop_times.txt` row.
#[derive(Debug, Clone)]
pub struct StopTimeRow {
    pub trip_id: String,
    pub stop_id: i64,
    pub stop_sequence: u32,
    pub arrival: Time,
    pub departure: Time,
}

#[derive(serde::Deserialize)]
struct RawStopRow {
    stop_id: i64,
    stop_lat: f64,
    stop_lon: f64,
}

#[derive(serde::Deserialize)]
struct RawRouteRow {
    route_id: String,
}

#[derive(serde::Deserialize)]
struct RawStopTimeRow {
    trip_id: String,
    arrival_time: String,
    departure_time: String,
    stop_id: i64,
    stop_sequence: u32,
}

/// Deserializes one row into a typed struct, reporting a field that fails to
/// parse as a `MalformedRow` rather than a raw `csv::Error` — the row shape
/// is fine, a value in it just isn't the numeric/time type the column
/// demands.
fn deserialize_row<T: serde::de::DeserializeOwned>(
    record: &csv::StringRecord,
    headers: &csv::StringRecord,
    table: &'static str,
) -> Result<T, FeedError> {
    record.deserialize(Some(headers)).map_err(|e| FeedError::MalformedRow { table, reason: e.to_string() })
}

/// Reads a table's header and every data row, failing fast if the file is
/// absent.
fn read_table(
    path: &Path,
    table: &'static str,
) -> Result<(csv::StringRecord, Vec<csv::StringRecord>), FeedError> {
    if !path.is_file() {
        return Err(FeedError::MissingFile(path.to_path_buf()));
    }
    let mut reader = csv::Reader::from_path(path).map_err(|e| FeedError::Csv { table, source: e })?;
    let headers = reader
        .headers()
        .map_err(|e| FeedError::Csv { table, source: e })?
        .clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record.map_err(|e| FeedError::Csv { table, source: e })?);
    }
    Ok((headers, rows))
}

pub fn read_stops(path: &Path) -> Result<Vec<StopRow>, FeedError> {
    let (headers, rows) = read_table(path, "stops.txt")?;
    rows.into_par_iter()
        .map(|record| {
            let raw: RawStopRow = deserialize_row(&record, &headers, "stops.txt")?;
            Ok(StopRow {
                stop_id: raw.stop_id,
                latitude: raw.stop_lat,
                longitude: raw.stop_lon,
            })
        })
        .collect()
}

pub fn read_routes(path: &Path) -> Result<Vec<RouteRow>, FeedError> {
    let (headers, rows) = read_table(path, "routes.txt")?;
    rows.into_par_iter()
        .map(|record| {
            let raw: RawRouteRow = deserialize_row(&record, &headers, "routes.txt")?;
            Ok(RouteRow { route_id: raw.route_id })
        })
        .collect()
}

pub fn read_trips(path: &Path) -> Result<Vec<TripRow>, FeedError> {
    let (headers, rows) = read_table(path, "trips.txt")?;
    rows.into_par_iter()
        .map(|record| {
            let mut metadata = HashMap::with_capacity(headers.len());
            for (name, value) in headers.iter().zip(record.iter()) {
                metadata.insert(name.to_string(), value.to_string());
            }
            let route_id = metadata.get("route_id").cloned().ok_or_else(|| FeedError::MalformedRow {
                table: "trips.txt",
                reason: "missing route_id column".to_string(),
            })?;
            let trip_id = metadata.get("trip_id").cloned().ok_or_else(|| FeedError::MalformedRow {
                table: "trips.txt",
                reason: "missing trip_id column".to_string(),
            })?;
            Ok(TripRow { route_id, trip_id, metadata })
        })
        .collect()
}

pub fn read_stop_times(path: &Path) -> Result<Vec<StopTimeRow>, FeedError> {
    let (headers, rows) = read_table(path, "stop_times.txt")?;
    rows.into_par_iter()
        .map(|record| {
            let raw: RawStopTimeRow = deserialize_row(&record, &headers, "stop_times.txt")?;
            let arrival = Time::parse_hms(&raw.arrival_time).ok_or_else(|| FeedError::MalformedRow {
                table: "stop_times.txt",
                reason: format!("unparsable arrival_time {:?} for trip {}", raw.arrival_time, raw.trip_id),
            })?;
            let departure = Time::parse_hms(&raw.departure_time).ok_or_else(|| FeedError::MalformedRow {
                table: "stop_times.txt",
                reason: format!("unparsable departure_time {:?} for trip {}", raw.departure_time, raw.trip_id),
            })?;
            Ok(StopTimeRow {
                trip_id: raw.trip_id,
                stop_id: raw.stop_id,
                stop_sequence: raw.stop_sequence,
                arrival,
                departure,
            })
        })
        .collect()
}
