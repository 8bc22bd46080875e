//! Assembles the four feed tables into an [`Index`].
//!
//! Ingestion follows the shape described by the data model: ingest each
//! table, join `stop_times` against `trips` on `trip_id`, sort the merged
//! rows lexicographically by `(route_id, trip_id, stop_sequence)` to derive
//! `RouteStops`/`StopRoutes`, group by `trip_id` for the per-trip schedule,
//! then compute the transfer graph. `RouteTrips` is the one index built
//! straight from `trips.txt`'s own row order rather than from the sorted
//! join, since `earliest_trip` ties break on that order.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::debug;

use crate::error::FeedError;
use crate::feed;
use crate::index::{transfers, Index, StopId, StopSchedule, Trip};

/// Names of the four tabular files within a feed directory, overridable for
/// fixtures or alternate feed layouts.
#[derive(Debug, Clone)]
pub struct TableNames {
    pub stops: String,
    pub routes: String,
    pub trips: String,
    pub stop_times: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            stops: "stops.txt".to_string(),
            routes: "routes.txt".to_string(),
            trips: "trips.txt".to_string(),
            stop_times: "stop_times.txt".to_string(),
        }
    }
}

/// Builds an [`Index`] from a feed directory using the conventional GTFS
/// file names.
pub fn build(base_dir: impl AsRef<Path>) -> Result<Index, FeedError> {
    build_with_tables(base_dir, &TableNames::default())
}

/// Builds an [`Index`], reading tables under the given file names instead of
/// the conventional ones. Used by tests to point at synthetic fixtures.
pub fn build_with_tables(base_dir: impl AsRef<Path>, tables: &TableNames) -> Result<Index, FeedError> {
    let base_dir = base_dir.as_ref();
    let started = Instant::now();

    let stop_rows = feed::read_stops(&base_dir.join(&tables.stops))?;
    let _route_rows = feed::read_routes(&base_dir.join(&tables.routes))?;
    let trip_rows = feed::read_trips(&base_dir.join(&tables.trips))?;
    let stop_time_rows = feed::read_stop_times(&base_dir.join(&tables.stop_times))?;
    debug!(
        stops = stop_rows.len(),
        trips = trip_rows.len(),
        stop_times = stop_time_rows.len(),
        elapsed = ?started.elapsed(),
        "ingested feed tables"
    );

    let now = Instant::now();
    let mut stop_coords = BTreeMap::new();
    for row in &stop_rows {
        stop_coords.insert(row.stop_id, crate::geo::Coordinate::new(row.latitude, row.longitude));
    }

    let mut trip_to_route: HashMap<Arc<str>, Arc<str>> = HashMap::with_capacity(trip_rows.len());
    let mut trip_metadata: HashMap<Arc<str>, HashMap<String, String>> = HashMap::with_capacity(trip_rows.len());
    let mut seen_trip_ids: HashSet<Arc<str>> = HashSet::with_capacity(trip_rows.len());
    // RouteTrips is populated here, in trips.txt's own input order, rather
    // than from the stop_times join below — §4.1.2 step 5 is explicit that
    // this order (not the lexicographic stop_times sort) is what
    // `earliest_trip` breaks ties against.
    let mut route_trips: BTreeMap<Arc<str>, Vec<Arc<str>>> = BTreeMap::new();
    for row in &trip_rows {
        let trip_id: Arc<str> = row.trip_id.as_str().into();
        if !seen_trip_ids.insert(trip_id.clone()) {
            return Err(FeedError::DuplicateTrip(row.trip_id.clone()));
        }
        let route_id: Arc<str> = row.route_id.as_str().into();
        trip_to_route.insert(trip_id.clone(), route_id.clone());
        trip_metadata.insert(trip_id.clone(), row.metadata.clone());
        route_trips.entry(route_id).or_default().push(trip_id);
    }
    debug!(trips = trip_to_route.len(), elapsed = ?now.elapsed(), "indexed trip metadata");

    struct MergedRow {
        route_id: Arc<str>,
        trip_id: Arc<str>,
        stop_id: StopId,
        stop_sequence: u32,
        arrival: crate::time::Time,
        departure: crate::time::Time,
    }

    let now = Instant::now();
    let mut merged: Vec<MergedRow> = Vec::with_capacity(stop_time_rows.len());
    for row in stop_time_rows {
        let trip_id: Arc<str> = row.trip_id.as_str().into();
        let route_id = trip_to_route
            .get(&trip_id)
            .cloned()
            .ok_or_else(|| FeedError::InconsistentReference(row.trip_id.clone()))?;
        if !stop_coords.contains_key(&row.stop_id) {
            return Err(FeedError::MalformedRow {
                table: "stop_times.txt",
                reason: format!("stop_id {} is absent from stops.txt", row.stop_id),
            });
        }
        if row.arrival > row.departure {
            return Err(FeedError::MalformedRow {
                table: "stop_times.txt",
                reason: format!(
                    "arrival {} is after departure {} for trip {} at stop {}",
                    row.arrival, row.departure, row.trip_id, row.stop_id
                ),
            });
        }
        merged.push(MergedRow {
            route_id,
            trip_id,
            stop_id: row.stop_id,
            stop_sequence: row.stop_sequence,
            arrival: row.arrival,
            departure: row.departure,
        });
    }
    merged.sort_by(|a, b| {
        (a.route_id.as_ref(), a.trip_id.as_ref(), a.stop_sequence)
            .cmp(&(b.route_id.as_ref(), b.trip_id.as_ref(), b.stop_sequence))
    });
    debug!(rows = merged.len(), elapsed = ?now.elapsed(), "joined stop_times against trips");

    let now = Instant::now();
    let mut route_stops: BTreeMap<Arc<str>, Vec<StopId>> = BTreeMap::new();
    let mut route_stop_seen: HashMap<Arc<str>, HashSet<StopId>> = HashMap::new();
    let mut stop_routes: BTreeMap<StopId, BTreeSet<Arc<str>>> = BTreeMap::new();
    for row in &merged {
        let seen = route_stop_seen.entry(row.route_id.clone()).or_default();
        if seen.insert(row.stop_id) {
            route_stops.entry(row.route_id.clone()).or_default().push(row.stop_id);
        }
        stop_routes.entry(row.stop_id).or_default().insert(row.route_id.clone());
    }

    let route_stop_position: BTreeMap<Arc<str>, HashMap<StopId, u32>> = route_stops
        .iter()
        .map(|(route, stops)| {
            let positions = stops.iter().enumerate().map(|(i, s)| (*s, i as u32)).collect();
            (route.clone(), positions)
        })
        .collect();
    debug!(
        routes = route_stops.len(),
        elapsed = ?now.elapsed(),
        "built route/stop relationships"
    );

    let now = Instant::now();
    let mut trip_groups: HashMap<Arc<str>, Vec<&MergedRow>> = HashMap::with_capacity(trip_to_route.len());
    for row in &merged {
        trip_groups.entry(row.trip_id.clone()).or_default().push(row);
    }
    let mut trips: HashMap<Arc<str>, Trip> = trip_groups
        .into_par_iter()
        .map(|(trip_id, rows)| {
            let route_id = trip_to_route.get(&trip_id).cloned().expect("trip was validated above");
            let mut stops = HashMap::with_capacity(rows.len());
            for row in rows {
                stops.insert(row.stop_id, StopSchedule { arrival: row.arrival, departure: row.departure });
            }
            let metadata = trip_metadata.get(&trip_id).cloned().unwrap_or_default();
            (trip_id.clone(), Trip { id: trip_id, route_id, metadata, stops })
        })
        .collect();
    // Every trips.txt row gets a Trip entry, even one with no stop_times
    // rows of its own (an empty schedule), matching the original loader's
    // unconditional insert into Trips.
    for (trip_id, route_id) in &trip_to_route {
        trips.entry(trip_id.clone()).or_insert_with(|| Trip {
            id: trip_id.clone(),
            route_id: route_id.clone(),
            metadata: trip_metadata.get(trip_id).cloned().unwrap_or_default(),
            stops: HashMap::new(),
        });
    }
    debug!(trips = trips.len(), elapsed = ?now.elapsed(), "built per-trip schedules");

    let now = Instant::now();
    let mut transfer_graph = transfers::build_transfers(&stop_coords);
    for stop_id in stop_coords.keys() {
        transfer_graph.entry(*stop_id).or_default();
    }
    debug!(stops = stop_coords.len(), elapsed = ?now.elapsed(), "built transfer graph");

    let stop_ids_by_dense_index: Vec<StopId> = stop_coords.keys().copied().collect();
    let stop_dense_index: HashMap<StopId, u32> = stop_ids_by_dense_index
        .iter()
        .enumerate()
        .map(|(i, s)| (*s, i as u32))
        .collect();

    debug!(elapsed = ?started.elapsed(), "built index");

    Ok(Index {
        stop_coords,
        stop_dense_index,
        stop_ids_by_dense_index,
        route_stops,
        route_stop_position,
        route_trips,
        stop_routes,
        transfers: transfer_graph,
        trips,
    })
}
