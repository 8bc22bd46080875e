//! The immutable, query-optimized transit index.
//!
//! An [`Index`] is built once from a feed directory and then shared
//! read-only across however many concurrent [`crate::query::raptor`] calls
//! the caller wants to run — there is no interior mutability and therefore
//! nothing to lock.

mod builder;
mod transfers;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use crate::geo::Coordinate;
use crate::time::Time;

pub use builder::{build, build_with_tables, TableNames};

/// External stop identifier, as it appears in the feed.
pub type StopId = i64;

/// The scheduled arrival/departure pair for one stop along one trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopSchedule {
    pub arrival: Time,
    pub departure: Time,
}

/// A single scheduled vehicle journey.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub id: Arc<str>,
    pub route_id: Arc<str>,
    /// Every column from `trips.txt` for this row, keyed by column name —
    /// including `route_id`/`trip_id` themselves.
    pub metadata: HashMap<String, String>,
    pub stops: HashMap<StopId, StopSchedule>,
}

/// The built transit network: stop/route/trip relationships, per-trip
/// schedules, and the symmetric walking-transfer graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    stop_coords: BTreeMap<StopId, Coordinate>,
    stop_dense_index: HashMap<StopId, u32>,
    stop_ids_by_dense_index: Vec<StopId>,
    route_stops: BTreeMap<Arc<str>, Vec<StopId>>,
    route_stop_position: BTreeMap<Arc<str>, HashMap<StopId, u32>>,
    route_trips: BTreeMap<Arc<str>, Vec<Arc<str>>>,
    stop_routes: BTreeMap<StopId, BTreeSet<Arc<str>>>,
    transfers: BTreeMap<StopId, Vec<(StopId, u32)>>,
    trips: HashMap<Arc<str>, Trip>,
}

impl Index {
    pub fn stop_count(&self) -> usize {
        self.stop_ids_by_dense_index.len()
    }

    pub fn route_count(&self) -> usize {
        self.route_stops.len()
    }

    pub fn trip_count(&self) -> usize {
        self.trips.len()
    }

    pub fn stop_ids(&self) -> &[StopId] {
        &self.stop_ids_by_dense_index
    }

    pub fn stop_coordinate(&self, stop: StopId) -> Option<Coordinate> {
        self.stop_coords.get(&stop).copied()
    }

    /// Dense `0..stop_count()` index for a stop id, used internally by the
    /// query engine for O(1) array indexing.
    pub(crate) fn dense_index(&self, stop: StopId) -> Option<u32> {
        self.stop_dense_index.get(&stop).copied()
    }

    pub(crate) fn stop_id_at(&self, dense: u32) -> StopId {
        self.stop_ids_by_dense_index[dense as usize]
    }

    pub fn route_ids(&self) -> impl Iterator<Item = &Arc<str>> {
        self.route_stops.keys()
    }

    pub fn route_stops(&self, route: &str) -> Option<&[StopId]> {
        self.route_stops.get(route).map(Vec::as_slice)
    }

    pub(crate) fn route_stop_position(&self, route: &str, stop: StopId) -> Option<u32> {
        self.route_stop_position.get(route)?.get(&stop).copied()
    }

    pub fn route_trips(&self, route: &str) -> Option<&[Arc<str>]> {
        self.route_trips.get(route).map(Vec::as_slice)
    }

    pub fn stop_routes(&self, stop: StopId) -> Option<&BTreeSet<Arc<str>>> {
        self.stop_routes.get(&stop)
    }

    pub fn transfers(&self, stop: StopId) -> &[(StopId, u32)] {
        self.transfers.get(&stop).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn trip(&self, trip_id: &str) -> Option<&Trip> {
        self.trips.get(trip_id)
    }

    pub fn trips(&self) -> impl Iterator<Item = &Trip> {
        self.trips.values()
    }
}
