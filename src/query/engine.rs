//! Round-based RAPTOR search.
//!
//! Each round `k` improves `arr[k][·]` over `arr[k-1][·]` in three phases:
//!
//! - **Phase A** — for every marked stop, find the earliest position within
//!   each of its routes that still needs to be scanned.
//! - **Phase B** — scan each candidate route once from that position,
//!   boarding the earliest trip reachable from the previous round's label
//!   and relaxing arrivals along the rest of the route.
//! - **Phase C** — relax one step of foot transfers from stops newly
//!   improved in phase B, using the *previous* round's label as the basis
//!   (a transfer taken in round k must not itself depend on something else
//!   improved in round k).
//!
//! Stop lookups go through dense `0..stop_count()` indices internally so the
//! per-round label arrays are plain `Vec`s rather than hash maps.

use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;

use crate::error::QueryError;
use crate::index::{Index, StopId};
use crate::query::{PathStep, RaptorResult, StepKind};

/// Above this many marked stops (or candidate trips), phase A's route
/// collection and `earliest_trip`'s scan switch to a `rayon` reduction. The
/// reduction folds on numeric minimums only, so it produces results
/// identical to the sequential path regardless of task interleaving.
const PARALLEL_THRESHOLD: usize = 200;

#[derive(Debug, Clone)]
enum ParentMode {
    Walk { walk_seconds: u32 },
    Ride { trip_id: Arc<str> },
}

#[derive(Debug, Clone)]
struct Parent {
    prev_stop: StopId,
    prev_round: usize,
    mode: ParentMode,
}

/// Runs a RAPTOR query for the earliest arrival at `dest` departing `source`
/// no earlier than `departure`, bounded to `k` rounds (transfers).
pub fn raptor(
    index: &Index,
    source: StopId,
    dest: StopId,
    departure: i64,
    k: i64,
) -> Result<RaptorResult, QueryError> {
    if departure < 0 || k < 1 {
        return Err(QueryError::InvalidBound);
    }
    let source_dense = index.dense_index(source).ok_or(QueryError::UnknownStop(source))?;
    let dest_dense = index.dense_index(dest).ok_or(QueryError::UnknownStop(dest))?;
    let departure = departure as u32;
    let k = k as usize;
    let n = index.stop_count();

    // arr[round][stop]; round 0 holds only the source label.
    let mut arr: Vec<Vec<Option<u32>>> = vec![vec![None; n]; k + 1];
    let mut best: Vec<Option<u32>> = vec![None; n];
    let mut parent: HashMap<(u32, usize), Parent> = HashMap::new();

    arr[0][source_dense as usize] = Some(departure);
    best[source_dense as usize] = Some(departure);

    let mut marked: Vec<u32> = vec![source_dense];

    for round in 1..=k {
        if marked.is_empty() {
            break;
        }

        let q = collect_candidate_routes(index, &marked);
        marked.clear();

        let mut marked_by_trip: Vec<u32> = Vec::new();
        for (route, &start_pos) in &q {
            let route_stops = index.route_stops(route).expect("route came from Q");
            let boarding_stop = route_stops[start_pos];
            let boarding_dense = index.dense_index(boarding_stop).expect("stop exists");
            let Some(boarding_time) = arr[round - 1][boarding_dense as usize] else {
                continue;
            };

            let Some(trip_id) = earliest_trip(index, route, boarding_stop, boarding_time) else {
                continue;
            };
            let trip = index.trip(&trip_id).expect("trip came from route_trips");
            let boarding_departure = trip.stops[&boarding_stop].departure.as_seconds();

            for &stop in &route_stops[start_pos..] {
                let Some(schedule) = trip.stops.get(&stop) else {
                    continue;
                };
                let trip_arrival = schedule.arrival.as_seconds();
                if trip_arrival < boarding_departure {
                    continue;
                }
                let stop_dense = index.dense_index(stop).expect("stop exists");
                let improves = match arr[round][stop_dense as usize] {
                    None => true,
                    Some(current) => trip_arrival < current,
                };
                if improves {
                    arr[round][stop_dense as usize] = Some(trip_arrival);
                    best[stop_dense as usize] = Some(match best[stop_dense as usize] {
                        None => trip_arrival,
                        Some(b) => b.min(trip_arrival),
                    });
                    parent.insert(
                        (stop_dense, round),
                        Parent { prev_stop: boarding_stop, prev_round: round - 1, mode: ParentMode::Ride { trip_id: trip_id.clone() } },
                    );
                    marked_by_trip.push(stop_dense);
                }
            }
        }
        marked.extend_from_slice(&marked_by_trip);

        let mut marked_by_walk: Vec<u32> = Vec::new();
        for &m_dense in &marked_by_trip {
            let Some(base_time) = arr[round - 1][m_dense as usize] else {
                continue;
            };
            let m_id = index.stop_id_at(m_dense);
            for &(neighbor, walk) in index.transfers(m_id) {
                let candidate = base_time + walk;
                let neighbor_dense = index.dense_index(neighbor).expect("stop exists");
                let improves = match arr[round][neighbor_dense as usize] {
                    None => true,
                    Some(current) => candidate < current,
                };
                if improves {
                    arr[round][neighbor_dense as usize] = Some(candidate);
                    best[neighbor_dense as usize] = Some(match best[neighbor_dense as usize] {
                        None => candidate,
                        Some(b) => b.min(candidate),
                    });
                    parent.insert(
                        (neighbor_dense, round),
                        Parent { prev_stop: m_id, prev_round: round - 1, mode: ParentMode::Walk { walk_seconds: walk } },
                    );
                    marked_by_walk.push(neighbor_dense);
                }
            }
        }
        marked.extend(marked_by_walk);
        marked.sort_unstable();
        marked.dedup();
    }

    let Some(best_arrival) = best[dest_dense as usize] else {
        return Ok(RaptorResult { arrival: -1, path: Vec::new() });
    };

    let k_star = (0..=k)
        .find(|&round| arr[round][dest_dense as usize] == Some(best_arrival))
        .expect("best arrival must have been set in some round");

    let path = trace_back(index, &arr, &parent, dest_dense, k_star);

    Ok(RaptorResult { arrival: best_arrival as i64, path })
}

/// Phase A: earliest position, per candidate route, among this round's
/// marked stops.
fn collect_candidate_routes(index: &Index, marked: &[u32]) -> HashMap<Arc<str>, usize> {
    let scan = |stop_dense: u32, local: &mut HashMap<Arc<str>, usize>| {
        let stop_id = index.stop_id_at(stop_dense);
        let Some(routes) = index.stop_routes(stop_id) else {
            return;
        };
        for route in routes {
            let Some(pos) = index.route_stop_position(route, stop_id) else {
                continue;
            };
            local
                .entry(route.clone())
                .and_modify(|best| *best = (*best).min(pos as usize))
                .or_insert(pos as usize);
        }
    };

    if marked.len() <= PARALLEL_THRESHOLD {
        let mut q = HashMap::new();
        for &stop in marked {
            scan(stop, &mut q);
        }
        return q;
    }

    marked
        .par_iter()
        .fold(HashMap::new, |mut local, &stop| {
            scan(stop, &mut local);
            local
        })
        .reduce(HashMap::new, |mut a, b| {
            for (route, pos) in b {
                a.entry(route).and_modify(|best| *best = (*best).min(pos)).or_insert(pos);
            }
            a
        })
}

/// Earliest trip on `route` that can still be boarded at `board_stop` no
/// earlier than `not_before`, breaking ties by position within the route's
/// trip list (i.e. first occurrence in `RouteTrips`).
pub fn earliest_trip(index: &Index, route: &str, board_stop: StopId, not_before: u32) -> Option<Arc<str>> {
    let trips = index.route_trips(route)?;

    let candidate = |i: usize, trip_id: &Arc<str>| -> Option<(u32, usize)> {
        let trip = index.trip(trip_id)?;
        let schedule = trip.stops.get(&board_stop)?;
        let departure = schedule.departure.as_seconds();
        (departure >= not_before).then_some((departure, i))
    };

    let best = if trips.len() <= PARALLEL_THRESHOLD {
        trips.iter().enumerate().filter_map(|(i, t)| candidate(i, t)).min()
    } else {
        trips.par_iter().enumerate().filter_map(|(i, t)| candidate(i, t)).min()
    };

    best.map(|(_, i)| trips[i].clone())
}

fn trace_back(
    index: &Index,
    arr: &[Vec<Option<u32>>],
    parent: &HashMap<(u32, usize), Parent>,
    dest_dense: u32,
    k_star: usize,
) -> Vec<PathStep> {
    let mut path = Vec::new();
    let mut stop_dense = dest_dense;
    let mut round = k_star;

    while let Some(p) = parent.get(&(stop_dense, round)) {
        let stop_id = index.stop_id_at(stop_dense);
        let prev_dense = index.dense_index(p.prev_stop).expect("stop exists");
        let start_time = arr[p.prev_round][prev_dense as usize].expect("parent label exists");
        let end_time = arr[round][stop_dense as usize].expect("current label exists");

        let step = match &p.mode {
            ParentMode::Walk { walk_seconds } => PathStep {
                kind: StepKind::Walk,
                stop1: p.prev_stop,
                stop2: stop_id,
                trip_id: None,
                walk_time: *walk_seconds,
                start_time,
                end_time,
                round,
            },
            ParentMode::Ride { trip_id } => {
                let trip = index.trip(trip_id).expect("trip exists");
                let start_time = trip.stops[&p.prev_stop].departure.as_seconds();
                let end_time = trip.stops[&stop_id].arrival.as_seconds();
                PathStep {
                    kind: StepKind::Ride,
                    stop1: p.prev_stop,
                    stop2: stop_id,
                    trip_id: Some(trip_id.clone()),
                    walk_time: 0,
                    start_time,
                    end_time,
                    round,
                }
            }
        };
        path.push(step);

        stop_dense = prev_dense;
        round = p.prev_round;
    }

    path.reverse();
    path
}
