mod common;

use std::collections::HashSet;

use common::Feed;
use raptor_transit::geo::{walk_seconds, TRANSFER_RADIUS_METERS};

/// A feed with enough routes, transfers, and a reachable-but-multi-leg
/// destination to exercise every invariant in one build.
fn sample_feed() -> Feed {
    Feed::new()
        .stop(1, 0.0, 0.0) // A
        .stop(2, 0.0, 0.01) // B1
        .stop(3, 0.0005, 0.0100) // B2, ~55m from B1
        .stop(4, 0.0, 0.02) // C
        .stop(5, 5.0, 5.0) // Z, isolated
        .route("R1")
        .route("R2")
        .trip("R1", "T1")
        .trip("R1", "T1b")
        .trip("R2", "T2")
        .stop_time("T1", 1, 1, "10:00:00", "10:00:00")
        .stop_time("T1", 2, 2, "10:05:00", "10:05:00")
        .stop_time("T1b", 1, 1, "10:30:00", "10:30:00")
        .stop_time("T1b", 2, 2, "10:35:00", "10:35:00")
        .stop_time("T2", 3, 1, "10:07:00", "10:07:00")
        .stop_time("T2", 4, 2, "10:15:00", "10:15:00")
}

/// Invariant 1: every stop_id referenced by stop_times is present in
/// StopCoords.
#[test]
fn stop_times_stops_are_covered_by_stop_coords() {
    let (_dir, index) = sample_feed().build();
    for trip in index.trips() {
        for stop in trip.stops.keys() {
            assert!(index.stop_coordinate(*stop).is_some(), "stop {stop} missing from StopCoords");
        }
    }
}

/// Invariant 2 & 5: trip stops are a subset of RouteStops[route], and
/// RouteStops/StopRoutes agree in both directions.
#[test]
fn route_and_stop_indices_cross_reference() {
    let (_dir, index) = sample_feed().build();

    for trip in index.trips() {
        let route_stops = index.route_stops(&trip.route_id).expect("trip's route exists");
        for stop in trip.stops.keys() {
            assert!(route_stops.contains(stop), "trip {} visits stop {stop} outside RouteStops", trip.id);
        }
    }

    for route in index.route_ids() {
        for &stop in index.route_stops(route).unwrap() {
            let stop_routes = index.stop_routes(stop).expect("stop has routes");
            assert!(stop_routes.contains(route.as_ref()), "StopRoutes[{stop}] missing {route}");
        }
    }

    for &stop in index.stop_ids() {
        if let Some(routes) = index.stop_routes(stop) {
            for route in routes {
                let route_stops = index.route_stops(route).expect("route exists");
                assert!(route_stops.contains(&stop), "RouteStops[{route}] missing {stop}");
            }
        }
    }
}

/// Invariant 3 & 4: the transfer graph is symmetric, self-free, and every
/// edge respects the radius/speed constants.
#[test]
fn transfers_are_symmetric_and_within_radius() {
    let (_dir, index) = sample_feed().build();

    for &a in index.stop_ids() {
        for &(b, walk) in index.transfers(a) {
            assert_ne!(a, b, "stop {a} has a self-transfer");
            let reciprocal = index.transfers(b).iter().any(|&(n, w)| n == a && w == walk);
            assert!(reciprocal, "transfer {a}->{b} ({walk}s) has no matching reverse edge");

            let coord_a = index.stop_coordinate(a).unwrap();
            let coord_b = index.stop_coordinate(b).unwrap();
            let distance = coord_a.haversine_meters(&coord_b);
            assert!(distance <= TRANSFER_RADIUS_METERS, "transfer {a}->{b} exceeds the radius: {distance}m");
            assert_eq!(walk, walk_seconds(distance));
        }
    }

    // The isolated stop still gets an (empty) entry, matching the
    // resolved open question on |StopCoords| vs |Transfers|.
    assert!(index.transfers(5).is_empty());
}

/// Invariant 6: two builds from the same feed files are bit-identical.
#[test]
fn build_is_deterministic() {
    let dir = sample_feed().dir();
    let first = raptor_transit::index::build(dir.path()).unwrap();
    let second = raptor_transit::index::build(dir.path()).unwrap();
    assert_eq!(first, second);
}

/// Invariant 7: widening the round budget never makes the arrival later.
#[test]
fn more_rounds_never_hurts() {
    let (_dir, index) = sample_feed().build();
    let departure = 9 * 3600;

    let mut previous = i64::MAX;
    for k in 1..=4 {
        let result = raptor_transit::raptor(&index, 1, 4, departure, k).unwrap();
        let arrival = if result.arrival < 0 { i64::MAX } else { result.arrival };
        assert!(arrival <= previous, "K={k} arrival {arrival} is worse than K={}'s {previous}", k - 1);
        previous = arrival;
    }
}

/// Invariant 8: querying a stop against itself returns the departure time
/// with no path, pinning the chosen behavior for this ambiguous case.
#[test]
fn source_equals_destination_returns_departure_with_empty_path() {
    let (_dir, index) = sample_feed().build();
    let departure = 9 * 3600;
    let result = raptor_transit::raptor(&index, 1, 1, departure, 3).unwrap();
    assert_eq!(result.arrival, departure);
    assert!(result.path.is_empty());
}

/// Invariant 9: earliest_trip returns a trip that is actually in the set of
/// trips with the minimal qualifying departure.
#[test]
fn earliest_trip_matches_brute_force_minimum() {
    let (_dir, index) = sample_feed().build();
    let not_before = 10 * 3600 + 10 * 60; // 10:10:00, after T1 but before T1b

    let found = raptor_transit::earliest_trip(&index, "R1", 1, not_before).unwrap();
    assert_eq!(found.as_ref(), "T1b");

    let mut candidates: Vec<(u32, &str)> = index
        .route_trips("R1")
        .unwrap()
        .iter()
        .filter_map(|trip_id| {
            let trip = index.trip(trip_id)?;
            let departure = trip.stops.get(&1)?.departure.as_seconds();
            (departure >= not_before).then_some((departure, trip_id.as_ref()))
        })
        .collect();
    candidates.sort();
    assert_eq!(found.as_ref(), candidates[0].1);
}

/// Path reconstruction consistency: segment endpoints chain, and the first
/// and last legs bound the query's departure/arrival times.
#[test]
fn path_segments_chain_from_source_to_destination() {
    let (_dir, index) = sample_feed().build();
    let departure = 9 * 3600 + 30 * 60;
    let result = raptor_transit::raptor(&index, 1, 4, departure, 3).unwrap();

    assert!(!result.path.is_empty());
    assert_eq!(result.path[0].stop1, 1);
    assert_eq!(result.path.last().unwrap().stop2, 4);
    assert!(result.path[0].start_time as i64 >= departure);
    assert_eq!(result.path.last().unwrap().end_time as i64, result.arrival);

    for pair in result.path.windows(2) {
        assert_eq!(pair[0].stop2, pair[1].stop1);
    }
}

/// Sanity check over stop ids: no duplicates, every id from the feed present.
#[test]
fn stop_ids_are_exactly_the_feed_stops() {
    let (_dir, index) = sample_feed().build();
    let ids: HashSet<_> = index.stop_ids().iter().copied().collect();
    assert_eq!(ids, HashSet::from([1, 2, 3, 4, 5]));
    assert_eq!(ids.len(), index.stop_ids().len());
}
