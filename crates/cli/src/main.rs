//! Command-line driver for the RAPTOR routing engine.
//!
//! Builds an index from a feed directory, optionally runs a self-check
//! pass, then either answers one pinned (source, dest, departure) query or
//! generates a batch of random queries, writing a human-readable report to
//! `raptor_results_<iterations>.txt`.

use std::collections::HashSet;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use raptor_transit::index::Index;
use raptor_transit::reporting;

const DEFAULT_ITERATIONS: u32 = 500;
const DEFAULT_K: i64 = 5;
const RANDOM_DEPARTURE_WINDOW: std::ops::Range<i64> = 36_000..64_800;

struct Args {
    iterations: u32,
    dataset: PathBuf,
    source: Option<i64>,
    dest: Option<i64>,
    departure: Option<i64>,
    run_tests: bool,
}

fn parse_args() -> Args {
    let mut iterations = DEFAULT_ITERATIONS;
    let mut dataset = PathBuf::from(".");
    let mut source = None;
    let mut dest = None;
    let mut departure = None;
    let mut run_tests = false;
    let mut positional_consumed = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dataset" => {
                if let Some(value) = args.next() {
                    dataset = PathBuf::from(value);
                }
            }
            "--source" => source = args.next().and_then(|v| v.parse().ok()),
            "--dest" => dest = args.next().and_then(|v| v.parse().ok()),
            "--departure" => departure = args.next().and_then(|v| v.parse().ok()),
            "--run-tests" => run_tests = true,
            other if !positional_consumed && !other.starts_with("--") => {
                iterations = other.parse().unwrap_or(DEFAULT_ITERATIONS);
                positional_consumed = true;
            }
            other => eprintln!("ignoring unrecognized argument: {other}"),
        }
    }

    Args { iterations, dataset, source, dest, departure, run_tests }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let args = parse_args();

    let index = match raptor_transit::index::build(&args.dataset) {
        Ok(index) => index,
        Err(err) => {
            tracing::error!(error = %err, "failed to build transit index");
            return ExitCode::FAILURE;
        }
    };

    if args.run_tests {
        run_self_checks(&index, &args.dataset);
    }

    let filename = format!("raptor_results_{}.txt", args.iterations);
    let file = match std::fs::File::create(&filename) {
        Ok(file) => file,
        Err(err) => {
            tracing::error!(error = %err, file = %filename, "failed to open report file");
            return ExitCode::FAILURE;
        }
    };
    let mut writer = BufWriter::new(file);

    match (args.source, args.dest, args.departure) {
        (Some(source), Some(dest), Some(departure)) => {
            run_fixed_query(&index, source, dest, departure, args.iterations, &mut writer)
        }
        _ => run_random_queries(&index, args.iterations, &mut writer),
    }

    ExitCode::SUCCESS
}

/// Runs the same pinned query `iterations` times (so the caller can time
/// it) and writes a single report block.
fn run_fixed_query(
    index: &Index,
    source: i64,
    dest: i64,
    departure: i64,
    iterations: u32,
    writer: &mut impl Write,
) {
    let mut result = None;
    for _ in 0..iterations.max(1) {
        result = Some(raptor_transit::raptor(index, source, dest, departure, DEFAULT_K));
    }
    match result.expect("iterations is clamped to at least one run") {
        Ok(result) => {
            reporting::write_query_report(writer, source, dest, departure as u32, &result)
                .expect("failed to write query report");
        }
        Err(err) => tracing::error!(error = %err, "query failed"),
    }
}

/// Replays the original random query generator: `iterations` queries
/// between random stops, with departures uniform over [10:00:00, 18:00:00).
fn run_random_queries(index: &Index, iterations: u32, writer: &mut impl Write) {
    let stop_ids = index.stop_ids();
    if stop_ids.len() < 2 {
        tracing::warn!("feed has fewer than two stops; skipping random query generation");
        return;
    }

    let rng = fastrand::Rng::new();
    for _ in 0..iterations {
        let departure = rng.i64(RANDOM_DEPARTURE_WINDOW);
        let source = stop_ids[rng.usize(0..stop_ids.len())];
        let mut dest = stop_ids[rng.usize(0..stop_ids.len())];
        while dest == source {
            dest = stop_ids[rng.usize(0..stop_ids.len())];
        }

        let result = raptor_transit::raptor(index, source, dest, departure, DEFAULT_K)
            .expect("source and dest were drawn from the index, K and departure are valid");
        reporting::write_query_report(writer, source, dest, departure as u32, &result)
            .expect("failed to write query report");
    }
}

/// Mirrors the original `conduct_unit_tests`: CSV row counts reconciled
/// against the built index, a seeded cross-consistency check between
/// `StopRoutes` and `RouteStops` for a handful of random stops, and one
/// `earliest_trip` spot check against a brute-force reference.
fn run_self_checks(index: &Index, dataset: &Path) {
    let stops_rows = count_csv_rows(&dataset.join("stops.txt"));
    let trips_rows = count_csv_rows(&dataset.join("trips.txt"));
    let routes_rows = count_csv_rows(&dataset.join("routes.txt"));

    assert_eq!(stops_rows, index.stop_count(), "stops.txt row count does not match the index");
    assert_eq!(trips_rows, index.trip_count(), "trips.txt row count does not match the index");
    assert_eq!(routes_rows, index.route_count(), "routes.txt row count does not match the index");
    println!("Assert passed - CSV row counts match data structures.");

    let stop_ids = index.stop_ids();
    let rng = fastrand::Rng::with_seed(1);
    let sample_size = 5.min(stop_ids.len());
    let mut sampled_stops = HashSet::new();
    while sampled_stops.len() < sample_size {
        sampled_stops.insert(stop_ids[rng.usize(0..stop_ids.len())]);
    }

    for &stop_id in &sampled_stops {
        let routes = index.stop_routes(stop_id).expect("sampled stop has at least one route");
        assert!(!routes.is_empty());
        for route in routes {
            let route_stops = index.route_stops(route).expect("route listed in StopRoutes must exist");
            assert!(route_stops.contains(&stop_id));
        }
    }
    println!("Assert passed - StopRoutes entries validated for {sample_size} random stops");

    let routes_with_stops: Vec<_> = index
        .route_ids()
        .filter(|route| index.route_stops(route).is_some_and(|stops| !stops.is_empty()))
        .cloned()
        .collect();
    if !routes_with_stops.is_empty() {
        let test_route = &routes_with_stops[rng.usize(0..routes_with_stops.len())];
        let board_stop = index.route_stops(test_route).expect("route has stops")[0];
        let board_time = 0;

        let expected = expected_earliest_trip(index, test_route, board_stop, board_time);
        let found = raptor_transit::earliest_trip(index, test_route, board_stop, board_time);
        assert_eq!(found, expected, "earliest_trip mismatch for route {test_route}");
        println!("Assert passed - earliest_trip returned expected trip id for route {test_route}");
    }

    println!("ALL ASSERTIONS PASSED");
}

/// Brute-force reference for `earliest_trip`, scanning every trip on the
/// route instead of relying on the engine's own implementation.
fn expected_earliest_trip(
    index: &Index,
    route: &str,
    board_stop: i64,
    not_before: u32,
) -> Option<std::sync::Arc<str>> {
    let mut best: Option<(u32, std::sync::Arc<str>)> = None;
    for trip_id in index.route_trips(route).unwrap_or(&[]) {
        let Some(trip) = index.trip(trip_id) else { continue };
        let Some(schedule) = trip.stops.get(&board_stop) else { continue };
        let departure = schedule.departure.as_seconds();
        if departure < not_before {
            continue;
        }
        match &best {
            None => best = Some((departure, trip_id.clone())),
            Some((best_departure, _)) if departure < *best_departure => {
                best = Some((departure, trip_id.clone()))
            }
            _ => {}
        }
    }
    best.map(|(_, id)| id)
}

fn count_csv_rows(path: &Path) -> usize {
    let content = std::fs::read_to_string(path).expect("self-check requires a readable feed file");
    content.lines().filter(|line| !line.trim().is_empty()).count().saturating_sub(1)
}
