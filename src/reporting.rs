//! Human-readable query reports, in the same layout the original random
//! query generator wrote to `raptor_results_<N>.txt`.

use std::io::{self, Write};

use crate::index::StopId;
use crate::query::{RaptorResult, StepKind};
use crate::time::Time;

const SEPARATOR: &str = "============================================";

/// Writes one query's report block: header lines, a numbered leg per
/// [`crate::query::PathStep`], and a trailing separator.
pub fn write_query_report(
    out: &mut impl Write,
    source: StopId,
    dest: StopId,
    departure: u32,
    result: &RaptorResult,
) -> io::Result<()> {
    writeln!(out, "Source stop: {source}")?;
    writeln!(out, "Dest stop: {dest}")?;
    writeln!(out, "Departure time: {}", Time::from_seconds(departure))?;

    if result.arrival < 0 {
        writeln!(out, "No path found.")?;
        writeln!(out, "{SEPARATOR}")?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "Arrival time: {}", Time::from_seconds(result.arrival as u32))?;
    writeln!(out, "Transfers: {}", result.path.len().saturating_sub(1))?;
    writeln!(out)?;

    for (i, step) in result.path.iter().enumerate() {
        writeln!(out, "{} - {}:", i + 1, step.kind.label())?;
        match step.kind {
            StepKind::Walk => {
                writeln!(out, "Walk from stop {} to stop {}", step.stop1, step.stop2)?;
                writeln!(
                    out,
                    "Start: {}, End: {}",
                    Time::from_seconds(step.start_time),
                    Time::from_seconds(step.end_time)
                )?;
                writeln!(out, "Walking time: {} min {} s", step.walk_time / 60, step.walk_time % 60)?;
            }
            StepKind::Ride => {
                writeln!(out, "Board stop {}; Get down at stop {}", step.stop1, step.stop2)?;
                writeln!(
                    out,
                    "Start: {}, End: {}",
                    Time::from_seconds(step.start_time),
                    Time::from_seconds(step.end_time)
                )?;
                let transit_time = step.end_time - step.start_time;
                writeln!(out, "Transit time: {} min {} s", transit_time / 60, transit_time % 60)?;
            }
        }
        writeln!(out)?;
    }

    writeln!(out, "{SEPARATOR}")?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::PathStep;
    use std::sync::Arc;

    #[test]
    fn reports_unreachable_destination() {
        let mut buf = Vec::new();
        let result = RaptorResult { arrival: -1, path: Vec::new() };
        write_query_report(&mut buf, 1, 2, 36000, &result).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("No path found."));
        assert!(text.contains("10:00:00"));
    }

    #[test]
    fn reports_a_single_ride_leg() {
        let mut buf = Vec::new();
        let result = RaptorResult {
            arrival: 36300,
            path: vec![PathStep {
                kind: StepKind::Ride,
                stop1: 1,
                stop2: 2,
                trip_id: Some(Arc::from("trip-1")),
                walk_time: 0,
                start_time: 36000,
                end_time: 36300,
                round: 1,
            }],
        };
        write_query_report(&mut buf, 1, 2, 36000, &result).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Transfers: 0"));
        assert!(text.contains("Board stop 1; Get down at stop 2"));
        assert!(text.contains("Transit time: 5 min 0 s"));
    }
}
