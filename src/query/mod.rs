//! The RAPTOR query engine: given a built [`crate::index::Index`], a source
//! stop, a destination stop, a departure time, and a round bound `K`, finds
//! the earliest arrival and one optimal path.

mod engine;

use std::sync::Arc;

use crate::index::StopId;

pub use engine::{earliest_trip, raptor};

/// One leg of a journey: either a walking transfer or a ride on a trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepKind {
    Walk,
    Ride,
}

impl StepKind {
    /// The label used in human-readable reports.
    pub fn label(&self) -> &'static str {
        match self {
            StepKind::Walk => "WALK",
            StepKind::Ride => "BUS/TRAIN",
        }
    }
}

/// A single leg of a reconstructed journey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    pub kind: StepKind,
    pub stop1: StopId,
    pub stop2: StopId,
    /// `Some` for a ride, `None` for a walking transfer.
    pub trip_id: Option<Arc<str>>,
    /// Walking duration in seconds; zero for a ride.
    pub walk_time: u32,
    pub start_time: u32,
    pub end_time: u32,
    /// The round in which this leg's arrival at `stop2` was set.
    pub round: usize,
}

/// The outcome of a [`raptor`] query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaptorResult {
    /// Earliest arrival time in seconds since midnight, or `-1` if the
    /// destination is unreachable within `K` rounds.
    pub arrival: i64,
    pub path: Vec<PathStep>,
}
