//! A RAPTOR-based public transit routing engine.
//!
//! [`index::build`] ingests a directory of GTFS-style tabular feed files
//! into an immutable [`index::Index`]; [`query::raptor`] then answers
//! earliest-arrival queries against it with a configurable round bound.

pub mod error;
pub mod geo;
pub mod index;
pub mod query;
pub mod reporting;
pub mod time;

mod feed;

pub use error::{FeedError, QueryError};
pub use index::Index;
pub use query::{earliest_trip, raptor, PathStep, RaptorResult, StepKind};
