use thiserror::Error;

/// Failures that can occur while building a transit [`crate::index::Index`] from a feed.
///
/// Build errors are always fatal: no partial index is ever published (§7).
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("missing required feed file: {0}")]
    MissingFile(std::path::PathBuf),

    #[error("malformed row in {table}: {reason}")]
    MalformedRow {
        table: &'static str,
        reason: String,
    },

    #[error("stop_times row references trip_id {0:?} absent from trips.txt")]
    InconsistentReference(String),

    #[error("duplicate trip_id {0:?} in trips.txt")]
    DuplicateTrip(String),

    #[error("failed to read {table}: {source}")]
    Csv {
        table: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures a query can report without touching the (read-only) index.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryError {
    #[error("stop id {0} is not present in the transit index")]
    UnknownStop(i64),

    #[error("invalid query bound: K must be >= 1 and departure must be >= 0")]
    InvalidBound,
}
