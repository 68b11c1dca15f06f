//! Statistics derived from extracted commit history.

pub mod stats;

pub use stats::{file_extension, AggregatedStatistics, WorkStyle};
