//! Session statistics for the sensor stream.
//!
//! Counters describing what a streaming session has produced so far. They are
//! kept in memory only and reset with the process.

pub mod log;

// Re-export commonly used types
pub use log::{create_shared_stats, SharedStreamStats, StreamStats, StreamStatsSnapshot};
