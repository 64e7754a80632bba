//! Core functionality for the sensor stream.
//!
//! This module contains:
//! - Threshold bounds and alert formatting
//! - The stream processor computing analytics over a window
//! - The retained reading window with its time and size bounds
//! - Snapshot building for JSON output

pub mod alerts;
pub mod processor;
pub mod snapshot;
pub mod thresholds;
pub mod windowing;

// Re-export commonly used types
pub use alerts::{Alert, AlertTimeZone};
pub use processor::{process_data, Analytics, ProcessedResult, StreamProcessor, ALERT_LOOKBACK};
pub use snapshot::{AnalyticsSnapshot, MetricSummary, SnapshotBuilder, PRODUCER_NAME, SNAPSHOT_VERSION};
pub use thresholds::{Metric, Severity, Threshold, Thresholds};
pub use windowing::{ReadingWindow, TimeRange, MAX_WINDOW_LEN};
