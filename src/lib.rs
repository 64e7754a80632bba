//! Sensorstream - simulated environmental sensor stream with rolling analytics.
//!
//! This library generates plausible temperature, humidity and pressure
//! readings from a small simulated fleet, keeps a bounded window of recent
//! readings and derives aggregate analytics and threshold alerts from it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Sensorstream                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │  Generator  │──▶│   Window    │──▶│  Processor  │       │
//! │  │ (simulated) │   │ (time+size) │   │ (analytics) │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │                                              │              │
//! │                                              ▼              │
//! │                                      ┌─────────────┐       │
//! │                                      │   Alerts    │       │
//! │                                      │ + Snapshot  │       │
//! │                                      └─────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use sensorstream::{core::process_data, generator::ReadingGenerator};
//!
//! let mut generator = ReadingGenerator::seeded(42);
//! let window = generator.generate_batch(3);
//!
//! let result = process_data(&window);
//! assert_eq!(result.analytics.data_point_count, 3);
//! ```

pub mod config;
pub mod core;
pub mod driver;
pub mod generator;
pub mod stats;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError};
pub use crate::core::{
    process_data, Alert, AlertTimeZone, Analytics, AnalyticsSnapshot, ProcessedResult,
    ReadingWindow, SnapshotBuilder, StreamProcessor, Thresholds, TimeRange,
};
pub use driver::{StreamDriver, TickOutcome};
pub use generator::{Baselines, GeneratorError, Reading, ReadingGenerator};
pub use stats::{SharedStreamStats, StreamStats};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
