//! Reading sources for the sensor stream.
//!
//! There is no real sensor I/O: readings come from a simulated fleet whose
//! baselines wander over time and which occasionally injects anomalies.

pub mod simulated;
pub mod types;

// Re-export commonly used types
pub use simulated::{
    Baselines, GeneratorError, ReadingGenerator, ANOMALY_PROBABILITY, READING_SPACING_MS,
};
pub use types::{Reading, DEFAULT_DEVICE_IDS};
