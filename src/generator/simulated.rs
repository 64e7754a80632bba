//! Simulated environmental readings.
//!
//! Each generator owns a set of slowly wandering baselines. Every reading is
//! the baseline plus a uniform variation, occasionally scaled up to inject an
//! anomaly, after which the baselines drift a little and are clamped back into
//! a realistic range.

use crate::generator::types::{Reading, DEFAULT_DEVICE_IDS};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Spacing between consecutive readings of one batch, in milliseconds.
pub const READING_SPACING_MS: i64 = 100;

/// Chance that any single reading is an injected anomaly.
pub const ANOMALY_PROBABILITY: f64 = 0.05;

const TEMPERATURE_BASELINE_RANGE: RangeInclusive<f64> = 15.0..=35.0;
const HUMIDITY_BASELINE_RANGE: RangeInclusive<f64> = 20.0..=80.0;
const PRESSURE_BASELINE_RANGE: RangeInclusive<f64> = 990.0..=1040.0;

/// Full width of the per-reading variation for each metric.
const TEMPERATURE_VARIATION: f64 = 4.0;
const HUMIDITY_VARIATION: f64 = 10.0;
const PRESSURE_VARIATION: f64 = 20.0;

/// Full width of the per-reading baseline drift for each metric.
const TEMPERATURE_DRIFT: f64 = 0.1;
const HUMIDITY_DRIFT: f64 = 0.2;
const PRESSURE_DRIFT: f64 = 0.5;

/// Running center points of the simulated environment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baselines {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
}

impl Default for Baselines {
    fn default() -> Self {
        Self {
            temperature: 22.0,
            humidity: 45.0,
            pressure: 1013.0,
        }
    }
}

impl Baselines {
    /// Check that every baseline sits inside its realistic range.
    pub fn in_range(&self) -> bool {
        TEMPERATURE_BASELINE_RANGE.contains(&self.temperature)
            && HUMIDITY_BASELINE_RANGE.contains(&self.humidity)
            && PRESSURE_BASELINE_RANGE.contains(&self.pressure)
    }

    fn drift<R: Rng>(&mut self, rng: &mut R) {
        self.temperature += symmetric(rng, TEMPERATURE_DRIFT);
        self.humidity += symmetric(rng, HUMIDITY_DRIFT);
        self.pressure += symmetric(rng, PRESSURE_DRIFT);

        self.temperature = clamp_to(self.temperature, &TEMPERATURE_BASELINE_RANGE);
        self.humidity = clamp_to(self.humidity, &HUMIDITY_BASELINE_RANGE);
        self.pressure = clamp_to(self.pressure, &PRESSURE_BASELINE_RANGE);
    }
}

/// Errors that can occur while configuring a generator.
#[derive(Debug, PartialEq, Eq)]
pub enum GeneratorError {
    NoDevices,
}

impl std::fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneratorError::NoDevices => write!(f, "At least one device id is required"),
        }
    }
}

impl std::error::Error for GeneratorError {}

/// Stateful source of synthetic sensor readings.
///
/// The random number generator is injected so runs can be reproduced.
/// A generator must not be shared between concurrent callers; pass it by
/// `&mut` to whoever drives it.
pub struct ReadingGenerator<R = StdRng> {
    rng: R,
    baselines: Baselines,
    device_ids: Vec<String>,
}

impl ReadingGenerator<StdRng> {
    /// Create a generator seeded from operating system entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create a reproducible generator from a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for ReadingGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> ReadingGenerator<R> {
    /// Create a generator driven by the given random source.
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            baselines: Baselines::default(),
            device_ids: DEFAULT_DEVICE_IDS.iter().map(|id| id.to_string()).collect(),
        }
    }

    /// Replace the simulated device fleet.
    pub fn with_devices(mut self, device_ids: Vec<String>) -> Result<Self, GeneratorError> {
        if device_ids.is_empty() {
            return Err(GeneratorError::NoDevices);
        }
        self.device_ids = device_ids;
        Ok(self)
    }

    /// Current baselines.
    pub fn baselines(&self) -> Baselines {
        self.baselines
    }

    /// Device ids readings are drawn from.
    pub fn device_ids(&self) -> &[String] {
        &self.device_ids
    }

    /// Generate `count` readings starting at the current time.
    pub fn generate_batch(&mut self, count: usize) -> Vec<Reading> {
        self.generate_batch_at(count, Utc::now())
    }

    /// Generate `count` readings, the first stamped at `now` and each
    /// following one `READING_SPACING_MS` later.
    ///
    /// `now` is truncated to whole milliseconds, the precision timestamps
    /// serialize with.
    pub fn generate_batch_at(&mut self, count: usize, now: DateTime<Utc>) -> Vec<Reading> {
        let now = now.trunc_subsecs(3);
        let mut batch = Vec::with_capacity(count);

        for index in 0..count {
            let device_index = self.rng.gen_range(0..self.device_ids.len());
            let device_id = self.device_ids[device_index].clone();

            let temperature_variation = symmetric(&mut self.rng, TEMPERATURE_VARIATION);
            let humidity_variation = symmetric(&mut self.rng, HUMIDITY_VARIATION);
            let pressure_variation = symmetric(&mut self.rng, PRESSURE_VARIATION);

            let is_anomaly = self.rng.gen::<f64>() < ANOMALY_PROBABILITY;
            let multiplier = if is_anomaly {
                self.rng.gen::<f64>() * 2.0 + 1.0
            } else {
                1.0
            };

            if is_anomaly {
                tracing::debug!(device_id = %device_id, multiplier, "Injecting anomalous reading");
            }

            let timestamp = now + Duration::milliseconds(index as i64 * READING_SPACING_MS);
            batch.push(Reading {
                timestamp,
                temperature: self.baselines.temperature + temperature_variation * multiplier,
                humidity: (self.baselines.humidity + humidity_variation * multiplier)
                    .clamp(0.0, 100.0),
                pressure: self.baselines.pressure + pressure_variation * multiplier,
                device_id,
            });

            self.baselines.drift(&mut self.rng);
        }

        tracing::debug!(
            count,
            base_temperature = self.baselines.temperature,
            base_humidity = self.baselines.humidity,
            base_pressure = self.baselines.pressure,
            "Generated reading batch"
        );

        batch
    }
}

/// Uniform draw from `[-width / 2, width / 2)`.
fn symmetric<R: Rng>(rng: &mut R, width: f64) -> f64 {
    (rng.gen::<f64>() - 0.5) * width
}

fn clamp_to(value: f64, range: &RangeInclusive<f64>) -> f64 {
    value.clamp(*range.start(), *range.end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn origin() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 22, 10, 15, 42).unwrap()
    }

    #[test]
    fn test_default_baselines() {
        let generator = ReadingGenerator::seeded(1);
        assert_eq!(generator.baselines(), Baselines::default());
        assert_eq!(generator.baselines().temperature, 22.0);
        assert_eq!(generator.baselines().humidity, 45.0);
        assert_eq!(generator.baselines().pressure, 1013.0);
    }

    #[test]
    fn test_live_batch_survives_json_round_trip() {
        let mut generator = ReadingGenerator::seeded(12);
        for _ in 0..20 {
            let batch = generator.generate_batch(3);
            let json = serde_json::to_string(&batch).unwrap();
            let parsed: Vec<Reading> = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, batch);
        }
    }

    #[test]
    fn test_origin_truncated_to_millis() {
        let mut generator = ReadingGenerator::seeded(12);
        let batch = generator.generate_batch_at(2, origin() + Duration::nanoseconds(123_456_789));

        assert_eq!(batch[0].timestamp, origin() + Duration::milliseconds(123));
        assert_eq!(batch[1].timestamp, origin() + Duration::milliseconds(223));
    }

    #[test]
    fn test_empty_batch() {
        let mut generator = ReadingGenerator::seeded(1);
        assert!(generator.generate_batch(0).is_empty());
        assert_eq!(generator.baselines(), Baselines::default());
    }

    #[test]
    fn test_timestamps_spaced_by_100ms() {
        let mut generator = ReadingGenerator::seeded(7);
        let batch = generator.generate_batch_at(5, origin());

        assert_eq!(batch[0].timestamp, origin());
        for pair in batch.windows(2) {
            assert_eq!(
                pair[1].timestamp - pair[0].timestamp,
                Duration::milliseconds(READING_SPACING_MS)
            );
        }
    }

    #[test]
    fn test_devices_come_from_fleet() {
        let mut generator = ReadingGenerator::seeded(3);
        for reading in generator.generate_batch(200) {
            assert!(DEFAULT_DEVICE_IDS.contains(&reading.device_id.as_str()));
        }
    }

    #[test]
    fn test_custom_fleet() {
        let mut generator = ReadingGenerator::seeded(3)
            .with_devices(vec!["greenhouse-a".to_string()])
            .unwrap();

        let batch = generator.generate_batch(10);
        assert!(batch.iter().all(|r| r.device_id == "greenhouse-a"));
    }

    #[test]
    fn test_empty_fleet_rejected() {
        let result = ReadingGenerator::seeded(3).with_devices(Vec::new());
        assert_eq!(result.err(), Some(GeneratorError::NoDevices));
    }

    #[test]
    fn test_seeded_generators_are_reproducible() {
        let mut a = ReadingGenerator::seeded(42);
        let mut b = ReadingGenerator::seeded(42);

        assert_eq!(a.generate_batch_at(20, origin()), b.generate_batch_at(20, origin()));
        assert_eq!(a.baselines(), b.baselines());
    }

    #[test]
    fn test_baselines_drift_between_calls() {
        let mut generator = ReadingGenerator::seeded(11);
        generator.generate_batch(50);
        assert_ne!(generator.baselines(), Baselines::default());
    }

    #[test]
    fn test_readings_stay_near_default_baseline() {
        // Variation is at most half its width, tripled for an anomaly, and the
        // baseline moves at most half a drift step per reading.
        let mut generator = ReadingGenerator::seeded(5);
        for reading in generator.generate_batch(10) {
            assert!((reading.temperature - 22.0).abs() <= 2.0 * 3.0 + 10.0 * 0.05);
            assert!((reading.pressure - 1013.0).abs() <= 10.0 * 3.0 + 10.0 * 0.25);
        }
    }

    proptest! {
        #[test]
        fn prop_batch_length_and_humidity(seed in any::<u64>(), count in 0usize..300) {
            let mut generator = ReadingGenerator::seeded(seed);
            let batch = generator.generate_batch_at(count, origin());

            prop_assert_eq!(batch.len(), count);
            for reading in &batch {
                prop_assert!((0.0..=100.0).contains(&reading.humidity));
            }
            for pair in batch.windows(2) {
                prop_assert_eq!(
                    (pair[1].timestamp - pair[0].timestamp).num_milliseconds(),
                    READING_SPACING_MS
                );
            }
        }

        #[test]
        fn prop_baselines_stay_clamped(seed in any::<u64>(), calls in 1usize..60) {
            let mut generator = ReadingGenerator::seeded(seed);
            for _ in 0..calls {
                generator.generate_batch(25);
                prop_assert!(generator.baselines().in_range());
            }
        }
    }
}
