//! Rolling analytics and alert derivation over a window of readings.
//!
//! Processing is a pure function of the window passed in: analytics are
//! recomputed from scratch on every call and nothing is carried over between
//! calls. Repeated violations across calls therefore repeat their alerts.

use crate::core::alerts::{collect_alerts, dedup_messages, Alert, AlertTimeZone};
use crate::core::thresholds::Thresholds;
use crate::generator::types::Reading;
use serde::{Deserialize, Serialize};

/// Number of trailing readings alerts are derived from.
pub const ALERT_LOOKBACK: usize = 10;

/// Aggregate statistics over a window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub avg_temperature: f64,
    pub avg_humidity: f64,
    pub avg_pressure: f64,
    /// Number of readings in the window
    pub data_point_count: usize,
    /// Readings with at least one metric outside its threshold
    pub anomaly_count: usize,
}

/// Output of one processing call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessedResult {
    pub analytics: Analytics,
    pub alerts: Vec<String>,
}

/// Stateless window processor.
#[derive(Debug, Clone)]
pub struct StreamProcessor {
    thresholds: Thresholds,
    alert_lookback: usize,
    timezone: AlertTimeZone,
}

impl Default for StreamProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamProcessor {
    /// Create a processor with the standard thresholds, a lookback of
    /// `ALERT_LOOKBACK` readings and local time rendering.
    pub fn new() -> Self {
        Self {
            thresholds: Thresholds::default(),
            alert_lookback: ALERT_LOOKBACK,
            timezone: AlertTimeZone::Local,
        }
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_alert_lookback(mut self, alert_lookback: usize) -> Self {
        self.alert_lookback = alert_lookback;
        self
    }

    pub fn with_timezone(mut self, timezone: AlertTimeZone) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn timezone(&self) -> AlertTimeZone {
        self.timezone
    }

    /// Compute analytics over the whole window and alerts over its tail.
    pub fn process_data(&self, window: &[Reading]) -> ProcessedResult {
        if window.is_empty() {
            return ProcessedResult::default();
        }

        let analytics = self.compute_analytics(window);
        let alerts = self.generate_alerts(self.recent(window));

        ProcessedResult { analytics, alerts }
    }

    /// Readings in the window that violate any threshold.
    pub fn detect_anomalies<'a>(&self, window: &'a [Reading]) -> Vec<&'a Reading> {
        window
            .iter()
            .filter(|reading| self.thresholds.is_anomalous(reading))
            .collect()
    }

    /// Structured alerts for the trailing readings of the window.
    pub fn collect_alerts(&self, window: &[Reading]) -> Vec<Alert> {
        collect_alerts(self.recent(window), &self.thresholds)
    }

    fn recent<'a>(&self, window: &'a [Reading]) -> &'a [Reading] {
        &window[window.len().saturating_sub(self.alert_lookback)..]
    }

    fn compute_analytics(&self, window: &[Reading]) -> Analytics {
        let mut temperature = 0.0;
        let mut humidity = 0.0;
        let mut pressure = 0.0;
        let mut anomaly_count = 0;

        for reading in window {
            temperature += reading.temperature;
            humidity += reading.humidity;
            pressure += reading.pressure;
            if self.thresholds.is_anomalous(reading) {
                anomaly_count += 1;
            }
        }

        let count = window.len() as f64;
        Analytics {
            avg_temperature: temperature / count,
            avg_humidity: humidity / count,
            avg_pressure: pressure / count,
            data_point_count: window.len(),
            anomaly_count,
        }
    }

    fn generate_alerts(&self, recent: &[Reading]) -> Vec<String> {
        let messages = collect_alerts(recent, &self.thresholds)
            .iter()
            .map(|alert| alert.message(&self.timezone))
            .collect();

        dedup_messages(messages)
    }
}

/// Process a window with the default processor.
pub fn process_data(window: &[Reading]) -> ProcessedResult {
    StreamProcessor::new().process_data(window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use proptest::prelude::*;

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 22, 10, 15, 42).unwrap()
    }

    fn utc_processor() -> StreamProcessor {
        StreamProcessor::new().with_timezone(AlertTimeZone::Named(chrono_tz::UTC))
    }

    fn normal(offset_secs: i64) -> Reading {
        Reading::new(
            base_time() + Duration::seconds(offset_secs),
            22.0,
            45.0,
            1013.0,
            "sensor-001",
        )
    }

    #[test]
    fn test_empty_window() {
        let result = process_data(&[]);
        assert_eq!(result.analytics, Analytics::default());
        assert_eq!(result.analytics.avg_temperature, 0.0);
        assert_eq!(result.analytics.data_point_count, 0);
        assert!(result.alerts.is_empty());
    }

    #[test]
    fn test_single_high_temperature() {
        let window = vec![Reading::new(base_time(), 30.0, 50.0, 1015.0, "sensor-001")];
        let result = utc_processor().process_data(&window);

        assert_eq!(result.analytics.avg_temperature, 30.0);
        assert_eq!(result.analytics.data_point_count, 1);
        assert_eq!(result.analytics.anomaly_count, 1);
        assert_eq!(
            result.alerts,
            vec!["High temperature alert: 30.0°C at 10:15:42 AM (sensor-001)"]
        );
    }

    #[test]
    fn test_averages() {
        let window = vec![
            Reading::new(base_time(), 20.0, 40.0, 1010.0, "sensor-001"),
            Reading::new(base_time(), 24.0, 50.0, 1020.0, "sensor-002"),
        ];
        let analytics = process_data(&window).analytics;

        assert_eq!(analytics.avg_temperature, 22.0);
        assert_eq!(analytics.avg_humidity, 45.0);
        assert_eq!(analytics.avg_pressure, 1015.0);
        assert_eq!(analytics.anomaly_count, 0);
    }

    #[test]
    fn test_only_trailing_ten_produce_alerts() {
        let mut window = vec![Reading::new(base_time(), 40.0, 45.0, 1013.0, "sensor-003")];
        window.extend((1..=10).map(normal));

        let result = utc_processor().process_data(&window);

        assert_eq!(result.analytics.anomaly_count, 1);
        assert!(result.alerts.is_empty());
    }

    #[test]
    fn test_anomalies_counted_across_whole_window() {
        let mut window: Vec<Reading> = (0..20)
            .map(|i| Reading::new(base_time(), 10.0, 45.0, 1013.0, format!("sensor-{i}")))
            .collect();
        window.extend((0..5).map(normal));

        let processor = utc_processor();
        let result = processor.process_data(&window);

        assert_eq!(result.analytics.anomaly_count, 20);
        assert_eq!(processor.detect_anomalies(&window).len(), 20);
        assert_eq!(result.alerts.len(), 5);
    }

    #[test]
    fn test_identical_violations_deduplicated() {
        let violating = Reading::new(base_time(), 29.31, 45.0, 1013.0, "sensor-002");
        let same_display = Reading::new(base_time(), 29.34, 45.0, 1013.0, "sensor-002");
        let window = vec![violating, same_display, normal(1)];

        let result = utc_processor().process_data(&window);

        assert_eq!(result.analytics.anomaly_count, 2);
        assert_eq!(
            result.alerts,
            vec!["High temperature alert: 29.3°C at 10:15:42 AM (sensor-002)"]
        );
    }

    #[test]
    fn test_multiple_metrics_on_one_reading() {
        let window = vec![Reading::new(base_time(), 15.0, 75.0, 1035.0, "sensor-001")];
        let result = utc_processor().process_data(&window);

        assert_eq!(result.analytics.anomaly_count, 1);
        assert_eq!(
            result.alerts,
            vec![
                "Low temperature alert: 15.0°C at 10:15:42 AM (sensor-001)",
                "High humidity alert: 75.0% at 10:15:42 AM (sensor-001)",
                "High pressure alert: 1035 hPa at 10:15:42 AM (sensor-001)",
            ]
        );
    }

    #[test]
    fn test_custom_lookback() {
        let mut window = vec![Reading::new(base_time(), 40.0, 45.0, 1013.0, "sensor-003")];
        window.extend((1..=3).map(normal));

        let processor = utc_processor().with_alert_lookback(4);
        assert_eq!(processor.process_data(&window).alerts.len(), 1);
        assert_eq!(processor.collect_alerts(&window).len(), 1);
    }

    fn arb_reading() -> impl Strategy<Value = Reading> {
        (0.0..50.0f64, 0.0..100.0f64, 970.0..1060.0f64, 0i64..10_000).prop_map(
            |(temperature, humidity, pressure, offset_ms)| {
                Reading::new(
                    base_time() + Duration::milliseconds(offset_ms),
                    temperature,
                    humidity,
                    pressure,
                    "sensor-001",
                )
            },
        )
    }

    proptest! {
        #[test]
        fn prop_averages_match_mean(window in prop::collection::vec(arb_reading(), 1..150)) {
            let analytics = process_data(&window).analytics;
            let n = window.len() as f64;
            let mean_t = window.iter().map(|r| r.temperature).sum::<f64>() / n;
            let mean_h = window.iter().map(|r| r.humidity).sum::<f64>() / n;
            let mean_p = window.iter().map(|r| r.pressure).sum::<f64>() / n;

            prop_assert!((analytics.avg_temperature - mean_t).abs() < 1e-9);
            prop_assert!((analytics.avg_humidity - mean_h).abs() < 1e-9);
            prop_assert!((analytics.avg_pressure - mean_p).abs() < 1e-9);
            prop_assert_eq!(analytics.data_point_count, window.len());
        }

        #[test]
        fn prop_anomaly_count_matches_filter(window in prop::collection::vec(arb_reading(), 0..150)) {
            let thresholds = Thresholds::default();
            let expected = window.iter().filter(|r| thresholds.is_anomalous(r)).count();
            prop_assert_eq!(process_data(&window).analytics.anomaly_count, expected);
        }

        #[test]
        fn prop_alerts_unique_and_bounded(window in prop::collection::vec(arb_reading(), 0..150)) {
            let alerts = utc_processor().process_data(&window).alerts;
            let unique: std::collections::HashSet<_> = alerts.iter().collect();

            prop_assert_eq!(unique.len(), alerts.len());
            prop_assert!(alerts.len() <= ALERT_LOOKBACK * 3);
        }
    }
}
