//! Threshold bounds shared by anomaly counting and alert generation.

use crate::generator::types::Reading;
use serde::{Deserialize, Serialize};

/// A measured quantity of a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Temperature,
    Humidity,
    Pressure,
}

impl Metric {
    /// All metrics, in the order alerts are checked.
    pub const ALL: [Metric; 3] = [Metric::Temperature, Metric::Humidity, Metric::Pressure];

    /// Lowercase name used in alert text.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
            Metric::Pressure => "pressure",
        }
    }

    /// Read this metric's value from a reading.
    pub fn value_of(&self, reading: &Reading) -> f64 {
        match self {
            Metric::Temperature => reading.temperature,
            Metric::Humidity => reading.humidity,
            Metric::Pressure => reading.pressure,
        }
    }

    /// Render a value with this metric's precision and unit.
    pub fn format_value(&self, value: f64) -> String {
        match self {
            Metric::Temperature => format!("{value:.1}°C"),
            Metric::Humidity => format!("{value:.1}%"),
            Metric::Pressure => format!("{value:.0} hPa"),
        }
    }
}

/// Direction of a threshold violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Low,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::High => "High",
            Severity::Low => "Low",
        }
    }
}

/// Closed acceptable range for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub min: f64,
    pub max: f64,
}

impl Threshold {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Classify a value against this range. High wins over low.
    pub fn classify(&self, value: f64) -> Option<Severity> {
        if value > self.max {
            Some(Severity::High)
        } else if value < self.min {
            Some(Severity::Low)
        } else {
            None
        }
    }

    /// Whether the value lies strictly outside the range.
    pub fn is_violated(&self, value: f64) -> bool {
        self.classify(value).is_some()
    }
}

pub const TEMPERATURE_THRESHOLD: Threshold = Threshold::new(18.0, 28.0);
pub const HUMIDITY_THRESHOLD: Threshold = Threshold::new(30.0, 70.0);
pub const PRESSURE_THRESHOLD: Threshold = Threshold::new(1000.0, 1030.0);

/// Threshold set for all three metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub temperature: Threshold,
    pub humidity: Threshold,
    pub pressure: Threshold,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            temperature: TEMPERATURE_THRESHOLD,
            humidity: HUMIDITY_THRESHOLD,
            pressure: PRESSURE_THRESHOLD,
        }
    }
}

impl Thresholds {
    pub fn for_metric(&self, metric: Metric) -> &Threshold {
        match metric {
            Metric::Temperature => &self.temperature,
            Metric::Humidity => &self.humidity,
            Metric::Pressure => &self.pressure,
        }
    }

    /// A reading is anomalous if any metric is outside its range.
    pub fn is_anomalous(&self, reading: &Reading) -> bool {
        Metric::ALL
            .iter()
            .any(|metric| self.for_metric(*metric).is_violated(metric.value_of(reading)))
    }

    /// Every per-metric violation of a reading, in metric order.
    pub fn violations<'a>(
        &'a self,
        reading: &'a Reading,
    ) -> impl Iterator<Item = (Metric, Severity)> + 'a {
        Metric::ALL.into_iter().filter_map(move |metric| {
            self.for_metric(metric)
                .classify(metric.value_of(reading))
                .map(|severity| (metric, severity))
        })
    }
}
