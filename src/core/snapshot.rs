//! JSON snapshot builder for processed windows.
//!
//! A snapshot captures one processing call: the window bounds, the analytics,
//! the alerts and a per-metric summary of the retained readings. Snapshots are
//! what the CLI prints in `--json` mode.

use crate::core::processor::{Analytics, ProcessedResult};
use crate::core::thresholds::Metric;
use crate::core::windowing::TimeRange;
use crate::generator::types::Reading;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::HashMap;
use uuid::Uuid;

/// The current snapshot format version.
pub const SNAPSHOT_VERSION: &str = "1.0";

/// The name of this producer.
pub const PRODUCER_NAME: &str = "sensorstream";

/// Producer metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotProducer {
    /// Name of the producing software
    pub name: String,
    /// Version of the producing software
    pub version: String,
    /// Unique instance identifier (UUID)
    pub instance_id: String,
    /// Host the producer runs on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

/// Window definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotWindow {
    /// Oldest retained reading (RFC3339)
    pub start: String,
    /// Newest retained reading (RFC3339)
    pub end: String,
    /// Selected retention range, e.g. "5m"
    pub time_range: TimeRange,
}

/// Descriptive statistics for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl MetricSummary {
    /// Summarize a non-empty slice of values.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        Some(Self {
            min: Statistics::min(values),
            max: Statistics::max(values),
            mean: Statistics::mean(values),
            std_dev: Statistics::population_std_dev(values),
        })
    }
}

/// Snapshot of one processed window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    /// Snapshot schema version
    pub snapshot_version: String,
    /// When this payload was computed (RFC3339)
    pub computed_at_utc: String,
    /// Producer metadata
    pub producer: SnapshotProducer,
    /// Window definition, absent for an empty window
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<SnapshotWindow>,
    /// Analytics for the window
    pub analytics: Analytics,
    /// Alerts for the trailing readings
    pub alerts: Vec<String>,
    /// Per-metric summaries keyed by metric name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summaries: Option<HashMap<String, MetricSummary>>,
    /// Additional metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, serde_json::Value>>,
}

/// Builder for analytics snapshots.
pub struct SnapshotBuilder {
    instance_id: Uuid,
    session_id: Option<String>,
    host: Option<String>,
}

impl SnapshotBuilder {
    /// Create a new builder with a unique instance ID.
    pub fn new() -> Self {
        let host = hostname::get()
            .ok()
            .and_then(|name| name.into_string().ok());

        Self {
            instance_id: Uuid::new_v4(),
            session_id: None,
            host,
        }
    }

    /// Set the session ID for generated snapshots.
    pub fn with_session_id(mut self, session_id: String) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Get the instance ID.
    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    /// Build a snapshot from a window and its processing result.
    pub fn build(
        &self,
        readings: &[Reading],
        time_range: TimeRange,
        result: &ProcessedResult,
    ) -> AnalyticsSnapshot {
        let computed_at = Utc::now();

        let window = match (readings.first(), readings.last()) {
            (Some(first), Some(last)) => Some(SnapshotWindow {
                start: first.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
                end: last.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
                time_range,
            }),
            _ => None,
        };

        let summaries = if readings.is_empty() {
            None
        } else {
            let mut summaries = HashMap::new();
            for metric in Metric::ALL {
                let values: Vec<f64> = readings.iter().map(|r| metric.value_of(r)).collect();
                if let Some(summary) = MetricSummary::from_values(&values) {
                    summaries.insert(metric.name().to_string(), summary);
                }
            }
            Some(summaries)
        };

        let mut devices: Vec<&str> = readings.iter().map(|r| r.device_id.as_str()).collect();
        devices.sort_unstable();
        devices.dedup();

        let mut meta = HashMap::new();
        meta.insert(
            "device_count".to_string(),
            serde_json::Value::Number(serde_json::Number::from(devices.len())),
        );
        meta.insert(
            "devices".to_string(),
            serde_json::Value::Array(
                devices
                    .iter()
                    .map(|d| serde_json::Value::String(d.to_string()))
                    .collect(),
            ),
        );
        if let Some(ref session_id) = self.session_id {
            meta.insert(
                "session_id".to_string(),
                serde_json::Value::String(session_id.clone()),
            );
        }

        AnalyticsSnapshot {
            snapshot_version: SNAPSHOT_VERSION.to_string(),
            computed_at_utc: computed_at.to_rfc3339(),
            producer: SnapshotProducer {
                name: PRODUCER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                instance_id: self.instance_id.to_string(),
                host: self.host.clone(),
            },
            window,
            analytics: result.analytics.clone(),
            alerts: result.alerts.clone(),
            summaries,
            meta: Some(meta),
        }
    }

    /// Build and serialize a snapshot as a single JSON line.
    pub fn build_json(
        &self,
        readings: &[Reading],
        time_range: TimeRange,
        result: &ProcessedResult,
    ) -> String {
        let snapshot = self.build(readings, time_range, result);
        to_json_or_empty(&snapshot)
    }
}

impl Default for SnapshotBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize `value`, logging and returning `{}` on failure.
fn to_json_or_empty<T: Serialize>(value: &T) -> String {
    match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!("Could not serialize snapshot: {e}");
            "{}".to_string()
        }
    }
}
