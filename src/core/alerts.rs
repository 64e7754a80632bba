//! Human-readable threshold alerts.

use crate::core::thresholds::{Metric, Severity, Thresholds};
use crate::generator::types::Reading;
use chrono::{DateTime, Local, Utc};
use chrono_tz::Tz;
use std::collections::HashSet;

/// Time-of-day format used in alert text, e.g. `10:15:42 AM`.
const TIME_OF_DAY_FORMAT: &str = "%-I:%M:%S %p";

/// Timezone used to render the time of day in alert text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertTimeZone {
    /// The host's local timezone
    #[default]
    Local,
    /// A fixed IANA timezone
    Named(Tz),
}

impl AlertTimeZone {
    /// Render the wall-clock time of an instant.
    pub fn time_of_day(&self, timestamp: DateTime<Utc>) -> String {
        match self {
            AlertTimeZone::Local => timestamp
                .with_timezone(&Local)
                .format(TIME_OF_DAY_FORMAT)
                .to_string(),
            AlertTimeZone::Named(tz) => timestamp
                .with_timezone(tz)
                .format(TIME_OF_DAY_FORMAT)
                .to_string(),
        }
    }
}

/// One metric violation on one reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub severity: Severity,
    pub metric: Metric,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
    pub device_id: String,
}

impl Alert {
    /// Format the alert as display text.
    pub fn message(&self, timezone: &AlertTimeZone) -> String {
        format!(
            "{} {} alert: {} at {} ({})",
            self.severity.label(),
            self.metric.name(),
            self.metric.format_value(self.value),
            timezone.time_of_day(self.timestamp),
            self.device_id
        )
    }
}

/// Collect alerts for every metric violation in `readings`, at most one per
/// metric per reading, in reading order then metric order.
pub fn collect_alerts(readings: &[Reading], thresholds: &Thresholds) -> Vec<Alert> {
    readings
        .iter()
        .flat_map(|reading| {
            thresholds
                .violations(reading)
                .map(move |(metric, severity)| Alert {
                    severity,
                    metric,
                    value: metric.value_of(reading),
                    timestamp: reading.timestamp,
                    device_id: reading.device_id.clone(),
                })
        })
        .collect()
}

/// Drop repeated messages, keeping the first occurrence of each.
pub fn dedup_messages(messages: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(messages.len());
    messages
        .into_iter()
        .filter(|message| seen.insert(message.clone()))
        .collect()
}
