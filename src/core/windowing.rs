//! Retained window of recent readings.
//!
//! The window is bounded twice: readings older than the selected time range
//! are dropped, then only the most recent `max_len` entries are kept. Order is
//! arrival order, which for generated batches is chronological.

use crate::config::ConfigError;
use crate::generator::types::Reading;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of readings retained after trimming.
pub const MAX_WINDOW_LEN: usize = 100;

/// Selectable retention durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1m")]
    OneMinute,
    #[default]
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "10m")]
    TenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::OneMinute,
        TimeRange::FiveMinutes,
        TimeRange::TenMinutes,
        TimeRange::ThirtyMinutes,
    ];

    pub fn minutes(&self) -> i64 {
        match self {
            TimeRange::OneMinute => 1,
            TimeRange::FiveMinutes => 5,
            TimeRange::TenMinutes => 10,
            TimeRange::ThirtyMinutes => 30,
        }
    }

    pub fn as_duration(&self) -> Duration {
        Duration::minutes(self.minutes())
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.minutes())
    }
}

impl FromStr for TimeRange {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1m" => Ok(TimeRange::OneMinute),
            "5m" => Ok(TimeRange::FiveMinutes),
            "10m" => Ok(TimeRange::TenMinutes),
            "30m" => Ok(TimeRange::ThirtyMinutes),
            other => Err(ConfigError::InvalidTimeRange(other.to_string())),
        }
    }
}

/// Time- and size-bounded sequence of readings.
#[derive(Debug, Clone)]
pub struct ReadingWindow {
    readings: Vec<Reading>,
    time_range: TimeRange,
    max_len: usize,
}

impl ReadingWindow {
    /// Create an empty window.
    pub fn new(time_range: TimeRange, max_len: usize) -> Self {
        Self {
            readings: Vec::new(),
            time_range,
            max_len,
        }
    }

    /// Append a batch in arrival order.
    pub fn extend(&mut self, batch: impl IntoIterator<Item = Reading>) {
        self.readings.extend(batch);
    }

    /// Drop readings at or before `now - retention`, then keep only the most
    /// recent `max_len` readings.
    pub fn trim(&mut self, now: DateTime<Utc>) {
        let cutoff = self.cutoff(now);
        self.readings.retain(|reading| reading.timestamp > cutoff);

        if self.readings.len() > self.max_len {
            let excess = self.readings.len() - self.max_len;
            self.readings.drain(..excess);
        }
    }

    /// Oldest instant still excluded from the window at `now`.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.time_range.as_duration()
    }

    pub fn set_time_range(&mut self, time_range: TimeRange) {
        self.time_range = time_range;
    }

    pub fn time_range(&self) -> TimeRange {
        self.time_range
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.readings.last()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn clear(&mut self) {
        self.readings.clear();
    }

    /// Timestamps of the oldest and newest retained readings.
    pub fn bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match (self.readings.first(), self.readings.last()) {
            (Some(first), Some(last)) => Some((first.timestamp, last.timestamp)),
            _ => None,
        }
    }
}

impl Default for ReadingWindow {
    fn default() -> Self {
        Self::new(TimeRange::default(), MAX_WINDOW_LEN)
    }
}
