//! Atomic session counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for the current streaming session.
#[derive(Debug)]
pub struct StreamStats {
    /// Number of readings generated or ingested
    readings_ingested: AtomicU64,
    /// Number of windows processed
    windows_processed: AtomicU64,
    /// Anomalous readings seen in newly ingested batches
    anomalies_observed: AtomicU64,
    /// Alert messages emitted across all processing calls
    alerts_emitted: AtomicU64,
    /// Session start time
    session_start: DateTime<Utc>,
}

impl StreamStats {
    pub fn new() -> Self {
        Self {
            readings_ingested: AtomicU64::new(0),
            windows_processed: AtomicU64::new(0),
            anomalies_observed: AtomicU64::new(0),
            alerts_emitted: AtomicU64::new(0),
            session_start: Utc::now(),
        }
    }

    pub fn record_readings(&self, count: u64) {
        self.readings_ingested.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_window_processed(&self) {
        self.windows_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_anomalies(&self, count: u64) {
        self.anomalies_observed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_alerts(&self, count: u64) {
        self.alerts_emitted.fetch_add(count, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn stats(&self) -> StreamStatsSnapshot {
        StreamStatsSnapshot {
            readings_ingested: self.readings_ingested.load(Ordering::Relaxed),
            windows_processed: self.windows_processed.load(Ordering::Relaxed),
            anomalies_observed: self.anomalies_observed.load(Ordering::Relaxed),
            alerts_emitted: self.alerts_emitted.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Session Statistics:\n\
             - Readings ingested: {}\n\
             - Windows processed: {}\n\
             - Anomalous readings: {}\n\
             - Alerts emitted: {}\n\
             - Session duration: {} seconds",
            stats.readings_ingested,
            stats.windows_processed,
            stats.anomalies_observed,
            stats.alerts_emitted,
            stats.session_duration_secs
        )
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.readings_ingested.store(0, Ordering::Relaxed);
        self.windows_processed.store(0, Ordering::Relaxed);
        self.anomalies_observed.store(0, Ordering::Relaxed);
        self.alerts_emitted.store(0, Ordering::Relaxed);
    }
}

impl Default for StreamStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the session counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamStatsSnapshot {
    pub readings_ingested: u64,
    pub windows_processed: u64,
    pub anomalies_observed: u64,
    pub alerts_emitted: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Thread-safe shared stats.
pub type SharedStreamStats = Arc<StreamStats>;

/// Create a new shared stats handle.
pub fn create_shared_stats() -> SharedStreamStats {
    Arc::new(StreamStats::new())
}
