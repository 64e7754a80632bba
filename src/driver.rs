//! Periodic generate, trim and process loop body.
//!
//! The driver owns the generator, the retained window and the processor, and
//! runs one step of the stream per call. Scheduling is left to the caller:
//! the CLI calls `tick` once per configured interval, tests call `tick_at`
//! with a synthetic clock.

use crate::config::Config;
use crate::core::processor::{ProcessedResult, StreamProcessor, ALERT_LOOKBACK};
use crate::core::windowing::{ReadingWindow, TimeRange, MAX_WINDOW_LEN};
use crate::generator::simulated::ReadingGenerator;
use crate::generator::types::Reading;
use crate::stats::log::{create_shared_stats, SharedStreamStats};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::Rng;

/// Result of one streaming step.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    /// Analytics and alerts for the trimmed window
    pub result: ProcessedResult,
    /// Newest reading in the window
    pub latest: Option<Reading>,
    /// Window length after trimming
    pub window_len: usize,
}

/// Drives a generator and processor over a shared window.
pub struct StreamDriver<R = StdRng> {
    generator: ReadingGenerator<R>,
    window: ReadingWindow,
    processor: StreamProcessor,
    batch_size: usize,
    streaming: bool,
    stats: SharedStreamStats,
}

impl StreamDriver<StdRng> {
    /// Build a driver from configuration. Window length and alert lookback
    /// are capped at `MAX_WINDOW_LEN` and `ALERT_LOOKBACK`.
    pub fn from_config(config: &Config, processor: StreamProcessor) -> Self {
        let generator = match config.seed {
            Some(seed) => ReadingGenerator::seeded(seed),
            None => ReadingGenerator::new(),
        };

        Self::new(
            generator,
            ReadingWindow::new(config.time_range, config.max_window_len.min(MAX_WINDOW_LEN)),
            processor.with_alert_lookback(config.alert_lookback.min(ALERT_LOOKBACK)),
            config.batch_size,
        )
    }
}

impl<R: Rng> StreamDriver<R> {
    /// Create a stopped driver.
    pub fn new(
        generator: ReadingGenerator<R>,
        window: ReadingWindow,
        processor: StreamProcessor,
        batch_size: usize,
    ) -> Self {
        Self {
            generator,
            window,
            processor,
            batch_size,
            streaming: false,
            stats: create_shared_stats(),
        }
    }

    /// Begin streaming with an empty window.
    pub fn start(&mut self) {
        self.window.clear();
        self.streaming = true;
        tracing::info!(
            time_range = %self.window.time_range(),
            batch_size = self.batch_size,
            "Streaming started"
        );
    }

    /// Stop streaming. The window is kept until the next start.
    pub fn stop(&mut self) {
        self.streaming = false;
        tracing::info!(window_len = self.window.len(), "Streaming stopped");
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Change the retention range; applied on the next trim.
    pub fn set_time_range(&mut self, time_range: TimeRange) {
        self.window.set_time_range(time_range);
    }

    pub fn window(&self) -> &ReadingWindow {
        &self.window
    }

    pub fn generator(&self) -> &ReadingGenerator<R> {
        &self.generator
    }

    pub fn processor(&self) -> &StreamProcessor {
        &self.processor
    }

    pub fn stats(&self) -> SharedStreamStats {
        self.stats.clone()
    }

    /// Run one step at the current time.
    pub fn tick(&mut self) -> Option<TickOutcome> {
        self.tick_at(Utc::now())
    }

    /// Run one step at `now`. Returns `None` while streaming is stopped.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Option<TickOutcome> {
        if !self.streaming {
            return None;
        }

        let batch = self.generator.generate_batch_at(self.batch_size, now);
        Some(self.ingest_at(batch, now))
    }

    /// Append externally supplied readings, trim and process the window.
    pub fn ingest_at(&mut self, batch: Vec<Reading>, now: DateTime<Utc>) -> TickOutcome {
        let thresholds = *self.processor.thresholds();
        let batch_anomalies = batch.iter().filter(|r| thresholds.is_anomalous(r)).count();

        self.stats.record_readings(batch.len() as u64);
        self.stats.record_anomalies(batch_anomalies as u64);

        self.window.extend(batch);
        self.window.trim(now);

        let result = self.processor.process_data(self.window.readings());

        self.stats.record_window_processed();
        self.stats.record_alerts(result.alerts.len() as u64);

        tracing::debug!(
            window_len = self.window.len(),
            anomalies = result.analytics.anomaly_count,
            alerts = result.alerts.len(),
            "Processed window"
        );

        TickOutcome {
            latest: self.window.latest().cloned(),
            window_len: self.window.len(),
            result,
        }
    }
}
