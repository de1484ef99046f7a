//! Pipeline counters for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector shared between the poller and the API
pub struct Metrics {
    /// Poll ticks executed
    pub poll_ticks: AtomicU64,
    /// Live games seen across all ticks
    pub live_games_seen: AtomicU64,
    /// Canonical play events forwarded to the log
    pub plays_forwarded: AtomicU64,
    /// Anomalous fields absorbed by the normalizer
    pub payload_anomalies: AtomicU64,
    /// Per-item failures contained inside poll ticks
    pub poll_errors: AtomicU64,
    /// Records served with predictions on the query path
    pub records_served: AtomicU64,
    /// Log records skipped because they failed to parse
    pub record_parse_failures: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            poll_ticks: AtomicU64::new(0),
            live_games_seen: AtomicU64::new(0),
            plays_forwarded: AtomicU64::new(0),
            payload_anomalies: AtomicU64::new(0),
            poll_errors: AtomicU64::new(0),
            records_served: AtomicU64::new(0),
            record_parse_failures: AtomicU64::new(0),
        }
    }

    pub fn inc_ticks(&self) {
        self.poll_ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_live_games(&self, count: u64) {
        self.live_games_seen.fetch_add(count, Ordering::Relaxed);
    }

    pub fn inc_plays_forwarded(&self) {
        self.plays_forwarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_payload_anomalies(&self, count: u64) {
        self.payload_anomalies.fetch_add(count, Ordering::Relaxed);
    }

    pub fn inc_poll_errors(&self) {
        self.poll_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_records_served(&self) {
        self.records_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_record_parse_failures(&self) {
        self.record_parse_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Export metrics in Prometheus format
    pub fn prometheus(&self) -> String {
        format!(
            r#"# HELP gridiron_poll_ticks_total Poll ticks executed
# TYPE gridiron_poll_ticks_total counter
gridiron_poll_ticks_total {}

# HELP gridiron_live_games_seen_total Live games seen across all ticks
# TYPE gridiron_live_games_seen_total counter
gridiron_live_games_seen_total {}

# HELP gridiron_plays_forwarded_total Play events forwarded to the log
# TYPE gridiron_plays_forwarded_total counter
gridiron_plays_forwarded_total {}

# HELP gridiron_payload_anomalies_total Anomalous fields absorbed by the normalizer
# TYPE gridiron_payload_anomalies_total counter
gridiron_payload_anomalies_total {}

# HELP gridiron_poll_errors_total Per-item failures contained inside poll ticks
# TYPE gridiron_poll_errors_total counter
gridiron_poll_errors_total {}

# HELP gridiron_records_served_total Records served with predictions
# TYPE gridiron_records_served_total counter
gridiron_records_served_total {}

# HELP gridiron_record_parse_failures_total Log records skipped as unparseable
# TYPE gridiron_record_parse_failures_total counter
gridiron_record_parse_failures_total {}
"#,
            self.poll_ticks.load(Ordering::Relaxed),
            self.live_games_seen.load(Ordering::Relaxed),
            self.plays_forwarded.load(Ordering::Relaxed),
            self.payload_anomalies.load(Ordering::Relaxed),
            self.poll_errors.load(Ordering::Relaxed),
            self.records_served.load(Ordering::Relaxed),
            self.record_parse_failures.load(Ordering::Relaxed),
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
