//! Ingress counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Ingestion metrics
///
/// Each `record_*` call bumps the local atomic counter and mirrors it to the
/// global `metrics` recorder, if one is installed.
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Frames received from the source, before topic filtering
    pub frames_received: AtomicU64,

    /// Frames whose topic did not match the IMU filter
    pub frames_filtered: AtomicU64,

    /// Frames dropped because they could not be decoded
    pub decode_errors: AtomicU64,

    /// Samples written to the slot
    pub samples_written: AtomicU64,

    /// Unread samples replaced by a newer one
    pub samples_overwritten: AtomicU64,
}

impl IngestionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record frame received
    pub fn record_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("attitude_frames_received_total").increment(1);
    }

    /// Record frame filtered by topic
    pub fn record_filtered(&self) {
        self.frames_filtered.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("attitude_frames_filtered_total").increment(1);
    }

    /// Record decode error
    pub fn record_decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("attitude_decode_errors_total").increment(1);
    }

    /// Record sample written, and whether it displaced an unread one
    pub fn record_written(&self, overwrote: bool) {
        self.samples_written.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("attitude_samples_written_total").increment(1);
        if overwrote {
            self.samples_overwritten.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("attitude_samples_overwritten_total").increment(1);
        }
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_filtered: self.frames_filtered.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            samples_written: self.samples_written.load(Ordering::Relaxed),
            samples_overwritten: self.samples_overwritten.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub frames_received: u64,
    pub frames_filtered: u64,
    pub decode_errors: u64,
    pub samples_written: u64,
    pub samples_overwritten: u64,
}
