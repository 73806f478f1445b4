//! Loop counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters for the fusion loop, readable while it runs
#[derive(Debug, Default)]
pub struct LoopStats {
    cycles: AtomicU64,
    starved: AtomicU64,
    corrections: AtomicU64,
    published: AtomicU64,
    publish_failures: AtomicU64,
    overruns: AtomicU64,
}

impl LoopStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_cycles(&self) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_starved(&self) {
        self.starved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_corrections(&self) {
        self.corrections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_publish_failures(&self) {
        self.publish_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_overruns(&self) {
        self.overruns.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            starved: self.starved.load(Ordering::Relaxed),
            corrections: self.corrections.load(Ordering::Relaxed),
            published: self.published.load(Ordering::Relaxed),
            publish_failures: self.publish_failures.load(Ordering::Relaxed),
            overruns: self.overruns.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`LoopStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub cycles: u64,
    pub starved: u64,
    pub corrections: u64,
    pub published: u64,
    pub publish_failures: u64,
    pub overruns: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot() {
        let stats = LoopStats::new();
        stats.inc_cycles();
        stats.inc_cycles();
        stats.inc_starved();
        stats.inc_published();
        stats.inc_publish_failures();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.cycles, 2);
        assert_eq!(snapshot.starved, 1);
        assert_eq!(snapshot.published, 1);
        assert_eq!(snapshot.publish_failures, 1);
        assert_eq!(snapshot.overruns, 0);
    }
}
