//! Fusion loop metrics
//!
//! One [`CycleObservation`] per loop cycle feeds both the global `metrics`
//! recorder and the in-memory [`LoopMetricsAggregator`] used for run summaries.

use std::time::Duration;

use contracts::AttitudeEstimate;
use metrics::{counter, gauge, histogram};

/// What happened in one fusion cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleObservation {
    /// 1-based cycle number
    pub cycle: u64,
    /// No fresh sample was available
    pub starved: bool,
    /// The accelerometer correction was applied
    pub corrected: bool,
    /// Integration step in seconds, if the engine advanced
    pub dt: Option<f64>,
    /// Time spent between wakeup and publish
    pub work: Duration,
    /// How late the wakeup was relative to its deadline
    pub lateness: Duration,
    /// Lateness exceeded one period
    pub overrun: bool,
    /// Estimate published this cycle
    pub estimate: AttitudeEstimate,
}

/// Record one cycle
pub fn record_cycle(obs: &CycleObservation) {
    counter!("attitude_cycles_total").increment(1);
    gauge!("attitude_last_cycle").set(obs.cycle as f64);

    if obs.starved {
        counter!("attitude_starved_cycles_total").increment(1);
    }
    if obs.corrected {
        counter!("attitude_gated_corrections_total").increment(1);
    }
    if obs.overrun {
        counter!("attitude_cycle_overruns_total").increment(1);
    }
    if let Some(dt) = obs.dt {
        histogram!("attitude_dt_ms").record(dt * 1000.0);
    }

    histogram!("attitude_cycle_work_ms").record(obs.work.as_secs_f64() * 1000.0);
    histogram!("attitude_cycle_lateness_ms").record(obs.lateness.as_secs_f64() * 1000.0);

    gauge!("attitude_pitch_deg").set(obs.estimate.pitch_deg);
    gauge!("attitude_roll_deg").set(obs.estimate.roll_deg);
}

/// Record an outbound frame
pub fn record_frame_published(publisher: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "attitude_frames_published_total",
        "publisher" => publisher.to_string(),
        "status" => status
    )
    .increment(1);
}

/// In-memory aggregation of cycle observations
#[derive(Debug, Clone, Default)]
pub struct LoopMetricsAggregator {
    pub total_cycles: u64,
    pub starved_cycles: u64,
    pub corrections: u64,
    pub overruns: u64,
    pub dt_ms: RunningStats,
    pub work_ms: RunningStats,
    pub pitch_deg: RunningStats,
    pub roll_deg: RunningStats,
    pub last_estimate: AttitudeEstimate,
}

impl LoopMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, obs: &CycleObservation) {
        self.total_cycles += 1;
        if obs.starved {
            self.starved_cycles += 1;
        }
        if obs.corrected {
            self.corrections += 1;
        }
        if obs.overrun {
            self.overruns += 1;
        }
        if let Some(dt) = obs.dt {
            self.dt_ms.push(dt * 1000.0);
        }
        self.work_ms.push(obs.work.as_secs_f64() * 1000.0);
        self.pitch_deg.push(obs.estimate.pitch_deg);
        self.roll_deg.push(obs.estimate.roll_deg);
        self.last_estimate = obs.estimate;
    }

    pub fn summary(&self) -> LoopSummary {
        let ratio = |n: u64| {
            if self.total_cycles > 0 {
                n as f64 / self.total_cycles as f64 * 100.0
            } else {
                0.0
            }
        };

        LoopSummary {
            total_cycles: self.total_cycles,
            starved_cycles: self.starved_cycles,
            corrections: self.corrections,
            overruns: self.overruns,
            starved_rate: ratio(self.starved_cycles),
            correction_rate: ratio(self.corrections),
            dt_ms: StatsSummary::from(&self.dt_ms),
            work_ms: StatsSummary::from(&self.work_ms),
            pitch_deg: StatsSummary::from(&self.pitch_deg),
            roll_deg: StatsSummary::from(&self.roll_deg),
            last_estimate: self.last_estimate,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Loop summary
#[derive(Debug, Clone, Default)]
pub struct LoopSummary {
    pub total_cycles: u64,
    pub starved_cycles: u64,
    pub corrections: u64,
    pub overruns: u64,
    pub starved_rate: f64,
    pub correction_rate: f64,
    pub dt_ms: StatsSummary,
    pub work_ms: StatsSummary,
    pub pitch_deg: StatsSummary,
    pub roll_deg: StatsSummary,
    pub last_estimate: AttitudeEstimate,
}

impl std::fmt::Display for LoopSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Fusion Loop Summary ===")?;
        writeln!(f, "Cycles: {}", self.total_cycles)?;
        writeln!(
            f,
            "Starved cycles: {} ({:.2}%)",
            self.starved_cycles, self.starved_rate
        )?;
        writeln!(
            f,
            "Gated corrections: {} ({:.2}%)",
            self.corrections, self.correction_rate
        )?;
        writeln!(f, "Overruns: {}", self.overruns)?;
        writeln!(f, "dt (ms): {}", self.dt_ms)?;
        writeln!(f, "Cycle work (ms): {}", self.work_ms)?;
        writeln!(f, "Pitch (deg): {}", self.pitch_deg)?;
        writeln!(f, "Roll (deg): {}", self.roll_deg)?;
        writeln!(
            f,
            "Last estimate: pitch={:.3} roll={:.3}",
            self.last_estimate.pitch_deg, self.last_estimate.roll_deg
        )
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online mean/variance (Welford)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
            return;
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.mean }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(cycle: u64, starved: bool, pitch_deg: f64) -> CycleObservation {
        CycleObservation {
            cycle,
            starved,
            corrected: !starved,
            dt: (!starved).then_some(0.1),
            work: Duration::from_micros(50),
            lateness: Duration::ZERO,
            overrun: false,
            estimate: AttitudeEstimate {
                pitch_deg,
                roll_deg: 0.0,
            },
        }
    }

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = LoopMetricsAggregator::new();
        aggregator.update(&observation(1, false, 1.0));
        aggregator.update(&observation(2, true, 1.0));
        aggregator.update(&observation(3, false, 2.0));

        let summary = aggregator.summary();
        assert_eq!(summary.total_cycles, 3);
        assert_eq!(summary.starved_cycles, 1);
        assert_eq!(summary.corrections, 2);
        assert_eq!(summary.dt_ms.count, 2);
        assert_eq!(summary.last_estimate.pitch_deg, 2.0);
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = LoopMetricsAggregator::new();
        for cycle in 1..=4 {
            aggregator.update(&observation(cycle, cycle == 4, 0.0));
        }

        let output = aggregator.summary().to_string();
        assert!(output.contains("Cycles: 4"));
        assert!(output.contains("Starved cycles: 1 (25.00%)"));
    }

    #[test]
    fn test_empty_summary() {
        let summary = LoopMetricsAggregator::new().summary();
        assert_eq!(summary.starved_rate, 0.0);
        assert_eq!(summary.dt_ms.to_string(), "N/A");
    }
}
