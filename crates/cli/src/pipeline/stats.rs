//! Run statistics.

use std::time::Duration;

use ingestion::MetricsSnapshot;
use observability::LoopSummary;
use publisher::StatsSnapshot;

/// How a run ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunEnd {
    /// Reached `--max-cycles`
    #[default]
    MaxCycles,
    /// Ctrl+C or SIGTERM
    Signal,
    /// Reached `--timeout`
    Timeout,
}

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Why the run stopped
    pub end: RunEnd,

    /// Wall-clock duration of the run
    pub duration: Duration,

    /// Configured cycle period
    pub period: Duration,

    /// Ingress counters
    pub ingestion: MetricsSnapshot,

    /// Loop counters
    pub loop_stats: StatsSnapshot,

    /// Aggregated per-cycle metrics
    pub summary: LoopSummary,
}

impl RunStats {
    /// Achieved publish rate
    pub fn publish_rate_hz(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.loop_stats.published as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Configured publish rate
    pub fn target_rate_hz(&self) -> f64 {
        if self.period.is_zero() {
            0.0
        } else {
            1.0 / self.period.as_secs_f64()
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     Attitude Fuser Run                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Ended by: {:?}", self.end);
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Cycles: {}", self.loop_stats.cycles);
        println!("   ├─ Published: {}", self.loop_stats.published);
        println!(
            "   └─ Rate: {:.2} Hz (target {:.2} Hz)",
            self.publish_rate_hz(),
            self.target_rate_hz()
        );

        let ingestion = &self.ingestion;
        println!("\n📥 Ingestion");
        println!("   ├─ Frames received: {}", ingestion.frames_received);
        println!("   ├─ Filtered by topic: {}", ingestion.frames_filtered);
        println!("   ├─ Decode errors: {}", ingestion.decode_errors);
        println!("   ├─ Samples written: {}", ingestion.samples_written);
        println!("   └─ Samples overwritten: {}", ingestion.samples_overwritten);

        let summary = &self.summary;
        println!("\n📈 Fusion");
        println!(
            "   ├─ Starved cycles: {} ({:.2}%)",
            summary.starved_cycles, summary.starved_rate
        );
        println!(
            "   ├─ Gated corrections: {} ({:.2}%)",
            summary.corrections, summary.correction_rate
        );
        println!("   ├─ Overruns: {}", summary.overruns);
        println!("   ├─ dt (ms): {}", summary.dt_ms);
        println!("   ├─ Cycle work (ms): {}", summary.work_ms);
        println!(
            "   └─ Last estimate: pitch={:.3}° roll={:.3}°",
            summary.last_estimate.pitch_deg, summary.last_estimate.roll_deg
        );

        println!();
    }
}
