//! Rate-controlled fusion loop
//!
//! Every period `T` the loop wakes at an absolute deadline, takes whatever sample
//! the ingress task left in the slot, advances the fusion engine and publishes
//! the estimate. Deadlines are computed as `anchor + T` from the previous
//! deadline, not from the wakeup time, so work and scheduling jitter never
//! accumulate into drift.

use std::sync::Arc;
use std::time::Duration;

use contracts::{AttitudeBlueprint, FramePublisher, ImuSample, StarvationPolicy};
use fusion::{FusionEngine, StepOutcome};
use ingestion::SampleSlot;
use observability::{CycleObservation, LoopMetricsAggregator, LoopSummary};
use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, instrument, trace, warn};

use crate::encoder::AttitudeEncoder;
use crate::error::PublisherError;
use crate::stats::LoopStats;

/// Loop configuration
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Cycle period `T`
    pub period: Duration,
    /// Behaviour on cycles with no fresh sample
    pub starvation_policy: StarvationPolicy,
    /// Stop after this many cycles (None = run until shutdown)
    pub max_cycles: Option<u64>,
    /// Log every estimate at info level
    pub print: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(100),
            starvation_policy: StarvationPolicy::Hold,
            max_cycles: None,
            print: false,
        }
    }
}

impl LoopConfig {
    pub fn from_blueprint(blueprint: &AttitudeBlueprint) -> Self {
        Self {
            period: blueprint.publisher.period(),
            starvation_policy: blueprint.publisher.starvation_policy,
            max_cycles: None,
            print: blueprint.publisher.print,
        }
    }

    pub fn with_max_cycles(mut self, max_cycles: Option<u64>) -> Self {
        self.max_cycles = max_cycles;
        self
    }
}

/// Why the loop returned normally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    MaxCycles,
    Shutdown,
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct LoopReport {
    pub cycles: u64,
    pub stop_reason: StopReason,
    pub summary: LoopSummary,
}

/// The fusion/publish loop
pub struct FusionLoop<P> {
    config: LoopConfig,
    engine: FusionEngine,
    slot: Arc<SampleSlot>,
    publisher: P,
    encoder: AttitudeEncoder,
    stats: Arc<LoopStats>,
    aggregator: LoopMetricsAggregator,
}

impl<P: FramePublisher> FusionLoop<P> {
    pub fn new(
        config: LoopConfig,
        engine: FusionEngine,
        slot: Arc<SampleSlot>,
        publisher: P,
        encoder: AttitudeEncoder,
    ) -> Self {
        Self {
            config,
            engine,
            slot,
            publisher,
            encoder,
            stats: Arc::new(LoopStats::new()),
            aggregator: LoopMetricsAggregator::new(),
        }
    }

    /// Shared counters, readable while the loop runs
    pub fn stats(&self) -> Arc<LoopStats> {
        self.stats.clone()
    }

    pub fn engine(&self) -> &FusionEngine {
        &self.engine
    }

    /// Run until `max_cycles`, a shutdown signal, or a publish failure.
    ///
    /// The publisher is closed on every exit path.
    ///
    /// # Errors
    /// Returns [`PublisherError::Publish`] if a publish fails. The failure is
    /// treated as fatal: no retry, no reconnect.
    #[instrument(
        name = "fusion_loop_run",
        skip_all,
        fields(
            publisher = %self.publisher.name(),
            period_ms = self.config.period.as_millis() as u64,
            policy = ?self.config.starvation_policy,
        )
    )]
    pub async fn run(
        mut self,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<LoopReport, PublisherError> {
        let period = self.config.period;
        let mut anchor = Instant::now();
        self.engine.reset_clock(anchor.into_std());

        info!(schema = ?self.encoder.schema(), "fusion loop started");

        let mut cycle: u64 = 0;
        let stop_reason = loop {
            if self.config.max_cycles.is_some_and(|max| cycle >= max) {
                break StopReason::MaxCycles;
            }
            if *shutdown.borrow() {
                break StopReason::Shutdown;
            }

            let deadline = anchor + period;
            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break StopReason::Shutdown;
                    }
                    continue;
                }

                _ = sleep_until(deadline) => {}
            }

            anchor = deadline;
            cycle += 1;

            if let Err(e) = self.cycle(cycle, deadline).await {
                error!(cycle, error = %e, "fusion loop failed");
                self.close_publisher().await;
                return Err(e);
            }
        };

        self.close_publisher().await;

        let summary = self.aggregator.summary();
        info!(
            cycles = cycle,
            starved = summary.starved_cycles,
            overruns = summary.overruns,
            reason = ?stop_reason,
            "fusion loop stopped"
        );

        Ok(LoopReport {
            cycles: cycle,
            stop_reason,
            summary,
        })
    }

    async fn cycle(&mut self, cycle: u64, deadline: Instant) -> Result<(), PublisherError> {
        let woke = Instant::now();
        let lateness = woke.saturating_duration_since(deadline);
        let overrun = lateness >= self.config.period;
        if overrun {
            self.stats.inc_overruns();
            warn!(cycle, lateness_ms = lateness.as_millis() as u64, "cycle overrun");
        }

        let sample = self.slot.take();
        let starved = sample.is_none();
        let outcome = self.fuse(sample, deadline);

        let schema = self.encoder.schema();
        let fields = self.engine.output_fields(schema);
        let frame = self
            .encoder
            .encode(&fields)
            .map_err(|source| PublisherError::Encode { cycle, source })?;

        let published = self.publisher.publish(&frame).await;
        observability::record_frame_published(self.publisher.name(), published.is_ok());
        if let Err(source) = published {
            self.stats.inc_publish_failures();
            return Err(PublisherError::publish(self.publisher.name(), cycle, source));
        }
        self.stats.inc_published();

        let estimate = self.engine.estimate();
        let observation = CycleObservation {
            cycle,
            starved,
            corrected: outcome.is_some_and(|o| o.corrected),
            dt: outcome.map(|o| o.dt),
            work: woke.elapsed(),
            lateness,
            overrun,
            estimate,
        };
        self.record(&observation);

        if self.config.print {
            info!(
                cycle,
                pitch_deg = estimate.pitch_deg,
                roll_deg = estimate.roll_deg,
                starved,
                fields = ?fields,
                "attitude published"
            );
        } else {
            trace!(
                cycle,
                pitch_deg = estimate.pitch_deg,
                roll_deg = estimate.roll_deg,
                starved,
                "attitude published"
            );
        }

        Ok(())
    }

    fn fuse(&mut self, sample: Option<ImuSample>, deadline: Instant) -> Option<StepOutcome> {
        let now = deadline.into_std();
        match (sample, self.config.starvation_policy) {
            (Some(sample), _) => Some(self.engine.advance(&sample, now)),
            (None, StarvationPolicy::Hold) => {
                if self.config.print {
                    debug!("no fresh sample, holding previous estimate");
                }
                None
            }
            (None, StarvationPolicy::FreeRun) => self.engine.free_run(now),
        }
    }

    fn record(&mut self, observation: &CycleObservation) {
        self.stats.inc_cycles();
        if observation.starved {
            self.stats.inc_starved();
        }
        if observation.corrected {
            self.stats.inc_corrections();
        }
        observability::record_cycle(observation);
        self.aggregator.update(observation);
    }

    async fn close_publisher(&mut self) {
        if let Err(e) = self.publisher.close().await {
            warn!(publisher = %self.publisher.name(), error = %e, "failed to close publisher");
        }
    }
}
