//! Pipeline orchestrator - wires ingress, fusion loop and publisher together.
//!
//! Startup opens both transports before anything runs; a failure there is fatal.
//! At runtime the loop and the ingress task are watched together: whichever ends
//! first stops the other, and transport resources are released before returning.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use contracts::{AttitudeBlueprint, FramePublisher};
use fusion::FusionEngine;
use ingestion::{
    Ingress, IngressHandle, MockImuConfig, MockImuSource, SampleDecoder, SampleSlot,
    UdpFrameSource,
};
use publisher::{AttitudeEncoder, FusionLoop, LogPublisher, LoopConfig, UdpFramePublisher};
use tokio::sync::watch;
use tracing::{error, info, warn};

use super::{RunEnd, RunStats};
use crate::error::{CliError, Result};

const MOCK_CHANNEL_CAPACITY: usize = 64;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Validated configuration
    pub blueprint: AttitudeBlueprint,

    /// Maximum number of cycles (None = unlimited)
    pub max_cycles: Option<u64>,

    /// Run timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Use the synthetic IMU instead of the subscribe endpoint
    pub mock: bool,

    /// Log estimates instead of sending them
    pub log_publisher: bool,
}

impl PipelineConfig {
    pub fn new(blueprint: AttitudeBlueprint) -> Self {
        Self {
            blueprint,
            max_cycles: None,
            timeout: None,
            mock: false,
            log_publisher: false,
        }
    }
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run until max cycles, timeout, `shutdown` resolving, or a fatal error.
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<RunStats> {
        let transport = &self.config.blueprint.transport;

        if self.config.log_publisher {
            let publisher = LogPublisher::new("attitude_log", transport.payload_format);
            self.run_with(publisher, shutdown).await
        } else {
            let publisher = UdpFramePublisher::connect(
                "attitude_pub",
                &transport.publish_endpoint,
                transport.max_packet_size,
            )
            .await
            .map_err(|e| CliError::connection("publish", e))?;
            self.run_with(publisher, shutdown).await
        }
    }

    async fn run_with<P>(
        self,
        mut publisher: P,
        shutdown: impl Future<Output = ()>,
    ) -> Result<RunStats>
    where
        P: FramePublisher + 'static,
    {
        let slot = Arc::new(SampleSlot::new());

        let (ingress, mock) = match self.start_ingress(slot.clone()).await {
            Ok(started) => started,
            Err(e) => {
                if let Err(close_err) = publisher.close().await {
                    warn!(error = %close_err, "failed to close publisher");
                }
                return Err(e);
            }
        };

        self.drive(publisher, slot, ingress, mock, shutdown).await
    }

    /// Run the fusion loop against an already running ingress task
    async fn drive<P>(
        self,
        publisher: P,
        slot: Arc<SampleSlot>,
        mut ingress: IngressHandle,
        mock: Option<MockImuSource>,
        shutdown: impl Future<Output = ()>,
    ) -> Result<RunStats>
    where
        P: FramePublisher + 'static,
    {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        let engine = FusionEngine::new(&blueprint.fusion, Instant::now());
        let loop_config =
            LoopConfig::from_blueprint(blueprint).with_max_cycles(self.config.max_cycles);
        let fusion_loop = FusionLoop::new(
            loop_config,
            engine,
            slot,
            publisher,
            AttitudeEncoder::from_blueprint(blueprint),
        );
        let loop_stats = fusion_loop.stats();
        let ingress_metrics = ingress.metrics().clone();

        let (stop_tx, stop_rx) = watch::channel(false);
        let mut loop_task = tokio::spawn(fusion_loop.run(stop_rx));

        info!(
            period_ms = blueprint.publisher.period_ms,
            max_cycles = ?self.config.max_cycles,
            mock = self.config.mock,
            "Fusion service running"
        );

        tokio::pin!(shutdown);
        let timeout = async {
            match self.config.timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(timeout);

        let mut end = RunEnd::MaxCycles;
        let mut stopping = false;
        let mut ingress_alive = true;
        let mut ingress_failure = None;

        let loop_result = loop {
            tokio::select! {
                result = &mut loop_task => break result,

                result = ingress.wait(), if ingress_alive => {
                    ingress_alive = false;
                    if let Err(e) = result {
                        error!(error = %e, "Ingress failed, stopping fusion loop");
                        ingress_failure = Some(e);
                    }
                    stop_tx.send_replace(true);
                }

                _ = &mut shutdown, if !stopping => {
                    warn!("Received shutdown signal, stopping fusion loop...");
                    stopping = true;
                    end = RunEnd::Signal;
                    stop_tx.send_replace(true);
                }

                _ = &mut timeout, if !stopping => {
                    warn!(timeout = ?self.config.timeout, "Run timed out");
                    stopping = true;
                    end = RunEnd::Timeout;
                    stop_tx.send_replace(true);
                }
            }
        };

        // Shutdown
        info!("Shutting down pipeline...");
        if let Some(mock) = &mock {
            mock.stop();
        }
        if ingress_alive {
            if let Err(e) = ingress.join().await {
                warn!(error = %e, "Ingress ended with error during shutdown");
            }
        }

        if let Some(e) = ingress_failure {
            return Err(e.into());
        }

        let report = loop_result
            .map_err(|e| CliError::Task {
                task: "fusion_loop",
                message: e.to_string(),
            })??;

        let stats = RunStats {
            end,
            duration: start_time.elapsed(),
            period: blueprint.publisher.period(),
            ingestion: ingress_metrics.snapshot(),
            loop_stats: loop_stats.snapshot(),
            summary: report.summary,
        };

        info!(
            cycles = report.cycles,
            duration_secs = stats.duration.as_secs_f64(),
            rate_hz = format!("{:.2}", stats.publish_rate_hz()),
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }

    /// Open the inbound side and spawn the ingress task
    async fn start_ingress(
        &self,
        slot: Arc<SampleSlot>,
    ) -> Result<(IngressHandle, Option<MockImuSource>)> {
        let blueprint = &self.config.blueprint;
        let transport = &blueprint.transport;
        let decoder = SampleDecoder::new(transport.imu_topic.clone(), transport.payload_format);
        let verbose = blueprint.publisher.print;

        if self.config.mock {
            info!("Running in MOCK mode (synthetic IMU, no subscriber socket)");
            let mock = MockImuSource::new(mock_config(blueprint));
            let source = mock.start(MOCK_CHANNEL_CAPACITY);
            let handle = Ingress::new(source, decoder, slot).verbose(verbose).spawn();
            return Ok((handle, Some(mock)));
        }

        let source = UdpFrameSource::bind(
            "imu_sub",
            &transport.subscribe_endpoint,
            transport.max_packet_size,
        )
        .await
        .map_err(|e| CliError::connection("subscribe", e))?;

        let handle = Ingress::new(source, decoder, slot).verbose(verbose).spawn();
        Ok((handle, None))
    }
}

fn mock_config(blueprint: &AttitudeBlueprint) -> MockImuConfig {
    MockImuConfig {
        topic: blueprint.transport.imu_topic.clone(),
        format: blueprint.transport.payload_format,
        gyro_sensitivity: blueprint.fusion.gyro_sensitivity,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use contracts::{ContractError, Frame, ImuSample};
    use ingestion::{channel_source, IngestionError};

    use super::*;

    fn mock_blueprint(period_ms: u64) -> AttitudeBlueprint {
        let mut blueprint = AttitudeBlueprint::default();
        blueprint.publisher.period_ms = period_ms;
        blueprint
    }

    #[tokio::test]
    async fn test_mock_run_to_max_cycles() {
        let mut config = PipelineConfig::new(mock_blueprint(10));
        config.mock = true;
        config.log_publisher = true;
        config.max_cycles = Some(5);

        let stats = Pipeline::new(config)
            .run(std::future::pending())
            .await
            .unwrap();

        assert_eq!(stats.end, RunEnd::MaxCycles);
        assert_eq!(stats.loop_stats.cycles, 5);
        assert_eq!(stats.loop_stats.published, 5);
    }

    #[tokio::test]
    async fn test_signal_stops_run() {
        let mut config = PipelineConfig::new(mock_blueprint(10));
        config.mock = true;
        config.log_publisher = true;

        let stats = Pipeline::new(config)
            .run(tokio::time::sleep(Duration::from_millis(100)))
            .await
            .unwrap();

        assert_eq!(stats.end, RunEnd::Signal);
        assert!(stats.loop_stats.cycles > 0);
    }

    #[tokio::test]
    async fn test_timeout_stops_run() {
        let mut config = PipelineConfig::new(mock_blueprint(10));
        config.mock = true;
        config.log_publisher = true;
        config.timeout = Some(Duration::from_millis(100));

        let stats = Pipeline::new(config)
            .run(std::future::pending())
            .await
            .unwrap();

        assert_eq!(stats.end, RunEnd::Timeout);
    }

    struct RecordingPublisher {
        published: Arc<AtomicUsize>,
        closed: Arc<AtomicBool>,
    }

    impl FramePublisher for RecordingPublisher {
        fn name(&self) -> &str {
            "recording"
        }

        async fn publish(&mut self, _frame: &Frame) -> std::result::Result<(), ContractError> {
            self.published.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn close(&mut self) -> std::result::Result<(), ContractError> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_source_failure_mid_run_is_fatal() {
        let blueprint = mock_blueprint(10);
        let format = blueprint.transport.payload_format;
        let slot = Arc::new(SampleSlot::new());

        let (tx, source) = channel_source("imu_chan", 4);
        let decoder = SampleDecoder::new("imu", format);
        let ingress = Ingress::new(source, decoder, slot.clone()).spawn();

        let published = Arc::new(AtomicUsize::new(0));
        let closed = Arc::new(AtomicBool::new(false));
        let publisher = RecordingPublisher {
            published: published.clone(),
            closed: closed.clone(),
        };

        // One good sample, then the bus goes away while the loop is running
        tokio::spawn(async move {
            let payload = format.encode(&ImuSample::level(0.0).to_fields()).unwrap();
            tx.send(Frame::new("imu", payload)).await.unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
            drop(tx);
        });

        let err = Pipeline::new(PipelineConfig::new(blueprint))
            .drive(publisher, slot, ingress, None, std::future::pending())
            .await
            .unwrap_err();

        assert!(
            matches!(
                err,
                CliError::Ingestion(IngestionError::Transport { ref source_name, .. })
                    if source_name == "imu_chan"
            ),
            "got: {err}"
        );
        assert!(published.load(Ordering::SeqCst) > 0);
        assert!(closed.load(Ordering::SeqCst), "publisher left open");
    }

    #[tokio::test]
    async fn test_subscribe_bind_failure_is_fatal() {
        let mut blueprint = mock_blueprint(10);
        blueprint.transport.subscribe_endpoint = "256.0.0.1:5559".to_string();
        let mut config = PipelineConfig::new(blueprint);
        config.log_publisher = true;

        let err = Pipeline::new(config)
            .run(std::future::pending())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CliError::Connection {
                role: "subscribe",
                ..
            }
        ));
    }
}
