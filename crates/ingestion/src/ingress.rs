//! Ingress task
//!
//! Reads frames from a source, decodes IMU samples and writes them to the
//! shared slot. Runs until told to stop or until the source fails.

use std::sync::Arc;

use contracts::{ContractError, Frame, FrameSource};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::decode::SampleDecoder;
use crate::error::{IngestionError, Result};
use crate::metrics::IngestionMetrics;
use crate::slot::SampleSlot;

/// Ingress worker, not yet started
pub struct Ingress<S> {
    source: S,
    decoder: SampleDecoder,
    slot: Arc<SampleSlot>,
    metrics: Arc<IngestionMetrics>,
    verbose: bool,
}

impl<S: FrameSource + 'static> Ingress<S> {
    pub fn new(source: S, decoder: SampleDecoder, slot: Arc<SampleSlot>) -> Self {
        Self {
            source,
            decoder,
            slot,
            metrics: Arc::new(IngestionMetrics::new()),
            verbose: false,
        }
    }

    /// Share an existing metrics instance
    pub fn with_metrics(mut self, metrics: Arc<IngestionMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Log every sample and every dropped frame at a visible level
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.metrics.clone()
    }

    /// Receive until `shutdown` flips to `true` (or its sender is dropped).
    ///
    /// # Errors
    /// Returns [`IngestionError::Transport`] when the source fails with a
    /// non-decode error. Malformed frames are dropped and never end the loop.
    #[instrument(name = "ingress_run", skip_all, fields(source = %self.source.name()))]
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        info!(
            topic = %String::from_utf8_lossy(self.decoder.topic()),
            format = self.decoder.format().as_str(),
            "ingress started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }

                received = self.source.recv() => match received {
                    Ok(frame) => self.handle_frame(frame),
                    Err(e) if e.is_decode() => {
                        self.metrics.record_received();
                        self.drop_frame(&e);
                    }
                    Err(e) => {
                        error!(error = %e, "frame source failed");
                        return Err(IngestionError::Transport {
                            source_name: self.source.name().to_string(),
                            source: e,
                        });
                    }
                },
            }
        }

        let stats = self.metrics.snapshot();
        info!(
            frames_received = stats.frames_received,
            samples_written = stats.samples_written,
            decode_errors = stats.decode_errors,
            "ingress stopped"
        );
        Ok(())
    }

    /// Spawn [`run`](Self::run) on the runtime with its own shutdown signal
    pub fn spawn(self) -> IngressHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let metrics = self.metrics.clone();
        let task = tokio::spawn(self.run(shutdown_rx));

        IngressHandle {
            shutdown: shutdown_tx,
            task,
            metrics,
        }
    }

    fn handle_frame(&self, frame: Frame) {
        self.metrics.record_received();

        match self.decoder.decode(&frame) {
            Ok(Some(sample)) => {
                if self.verbose {
                    info!(
                        timestamp = sample.timestamp,
                        accel = ?sample.accel,
                        gyro = ?sample.gyro,
                        "sample received"
                    );
                }
                let overwrote = self.slot.write(sample);
                self.metrics.record_written(overwrote);
            }
            Ok(None) => {
                self.metrics.record_filtered();
                debug!(topic = %String::from_utf8_lossy(&frame.topic), "frame filtered by topic");
            }
            Err(e) => self.drop_frame(&e),
        }
    }

    fn drop_frame(&self, error: &ContractError) {
        self.metrics.record_decode_error();
        if self.verbose {
            warn!(error = %error, "dropping malformed frame");
        } else {
            debug!(error = %error, "dropping malformed frame");
        }
    }
}

/// Handle to a running ingress task
pub struct IngressHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<Result<()>>,
    metrics: Arc<IngestionMetrics>,
}

impl IngressHandle {
    /// Ask the task to stop at its next wakeup
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn metrics(&self) -> &Arc<IngestionMetrics> {
        &self.metrics
    }

    /// Wait for the task to end on its own.
    ///
    /// Cancel-safe, so it can sit in a `select!`. Do not call again once it
    /// has resolved.
    pub async fn wait(&mut self) -> Result<()> {
        match (&mut self.task).await {
            Ok(result) => result,
            Err(e) => Err(IngestionError::TaskFailed {
                message: e.to_string(),
            }),
        }
    }

    /// Signal shutdown and wait for the task to finish
    pub async fn join(mut self) -> Result<()> {
        self.shutdown();
        self.wait().await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use contracts::{ImuSample, PayloadFormat};
    use tokio::sync::mpsc;

    use super::*;
    use crate::sources::channel_source;

    fn imu_frame(ts: f64) -> Frame {
        let payload = PayloadFormat::Bincode
            .encode(&ImuSample::level(ts).to_fields())
            .unwrap();
        Frame::new(&b"imu"[..], payload)
    }

    async fn settle() {
        // Let the ingress task drain the channel
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    fn start(capacity: usize) -> (mpsc::Sender<Frame>, Arc<SampleSlot>, IngressHandle) {
        let (tx, source) = channel_source("test", capacity);
        let slot = Arc::new(SampleSlot::new());
        let decoder = SampleDecoder::new("imu", PayloadFormat::Bincode);
        let handle = Ingress::new(source, decoder, slot.clone()).spawn();
        (tx, slot, handle)
    }

    #[tokio::test]
    async fn test_latest_sample_wins() {
        let (tx, slot, handle) = start(16);

        for ts in [1.0, 2.0, 3.0] {
            tx.send(imu_frame(ts)).await.unwrap();
        }
        settle().await;

        assert_eq!(slot.take().map(|s| s.timestamp), Some(3.0));
        assert!(slot.take().is_none());

        let stats = handle.metrics().snapshot();
        assert_eq!(stats.samples_written, 3);
        assert_eq!(stats.samples_overwritten, 2);

        handle.join().await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_frames_dropped() {
        let (tx, slot, handle) = start(16);

        tx.send(Frame::new(&b"imu"[..], &b"\x01\x02"[..])).await.unwrap();
        tx.send(imu_frame(5.0)).await.unwrap();
        let short = PayloadFormat::Bincode.encode(&[1.0; 11]).unwrap();
        tx.send(Frame::new(&b"imu"[..], short)).await.unwrap();
        settle().await;

        assert_eq!(slot.take().map(|s| s.timestamp), Some(5.0));
        assert!(!handle.is_finished());

        let stats = handle.metrics().snapshot();
        assert_eq!(stats.frames_received, 3);
        assert_eq!(stats.decode_errors, 2);

        handle.join().await.unwrap();
    }

    #[tokio::test]
    async fn test_other_topics_ignored() {
        let (tx, slot, handle) = start(16);

        let payload = PayloadFormat::Bincode
            .encode(&ImuSample::level(1.0).to_fields())
            .unwrap();
        tx.send(Frame::new(&b"att"[..], payload)).await.unwrap();
        settle().await;

        assert!(slot.is_empty());
        assert_eq!(handle.metrics().snapshot().frames_filtered, 1);

        handle.join().await.unwrap();
    }

    #[tokio::test]
    async fn test_source_failure_ends_task() {
        let (tx, _slot, mut handle) = start(4);
        drop(tx);

        let result = tokio::time::timeout(Duration::from_secs(1), handle.wait())
            .await
            .unwrap();
        assert!(matches!(result, Err(IngestionError::Transport { .. })));
    }

    #[tokio::test]
    async fn test_shutdown_stops_idle_task() {
        let (_tx, _slot, handle) = start(4);
        tokio::time::timeout(Duration::from_secs(1), handle.join())
            .await
            .unwrap()
            .unwrap();
    }
}
