//! Mock IMU source
//!
//! Generates a synthetic rocking motion so the service can run without real
//! hardware. Frames go through the same encode/decode path as live traffic.

use std::f64::consts::TAU;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use contracts::{Frame, ImuSample, PayloadFormat, Vector3};
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, trace, warn};

use crate::sources::{channel_source, ChannelFrameSource};

/// Mock IMU source configuration
#[derive(Debug, Clone)]
pub struct MockImuConfig {
    /// Topic to publish under
    pub topic: String,

    /// Sample rate (Hz)
    pub frequency_hz: f64,

    /// Payload format
    pub format: PayloadFormat,

    /// Raw gyro units per rad/s
    pub gyro_sensitivity: f64,

    /// Peak pitch angle (degrees). Roll swings at half this amplitude.
    pub amplitude_deg: f64,

    /// Rocking frequency (Hz)
    pub motion_hz: f64,
}

impl Default for MockImuConfig {
    fn default() -> Self {
        Self {
            topic: "imu".to_string(),
            frequency_hz: 100.0,
            format: PayloadFormat::Bincode,
            gyro_sensitivity: 1.0,
            amplitude_deg: 10.0,
            motion_hz: 0.2,
        }
    }
}

impl MockImuConfig {
    /// True attitude (pitch, roll) in radians at time `t`
    pub fn attitude_at(&self, t: f64) -> (f64, f64) {
        let phase = (TAU * self.motion_hz * t).sin();
        let pitch = self.amplitude_deg.to_radians() * phase;
        (pitch, pitch / 2.0)
    }

    /// Sample consistent with [`attitude_at`](Self::attitude_at): 1 g tilted by
    /// the attitude, gyro equal to its time derivative.
    pub fn sample_at(&self, t: f64) -> ImuSample {
        let (pitch, roll) = self.attitude_at(t);
        let omega = TAU * self.motion_hz;
        let pitch_rate = self.amplitude_deg.to_radians() * omega * (omega * t).cos();
        let roll_rate = pitch_rate / 2.0;

        ImuSample {
            timestamp: t,
            uptime: t,
            accel: Vector3::new(
                -roll.sin() * pitch.cos(),
                pitch.sin(),
                roll.cos() * pitch.cos(),
            ),
            // Roll integrates with the opposite sign of gyro y
            gyro: Vector3::new(
                pitch_rate * self.gyro_sensitivity,
                -roll_rate * self.gyro_sensitivity,
                0.0,
            ),
            mag: Vector3::new(0.2, 0.0, 0.4),
            temperature: 25.0,
        }
    }

    fn frame_at(&self, t: f64) -> Option<Frame> {
        let payload = self.format.encode(&self.sample_at(t).to_fields()).ok()?;
        Some(Frame::new(self.topic.clone(), payload))
    }
}

/// Mock IMU source
pub struct MockImuSource {
    config: MockImuConfig,
    running: Arc<AtomicBool>,
}

impl MockImuSource {
    pub fn new(config: MockImuConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Default rocking motion on `topic`
    pub fn rocking(topic: &str, frequency_hz: f64) -> Self {
        Self::new(MockImuConfig {
            topic: topic.to_string(),
            frequency_hz,
            ..Default::default()
        })
    }

    /// Motionless, level IMU
    pub fn level(topic: &str, frequency_hz: f64) -> Self {
        Self::new(MockImuConfig {
            topic: topic.to_string(),
            frequency_hz,
            amplitude_deg: 0.0,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &MockImuConfig {
        &self.config
    }

    /// Start generating frames, returning the receiving side as a frame source.
    ///
    /// Frames are dropped when the channel is full, like a slow subscriber on a bus.
    pub fn start(&self, channel_capacity: usize) -> ChannelFrameSource {
        let (tx, source) = channel_source("mock_imu", channel_capacity);
        let config = self.config.clone();
        let running = self.running.clone();

        running.store(true, Ordering::SeqCst);

        tokio::spawn(async move {
            let interval = Duration::from_secs_f64(1.0 / config.frequency_hz);
            let start_time = tokio::time::Instant::now();

            debug!(
                topic = %config.topic,
                frequency_hz = config.frequency_hz,
                amplitude_deg = config.amplitude_deg,
                "mock IMU source started"
            );

            while running.load(Ordering::Relaxed) {
                let t = start_time.elapsed().as_secs_f64();
                let Some(frame) = config.frame_at(t) else {
                    warn!("mock IMU sample could not be encoded");
                    break;
                };

                match tx.try_send(frame) {
                    Ok(()) => trace!(t, "mock IMU frame sent"),
                    Err(TrySendError::Full(_)) => trace!(t, "mock IMU frame dropped"),
                    Err(TrySendError::Closed(_)) => break,
                }

                tokio::time::sleep(interval).await;
            }

            running.store(false, Ordering::SeqCst);
            debug!(topic = %config.topic, "mock IMU source stopped");
        });

        source
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

impl Drop for MockImuSource {
    fn drop(&mut self) {
        self.stop();
    }
}
