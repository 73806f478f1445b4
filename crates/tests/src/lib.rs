//! # Integration Tests
//!
//! Cross-crate end-to-end tests.
//!
//! Covers:
//! - config file to running pipeline
//! - in-memory pipelines with paused time
//! - loopback UDP pipelines

#[cfg(test)]
mod config_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{OutputSchema, StarvationPolicy};
    use publisher::{AttitudeEncoder, LoopConfig};

    const CONFIG: &str = r#"
[transport]
subscribe_endpoint = "127.0.0.1:0"
publish_endpoint = "127.0.0.1:5560"
imu_topic = "imu"
attitude_topic = "att"
payload_format = "json"

[fusion]
gyro_sensitivity = 131.0
pitch_gyro_weight = 0.98
roll_gyro_weight = 0.98

[publisher]
period_ms = 20
starvation_policy = "free_run"
output_schema = "quaternion"
"#;

    #[test]
    fn test_config_drives_components() {
        let blueprint = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();

        let loop_config = LoopConfig::from_blueprint(&blueprint);
        assert_eq!(loop_config.period.as_millis(), 20);
        assert_eq!(loop_config.starvation_policy, StarvationPolicy::FreeRun);

        let encoder = AttitudeEncoder::from_blueprint(&blueprint);
        assert_eq!(encoder.schema(), OutputSchema::Quaternion);

        let filter = fusion::ComplementaryFilter::new(&blueprint.fusion);
        assert_eq!(filter.gate().min_g, 0.9);
    }

    #[test]
    fn test_toml_json_equivalent() {
        let blueprint = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&blueprint).unwrap();
        let reparsed = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();

        assert_eq!(reparsed.fusion, blueprint.fusion);
        assert_eq!(reparsed.publisher.period_ms, 20);
        assert_eq!(reparsed.transport.payload_format, blueprint.transport.payload_format);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use bytes::Bytes;
    use contracts::{
        Frame, FusionConfig, ImuSample, OutputSchema, PayloadFormat, StarvationPolicy, Vector3,
    };
    use fusion::FusionEngine;
    use ingestion::{
        channel_source, Ingress, MockImuSource, SampleDecoder, SampleSlot, UdpFrameSource,
    };
    use publisher::{
        channel_publisher, AttitudeEncoder, FusionLoop, LoopConfig, StopReason, UdpFramePublisher,
    };
    use tokio::net::UdpSocket;
    use tokio::sync::watch;

    const GYR_SENS: f64 = 131.0;

    fn fusion_config() -> FusionConfig {
        FusionConfig {
            gyro_sensitivity: GYR_SENS,
            ..Default::default()
        }
    }

    fn loop_config(period_ms: u64, max_cycles: u64) -> LoopConfig {
        LoopConfig {
            period: Duration::from_millis(period_ms),
            starvation_policy: StarvationPolicy::Hold,
            max_cycles: Some(max_cycles),
            print: false,
        }
    }

    fn imu_frame(topic: &str, sample: &ImuSample, format: PayloadFormat) -> Frame {
        let payload = format.encode(&sample.to_fields()).unwrap();
        Frame::new(topic.to_string(), payload)
    }

    /// channel source -> ingress -> slot -> fusion loop -> channel publisher
    #[tokio::test(start_paused = true)]
    async fn test_e2e_channel_pipeline() {
        let slot = Arc::new(SampleSlot::new());
        let (frame_tx, source) = channel_source("imu_chan", 64);
        let decoder = SampleDecoder::new("imu", PayloadFormat::Json);
        let ingress = Ingress::new(source, decoder, slot.clone()).spawn();

        let (publisher, mut attitude_rx) = channel_publisher("att_chan", 64);
        let fusion_loop = FusionLoop::new(
            loop_config(100, 10),
            FusionEngine::new(&fusion_config(), std::time::Instant::now()),
            slot,
            publisher,
            AttitudeEncoder::new("att", OutputSchema::Euler, PayloadFormat::Json),
        );
        let (_stop_tx, stop_rx) = watch::channel(false);
        let loop_task = tokio::spawn(fusion_loop.run(stop_rx));

        // Upstream: a level IMU at 50 Hz with some garbage mixed in
        let upstream = tokio::spawn(async move {
            for i in 0..60 {
                let sample = ImuSample::level(i as f64 * 0.02);
                let frame = imu_frame("imu", &sample, PayloadFormat::Json);
                if frame_tx.send(frame).await.is_err() {
                    break;
                }
                if i % 7 == 0 {
                    let _ = frame_tx.send(Frame::new(&b"imu"[..], &b"garbage"[..])).await;
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        });

        let mut published = Vec::new();
        while let Some(frame) = attitude_rx.recv().await {
            assert_eq!(&frame.topic[..], b"att");
            published.push(PayloadFormat::Json.decode(&frame.payload).unwrap());
        }

        let report = loop_task.await.unwrap().unwrap();
        upstream.await.unwrap();
        let ingest_stats = ingress.metrics().snapshot();
        ingress.join().await.unwrap();

        assert_eq!(report.cycles, 10);
        assert_eq!(report.stop_reason, StopReason::MaxCycles);
        assert_eq!(published.len(), 10);
        for fields in &published {
            assert_eq!(fields.len(), 4);
            assert!(fields[0].abs() < 1e-9 && fields[1].abs() < 1e-9);
        }
        assert!(ingest_stats.decode_errors > 0);
        assert!(ingest_stats.samples_overwritten > 0);
    }

    /// Gyro-only motion accumulates linearly through the whole pipeline
    #[tokio::test(start_paused = true)]
    async fn test_e2e_gyro_drift() {
        let slot = Arc::new(SampleSlot::new());
        let (frame_tx, source) = channel_source("imu_chan", 64);
        let ingress = Ingress::new(
            source,
            SampleDecoder::new("imu", PayloadFormat::Bincode),
            slot.clone(),
        )
        .spawn();

        let (publisher, mut attitude_rx) = channel_publisher("att_chan", 64);
        let fusion_loop = FusionLoop::new(
            loop_config(100, 5),
            FusionEngine::new(&fusion_config(), std::time::Instant::now()),
            slot,
            publisher,
            AttitudeEncoder::new("att", OutputSchema::Euler, PayloadFormat::Bincode),
        );
        let (_stop_tx, stop_rx) = watch::channel(false);
        let loop_task = tokio::spawn(fusion_loop.run(stop_rx));

        // Free fall (gate fails) while rotating about x at 0.5 rad/s
        let rotating = ImuSample {
            accel: Vector3::default(),
            gyro: Vector3::new(0.5 * GYR_SENS, 0.0, 0.0),
            ..ImuSample::level(0.0)
        };
        let upstream = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            for _ in 0..5 {
                let frame = imu_frame("imu", &rotating, PayloadFormat::Bincode);
                if frame_tx.send(frame).await.is_err() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        });

        let mut pitches = Vec::new();
        while let Some(frame) = attitude_rx.recv().await {
            pitches.push(PayloadFormat::Bincode.decode(&frame.payload).unwrap()[0]);
        }
        loop_task.await.unwrap().unwrap();
        upstream.await.unwrap();
        ingress.join().await.unwrap();

        let step_deg = (0.5_f64 * 0.1).to_degrees();
        assert_eq!(pitches.len(), 5);
        for (n, pitch) in pitches.iter().enumerate() {
            assert!((pitch - step_deg * (n + 1) as f64).abs() < 1e-6, "cycle {n}: {pitch}");
        }
    }

    /// Mock IMU rocking motion stays within its physical range after fusion
    #[tokio::test(start_paused = true)]
    async fn test_e2e_mock_source_tracking() {
        let mock = MockImuSource::new(ingestion::MockImuConfig {
            gyro_sensitivity: GYR_SENS,
            ..Default::default()
        });
        let amplitude = mock.config().amplitude_deg;

        let slot = Arc::new(SampleSlot::new());
        let ingress = Ingress::new(
            mock.start(64),
            SampleDecoder::new("imu", PayloadFormat::Bincode),
            slot.clone(),
        )
        .spawn();

        let (publisher, mut attitude_rx) = channel_publisher("att_chan", 128);
        let fusion_loop = FusionLoop::new(
            loop_config(100, 50),
            FusionEngine::new(&fusion_config(), std::time::Instant::now()),
            slot,
            publisher,
            AttitudeEncoder::new("att", OutputSchema::Euler, PayloadFormat::Bincode),
        );
        let (_stop_tx, stop_rx) = watch::channel(false);
        let loop_task = tokio::spawn(fusion_loop.run(stop_rx));

        let mut count = 0;
        while let Some(frame) = attitude_rx.recv().await {
            let fields = PayloadFormat::Bincode.decode(&frame.payload).unwrap();
            assert!(fields[0].abs() <= amplitude + 2.0, "pitch {}", fields[0]);
            assert!(fields[1].abs() <= amplitude / 2.0 + 2.0, "roll {}", fields[1]);
            count += 1;
        }

        let report = loop_task.await.unwrap().unwrap();
        mock.stop();
        ingress.join().await.unwrap();

        assert_eq!(count, 50);
        assert!(report.summary.corrections > 0);
    }

    /// Loopback UDP: raw IMU datagrams in, attitude datagrams out
    #[tokio::test]
    async fn test_e2e_udp_loopback() {
        let source = UdpFrameSource::bind("imu_sub", "127.0.0.1:0", 65000)
            .await
            .unwrap();
        let subscribe_addr = source.local_addr().unwrap();

        let downstream = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let publish_endpoint = downstream.local_addr().unwrap().to_string();
        let publisher = UdpFramePublisher::connect("att_pub", &publish_endpoint, 65000)
            .await
            .unwrap();

        let slot = Arc::new(SampleSlot::new());
        let ingress = Ingress::new(
            source,
            SampleDecoder::new("imu", PayloadFormat::Bincode),
            slot.clone(),
        )
        .spawn();

        let fusion_loop = FusionLoop::new(
            loop_config(20, 10),
            FusionEngine::new(&fusion_config(), std::time::Instant::now()),
            slot,
            publisher,
            AttitudeEncoder::new("att", OutputSchema::Quaternion, PayloadFormat::Bincode),
        );
        let (_stop_tx, stop_rx) = watch::channel(false);
        let loop_task = tokio::spawn(fusion_loop.run(stop_rx));

        // Upstream device: level samples, one malformed datagram, one foreign topic
        let upstream = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        upstream.send_to(b"\x00", subscribe_addr).await.unwrap();
        let foreign = imu_frame("mag", &ImuSample::level(0.0), PayloadFormat::Bincode);
        upstream
            .send_to(&foreign.encode().unwrap(), subscribe_addr)
            .await
            .unwrap();
        for i in 0..5 {
            let frame = imu_frame("imu", &ImuSample::level(i as f64), PayloadFormat::Bincode);
            upstream
                .send_to(&frame.encode().unwrap(), subscribe_addr)
                .await
                .unwrap();
        }

        let mut buf = vec![0u8; 65536];
        let mut received = Vec::new();
        while received.len() < 10 {
            let len = tokio::time::timeout(Duration::from_secs(2), downstream.recv(&mut buf))
                .await
                .expect("attitude datagram")
                .unwrap();
            let frame = Frame::decode(Bytes::copy_from_slice(&buf[..len])).unwrap();
            assert_eq!(&frame.topic[..], b"att");
            received.push(PayloadFormat::Bincode.decode(&frame.payload).unwrap());
        }

        let report = loop_task.await.unwrap().unwrap();
        let ingest_stats = ingress.metrics().snapshot();
        ingress.join().await.unwrap();

        assert_eq!(report.cycles, 10);
        // Level device -> identity quaternion
        for q in &received {
            assert!((q[0] - 1.0).abs() < 1e-9);
            assert!(q[1..].iter().all(|v| v.abs() < 1e-9));
        }
        assert_eq!(ingest_stats.decode_errors, 1);
        assert_eq!(ingest_stats.frames_filtered, 1);
        assert!(ingest_stats.samples_written >= 1);
    }
}
