//! AttitudeBlueprint - Config Loader output
//!
//! Describes the full process configuration: transport endpoints and topics,
//! filter constants, and publish cadence.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{OutputSchema, PayloadFormat};

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete configuration blueprint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttitudeBlueprint {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Bus endpoints and topics
    #[serde(default)]
    pub transport: TransportConfig,

    /// Complementary filter constants
    #[serde(default)]
    pub fusion: FusionConfig,

    /// Publish cadence and output layout
    #[serde(default)]
    pub publisher: PublisherConfig,
}

/// Transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Local address the subscriber binds to (inbound IMU frames)
    #[serde(default = "default_subscribe_endpoint")]
    pub subscribe_endpoint: String,

    /// Remote address attitude frames are sent to
    #[serde(default = "default_publish_endpoint")]
    pub publish_endpoint: String,

    /// Topic filter for inbound IMU frames
    #[serde(default = "default_imu_topic")]
    pub imu_topic: String,

    /// Topic for outbound attitude frames
    #[serde(default = "default_attitude_topic")]
    pub attitude_topic: String,

    /// Payload encoding, both directions
    #[serde(default)]
    pub payload_format: PayloadFormat,

    /// Largest datagram accepted or sent
    #[serde(default = "default_max_packet_size")]
    pub max_packet_size: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            subscribe_endpoint: default_subscribe_endpoint(),
            publish_endpoint: default_publish_endpoint(),
            imu_topic: default_imu_topic(),
            attitude_topic: default_attitude_topic(),
            payload_format: PayloadFormat::default(),
            max_packet_size: default_max_packet_size(),
        }
    }
}

fn default_subscribe_endpoint() -> String {
    "127.0.0.1:5559".to_string()
}

fn default_publish_endpoint() -> String {
    "127.0.0.1:5560".to_string()
}

fn default_imu_topic() -> String {
    "imu".to_string()
}

fn default_attitude_topic() -> String {
    "att".to_string()
}

fn default_max_packet_size() -> usize {
    65000
}

/// Complementary filter configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionConfig {
    /// Raw gyro units per rad/s
    #[serde(default = "default_gyro_sensitivity")]
    pub gyro_sensitivity: f64,

    /// Gyro trust for pitch (alpha); accelerometer gets `1 - alpha`
    #[serde(default = "default_gyro_weight")]
    pub pitch_gyro_weight: f64,

    /// Gyro trust for roll (beta); accelerometer gets `1 - beta`
    #[serde(default = "default_gyro_weight")]
    pub roll_gyro_weight: f64,

    /// Lower specific-force bound (g) for accelerometer correction, inclusive
    #[serde(default = "default_gate_min_g")]
    pub gate_min_g: f64,

    /// Upper specific-force bound (g) for accelerometer correction, inclusive
    #[serde(default = "default_gate_max_g")]
    pub gate_max_g: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            gyro_sensitivity: default_gyro_sensitivity(),
            pitch_gyro_weight: default_gyro_weight(),
            roll_gyro_weight: default_gyro_weight(),
            gate_min_g: default_gate_min_g(),
            gate_max_g: default_gate_max_g(),
        }
    }
}

fn default_gyro_sensitivity() -> f64 {
    1.0
}

fn default_gyro_weight() -> f64 {
    0.95
}

fn default_gate_min_g() -> f64 {
    0.9
}

fn default_gate_max_g() -> f64 {
    1.1
}

/// What a cycle publishes when no fresh sample arrived
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StarvationPolicy {
    /// Republish the previous estimate, leave the integration clock untouched
    #[default]
    Hold,
    /// Integrate the last known gyro rate over the elapsed time, no correction
    FreeRun,
}

/// Publisher loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// Cycle period (ms)
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,

    /// Behaviour when the sample slot is empty
    #[serde(default)]
    pub starvation_policy: StarvationPolicy,

    /// Outbound payload layout
    #[serde(default)]
    pub output_schema: OutputSchema,

    /// Log every sample and estimate
    #[serde(default)]
    pub print: bool,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            period_ms: default_period_ms(),
            starvation_policy: StarvationPolicy::default(),
            output_schema: OutputSchema::default(),
            print: false,
        }
    }
}

impl PublisherConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

fn default_period_ms() -> u64 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blueprint_defaults() {
        let bp = AttitudeBlueprint::default();
        assert_eq!(bp.transport.imu_topic, "imu");
        assert_eq!(bp.transport.payload_format, PayloadFormat::Bincode);
        assert_eq!(bp.fusion.pitch_gyro_weight, 0.95);
        assert_eq!(bp.fusion.roll_gyro_weight, 0.95);
        assert_eq!(bp.publisher.period(), Duration::from_millis(100));
        assert_eq!(bp.publisher.starvation_policy, StarvationPolicy::Hold);
    }

    #[test]
    fn blueprint_partial_toml() {
        let bp: AttitudeBlueprint = toml::from_str(
            r#"
[fusion]
gyro_sensitivity = 131.0

[publisher]
period_ms = 1000
starvation_policy = "free_run"
output_schema = "quaternion"
"#,
        )
        .unwrap();

        assert_eq!(bp.fusion.gyro_sensitivity, 131.0);
        assert_eq!(bp.fusion.gate_max_g, 1.1);
        assert_eq!(bp.publisher.period_ms, 1000);
        assert_eq!(bp.publisher.starvation_policy, StarvationPolicy::FreeRun);
        assert_eq!(bp.publisher.output_schema, OutputSchema::Quaternion);
        assert_eq!(bp.transport.subscribe_endpoint, "127.0.0.1:5559");
    }
}
