//! Config validation
//!
//! Rules:
//! - endpoints parse as socket addresses
//! - topics are non-empty
//! - gyro_sensitivity is finite and non-zero
//! - gyro weights lie strictly inside (0, 1)
//! - 0 < gate_min_g <= gate_max_g
//! - 0 < max_packet_size <= MAX_DATAGRAM_SIZE
//! - period_ms > 0

use std::net::SocketAddr;

use contracts::{
    AttitudeBlueprint, ContractError, FusionConfig, PublisherConfig, TransportConfig,
    MAX_DATAGRAM_SIZE,
};

/// Validate an AttitudeBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &AttitudeBlueprint) -> Result<(), ContractError> {
    validate_transport(&blueprint.transport)?;
    validate_fusion(&blueprint.fusion)?;
    validate_publisher(&blueprint.publisher)?;
    Ok(())
}

fn validate_transport(transport: &TransportConfig) -> Result<(), ContractError> {
    validate_endpoint("transport.subscribe_endpoint", &transport.subscribe_endpoint)?;
    validate_endpoint("transport.publish_endpoint", &transport.publish_endpoint)?;

    if transport.imu_topic.is_empty() {
        return Err(ContractError::config_validation(
            "transport.imu_topic",
            "topic cannot be empty",
        ));
    }
    if transport.attitude_topic.is_empty() {
        return Err(ContractError::config_validation(
            "transport.attitude_topic",
            "topic cannot be empty",
        ));
    }
    if transport.attitude_topic.len() > u16::MAX as usize {
        return Err(ContractError::config_validation(
            "transport.attitude_topic",
            "topic longer than 65535 bytes",
        ));
    }
    if transport.max_packet_size == 0 {
        return Err(ContractError::config_validation(
            "transport.max_packet_size",
            "max_packet_size must be > 0",
        ));
    }
    if transport.max_packet_size > MAX_DATAGRAM_SIZE {
        return Err(ContractError::config_validation(
            "transport.max_packet_size",
            format!("max_packet_size must be <= {MAX_DATAGRAM_SIZE}"),
        ));
    }
    Ok(())
}

fn validate_endpoint(field: &str, endpoint: &str) -> Result<(), ContractError> {
    endpoint.parse::<SocketAddr>().map(|_| ()).map_err(|e| {
        ContractError::config_validation(field, format!("invalid address '{endpoint}': {e}"))
    })
}

fn validate_fusion(fusion: &FusionConfig) -> Result<(), ContractError> {
    if !fusion.gyro_sensitivity.is_finite() || fusion.gyro_sensitivity == 0.0 {
        return Err(ContractError::config_validation(
            "fusion.gyro_sensitivity",
            format!(
                "gyro_sensitivity must be finite and non-zero, got {}",
                fusion.gyro_sensitivity
            ),
        ));
    }

    for (field, weight) in [
        ("fusion.pitch_gyro_weight", fusion.pitch_gyro_weight),
        ("fusion.roll_gyro_weight", fusion.roll_gyro_weight),
    ] {
        if !(weight > 0.0 && weight < 1.0) {
            return Err(ContractError::config_validation(
                field,
                format!("weight must be in (0, 1), got {weight}"),
            ));
        }
    }

    if !(fusion.gate_min_g > 0.0 && fusion.gate_min_g <= fusion.gate_max_g)
        || !fusion.gate_max_g.is_finite()
    {
        return Err(ContractError::config_validation(
            "fusion.gate_min_g / fusion.gate_max_g",
            format!(
                "gate bounds must satisfy 0 < gate_min_g ({}) <= gate_max_g ({})",
                fusion.gate_min_g, fusion.gate_max_g
            ),
        ));
    }
    Ok(())
}

fn validate_publisher(publisher: &PublisherConfig) -> Result<(), ContractError> {
    if publisher.period_ms == 0 {
        return Err(ContractError::config_validation(
            "publisher.period_ms",
            "period_ms must be > 0",
        ));
    }
    Ok(())
}
