//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::AttitudeBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    subscribe_endpoint: String,
    publish_endpoint: String,
    imu_topic: String,
    attitude_topic: String,
    rate_hz: f64,
    starvation_policy: String,
    output_schema: String,
    payload_format: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(summarize(&blueprint)),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

fn summarize(blueprint: &AttitudeBlueprint) -> ConfigSummary {
    let transport = &blueprint.transport;
    ConfigSummary {
        version: format!("{:?}", blueprint.version),
        subscribe_endpoint: transport.subscribe_endpoint.clone(),
        publish_endpoint: transport.publish_endpoint.clone(),
        imu_topic: transport.imu_topic.clone(),
        attitude_topic: transport.attitude_topic.clone(),
        rate_hz: 1000.0 / blueprint.publisher.period_ms as f64,
        starvation_policy: format!("{:?}", blueprint.publisher.starvation_policy),
        output_schema: format!("{:?}", blueprint.publisher.output_schema),
        payload_format: transport.payload_format.as_str().to_string(),
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &AttitudeBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();
    let transport = &blueprint.transport;
    let fusion = &blueprint.fusion;

    if transport.subscribe_endpoint == transport.publish_endpoint {
        warnings.push("subscribe and publish endpoints are identical".to_string());
    }

    if transport.attitude_topic.starts_with(&transport.imu_topic) {
        warnings.push(format!(
            "attitude topic '{}' matches the IMU topic filter '{}'",
            transport.attitude_topic, transport.imu_topic
        ));
    }

    if fusion.pitch_gyro_weight != fusion.roll_gyro_weight {
        warnings.push(format!(
            "pitch and roll gyro weights differ ({} vs {})",
            fusion.pitch_gyro_weight, fusion.roll_gyro_weight
        ));
    }

    if fusion.gate_min_g == fusion.gate_max_g {
        warnings.push("accelerometer gate admits a single magnitude only".to_string());
    }

    if blueprint.publisher.period_ms < 5 {
        warnings.push(format!(
            "publisher.period_ms = {} is very short",
            blueprint.publisher.period_ms
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!(
                "  Subscribe: {} (topic '{}')",
                summary.subscribe_endpoint, summary.imu_topic
            );
            println!(
                "  Publish: {} (topic '{}')",
                summary.publish_endpoint, summary.attitude_topic
            );
            println!("  Rate: {:.2} Hz", summary.rate_hz);
            println!("  Starvation policy: {}", summary.starvation_policy);
            println!("  Output: {} / {}", summary.output_schema, summary.payload_format);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
