//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::AttitudeBlueprint;
use tracing::info;

use crate::cli::InfoArgs;

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let json = config_loader::ConfigLoader::to_json(&blueprint)
            .context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint);
    }

    Ok(())
}

fn print_config_info(blueprint: &AttitudeBlueprint) {
    let transport = &blueprint.transport;
    let fusion = &blueprint.fusion;
    let publisher = &blueprint.publisher;

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Attitude Fuser Configuration                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📡 Transport");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Subscribe: {}", transport.subscribe_endpoint);
    println!("   ├─ IMU topic: {}", transport.imu_topic);
    println!("   ├─ Publish: {}", transport.publish_endpoint);
    println!("   ├─ Attitude topic: {}", transport.attitude_topic);
    println!("   ├─ Payload format: {}", transport.payload_format.as_str());
    println!("   └─ Max packet size: {} bytes", transport.max_packet_size);

    println!("\n🧭 Fusion");
    println!("   ├─ Gyro sensitivity: {} raw/(rad/s)", fusion.gyro_sensitivity);
    println!(
        "   ├─ Pitch: {:.3} gyro / {:.3} accel",
        fusion.pitch_gyro_weight,
        1.0 - fusion.pitch_gyro_weight
    );
    println!(
        "   ├─ Roll: {:.3} gyro / {:.3} accel",
        fusion.roll_gyro_weight,
        1.0 - fusion.roll_gyro_weight
    );
    println!(
        "   └─ Accel gate: {} g ≤ |a| ≤ {} g",
        fusion.gate_min_g, fusion.gate_max_g
    );

    println!("\n⚙️  Publisher");
    println!(
        "   ├─ Period: {} ms ({:.2} Hz)",
        publisher.period_ms,
        1000.0 / publisher.period_ms as f64
    );
    println!("   ├─ Starvation policy: {:?}", publisher.starvation_policy);
    println!("   ├─ Output schema: {:?}", publisher.output_schema);
    println!("   └─ Print: {}", publisher.print);

    println!();
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_info_json_and_text() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(br#"{"publisher": {"output_schema": "quaternion"}}"#)
            .unwrap();

        for json in [true, false] {
            let args = InfoArgs {
                config: file.path().to_path_buf(),
                json,
            };
            assert!(run_info(&args).is_ok());
        }
    }

    #[test]
    fn test_info_missing_file() {
        let args = InfoArgs {
            config: "/nonexistent/config.toml".into(),
            json: false,
        };
        assert!(run_info(&args).is_err());
    }
}
