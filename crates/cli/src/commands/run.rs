//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::AttitudeBlueprint;
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_service(args: &RunArgs) -> Result<()> {
    let blueprint = load_blueprint(args)?;

    info!(
        subscribe = %blueprint.transport.subscribe_endpoint,
        publish = %blueprint.transport.publish_endpoint,
        imu_topic = %blueprint.transport.imu_topic,
        attitude_topic = %blueprint.transport.attitude_topic,
        period_ms = blueprint.publisher.period_ms,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let pipeline_config = PipelineConfig {
        max_cycles: (args.max_cycles != 0).then_some(args.max_cycles),
        timeout: (args.timeout != 0).then(|| Duration::from_secs(args.timeout)),
        mock: args.mock,
        log_publisher: args.log_publisher,
        ..PipelineConfig::new(blueprint)
    };

    info!("Starting fusion service...");

    let stats = Pipeline::new(pipeline_config)
        .run(shutdown_signal())
        .await
        .context("Fusion service failed")?;

    info!(
        cycles = stats.loop_stats.cycles,
        published = stats.loop_stats.published,
        duration_secs = stats.duration.as_secs_f64(),
        ended_by = ?stats.end,
        "Fusion service finished"
    );
    stats.print_summary();

    Ok(())
}

/// Load the config file (or defaults), apply CLI overrides, validate the result
pub fn load_blueprint(args: &RunArgs) -> Result<AttitudeBlueprint> {
    let mut blueprint = match &args.config {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            if !path.exists() {
                return Err(CliError::config_not_found(path.display().to_string()).into());
            }
            config_loader::ConfigLoader::load_from_path(path)
                .map_err(CliError::Config)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => {
            info!("No configuration file given, using built-in defaults");
            AttitudeBlueprint::default()
        }
    };

    apply_overrides(&mut blueprint, args);

    config_loader::validate(&blueprint)
        .map_err(CliError::Config)
        .context("Configuration invalid after applying CLI overrides")?;

    Ok(blueprint)
}

fn apply_overrides(blueprint: &mut AttitudeBlueprint, args: &RunArgs) {
    if let Some(ref subscribe) = args.subscribe {
        info!(subscribe = %subscribe, "Overriding subscribe endpoint from CLI");
        blueprint.transport.subscribe_endpoint = subscribe.clone();
    }
    if let Some(ref publish) = args.publish {
        info!(publish = %publish, "Overriding publish endpoint from CLI");
        blueprint.transport.publish_endpoint = publish.clone();
    }
    if let Some(period_ms) = args.period_ms {
        info!(period_ms, "Overriding period from CLI");
        blueprint.publisher.period_ms = period_ms;
    }
    if args.print {
        blueprint.publisher.print = true;
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &AttitudeBlueprint) {
    let transport = &blueprint.transport;
    let fusion = &blueprint.fusion;
    let publisher = &blueprint.publisher;

    println!("\n=== Configuration Summary ===\n");
    println!("Transport:");
    println!(
        "  Subscribe: {} (topic '{}')",
        transport.subscribe_endpoint, transport.imu_topic
    );
    println!(
        "  Publish: {} (topic '{}')",
        transport.publish_endpoint, transport.attitude_topic
    );
    println!("  Payload format: {}", transport.payload_format.as_str());

    println!("\nFusion:");
    println!("  Gyro sensitivity: {}", fusion.gyro_sensitivity);
    println!(
        "  Gyro weights: pitch {} / roll {}",
        fusion.pitch_gyro_weight, fusion.roll_gyro_weight
    );
    println!("  Accel gate: [{}, {}] g", fusion.gate_min_g, fusion.gate_max_g);

    println!("\nPublisher:");
    println!("  Period: {} ms", publisher.period_ms);
    println!("  Starvation policy: {:?}", publisher.starvation_policy);
    println!("  Output schema: {:?}", publisher.output_schema);

    println!();
}
