//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Attitude Fuser - IMU tilt estimation service
#[derive(Parser, Debug)]
#[command(
    name = "attitude-fuser",
    author,
    version,
    about = "IMU attitude fusion service",
    long_about = "Subscribes to raw IMU samples, fuses gyro and accelerometer readings with a \n\
                  complementary filter, and publishes pitch/roll at a fixed rate."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "ATTITUDE_FUSER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "ATTITUDE_FUSER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the fusion service
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON). Built-in defaults when omitted.
    #[arg(short, long, env = "ATTITUDE_FUSER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the subscribe endpoint (UDP bind address)
    #[arg(long, env = "ATTITUDE_FUSER_SUBSCRIBE")]
    pub subscribe: Option<String>,

    /// Override the publish endpoint (UDP destination)
    #[arg(long, env = "ATTITUDE_FUSER_PUBLISH")]
    pub publish: Option<String>,

    /// Override the publish period in milliseconds
    #[arg(long, env = "ATTITUDE_FUSER_PERIOD_MS")]
    pub period_ms: Option<u64>,

    /// Log every sample and estimate
    #[arg(long)]
    pub print: bool,

    /// Stop after this many cycles (0 = unlimited)
    #[arg(long, default_value = "0", env = "ATTITUDE_FUSER_MAX_CYCLES")]
    pub max_cycles: u64,

    /// Run timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "ATTITUDE_FUSER_TIMEOUT")]
    pub timeout: u64,

    /// Feed the filter from a built-in synthetic IMU instead of the network
    #[arg(long)]
    pub mock: bool,

    /// Log estimates instead of sending them to the publish endpoint
    #[arg(long)]
    pub log_publisher: bool,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", env = "ATTITUDE_FUSER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
