//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Generate `AttitudeBlueprint`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("config.toml")).unwrap();
//! println!("Period: {} ms", blueprint.publisher.period_ms);
//! ```

mod parser;
mod validator;

pub use contracts::AttitudeBlueprint;
pub use parser::ConfigFormat;
pub use validator::validate;

use contracts::ContractError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<AttitudeBlueprint, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<AttitudeBlueprint, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Serialize AttitudeBlueprint to TOML string
    pub fn to_toml(blueprint: &AttitudeBlueprint) -> Result<String, ContractError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize AttitudeBlueprint to JSON string
    pub fn to_json(blueprint: &AttitudeBlueprint) -> Result<String, ContractError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<AttitudeBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{OutputSchema, PayloadFormat, StarvationPolicy};
    use std::io::Write;

    const FULL_TOML: &str = r#"
[transport]
subscribe_endpoint = "0.0.0.0:5559"
publish_endpoint = "127.0.0.1:5560"
imu_topic = "imu"
attitude_topic = "att"
payload_format = "json"

[fusion]
gyro_sensitivity = 131.0
pitch_gyro_weight = 0.98
roll_gyro_weight = 0.98

[publisher]
period_ms = 100
starvation_policy = "hold"
output_schema = "euler"
print = true
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(FULL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.transport.payload_format, PayloadFormat::Json);
        assert_eq!(bp.fusion.gyro_sensitivity, 131.0);
        assert_eq!(bp.publisher.starvation_policy, StarvationPolicy::Hold);
        assert_eq!(bp.publisher.output_schema, OutputSchema::Euler);
        assert!(bp.publisher.print);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let bp = ConfigLoader::load_from_str("", ConfigFormat::Toml).unwrap();
        assert_eq!(bp.transport.imu_topic, "imu");
        assert_eq!(bp.publisher.period_ms, 100);
    }

    #[test]
    fn test_round_trip_toml() {
        let bp = ConfigLoader::load_from_str(FULL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.transport.subscribe_endpoint, bp2.transport.subscribe_endpoint);
        assert_eq!(bp.fusion, bp2.fusion);
    }

    #[test]
    fn test_round_trip_json() {
        let bp = ConfigLoader::load_from_str(FULL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(bp.publisher.period_ms, bp2.publisher.period_ms);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[fusion]
gyro_sensitivity = 0.0
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("gyro_sensitivity"));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(FULL_TOML.as_bytes()).unwrap();

        let bp = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(bp.transport.subscribe_endpoint, "0.0.0.0:5559");
    }

    #[test]
    fn test_load_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }
}
