//! Configuration file parsing and structures.
//!
//! remolight uses a single TOML file. Every `[[accessories]]` entry becomes one bridge
//! accessory; the `accessory` key selects which registered accessory kind builds it.

use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use secrecy::SecretString;
use serde::Deserialize;
use serde::Serialize;
use tracing_subscriber::filter::LevelFilter;

use crate::light::DimmingModes;

/// Accessory kind registered by the Nature Remo light
pub const NATURE_REMO_LIGHT: &str = "NatureRemoLightDeviceExt";

pub const DEFAULT_BASE_URL: &str = "https://api.nature.global";

/// Top-level configuration
#[derive(Debug)]
pub struct Config {
    pub logging: LoggingConfig,
    pub api: ApiConfig,
    pub cloud: CloudConfig,
    pub accessories: Vec<AccessoryConfig>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default)]
    pub level: LogLevel,

    /// Per-target levels, e.g. `"remolight::remo" = "debug"`
    #[serde(default)]
    pub overrides: HashMap<String, LogLevel>,
}

fn default_listen() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8581
}

/// HTTP surface the bridge talks to
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// Nature Remo cloud endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct CloudConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Transport timeout for a single request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// A validated accessory entry
#[derive(Debug)]
pub struct AccessoryConfig {
    /// Registered accessory kind that builds this entry
    pub kind: String,

    pub appliance: ApplianceConfig,
}

/// Everything needed to drive one cloud appliance. Immutable after construction.
#[derive(Debug)]
pub struct ApplianceConfig {
    /// Appliance id in the Nature Remo account
    pub id: String,

    /// Bearer token for the cloud API
    pub access_token: SecretString,

    /// Accessory name shown by the bridge
    pub name: String,

    pub modes: DimmingModes,
}

impl ApplianceConfig {
    /// Validate and build an appliance config. Blank `id`, `access_token` or `name` is
    /// rejected, with every offending field reported.
    pub fn new(
        id: impl Into<String>,
        access_token: impl Into<String>,
        name: impl Into<String>,
        modes: DimmingModes,
    ) -> Result<Self, ConfigError> {
        let raw = RawAccessory {
            accessory: NATURE_REMO_LIGHT.to_string(),
            name: Some(name.into()),
            id: Some(id.into()),
            access_token: Some(access_token.into()),
            full: modes.full,
            night: modes.night,
        };
        raw.validate("").map(|a| a.appliance).map_err(ConfigError::Invalid)
    }
}

/// A single validation failure, with the dotted path of the offending field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field_path: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field_path, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("\n  {}", e))
        .collect::<String>()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration:{}", format_validation_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn default_accessory_kind() -> String {
    NATURE_REMO_LIGHT.to_string()
}

/// On-disk shape, before validation
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    logging: LoggingConfig,

    #[serde(default)]
    api: ApiConfig,

    #[serde(default)]
    cloud: CloudConfig,

    #[serde(default)]
    accessories: Vec<RawAccessory>,
}

#[derive(Debug, Deserialize)]
struct RawAccessory {
    #[serde(default = "default_accessory_kind")]
    accessory: String,

    name: Option<String>,

    id: Option<String>,

    #[serde(alias = "accessToken")]
    access_token: Option<String>,

    #[serde(default)]
    full: bool,

    #[serde(default)]
    night: bool,
}

fn required(
    value: Option<String>,
    field_path: String,
    errors: &mut Vec<ValidationError>,
) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        Some(_) => {
            errors.push(ValidationError {
                field_path,
                message: "must not be empty".to_string(),
            });
            String::new()
        }
        None => {
            errors.push(ValidationError {
                field_path,
                message: "is required".to_string(),
            });
            String::new()
        }
    }
}

impl RawAccessory {
    fn validate(self, prefix: &str) -> Result<AccessoryConfig, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let id = required(self.id, format!("{}id", prefix), &mut errors);
        let access_token = required(
            self.access_token,
            format!("{}access_token", prefix),
            &mut errors,
        );
        let name = required(self.name, format!("{}name", prefix), &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(AccessoryConfig {
            kind: self.accessory,
            appliance: ApplianceConfig {
                id,
                access_token: SecretString::from(access_token),
                name,
                modes: DimmingModes::new(self.full, self.night),
            },
        })
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(path.as_ref().to_path_buf(), e))?;

        Self::parse(&contents)
    }

    /// Parse and validate configuration, reporting all validation errors together
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(contents)?;

        let mut errors = Vec::new();
        let mut accessories = Vec::new();
        let mut names = HashSet::new();

        for (i, raw_accessory) in raw.accessories.into_iter().enumerate() {
            let prefix = format!("accessories[{}].", i);
            match raw_accessory.validate(&prefix) {
                Ok(accessory) => {
                    if !names.insert(accessory.appliance.name.clone()) {
                        errors.push(ValidationError {
                            field_path: format!("{}name", prefix),
                            message: format!(
                                "duplicate accessory name '{}'",
                                accessory.appliance.name
                            ),
                        });
                    }
                    accessories.push(accessory);
                }
                Err(e) => errors.extend(e),
            }
        }

        if !errors.is_empty() {
            return Err(ConfigError::Invalid(errors));
        }

        Ok(Config {
            logging: raw.logging,
            api: raw.api,
            cloud: raw.cloud,
            accessories,
        })
    }
}
