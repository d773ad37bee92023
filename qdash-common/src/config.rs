//! Configuration loading
//!
//! Bootstrap configuration follows this priority order:
//! 1. Command-line argument (highest priority, parsed by the binary)
//! 2. Environment variable (parsed by the binary alongside the CLI)
//! 3. TOML config file
//! 4. Compiled defaults (fallback)
//!
//! A missing TOML file is not an error: the service logs a warning and starts
//! with compiled defaults. A TOML file that exists but does not parse is an error.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::family::TableFamily;
use crate::{Error, Result};

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Path to the production SQLite database (opened read-only)
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Listen address
    #[serde(default = "default_bind")]
    pub bind: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory of static dashboard assets served at `/` (optional)
    #[serde(default)]
    pub static_dir: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub report: ReportSettings,

    /// Table families, matched against table names in order
    #[serde(default = "default_families")]
    pub families: Vec<TableFamily>,
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// The configured file does not exist; compiled defaults are in use
    Missing(PathBuf),
    /// No config file was given or found; compiled defaults are in use
    Defaults,
}

impl ConfigSource {
    /// Report the outcome of `TomlConfig::load_or_default`
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded configuration from {}", path.display()),
            ConfigSource::Missing(path) => warn!(
                "Config file not found at {}, using compiled defaults",
                path.display()
            ),
            ConfigSource::Defaults => warn!("No config file found, using compiled defaults"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is not set (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Report pipeline tunables
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReportSettings {
    /// Prefix prepended to bare vehicle type codes ("254" → "V254")
    #[serde(default = "default_type_prefix")]
    pub type_prefix: String,

    /// Model reported by the summary when no record carries a vehicle type
    #[serde(default = "default_model")]
    pub default_model: String,

    /// First hour of the day shift (inclusive)
    #[serde(default = "default_day_shift_start")]
    pub day_shift_start: u32,

    /// First hour after the day shift (exclusive)
    #[serde(default = "default_day_shift_end")]
    pub day_shift_end: u32,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_type_prefix() -> String {
    "V".to_string()
}

fn default_model() -> String {
    "V254".to_string()
}

fn default_day_shift_start() -> u32 {
    7
}

fn default_day_shift_end() -> u32 {
    19
}

fn default_families() -> Vec<TableFamily> {
    vec![TableFamily::default()]
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            type_prefix: default_type_prefix(),
            default_model: default_model(),
            day_shift_start: default_day_shift_start(),
            day_shift_end: default_day_shift_end(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            bind: default_bind(),
            port: default_port(),
            static_dir: None,
            logging: LoggingConfig::default(),
            report: ReportSettings::default(),
            families: default_families(),
        }
    }
}

impl TomlConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load `path` if given and present, otherwise fall back to compiled defaults
    ///
    /// Nothing is logged here: this runs before the tracing subscriber exists, so the
    /// caller logs the returned `ConfigSource` once logging is up.
    pub fn load_or_default(path: Option<&Path>) -> Result<(Self, ConfigSource)> {
        match path {
            Some(path) if path.exists() => {
                Ok((Self::load(path)?, ConfigSource::File(path.to_path_buf())))
            }
            Some(path) => Ok((Self::default(), ConfigSource::Missing(path.to_path_buf()))),
            None => Ok((Self::default(), ConfigSource::Defaults)),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let report = &self.report;
        if report.day_shift_start >= report.day_shift_end || report.day_shift_end > 24 {
            return Err(Error::Config(format!(
                "day shift hours must satisfy start < end <= 24 (got {}..{})",
                report.day_shift_start, report.day_shift_end
            )));
        }

        if self.families.is_empty() {
            return Err(Error::Config(
                "at least one table family must be configured".to_string(),
            ));
        }

        for family in &self.families {
            family.validate()?;
        }

        Ok(())
    }

    /// Database path from TOML, or the compiled default
    pub fn database_path_or_default(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(default_database_path)
    }
}

/// Resolve which config file to read
///
/// An explicit path (CLI or environment) wins. Otherwise the platform locations are
/// probed: `<config dir>/qdash/config.toml`, then `/etc/qdash/config.toml` on Linux.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let user_config = dirs::config_dir().map(|d| d.join("qdash").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/qdash/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Compiled default database location
pub fn default_database_path() -> PathBuf {
    PathBuf::from("productiondata_db.db")
}
