//! Configuration system for omni-survey
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (OMNI_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::export::ExportFormat;
use crate::survey::participant::DEFAULT_PREFIX;

/// File name searched for in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "omni-survey.toml";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyConfig {
    /// Survey intake settings
    pub survey: SurveySettings,

    /// Data storage paths
    pub storage: StorageSettings,

    /// Export defaults
    pub export: ExportSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Survey intake settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveySettings {
    /// Prefix for generated participant ids, e.g. "TD-OMNI" gives "TD-OMNI-3FA9"
    pub participant_prefix: String,
}

/// Storage path settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Base data directory; submissions live under `<data_dir>/submissions`
    pub data_dir: String,
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Format used when `export` is run without `--format`: json or csv
    pub default_format: String,

    /// Directory for export files when `--output` is not given (unset = stdout)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Maximum log file size in MB before rotation
    pub max_file_size_mb: u64,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

// Default implementations

impl Default for SurveySettings {
    fn default() -> Self {
        Self {
            participant_prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.omni-survey/data".to_string(),
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            default_format: ExportFormat::Json.as_str().to_string(),
            output_dir: None,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_file_size_mb: 100,
            max_files: 5,
            json_format: false,
        }
    }
}

impl SurveyConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        // 1. Load from config file if it exists
        if let Some(path) = Self::find_config_file(config_path)? {
            config = Self::from_file(&path)?;
        }

        // 2. Apply environment variable overrides
        config.apply_env_overrides();

        // 3. Expand paths
        config.expand_paths();

        // 4. Validate
        config.validate()?;

        Ok(config)
    }

    /// Parse a single TOML file, without overrides or validation
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading configuration file");
        let content = fs::read_to_string(path).map_err(|e| Error::IoRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = toml::from_str(&content)?;
        info!(path = %path.display(), "Configuration loaded from file");
        Ok(config)
    }

    /// Find the configuration file to use
    pub fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        // If explicit path provided, use it (error if not found)
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(Error::config_not_found(path));
        }

        for path in search_paths() {
            if path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("OMNI_PARTICIPANT_PREFIX") {
            self.survey.participant_prefix = val;
        }

        if let Ok(val) = std::env::var("OMNI_DATA_DIR") {
            self.storage.data_dir = val;
        }

        if let Ok(val) = std::env::var("OMNI_EXPORT_FORMAT") {
            self.export.default_format = val;
        }
        if let Ok(val) = std::env::var("OMNI_EXPORT_DIR") {
            self.export.output_dir = Some(val);
        }

        if let Ok(val) = std::env::var("OMNI_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("OMNI_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("OMNI_LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Expand ~ and other path variables
    fn expand_paths(&mut self) {
        self.storage.data_dir = expand_path(&self.storage.data_dir);

        if let Some(ref dir) = self.export.output_dir {
            self.export.output_dir = Some(expand_path(dir));
        }
        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let prefix = &self.survey.participant_prefix;
        if prefix.trim().is_empty() {
            return Err(Error::config_field_invalid(
                "survey.participant_prefix",
                "Participant prefix cannot be empty",
            ));
        }
        if !prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(Error::config_field_invalid(
                "survey.participant_prefix",
                "Participant prefix may only contain letters, digits, '-' and '_'",
            ));
        }

        if self.storage.data_dir.trim().is_empty() {
            return Err(Error::config_field_invalid(
                "storage.data_dir",
                "Data directory cannot be empty",
            ));
        }

        if self.export.default_format.parse::<ExportFormat>().is_err() {
            return Err(Error::config_field_invalid(
                "export.default_format",
                format!(
                    "Invalid export format '{}'. Must be one of: json, csv",
                    self.export.default_format
                ),
            ));
        }

        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        Ok(())
    }

    /// Get the data directory as a PathBuf
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir)
    }

    /// Default export format. Falls back to JSON if the value was never validated.
    pub fn export_format(&self) -> ExportFormat {
        self.export
            .default_format
            .parse()
            .unwrap_or(ExportFormat::Json)
    }

    pub fn export_dir(&self) -> Option<PathBuf> {
        self.export.output_dir.as_ref().map(PathBuf::from)
    }
}

/// Standard locations, searched in order.
fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("omni-survey").join("config.toml"));
    }
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".omni-survey").join("config.toml"));
    }
    paths.push(PathBuf::from("/etc/omni-survey/config.toml"));
    paths
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Default location written by `config init`
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".omni-survey")
        .join("config.toml")
}

/// Initialize a new configuration file, returning the path written
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(default_config_path);

    if config_path.exists() && !force {
        return Err(Error::config_validation(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(&config_path, generate_default_config()).map_err(|e| Error::IoWrite {
        path: config_path.clone(),
        source: e,
    })?;

    info!(path = %config_path.display(), "Configuration file created");
    Ok(config_path)
}

/// Generate default configuration content with comments
fn generate_default_config() -> String {
    format!(
        r#"# omni-survey configuration

[survey]
# Prefix for generated participant ids
participant_prefix = "{prefix}"

[storage]
# Base data directory (submissions are stored under <data_dir>/submissions)
data_dir = "~/.omni-survey/data"

[export]
# Format used when --format is not given: json or csv
default_format = "json"

# Directory for export files when --output is not given (comment out for stdout)
# output_dir = "~/.omni-survey/exports"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (comment out to disable file logging)
# file = "~/.omni-survey/logs/omni-survey.log"

# Maximum log file size in MB before rotation
max_file_size_mb = 100

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#,
        prefix = DEFAULT_PREFIX
    )
}
