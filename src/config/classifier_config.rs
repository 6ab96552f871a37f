//! Classifier Configuration - scheme, parallelism, model and output settings
//!
//! Every section implements `Default`, so an empty or missing file yields a
//! working configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;
use crate::types::Scheme;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// Load with `ClassifierConfig::load()` which searches:
/// 1. `$EDS_MINERAL_CONFIG` env var
/// 2. `./eds_mineral.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Scheme selection and batch execution
    #[serde(default)]
    pub classifier: ClassifierSection,

    /// Pretrained model for the ML scheme
    #[serde(default)]
    pub model: ModelSection,

    /// Output table layout
    #[serde(default)]
    pub output: OutputSection,
}

impl ClassifierConfig {
    /// Load configuration using the standard search order:
    /// 1. `$EDS_MINERAL_CONFIG` environment variable
    /// 2. `./eds_mineral.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), scheme = %config.classifier.scheme, "Loaded config from EDS_MINERAL_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from EDS_MINERAL_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "EDS_MINERAL_CONFIG points to non-existent file, falling back");
            }
        }

        // 2. Check ./eds_mineral.toml
        let local = PathBuf::from(defaults::LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(scheme = %config.classifier.scheme, "Loaded config from ./eds_mineral.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./eds_mineral.toml, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No eds_mineral.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate TOML text.
    ///
    /// Unknown keys are logged as warnings and never fail the load.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        // Two-pass: check for unknown keys first (warnings only)
        for w in &super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<string>"), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Save config to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Validate all settings.
    ///
    /// Rules:
    /// - `classifier.scheme` must name a known scheme
    /// - `classifier.parallel_min_rows` must be > 0
    /// - `output.delimiter` must be exactly one ASCII character, not a quote
    /// - `model.path`, when set, must not be empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        if let Err(e) = self.classifier.scheme.parse::<Scheme>() {
            errors.push(format!("classifier.scheme: {e}"));
        }
        if let Some(path) = &self.model.path {
            if path.as_os_str().is_empty() {
                errors.push("model.path must not be empty when set".to_string());
            }
        }

        let (range_errors, range_warnings) = super::validation::validate_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// The configured scheme.
    ///
    /// Falls back to the default scheme if the selector does not parse; a
    /// validated config never takes that path.
    pub fn scheme(&self) -> Scheme {
        self.classifier.scheme.parse().unwrap_or_default()
    }

    /// The configured delimiter as a character.
    pub fn delimiter(&self) -> char {
        self.output.delimiter.chars().next().unwrap_or(defaults::DELIMITER)
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// [classifier]
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierSection {
    /// Scheme selector: donarummo, panta, kandler or ml (case-insensitive)
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Classify large batches on the rayon pool
    #[serde(default = "default_true")]
    pub parallel: bool,

    /// Row count at which parallel classification starts
    #[serde(default = "default_parallel_min_rows")]
    pub parallel_min_rows: usize,

    /// Log rows whose ratios are NaN or infinite
    #[serde(default = "default_true")]
    pub report_degenerate_rows: bool,
}

fn default_scheme() -> String {
    defaults::DEFAULT_SCHEME.to_string()
}
fn default_true() -> bool {
    true
}
fn default_parallel_min_rows() -> usize {
    defaults::PARALLEL_MIN_ROWS
}

impl Default for ClassifierSection {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            parallel: true,
            parallel_min_rows: default_parallel_min_rows(),
            report_degenerate_rows: true,
        }
    }
}

// ============================================================================
// [model]
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSection {
    /// JSON model file used by the ML scheme
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// ============================================================================
// [output]
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSection {
    /// Field delimiter for input and output tables
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Write the group column where the scheme has one
    #[serde(default = "default_true")]
    pub include_group: bool,

    /// Write the refractive index column (Kandler)
    #[serde(default = "default_true")]
    pub include_refractive_index: bool,

    /// Copy the input columns in front of the label columns
    #[serde(default)]
    pub keep_input_columns: bool,
}

fn default_delimiter() -> String {
    defaults::DELIMITER.to_string()
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            include_group: true,
            include_refractive_index: true,
            keep_input_columns: false,
        }
    }
}
