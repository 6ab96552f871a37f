//! Classifier Configuration Module
//!
//! Scheme selection, batch parallelism, model location and output layout,
//! loaded from TOML.
//!
//! ## Loading Order
//!
//! 1. `EDS_MINERAL_CONFIG` environment variable (path to TOML file)
//! 2. `eds_mineral.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! Call `config::init()` once at startup, then `config::get()` anywhere:
//!
//! ```ignore
//! // In main():
//! config::init(ClassifierConfig::load());
//!
//! // Anywhere in the codebase:
//! let min_rows = config::get().classifier.parallel_min_rows;
//! ```

mod classifier_config;
pub mod defaults;
pub mod validation;

pub use classifier_config::*;

use std::sync::OnceLock;

/// Global classifier configuration, initialized once at startup.
static CLASSIFIER_CONFIG: OnceLock<ClassifierConfig> = OnceLock::new();

/// Initialize the global classifier configuration.
///
/// A second call is ignored with a warning.
pub fn init(config: ClassifierConfig) {
    if CLASSIFIER_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// Get a reference to the global classifier configuration.
///
/// Falls back to built-in defaults when `init()` has not been called.
pub fn get() -> &'static ClassifierConfig {
    CLASSIFIER_CONFIG.get_or_init(ClassifierConfig::default)
}

/// Check whether the config has been initialized.
pub fn is_initialized() -> bool {
    CLASSIFIER_CONFIG.get().is_some()
}
