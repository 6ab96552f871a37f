//! System-wide default constants.
//!
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Config Loading
// ============================================================================

/// Environment variable holding the path to a TOML config file.
pub const CONFIG_ENV_VAR: &str = "EDS_MINERAL_CONFIG";

/// Config file looked up in the current working directory.
pub const LOCAL_CONFIG_FILE: &str = "eds_mineral.toml";

// ============================================================================
// Classifier
// ============================================================================

/// Scheme used when neither config nor CLI selects one.
pub const DEFAULT_SCHEME: &str = "ml";

/// Batches at or above this many rows are classified on the rayon pool.
///
/// Below it the per-row work is too small to amortize the fork/join.
pub const PARALLEL_MIN_ROWS: usize = 2_048;

// ============================================================================
// Output
// ============================================================================

/// Field delimiter for CSV input and output.
pub const DELIMITER: char = ',';

/// Header of the leaf label column.
pub const CLASS_COLUMN: &str = "class";

/// Header of the coarse group column.
pub const GROUP_COLUMN: &str = "group";

/// Header of the refractive index column (Kandler only).
pub const REFRACTIVE_INDEX_COLUMN: &str = "refractive_index";

/// Header of the model confidence column (ML only).
pub const CONFIDENCE_COLUMN: &str = "confidence";
