//! Dispatcher
//!
//! Validates the scheme selector, runs the column normalizer and ratio
//! engine, and hands the ratio table to the selected classifier.
//!
//! ```text
//! ElementTable ──► normalize_columns ──► compute_ratios ──► scheme ──► SchemeOutput
//!                   (SchemaError)                          │
//!                                                          └─► BatchReport
//! ```
//!
//! Output shape is per scheme: one label per row for Donarummo and Panta,
//! `{class, group, refractive_index}` records for Kandler, and
//! `{label, group, confidence}` records for the ML model.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ClassifierConfig;
use crate::error::ClassifyError;
use crate::model::{BaggedTreeModel, PretrainedClassifier};
use crate::normalize::normalize_columns;
use crate::ratios::{compute_ratios, RatioSpec, RatioTable};
use crate::schemes::donarummo::{self, DonarummoClass};
use crate::schemes::kandler::{self, KandlerRecord};
use crate::schemes::panta::{self, PantaClass};
use crate::schemes::weber::{self, MlRecord};
use crate::schemes::MineralLabel;
use crate::types::{ElementTable, Scheme};

/// Ratio list a scheme classifies on.
pub const fn ratio_specs(scheme: Scheme) -> &'static [RatioSpec] {
    match scheme {
        Scheme::Donarummo => donarummo::DONARUMMO_RATIOS,
        Scheme::Panta => panta::PANTA_RATIOS,
        Scheme::Kandler => kandler::KANDLER_RATIOS,
        Scheme::Ml => weber::WEBER_RATIOS,
    }
}

/// Closed label vocabulary of a rule-based scheme.
///
/// The ML scheme's vocabulary is the loaded model's class list, so this
/// returns `None` for it.
pub fn vocabulary(scheme: Scheme) -> Option<Vec<&'static str>> {
    fn codes<L: MineralLabel>() -> Vec<&'static str> {
        L::vocabulary().iter().map(|l| l.code()).collect()
    }
    match scheme {
        Scheme::Donarummo => Some(codes::<DonarummoClass>()),
        Scheme::Panta => Some(codes::<PantaClass>()),
        Scheme::Kandler => Some(codes::<kandler::KandlerClass>()),
        Scheme::Ml => None,
    }
}

/// Reject a model whose recorded feature names differ from the ratio columns.
fn check_feature_order(
    model: &dyn PretrainedClassifier,
    names: &[&'static str],
) -> Result<(), ClassifyError> {
    let Some(model_names) = model.feature_names() else {
        return Ok(());
    };
    if model_names.len() != names.len() {
        return Err(ClassifyError::ModelFeatureMismatch {
            expected: model_names.len(),
            found: names.len(),
        });
    }
    match model_names
        .iter()
        .zip(names)
        .position(|(m, t)| m.as_str() != *t)
    {
        Some(position) => Err(ClassifyError::ModelFeatureOrder {
            position,
            model: model_names[position].clone(),
            table: names[position].to_string(),
        }),
        None => Ok(()),
    }
}

// ============================================================================
// Output
// ============================================================================

/// Per-scheme classification output, one entry per input row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "scheme", content = "rows", rename_all = "lowercase")]
pub enum SchemeOutput {
    Donarummo(Vec<DonarummoClass>),
    Panta(Vec<PantaClass>),
    Kandler(Vec<KandlerRecord>),
    Ml(Vec<MlRecord>),
}

impl SchemeOutput {
    pub fn scheme(&self) -> Scheme {
        match self {
            SchemeOutput::Donarummo(_) => Scheme::Donarummo,
            SchemeOutput::Panta(_) => Scheme::Panta,
            SchemeOutput::Kandler(_) => Scheme::Kandler,
            SchemeOutput::Ml(_) => Scheme::Ml,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SchemeOutput::Donarummo(v) => v.len(),
            SchemeOutput::Panta(v) => v.len(),
            SchemeOutput::Kandler(v) => v.len(),
            SchemeOutput::Ml(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Leaf label of every row.
    pub fn labels(&self) -> Vec<&str> {
        match self {
            SchemeOutput::Donarummo(v) => v.iter().map(|c| c.code()).collect(),
            SchemeOutput::Panta(v) => v.iter().map(|c| c.code()).collect(),
            SchemeOutput::Kandler(v) => v.iter().map(|r| r.class.code()).collect(),
            SchemeOutput::Ml(v) => v.iter().map(|r| r.label.as_str()).collect(),
        }
    }

    /// Group of every row, for schemes with a grouping pass.
    pub fn groups(&self) -> Option<Vec<&str>> {
        match self {
            SchemeOutput::Kandler(v) => Some(v.iter().map(|r| r.group).collect()),
            SchemeOutput::Ml(v) => Some(v.iter().map(|r| r.group.as_str()).collect()),
            SchemeOutput::Donarummo(_) | SchemeOutput::Panta(_) => None,
        }
    }

    /// Rows that ended on the scheme's unknown label.
    pub fn unknown_rows(&self) -> usize {
        match self {
            SchemeOutput::Donarummo(v) => v.iter().filter(|c| c.is_unknown()).count(),
            SchemeOutput::Panta(v) => v.iter().filter(|c| c.is_unknown()).count(),
            SchemeOutput::Kandler(v) => v.iter().filter(|r| r.class.is_unknown()).count(),
            SchemeOutput::Ml(v) => v.iter().filter(|r| r.label.is_empty()).count(),
        }
    }
}

/// Batch-level summary returned with every classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub scheme: Scheme,
    pub rows: usize,
    /// Rows with at least one NaN or infinite ratio
    pub degenerate_rows: usize,
    /// Rows that ended on the unknown label
    pub unknown_rows: usize,
}

impl std::fmt::Display for BatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} rows, {} unknown, {} degenerate",
            self.scheme, self.rows, self.unknown_rows, self.degenerate_rows
        )
    }
}

/// Classifier output plus its batch report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub output: SchemeOutput,
    pub report: BatchReport,
}

// ============================================================================
// Classifier
// ============================================================================

/// Execution settings for a [`Classifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierSettings {
    pub parallel: bool,
    pub parallel_min_rows: usize,
    pub report_degenerate_rows: bool,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self::from(&ClassifierConfig::default())
    }
}

impl From<&ClassifierConfig> for ClassifierSettings {
    fn from(config: &ClassifierConfig) -> Self {
        Self {
            parallel: config.classifier.parallel,
            parallel_min_rows: config.classifier.parallel_min_rows,
            report_degenerate_rows: config.classifier.report_degenerate_rows,
        }
    }
}

/// Entry point for classifying tables.
///
/// Holds no per-batch state: classifying the same table twice yields the
/// same output.
#[derive(Clone, Default)]
pub struct Classifier {
    settings: ClassifierSettings,
    model: Option<Arc<dyn PretrainedClassifier>>,
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("settings", &self.settings)
            .field("model", &self.model.as_ref().map(|m| m.class_names().len()))
            .finish()
    }
}

impl Classifier {
    pub fn new(settings: ClassifierSettings) -> Self {
        Self {
            settings,
            model: None,
        }
    }

    /// Attach the pretrained model used by the ML scheme.
    pub fn with_model(mut self, model: Arc<dyn PretrainedClassifier>) -> Self {
        self.model = Some(model);
        self
    }

    /// Build from config, loading `model.path` if set.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, ClassifyError> {
        let classifier = Self::new(ClassifierSettings::from(config));
        match &config.model.path {
            Some(path) => classifier.with_model_file(path),
            None => Ok(classifier),
        }
    }

    /// Load a JSON bagged-tree model and attach it.
    pub fn with_model_file(self, path: &Path) -> Result<Self, ClassifyError> {
        let model = BaggedTreeModel::load(path)?;
        Ok(self.with_model(Arc::new(model)))
    }

    pub fn settings(&self) -> ClassifierSettings {
        self.settings
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    fn use_parallel(&self, rows: usize) -> bool {
        self.settings.parallel && rows >= self.settings.parallel_min_rows
    }

    /// Normalize a table and compute the scheme's ratio table.
    pub fn ratios(&self, table: &ElementTable, scheme: Scheme) -> Result<RatioTable, ClassifyError> {
        let normalized = normalize_columns(table, scheme)?;
        let parallel = self.use_parallel(normalized.n_rows());
        debug!(scheme = %scheme, rows = normalized.n_rows(), parallel, "Computing ratios");
        Ok(compute_ratios(&normalized, ratio_specs(scheme), parallel))
    }

    /// Classify with a selector string (case-insensitive).
    ///
    /// An unrecognized selector fails before the table is touched.
    pub fn classify_named(
        &self,
        table: &ElementTable,
        selector: &str,
    ) -> Result<Classification, ClassifyError> {
        let scheme: Scheme = selector.parse()?;
        self.classify(table, scheme)
    }

    /// Classify every row of `table` with `scheme`.
    pub fn classify(
        &self,
        table: &ElementTable,
        scheme: Scheme,
    ) -> Result<Classification, ClassifyError> {
        let model = match scheme {
            Scheme::Ml => Some(self.model.as_deref().ok_or(ClassifyError::ModelUnavailable)?),
            _ => None,
        };

        let ratios = self.ratios(table, scheme)?;
        let parallel = self.use_parallel(ratios.n_rows());

        let output = match (scheme, model) {
            (Scheme::Donarummo, _) => {
                SchemeOutput::Donarummo(donarummo::classify_table(&ratios, parallel))
            }
            (Scheme::Panta, _) => SchemeOutput::Panta(panta::classify_table(&ratios, parallel)),
            (Scheme::Kandler, _) => {
                SchemeOutput::Kandler(kandler::classify_table(&ratios, parallel))
            }
            (Scheme::Ml, Some(model)) => {
                if model.n_features() != ratios.names().len() {
                    return Err(ClassifyError::ModelFeatureMismatch {
                        expected: model.n_features(),
                        found: ratios.names().len(),
                    });
                }
                check_feature_order(model, ratios.names())?;
                SchemeOutput::Ml(weber::classify_table(model, &ratios, parallel))
            }
            (Scheme::Ml, None) => return Err(ClassifyError::ModelUnavailable),
        };

        let report = BatchReport {
            scheme,
            rows: output.len(),
            degenerate_rows: ratios.degenerate_rows(),
            unknown_rows: output.unknown_rows(),
        };

        info!(
            scheme = %scheme,
            rows = report.rows,
            unknown = report.unknown_rows,
            parallel,
            "Classified batch"
        );
        if self.settings.report_degenerate_rows && report.degenerate_rows > 0 {
            warn!(
                scheme = %scheme,
                degenerate = report.degenerate_rows,
                rows = report.rows,
                "Rows with NaN or infinite ratios (zero or missing denominators)"
            );
        }

        Ok(Classification { output, report })
    }
}
