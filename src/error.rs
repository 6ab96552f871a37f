//! Error types for classification

use std::path::PathBuf;
use thiserror::Error;

use crate::types::{Element, Scheme};

/// The input table does not carry the columns a scheme needs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{scheme}: expected {required} element columns, found {found} (missing: [{}], duplicated: [{}])",
    join_symbols(.missing), join_symbols(.duplicated))]
pub struct SchemaError {
    pub scheme: Scheme,
    pub required: usize,
    pub found: usize,
    pub missing: Vec<Element>,
    pub duplicated: Vec<Element>,
}

fn join_symbols(elements: &[Element]) -> String {
    elements
        .iter()
        .map(|e| e.symbol())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Input is not table-shaped: {0}")]
    NotTabular(String),

    #[error("Unsupported scheme '{0}' (expected one of: donarummo, panta, kandler, ml)")]
    UnsupportedScheme(String),

    #[error("Scheme 'ml' requires a pretrained model, none was loaded")]
    ModelUnavailable,

    #[error("Model expects {expected} features, ratio table has {found}")]
    ModelFeatureMismatch { expected: usize, found: usize },

    #[error("Model feature {position} is '{model}', ratio table has '{table}'")]
    ModelFeatureOrder {
        position: usize,
        model: String,
        table: String,
    },

    #[error("Model error: {0}")]
    Model(#[from] crate::model::ModelError),

    #[error("IO error ({0}): {1}")]
    Io(PathBuf, std::io::Error),

    #[error("CSV error on line {line}: {message}")]
    Csv { line: usize, message: String },
}
