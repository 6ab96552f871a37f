//! Pretrained classifier interface
//!
//! The ML scheme hands each row of the Weber ratio table to an opaque
//! pretrained classifier and gets back a label plus per-class
//! probabilities. [`PretrainedClassifier`] is the seam; [`BaggedTreeModel`]
//! is the bundled implementation that reads an exported tree ensemble from
//! JSON.

mod bagged_trees;

pub use bagged_trees::{BaggedTreeModel, TreeArrays};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Failed to read model file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse model JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid model: {0}")]
    Invalid(String),
}

/// Output of one prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPrediction {
    pub label: String,
    /// One entry per class, in [`PretrainedClassifier::class_names`] order.
    pub probabilities: Vec<f64>,
}

impl ModelPrediction {
    /// Probability of `label` when `class_names` lists it, otherwise the
    /// probability at the argmax index. Empty probabilities give 0.0.
    pub fn confidence(&self, class_names: &[String]) -> f64 {
        let index = class_names
            .iter()
            .position(|c| *c == self.label)
            .unwrap_or_else(|| argmax(&self.probabilities));
        self.probabilities.get(index).copied().unwrap_or(0.0)
    }
}

/// A classifier trained offline on Weber ratio rows.
pub trait PretrainedClassifier: Send + Sync {
    /// Class labels, indexed like the probability vector.
    fn class_names(&self) -> &[String];

    /// Number of input features the model was trained on.
    fn n_features(&self) -> usize;

    /// Feature names in training order, when the model recorded them.
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Per-class probabilities for one feature row.
    fn predict_proba(&self, features: &[f64]) -> Vec<f64>;

    /// Most probable class. Ties go to the lowest class index.
    fn predict(&self, features: &[f64]) -> ModelPrediction {
        let probabilities = self.predict_proba(features);
        let best = argmax(&probabilities);
        let label = self
            .class_names()
            .get(best)
            .cloned()
            .unwrap_or_default();
        ModelPrediction {
            label,
            probabilities,
        }
    }
}

/// Index of the largest value, first index on ties. NaN entries never win.
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, &v) in values.iter().enumerate() {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant(Vec<String>, Vec<f64>);

    impl PretrainedClassifier for Constant {
        fn class_names(&self) -> &[String] {
            &self.0
        }
        fn n_features(&self) -> usize {
            1
        }
        fn predict_proba(&self, _features: &[f64]) -> Vec<f64> {
            self.1.clone()
        }
    }

    #[test]
    fn test_argmax_first_on_ties() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), 1);
        assert_eq!(argmax(&[f64::NAN, 0.1]), 1);
        assert_eq!(argmax(&[]), 0);
    }

    #[test]
    fn test_default_predict_uses_class_names() {
        let model = Constant(
            vec!["Illite".into(), "Quartz".into()],
            vec![0.25, 0.75],
        );
        let prediction = model.predict(&[0.0]);
        assert_eq!(prediction.label, "Quartz");
        assert!((prediction.confidence(model.class_names()) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_confidence_follows_label_not_maximum() {
        let classes = vec!["Illite".to_string(), "Quartz".to_string()];
        let prediction = ModelPrediction {
            label: "Illite".to_string(),
            probabilities: vec![0.3, 0.7],
        };
        assert!((prediction.confidence(&classes) - 0.3).abs() < 1e-12);
        // Unlisted label: probability at the argmax index.
        assert!((prediction.confidence(&[]) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_confidence_of_nan_probabilities_is_nan() {
        let model = Constant(vec!["A".into(), "B".into()], vec![f64::NAN, f64::NAN]);
        let prediction = model.predict(&[0.0]);
        assert_eq!(prediction.label, "A");
        assert!(prediction.confidence(model.class_names()).is_nan());
        let empty = ModelPrediction {
            label: String::new(),
            probabilities: vec![],
        };
        assert_eq!(empty.confidence(&[]), 0.0);
    }
}
