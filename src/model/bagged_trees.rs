//! Bagged decision-tree ensemble
//!
//! Inference-only reader for a tree ensemble exported as JSON. Each tree
//! uses the parallel-array layout of scikit-learn's `tree_` attribute:
//!
//! ```text
//! {
//!   "classes": ["Illite", "Kaolinite", ...],
//!   "n_features": 14,
//!   "feature_names": ["|Na|", ...],          // optional
//!   "trees": [
//!     { "feature":   [3, -2, -2],
//!       "threshold": [0.42, 0.0, 0.0],
//!       "left":      [1, -1, -1],
//!       "right":     [2, -1, -1],
//!       "value":     [[10, 12], [9, 1], [1, 11]] }
//!   ]
//! }
//! ```
//!
//! A node with a negative `feature` is a leaf. At a split, `x <= threshold`
//! goes left; a NaN feature goes right. Leaf `value` rows are class counts
//! (or weights) and are normalized to distributions on load. The ensemble
//! probability is the mean of the trees' leaf distributions.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ModelError, PretrainedClassifier};

/// One tree in parallel-array form, as stored in the model file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeArrays {
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub left: Vec<i64>,
    pub right: Vec<i64>,
    pub value: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ModelFile {
    classes: Vec<String>,
    n_features: usize,
    #[serde(default)]
    feature_names: Option<Vec<String>>,
    trees: Vec<TreeArrays>,
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(Vec<f64>),
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_arrays(
        index: usize,
        arrays: &TreeArrays,
        n_features: usize,
        n_classes: usize,
    ) -> Result<Self, ModelError> {
        let invalid = |msg: String| ModelError::Invalid(format!("tree {index}: {msg}"));

        let n = arrays.feature.len();
        if n == 0 {
            return Err(invalid("no nodes".to_string()));
        }
        if arrays.threshold.len() != n
            || arrays.left.len() != n
            || arrays.right.len() != n
            || arrays.value.len() != n
        {
            return Err(invalid("inconsistent array lengths".to_string()));
        }

        let child = |node: usize, raw: i64| -> Result<usize, ModelError> {
            // Children must come after their parent so every walk terminates.
            usize::try_from(raw)
                .ok()
                .filter(|&c| c > node && c < n)
                .ok_or_else(|| invalid(format!("node {node} has invalid child {raw}")))
        };

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let raw_feature = arrays.feature[i];
            if raw_feature < 0 {
                nodes.push(Node::Leaf(leaf_distribution(&arrays.value[i], n_classes).map_err(
                    |msg| invalid(format!("leaf {i}: {msg}")),
                )?));
                continue;
            }

            let feature = usize::try_from(raw_feature)
                .ok()
                .filter(|&f| f < n_features)
                .ok_or_else(|| invalid(format!("node {i} splits on feature {raw_feature}")))?;
            let threshold = arrays.threshold[i];
            if !threshold.is_finite() {
                return Err(invalid(format!("node {i} has non-finite threshold")));
            }
            nodes.push(Node::Split {
                feature,
                threshold,
                left: child(i, arrays.left[i])?,
                right: child(i, arrays.right[i])?,
            });
        }

        Ok(Self { nodes })
    }

    fn leaf(&self, features: &[f64]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf(distribution) => return distribution,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = features.get(*feature).copied().unwrap_or(f64::NAN);
                    idx = if x <= *threshold { *left } else { *right };
                }
            }
        }
    }

    fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf(_) => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        walk(&self.nodes, 0)
    }
}

fn leaf_distribution(counts: &[f64], n_classes: usize) -> Result<Vec<f64>, String> {
    if counts.len() != n_classes {
        return Err(format!("{} values for {} classes", counts.len(), n_classes));
    }
    if counts.iter().any(|c| !c.is_finite() || *c < 0.0) {
        return Err("values must be finite and non-negative".to_string());
    }
    let total: f64 = counts.iter().sum();
    if total <= 0.0 {
        return Err("all values are zero".to_string());
    }
    Ok(counts.iter().map(|c| c / total).collect())
}

/// Ensemble of decision trees averaged into class probabilities.
#[derive(Debug, Clone)]
pub struct BaggedTreeModel {
    classes: Vec<String>,
    n_features: usize,
    feature_names: Option<Vec<String>>,
    trees: Vec<Tree>,
}

impl BaggedTreeModel {
    /// Build a model from already-decoded trees.
    pub fn from_trees(
        classes: Vec<String>,
        n_features: usize,
        trees: &[TreeArrays],
    ) -> Result<Self, ModelError> {
        if classes.is_empty() {
            return Err(ModelError::Invalid("no classes".to_string()));
        }
        if trees.is_empty() {
            return Err(ModelError::Invalid("empty ensemble".to_string()));
        }
        let trees = trees
            .iter()
            .enumerate()
            .map(|(i, arrays)| Tree::from_arrays(i, arrays, n_features, classes.len()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            classes,
            n_features,
            feature_names: None,
            trees,
        })
    }

    /// Parse a model from its JSON text.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let file: ModelFile = serde_json::from_str(json)?;
        if let Some(names) = &file.feature_names {
            if names.len() != file.n_features {
                return Err(ModelError::Invalid(format!(
                    "{} feature names for {} features",
                    names.len(),
                    file.n_features
                )));
            }
        }
        let mut model = Self::from_trees(file.classes, file.n_features, &file.trees)?;
        model.feature_names = file.feature_names;
        Ok(model)
    }

    /// Load a model file from disk.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ModelError::Io(path.to_path_buf(), e))?;
        let model = Self::from_json(&json)?;
        info!(
            path = %path.display(),
            trees = model.n_trees(),
            classes = model.classes.len(),
            features = model.n_features,
            "Loaded bagged tree model"
        );
        debug!(max_depth = model.max_depth(), "Model shape");
        Ok(model)
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Deepest root-to-leaf path across the ensemble.
    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(Tree::depth).max().unwrap_or(0)
    }
}

impl PretrainedClassifier for BaggedTreeModel {
    fn class_names(&self) -> &[String] {
        &self.classes
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    #[allow(clippy::cast_precision_loss)]
    fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        let mut sum = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (acc, p) in sum.iter_mut().zip(tree.leaf(features)) {
                *acc += p;
            }
        }
        let n = self.trees.len() as f64;
        sum.into_iter().map(|s| s / n).collect()
    }
}
