//! Weber ratio table and groups for the ML scheme
//!
//! The pretrained classifier sees a fixed ordered list of 14 ratios built
//! from nine elements. Its leaf labels are free strings decided at training
//! time, so grouping is a string lookup; labels no entry lists keep their
//! own name as group.

use serde::Serialize;

use crate::model::{ModelPrediction, PretrainedClassifier};
use crate::ratios::{map_rows, quotient, ratio_set, relative, RatioTable};
use crate::schemes::checklist::{self, GroupRule};
use crate::types::Element as E;

/// Required elements, in column order.
pub const REQUIRED_ELEMENTS: &[E] = &[
    E::Na, E::Mg, E::Al, E::Si, E::S, E::K, E::Ca, E::Ti, E::Fe,
];

ratio_set! {
    /// One row of model input features.
    pub struct WeberRatios, specs = WEBER_RATIOS {
        rel_na = relative("|Na|", &[E::Na]),
        rel_mg = relative("|Mg|", &[E::Mg]),
        rel_al = relative("|Al|", &[E::Al]),
        rel_si = relative("|Si|", &[E::Si]),
        rel_s = relative("|S|", &[E::S]),
        rel_k = relative("|K|", &[E::K]),
        rel_ca = relative("|Ca|", &[E::Ca]),
        rel_ti = relative("|Ti|", &[E::Ti]),
        rel_fe = relative("|Fe|", &[E::Fe]),
        al_si = quotient("Al/Si", &[E::Al], &[E::Si]),
        fe_si = quotient("Fe/Si", &[E::Fe], &[E::Si]),
        mg_si = quotient("Mg/Si", &[E::Mg], &[E::Si]),
        k_al = quotient("K/Al", &[E::K], &[E::Al]),
        ca_si = quotient("Ca/Si", &[E::Ca], &[E::Si]),
    }
}

/// Leaf-to-group table for the model's class names.
pub const WEBER_GROUPS: &[GroupRule<&str>] = &[
    GroupRule {
        group: "Clay",
        members: &["Illite", "Kaolinite", "Chlorite", "Smectite", "Palygorskite"],
    },
    GroupRule {
        group: "Feldspar",
        members: &["K-feldspar", "Plagioclase", "Albite"],
    },
    GroupRule {
        group: "Carbonate",
        members: &["Calcite", "Dolomite"],
    },
    GroupRule {
        group: "Sulfate",
        members: &["Gypsum"],
    },
    GroupRule {
        group: "Oxide",
        members: &["Hematite", "Goethite", "Rutile"],
    },
];

/// Group for a model label. Unlisted labels keep their own name.
pub fn group_of(label: &str) -> &str {
    checklist::group_of(WEBER_GROUPS, &label, label)
}

/// One classified row from the ML scheme.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MlRecord {
    pub label: String,
    pub group: String,
    /// Probability of `label`.
    pub confidence: f64,
    /// Per-class probabilities, in the model's class order.
    pub probabilities: Vec<f64>,
}

impl MlRecord {
    pub fn from_prediction(prediction: &ModelPrediction, class_names: &[String]) -> Self {
        Self {
            group: group_of(&prediction.label).to_string(),
            confidence: prediction.confidence(class_names),
            label: prediction.label.clone(),
            probabilities: prediction.probabilities.clone(),
        }
    }
}

/// Run the model over every row of a Weber ratio table.
pub fn classify_table(
    model: &dyn PretrainedClassifier,
    ratios: &RatioTable,
    parallel: bool,
) -> Vec<MlRecord> {
    map_rows(ratios.n_rows(), parallel, |i| {
        MlRecord::from_prediction(&model.predict(&ratios.rows()[i]), model.class_names())
    })
}
