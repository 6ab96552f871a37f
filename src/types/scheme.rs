//! Closed set of classification schemes

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::Element;
use crate::error::ClassifyError;

/// Classification scheme selector.
///
/// Selector strings are matched case-insensitively. The default is the
/// pretrained ML model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Donarummo et al. nested decision tree
    Donarummo,
    /// Panta et al. rule checklist
    Panta,
    /// Kandler et al. rule checklist with groups and refractive indices
    Kandler,
    /// Pretrained bagged-tree model (Weber ratios)
    #[default]
    Ml,
}

impl Scheme {
    pub const ALL: [Scheme; 4] = [Scheme::Donarummo, Scheme::Panta, Scheme::Kandler, Scheme::Ml];

    /// Selector string accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            Scheme::Donarummo => "donarummo",
            Scheme::Panta => "panta",
            Scheme::Kandler => "kandler",
            Scheme::Ml => "ml",
        }
    }

    /// Elements that must be present (exactly once) after normalization.
    pub fn required_elements(self) -> &'static [Element] {
        match self {
            Scheme::Donarummo => crate::schemes::donarummo::REQUIRED_ELEMENTS,
            Scheme::Panta => crate::schemes::panta::REQUIRED_ELEMENTS,
            Scheme::Kandler => crate::schemes::kandler::REQUIRED_ELEMENTS,
            Scheme::Ml => crate::schemes::weber::REQUIRED_ELEMENTS,
        }
    }

    /// Whether the scheme needs an external pretrained model.
    pub const fn needs_model(self) -> bool {
        matches!(self, Scheme::Ml)
    }
}

impl FromStr for Scheme {
    type Err = ClassifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|scheme| scheme.name() == wanted)
            .ok_or_else(|| ClassifyError::UnsupportedScheme(s.to_string()))
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
