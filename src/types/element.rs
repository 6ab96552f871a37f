//! Element alphabet measured by the EDS detector

use serde::{Deserialize, Serialize};

/// Elements the classification schemes know about.
///
/// The alphabet is closed: every scheme requires a subset of these, and the
/// column normalizer only ever renames columns to one of these symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Element {
    Na,
    Mg,
    Al,
    Si,
    P,
    S,
    Cl,
    K,
    Ca,
    Ti,
    Cr,
    Mn,
    Fe,
    F,
}

impl Element {
    /// Size of the alphabet.
    pub const COUNT: usize = 14;

    /// Every element in the alphabet, in atomic-number order except F last.
    pub const ALL: [Element; Self::COUNT] = [
        Element::Na,
        Element::Mg,
        Element::Al,
        Element::Si,
        Element::P,
        Element::S,
        Element::Cl,
        Element::K,
        Element::Ca,
        Element::Ti,
        Element::Cr,
        Element::Mn,
        Element::Fe,
        Element::F,
    ];

    /// Canonical chemical symbol, as used for normalized column names.
    pub const fn symbol(self) -> &'static str {
        match self {
            Element::Na => "Na",
            Element::Mg => "Mg",
            Element::Al => "Al",
            Element::Si => "Si",
            Element::P => "P",
            Element::S => "S",
            Element::Cl => "Cl",
            Element::K => "K",
            Element::Ca => "Ca",
            Element::Ti => "Ti",
            Element::Cr => "Cr",
            Element::Mn => "Mn",
            Element::Fe => "Fe",
            Element::F => "F",
        }
    }

    /// Atomic number (Z).
    pub const fn atomic_number(self) -> u8 {
        match self {
            Element::F => 9,
            Element::Na => 11,
            Element::Mg => 12,
            Element::Al => 13,
            Element::Si => 14,
            Element::P => 15,
            Element::S => 16,
            Element::Cl => 17,
            Element::K => 19,
            Element::Ca => 20,
            Element::Ti => 22,
            Element::Cr => 24,
            Element::Mn => 25,
            Element::Fe => 26,
        }
    }

    /// Look up an element by its exact canonical symbol.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.symbol() == symbol)
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}
