//! Kandler mineral classification
//!
//! Flattened checklist over 13 elements (the Panta alphabet without F),
//! evaluated last-match-wins like Panta. Each row additionally gets:
//!
//! - a coarse **group** from [`KANDLER_GROUPS`] (apply-then-overwrite, rows
//!   with no group entry keep their leaf code), and
//! - a complex **refractive index** string used by optical closure models
//!   (`"NA"` when the leaf has none).

use serde::Serialize;

use crate::ratios::{map_rows, quotient, ratio_set, relative, RatioTable};
use crate::schemes::checklist::{self, rule, GroupRule, Rule};
use crate::schemes::{mineral_classes, MineralLabel};
use crate::types::Element as E;

/// Required elements, in column order.
pub const REQUIRED_ELEMENTS: &[E] = &[
    E::Na, E::Mg, E::Al, E::Si, E::P, E::S, E::Cl, E::K, E::Ca, E::Ti, E::Cr, E::Mn, E::Fe,
];

ratio_set! {
    /// One row of Kandler ratios.
    pub struct KandlerRatios, specs = KANDLER_RATIOS {
        rel_na = relative("|Na|", &[E::Na]),
        rel_mg = relative("|Mg|", &[E::Mg]),
        rel_si = relative("|Si|", &[E::Si]),
        rel_p = relative("|P|", &[E::P]),
        rel_s = relative("|S|", &[E::S]),
        rel_cl = relative("|Cl|", &[E::Cl]),
        rel_ca = relative("|Ca|", &[E::Ca]),
        rel_ti = relative("|Ti|", &[E::Ti]),
        rel_cr = relative("|Cr|", &[E::Cr]),
        rel_mn = relative("|Mn|", &[E::Mn]),
        rel_fe = relative("|Fe|", &[E::Fe]),
        al_si = quotient("Al/Si", &[E::Al], &[E::Si]),
        k_al = quotient("K/Al", &[E::K], &[E::Al]),
        na_al = quotient("Na/Al", &[E::Na], &[E::Al]),
        ca_al = quotient("Ca/Al", &[E::Ca], &[E::Al]),
        mgfe_si = quotient("(Mg+Fe)/Si", &[E::Mg, E::Fe], &[E::Si]),
        ca_s = quotient("Ca/S", &[E::Ca], &[E::S]),
        na_cl = quotient("Na/Cl", &[E::Na], &[E::Cl]),
        ca_mg = quotient("Ca/Mg", &[E::Ca], &[E::Mg]),
        fe_ti = quotient("Fe/Ti", &[E::Fe], &[E::Ti]),
        ca_p = quotient("Ca/P", &[E::Ca], &[E::P]),
    }
}

mineral_classes! {
    /// Kandler leaf labels.
    pub enum KandlerClass {
        #[default]
        Unknown => ("Unknown", "Unknown"),
        Silicate => ("Sil", "Other silicate"),
        SilicateCarbonate => ("Si-Ca", "Silicate-carbonate mixture"),
        SilicateSulfate => ("Si-S", "Silicate-sulfate mixture"),
        SilicateChloride => ("Si-Cl", "Silicate-chloride mixture"),
        Quartz => ("Qz", "Quartz"),
        Kaolinite => ("Kln", "Kaolinite"),
        Illite => ("Ilt", "Illite"),
        Smectite => ("Sme", "Smectite"),
        Chlorite => ("Chl", "Chlorite"),
        KFeldspar => ("Kfs", "K-feldspar"),
        NaFeldspar => ("Ab", "Na-feldspar"),
        CaFeldspar => ("Pl", "Ca-plagioclase"),
        Sulfate => ("Sul", "Other sulfate"),
        Chloride => ("Chd", "Other chloride"),
        Calcite => ("Cal", "Calcite"),
        Dolomite => ("Dol", "Dolomite"),
        Gypsum => ("Gp", "Gypsum"),
        Apatite => ("Ap", "Apatite"),
        Halite => ("Hl", "Halite"),
        FeOxide => ("Hem", "Fe-oxide"),
        Rutile => ("Rt", "Rutile"),
        Ilmenite => ("Ilm", "Ilmenite"),
        MnOxide => ("Mn-ox", "Mn-oxide"),
        CrOxide => ("Cr-ox", "Cr-oxide"),
    }
}

fn in_range(value: f64, low: f64, high: f64) -> bool {
    value >= low && value < high
}

// ============================================================================
// Silicates
// ============================================================================

fn silicate(r: &KandlerRatios) -> bool {
    r.rel_si >= 0.2
}

fn silicate_carbonate(r: &KandlerRatios) -> bool {
    r.rel_si >= 0.2 && r.rel_ca >= 0.2 && r.ca_s >= 2.0
}

fn silicate_sulfate(r: &KandlerRatios) -> bool {
    r.rel_si >= 0.2 && r.rel_s >= 0.15
}

fn silicate_chloride(r: &KandlerRatios) -> bool {
    r.rel_si >= 0.2 && r.rel_cl >= 0.15
}

fn quartz(r: &KandlerRatios) -> bool {
    r.rel_si >= 0.75 && r.al_si < 0.15 && r.mgfe_si < 0.1
}

fn kaolinite(r: &KandlerRatios) -> bool {
    in_range(r.al_si, 0.7, 1.4)
        && r.k_al < 0.1
        && r.na_al < 0.1
        && r.ca_al < 0.1
        && r.mgfe_si < 0.2
}

fn illite(r: &KandlerRatios) -> bool {
    in_range(r.al_si, 0.4, 0.9) && in_range(r.k_al, 0.1, 0.6) && r.mgfe_si < 0.4
}

fn smectite(r: &KandlerRatios) -> bool {
    in_range(r.al_si, 0.2, 0.6) && r.k_al < 0.1 && in_range(r.mgfe_si, 0.05, 0.5)
}

fn chlorite(r: &KandlerRatios) -> bool {
    in_range(r.al_si, 0.4, 1.4) && r.mgfe_si >= 0.5
}

fn k_feldspar(r: &KandlerRatios) -> bool {
    in_range(r.al_si, 0.2, 0.5) && r.k_al >= 0.6 && r.na_al < 0.4 && r.mgfe_si < 0.1
}

fn na_feldspar(r: &KandlerRatios) -> bool {
    in_range(r.al_si, 0.2, 0.6)
        && r.na_al >= 0.4
        && r.k_al < 0.3
        && r.ca_al < 0.3
        && r.mgfe_si < 0.1
}

fn ca_feldspar(r: &KandlerRatios) -> bool {
    in_range(r.al_si, 0.5, 1.2) && r.ca_al >= 0.3 && r.mgfe_si < 0.1
}

// ============================================================================
// Salts, carbonates, phosphates
// ============================================================================

fn sulfate(r: &KandlerRatios) -> bool {
    r.rel_s >= 0.2 && r.rel_si < 0.2
}

fn chloride(r: &KandlerRatios) -> bool {
    r.rel_cl >= 0.2 && r.rel_si < 0.2
}

fn calcite(r: &KandlerRatios) -> bool {
    r.rel_ca >= 0.6 && r.rel_mg < 0.1 && r.rel_s < 0.1 && r.rel_si < 0.2
}

fn dolomite(r: &KandlerRatios) -> bool {
    r.rel_ca >= 0.2
        && r.rel_mg >= 0.15
        && in_range(r.ca_mg, 0.6, 2.0)
        && r.rel_si < 0.2
        && r.rel_s < 0.1
}

fn gypsum(r: &KandlerRatios) -> bool {
    r.rel_ca >= 0.25 && r.rel_s >= 0.25 && in_range(r.ca_s, 0.6, 1.6)
}

fn apatite(r: &KandlerRatios) -> bool {
    r.rel_p >= 0.15 && r.rel_ca >= 0.25 && in_range(r.ca_p, 1.0, 2.5)
}

fn halite(r: &KandlerRatios) -> bool {
    r.rel_na >= 0.25 && r.rel_cl >= 0.25 && in_range(r.na_cl, 0.5, 2.0)
}

// ============================================================================
// Oxides
// ============================================================================

fn fe_oxide(r: &KandlerRatios) -> bool {
    r.rel_fe >= 0.6 && r.rel_ti < 0.1
}

fn rutile(r: &KandlerRatios) -> bool {
    r.rel_ti >= 0.6 && r.rel_fe < 0.1
}

fn ilmenite(r: &KandlerRatios) -> bool {
    r.rel_ti >= 0.25 && r.rel_fe >= 0.25 && in_range(r.fe_ti, 0.5, 2.0)
}

fn mn_oxide(r: &KandlerRatios) -> bool {
    r.rel_mn >= 0.5
}

fn cr_oxide(r: &KandlerRatios) -> bool {
    r.rel_cr >= 0.5
}

/// Ordered checklist. Do not reorder: later rules win.
pub const KANDLER_RULES: &[Rule<KandlerRatios, KandlerClass>] = &[
    rule(KandlerClass::Silicate, silicate),
    rule(KandlerClass::SilicateCarbonate, silicate_carbonate),
    rule(KandlerClass::SilicateSulfate, silicate_sulfate),
    rule(KandlerClass::SilicateChloride, silicate_chloride),
    rule(KandlerClass::Quartz, quartz),
    rule(KandlerClass::Kaolinite, kaolinite),
    rule(KandlerClass::Illite, illite),
    rule(KandlerClass::Smectite, smectite),
    rule(KandlerClass::Chlorite, chlorite),
    rule(KandlerClass::KFeldspar, k_feldspar),
    rule(KandlerClass::NaFeldspar, na_feldspar),
    rule(KandlerClass::CaFeldspar, ca_feldspar),
    rule(KandlerClass::Sulfate, sulfate),
    rule(KandlerClass::Chloride, chloride),
    rule(KandlerClass::Calcite, calcite),
    rule(KandlerClass::Dolomite, dolomite),
    rule(KandlerClass::Gypsum, gypsum),
    rule(KandlerClass::Apatite, apatite),
    rule(KandlerClass::Halite, halite),
    rule(KandlerClass::FeOxide, fe_oxide),
    rule(KandlerClass::Rutile, rutile),
    rule(KandlerClass::Ilmenite, ilmenite),
    rule(KandlerClass::MnOxide, mn_oxide),
    rule(KandlerClass::CrOxide, cr_oxide),
];

// ============================================================================
// Grouping and refractive index
// ============================================================================

/// Leaf-to-group table. Feldspars and clays are first grouped as silicates
/// and then overwritten by their narrower group.
pub const KANDLER_GROUPS: &[GroupRule<KandlerClass>] = &[
    GroupRule {
        group: "Silicates",
        members: &[
            KandlerClass::Silicate,
            KandlerClass::Quartz,
            KandlerClass::Kaolinite,
            KandlerClass::Illite,
            KandlerClass::Smectite,
            KandlerClass::Chlorite,
            KandlerClass::KFeldspar,
            KandlerClass::NaFeldspar,
            KandlerClass::CaFeldspar,
        ],
    },
    GroupRule {
        group: "Feldspar",
        members: &[
            KandlerClass::KFeldspar,
            KandlerClass::NaFeldspar,
            KandlerClass::CaFeldspar,
        ],
    },
    GroupRule {
        group: "Clay",
        members: &[
            KandlerClass::Kaolinite,
            KandlerClass::Illite,
            KandlerClass::Smectite,
            KandlerClass::Chlorite,
        ],
    },
    GroupRule {
        group: "Carbonates",
        members: &[KandlerClass::Calcite, KandlerClass::Dolomite],
    },
    GroupRule {
        group: "Sulfates",
        members: &[KandlerClass::Gypsum, KandlerClass::Sulfate],
    },
    GroupRule {
        group: "Chlorides",
        members: &[KandlerClass::Halite, KandlerClass::Chloride],
    },
    GroupRule {
        group: "Oxides",
        members: &[
            KandlerClass::FeOxide,
            KandlerClass::Rutile,
            KandlerClass::Ilmenite,
            KandlerClass::MnOxide,
            KandlerClass::CrOxide,
        ],
    },
    GroupRule {
        group: "Phosphates",
        members: &[KandlerClass::Apatite],
    },
    GroupRule {
        group: "Mixtures",
        members: &[
            KandlerClass::SilicateCarbonate,
            KandlerClass::SilicateSulfate,
            KandlerClass::SilicateChloride,
        ],
    },
];

/// Refractive index reported when a leaf has none.
pub const NO_REFRACTIVE_INDEX: &str = "NA";

/// Complex refractive index at visible wavelengths, as `n+ki`.
pub const fn refractive_index(class: KandlerClass) -> &'static str {
    use KandlerClass as C;
    match class {
        C::Quartz => "1.55+0.000i",
        C::Silicate | C::Kaolinite => "1.56+0.001i",
        C::SilicateCarbonate => "1.58+0.001i",
        C::SilicateSulfate | C::SilicateChloride => "1.55+0.001i",
        C::Illite => "1.58+0.001i",
        C::Smectite => "1.52+0.001i",
        C::Chlorite => "1.60+0.001i",
        C::KFeldspar => "1.52+0.000i",
        C::NaFeldspar => "1.53+0.000i",
        C::CaFeldspar => "1.57+0.000i",
        C::Sulfate | C::Gypsum => "1.52+0.000i",
        C::Chloride | C::Halite => "1.54+0.000i",
        C::Calcite | C::Dolomite => "1.60+0.000i",
        C::Apatite => "1.63+0.000i",
        C::FeOxide => "3.10+0.092i",
        C::Rutile => "2.60+0.000i",
        C::Ilmenite => "2.40+0.500i",
        C::MnOxide => "2.20+0.300i",
        C::CrOxide => "2.50+0.500i",
        C::Unknown => NO_REFRACTIVE_INDEX,
    }
}

/// Group for a leaf label. Unlisted leaves keep their own code.
pub fn group_of(class: KandlerClass) -> &'static str {
    checklist::group_of(KANDLER_GROUPS, &class, class.code())
}

/// One classified Kandler row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KandlerRecord {
    pub class: KandlerClass,
    pub group: &'static str,
    pub refractive_index: &'static str,
}

impl KandlerRecord {
    pub fn from_class(class: KandlerClass) -> Self {
        Self {
            class,
            group: group_of(class),
            refractive_index: refractive_index(class),
        }
    }
}

/// Classify one row into a leaf label.
pub fn classify(r: &KandlerRatios) -> KandlerClass {
    checklist::apply(KANDLER_RULES, r)
}

/// Every label whose rule matches the row, in rule order.
pub fn candidates(r: &KandlerRatios) -> Vec<KandlerClass> {
    checklist::matching(KANDLER_RULES, r)
}

/// Classify every row of a Kandler ratio table, with group and refractive index.
pub fn classify_table(ratios: &RatioTable, parallel: bool) -> Vec<KandlerRecord> {
    map_rows(ratios.n_rows(), parallel, |i| {
        KandlerRecord::from_class(classify(&KandlerRatios::from_row(&ratios.rows()[i])))
    })
}
