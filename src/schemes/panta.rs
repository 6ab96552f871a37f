//! Panta mineral classification
//!
//! Flattened checklist over the full 14-element alphabet. Every rule is
//! tested against every row and the last matching rule in [`PANTA_RULES`]
//! decides the label (see [`crate::schemes::checklist`]).
//!
//! ## Rule order
//!
//! Rules are declared from broad to narrow so narrower checks overwrite
//! broader ones where their windows overlap:
//!
//! 1. broad silicate and silicate-mixture windows
//! 2. quartz and Mg silicates
//! 3. clays
//! 4. feldspars
//! 5. sulfate/chloride catch-alls
//! 6. carbonates, sulfates, phosphates, fluorides, salts
//! 7. oxides and single-element-dominated particles

use crate::ratios::{map_rows, quotient, ratio_set, relative, RatioTable};
use crate::schemes::checklist::{self, rule, Rule};
use crate::schemes::mineral_classes;
use crate::types::Element as E;

/// Required elements, in column order.
pub const REQUIRED_ELEMENTS: &[E] = &[
    E::Na, E::Mg, E::Al, E::Si, E::P, E::S, E::Cl, E::K, E::Ca, E::Ti, E::Cr, E::Mn, E::Fe, E::F,
];

ratio_set! {
    /// One row of Panta ratios.
    pub struct PantaRatios, specs = PANTA_RATIOS {
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
        rel_f = relative("|F|", &[E::F]),
        al_si = quotient("Al/Si", &[E::Al], &[E::Si]),
        f_si = quotient("F/Si", &[E::F], &[E::Si]),
        fe_si = quotient("Fe/Si", &[E::Fe], &[E::Si]),
        mgfe_si = quotient("(Mg+Fe)/Si", &[E::Mg, E::Fe], &[E::Si]),
        k_al = quotient("K/Al", &[E::K], &[E::Al]),
        na_al = quotient("Na/Al", &[E::Na], &[E::Al]),
        ca_al = quotient("Ca/Al", &[E::Ca], &[E::Al]),
        ca_mg = quotient("Ca/Mg", &[E::Ca], &[E::Mg]),
        ca_s = quotient("Ca/S", &[E::Ca], &[E::S]),
    }
}

mineral_classes! {
    /// Panta leaf labels.
    pub enum PantaClass {
        #[default]
        Unknown => ("Unknown", "Unknown"),
        OtherSilicate => ("Other silicate", "Silicate, unspecified"),
        SilicateCarbonate => ("Ca-rich silicate mixture", "Silicate with calcium carbonate"),
        SilicateSulfate => ("Silicate-sulfate mixture", "Silicate with sulfate"),
        SilicateChloride => ("Silicate-chloride mixture", "Silicate with chloride"),
        Quartz => ("Quartz-like", "Quartz"),
        MgSilicate => ("Mg-silicate-like", "Talc, serpentine or other Mg silicate"),
        Smectite => ("Smectite-like", "Smectite"),
        Illite => ("Illite-like", "Illite"),
        Kaolinite => ("Kaolinite-like", "Kaolinite"),
        Chlorite => ("Chlorite-like", "Chlorite"),
        NaFeldspar => ("Na-feldspar-like", "Albite"),
        KFeldspar => ("K-feldspar-like", "Orthoclase or microcline"),
        CaFeldspar => ("Ca-feldspar-like", "Calcic plagioclase"),
        OtherSulfate => ("Sulfate-like", "Sulfate, unspecified"),
        OtherChloride => ("Chloride-like", "Chloride, unspecified"),
        Calcite => ("Calcite-like", "Calcite"),
        Dolomite => ("Dolomite-like", "Dolomite"),
        Gypsum => ("Gypsum-like", "Gypsum"),
        Apatite => ("Apatite-like", "Apatite"),
        Fluorite => ("Fluorite-like", "Fluorite"),
        Halite => ("Halite-like", "Halite"),
        FeOxide => ("Fe-oxide-like", "Hematite, goethite or magnetite"),
        TiOxide => ("Ti-oxide-like", "Rutile or anatase"),
        Ilmenite => ("Ilmenite-like", "Ilmenite"),
        MgRich => ("Mg-rich", "Mg-dominated particle"),
        MnRich => ("Mn-rich", "Mn-dominated particle"),
        CrRich => ("Cr-rich", "Cr-dominated particle"),
    }
}

fn in_range(value: f64, low: f64, high: f64) -> bool {
    value >= low && value < high
}

// ============================================================================
// Silicate windows and mixtures
// ============================================================================

fn other_silicate(r: &PantaRatios) -> bool {
    in_range(r.rel_si, 0.2, 0.7)
}

fn silicate_carbonate(r: &PantaRatios) -> bool {
    r.rel_si >= 0.2 && r.rel_ca >= 0.2 && r.rel_s < 0.1
}

fn silicate_sulfate(r: &PantaRatios) -> bool {
    r.rel_si >= 0.2 && r.rel_s >= 0.1
}

fn silicate_chloride(r: &PantaRatios) -> bool {
    r.rel_si >= 0.2 && r.rel_cl >= 0.1
}

fn quartz(r: &PantaRatios) -> bool {
    r.rel_si >= 0.7 && r.rel_si <= 1.01 && r.al_si < 0.1 && r.f_si < 0.1
}

fn mg_silicate(r: &PantaRatios) -> bool {
    r.rel_si >= 0.3 && r.rel_mg >= 0.2 && r.al_si < 0.15 && r.fe_si < 0.3
}

// ============================================================================
// Clays
// ============================================================================

fn smectite(r: &PantaRatios) -> bool {
    in_range(r.al_si, 0.25, 0.6) && in_range(r.mgfe_si, 0.05, 0.4) && r.k_al < 0.1
}

fn illite(r: &PantaRatios) -> bool {
    in_range(r.al_si, 0.45, 0.9) && in_range(r.k_al, 0.1, 0.5) && r.mgfe_si < 0.3
}

fn kaolinite(r: &PantaRatios) -> bool {
    r.al_si >= 0.7
        && r.al_si <= 1.3
        && r.k_al < 0.1
        && r.na_al < 0.1
        && r.ca_al < 0.1
        && r.mgfe_si < 0.15
}

fn chlorite(r: &PantaRatios) -> bool {
    r.al_si >= 0.5 && r.al_si <= 1.3 && r.mgfe_si >= 0.6
}

// ============================================================================
// Feldspars
// ============================================================================

fn na_feldspar(r: &PantaRatios) -> bool {
    in_range(r.al_si, 0.25, 0.45) && r.na_al >= 0.5 && r.k_al < 0.2 && r.mgfe_si < 0.1
}

fn k_feldspar(r: &PantaRatios) -> bool {
    in_range(r.al_si, 0.25, 0.45) && r.k_al >= 0.5 && r.na_al < 0.5 && r.mgfe_si < 0.1
}

fn ca_feldspar(r: &PantaRatios) -> bool {
    in_range(r.al_si, 0.45, 1.2) && r.ca_al >= 0.3 && r.rel_ca >= 0.05 && r.mgfe_si < 0.1
}

// ============================================================================
// Non-silicates
// ============================================================================

fn other_sulfate(r: &PantaRatios) -> bool {
    r.rel_s >= 0.2 && r.rel_si < 0.2
}

fn other_chloride(r: &PantaRatios) -> bool {
    r.rel_cl >= 0.2 && r.rel_si < 0.2
}

fn calcite(r: &PantaRatios) -> bool {
    r.rel_ca >= 0.7 && r.rel_mg < 0.1 && r.rel_s < 0.1 && r.rel_p < 0.1
}

fn dolomite(r: &PantaRatios) -> bool {
    r.rel_ca >= 0.3
        && r.rel_mg >= 0.2
        && in_range(r.ca_mg, 0.5, 2.5)
        && r.rel_s < 0.1
        && r.rel_si < 0.2
}

fn gypsum(r: &PantaRatios) -> bool {
    r.rel_ca >= 0.3 && r.rel_s >= 0.3 && in_range(r.ca_s, 0.5, 2.0)
}

fn apatite(r: &PantaRatios) -> bool {
    r.rel_p >= 0.2 && r.rel_ca >= 0.3
}

fn fluorite(r: &PantaRatios) -> bool {
    r.rel_f >= 0.3 && r.rel_ca >= 0.3 && r.rel_si < 0.1
}

fn halite(r: &PantaRatios) -> bool {
    r.rel_na >= 0.3 && r.rel_cl >= 0.3
}

fn fe_oxide(r: &PantaRatios) -> bool {
    r.rel_fe >= 0.7
}

fn ti_oxide(r: &PantaRatios) -> bool {
    r.rel_ti >= 0.7
}

fn ilmenite(r: &PantaRatios) -> bool {
    r.rel_ti >= 0.3 && r.rel_fe >= 0.3
}

fn mg_rich(r: &PantaRatios) -> bool {
    r.rel_mg >= 0.7
}

fn mn_rich(r: &PantaRatios) -> bool {
    r.rel_mn >= 0.5
}

fn cr_rich(r: &PantaRatios) -> bool {
    r.rel_cr >= 0.5
}

/// Ordered checklist. Do not reorder: later rules win.
pub const PANTA_RULES: &[Rule<PantaRatios, PantaClass>] = &[
    rule(PantaClass::OtherSilicate, other_silicate),
    rule(PantaClass::SilicateCarbonate, silicate_carbonate),
    rule(PantaClass::SilicateSulfate, silicate_sulfate),
    rule(PantaClass::SilicateChloride, silicate_chloride),
    rule(PantaClass::Quartz, quartz),
    rule(PantaClass::MgSilicate, mg_silicate),
    rule(PantaClass::Smectite, smectite),
    rule(PantaClass::Illite, illite),
    rule(PantaClass::Kaolinite, kaolinite),
    rule(PantaClass::Chlorite, chlorite),
    rule(PantaClass::NaFeldspar, na_feldspar),
    rule(PantaClass::KFeldspar, k_feldspar),
    rule(PantaClass::CaFeldspar, ca_feldspar),
    rule(PantaClass::OtherSulfate, other_sulfate),
    rule(PantaClass::OtherChloride, other_chloride),
    rule(PantaClass::Calcite, calcite),
    rule(PantaClass::Dolomite, dolomite),
    rule(PantaClass::Gypsum, gypsum),
    rule(PantaClass::Apatite, apatite),
    rule(PantaClass::Fluorite, fluorite),
    rule(PantaClass::Halite, halite),
    rule(PantaClass::FeOxide, fe_oxide),
    rule(PantaClass::TiOxide, ti_oxide),
    rule(PantaClass::Ilmenite, ilmenite),
    rule(PantaClass::MgRich, mg_rich),
    rule(PantaClass::MnRich, mn_rich),
    rule(PantaClass::CrRich, cr_rich),
];

/// Classify one row.
pub fn classify(r: &PantaRatios) -> PantaClass {
    checklist::apply(PANTA_RULES, r)
}

/// Every label whose rule matches the row, in rule order.
pub fn candidates(r: &PantaRatios) -> Vec<PantaClass> {
    checklist::matching(PANTA_RULES, r)
}

/// Classify every row of a Panta ratio table.
pub fn classify_table(ratios: &RatioTable, parallel: bool) -> Vec<PantaClass> {
    map_rows(ratios.n_rows(), parallel, |i| {
        classify(&PantaRatios::from_row(&ratios.rows()[i]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratios::{compute_row, Composition};
    use crate::schemes::MineralLabel;

    fn ratios(pairs: &[(E, f64)]) -> PantaRatios {
        // Unlisted elements are measured as zero.
        let mut full: Vec<(E, f64)> = REQUIRED_ELEMENTS.iter().map(|&e| (e, 0.0)).collect();
        full.extend_from_slice(pairs);
        let c = Composition::from_pairs(&full);
        PantaRatios::from_row(&compute_row(PANTA_RATIOS, &c, REQUIRED_ELEMENTS))
    }

    #[test]
    fn test_every_label_has_a_rule() {
        for label in PantaClass::ALL.iter().filter(|l| !l.is_unknown()) {
            assert!(
                PANTA_RULES.iter().any(|r| r.label == *label),
                "no rule for {}",
                label
            );
        }
        assert_eq!(PANTA_RATIOS.len(), 21);
    }

    #[test]
    fn test_quartz_scenario() {
        let r = ratios(&[(E::Si, 95.0), (E::Al, 2.0), (E::F, 0.5), (E::Fe, 1.0), (E::Na, 1.5)]);
        assert!(r.rel_si >= 0.7 && r.rel_si <= 1.01);
        assert_eq!(classify(&r), PantaClass::Quartz);
        assert_eq!(classify(&r).code(), "Quartz-like");
    }

    #[test]
    fn test_rel_si_boundary() {
        // |Si| exactly 0.7 is outside the broad window and inside quartz.
        let r = ratios(&[(E::Si, 7.0), (E::Na, 3.0)]);
        assert!((r.rel_si - 0.7).abs() < 1e-12);
        assert!(!other_silicate(&r));
        assert_eq!(classify(&r), PantaClass::Quartz);
    }

    #[test]
    fn test_overlap_resolves_to_later_rule() {
        // Illite window inside the broad silicate window.
        let r = ratios(&[
            (E::Si, 50.0),
            (E::Al, 30.0),
            (E::K, 6.0),
            (E::Mg, 2.0),
            (E::Fe, 3.0),
            (E::Na, 1.0),
            (E::Ca, 1.0),
        ]);
        assert!(other_silicate(&r));
        assert!(illite(&r));
        assert_eq!(
            candidates(&r),
            vec![PantaClass::OtherSilicate, PantaClass::Illite]
        );
        assert_eq!(classify(&r), PantaClass::Illite);
    }

    #[test]
    fn test_non_silicates() {
        assert_eq!(classify(&ratios(&[(E::Ca, 90.0), (E::Mg, 2.0)])).code(), "Calcite-like");
        assert_eq!(
            classify(&ratios(&[(E::Ca, 40.0), (E::Mg, 30.0), (E::Si, 2.0)])).code(),
            "Dolomite-like"
        );
        assert_eq!(classify(&ratios(&[(E::Ca, 45.0), (E::S, 50.0)])).code(), "Gypsum-like");
        assert_eq!(classify(&ratios(&[(E::Na, 45.0), (E::Cl, 50.0)])).code(), "Halite-like");
        assert_eq!(classify(&ratios(&[(E::Fe, 90.0), (E::Si, 5.0)])).code(), "Fe-oxide-like");
        assert_eq!(classify(&ratios(&[(E::Ti, 45.0), (E::Fe, 45.0)])).code(), "Ilmenite-like");
        assert_eq!(classify(&ratios(&[(E::Ca, 45.0), (E::F, 50.0)])).code(), "Fluorite-like");
    }

    #[test]
    fn test_kaolinite_beats_broad_silicate() {
        let r = ratios(&[(E::Si, 50.0), (E::Al, 48.0), (E::Fe, 1.0)]);
        assert_eq!(classify(&r), PantaClass::Kaolinite);
    }

    #[test]
    fn test_degenerate_row_is_unknown() {
        assert_eq!(classify(&ratios(&[])), PantaClass::Unknown);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let rows: Vec<Vec<f64>> = (0..300)
            .map(|i| {
                let mut pairs: Vec<(E, f64)> =
                    REQUIRED_ELEMENTS.iter().map(|&e| (e, 1.0)).collect();
                pairs.push((E::Si, f64::from(i % 97)));
                pairs.push((E::Ca, f64::from(i % 13)));
                let c = Composition::from_pairs(&pairs);
                compute_row(PANTA_RATIOS, &c, REQUIRED_ELEMENTS)
            })
            .collect();
        let table = RatioTable::from_parts(PANTA_RATIOS, rows);
        assert_eq!(classify_table(&table, false), classify_table(&table, true));
    }
}
