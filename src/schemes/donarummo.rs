//! Donarummo mineral classification
//!
//! Nested decision tree over seven elements (Na, Mg, Al, Si, K, Ca, Fe).
//! The first split is on Al/Si and selects one of three pathways:
//!
//! | Pathway | Al/Si            | Minerals                                    |
//! |---------|------------------|---------------------------------------------|
//! | 1       | `< 0.1`          | Mg/Fe silicates (hectorite, talc, sepiolite) |
//! | 2       | `>= 0.1, < 0.7`  | feldspars, smectites, micas                 |
//! | 3       | `>= 0.7, < 1.5`  | chlorite, muscovite, kaolinite, anorthite   |
//! | -       | `>= 1.5`         | `U-D0`                                      |
//!
//! Every branch states its own condition, including the complement of the
//! branch above it. A NaN ratio therefore fails both sides of a split and
//! the row lands on `U-`; it is never pushed into an `else` leaf.
//!
//! The `U-Dn` leaves are unknown outcomes that still carry the pathway they
//! came from. `U-D0` is not part of the published tree.

use crate::ratios::{map_rows, quotient, ratio_set, relative, RatioTable};
use crate::schemes::mineral_classes;
use crate::types::Element as E;

/// Required elements, in column order.
pub const REQUIRED_ELEMENTS: &[E] = &[E::Na, E::Mg, E::Al, E::Si, E::K, E::Ca, E::Fe];

ratio_set! {
    /// One row of Donarummo ratios.
    pub struct DonarummoRatios, specs = DONARUMMO_RATIOS {
        al_si = quotient("Al/Si", &[E::Al], &[E::Si]),
        fe_si = quotient("Fe/Si", &[E::Fe], &[E::Si]),
        k_kna_ca = quotient("K/(K+Na+Ca)", &[E::K], &[E::K, E::Na, E::Ca]),
        mgfe_al = quotient("(Mg+Fe)/Al", &[E::Mg, E::Fe], &[E::Al]),
        cana_al = quotient("(Ca+Na)/Al", &[E::Ca, E::Na], &[E::Al]),
        ca_na = quotient("Ca/Na", &[E::Ca], &[E::Na]),
        mg_fe = quotient("Mg/Fe", &[E::Mg], &[E::Fe]),
        mg_si = quotient("Mg/Si", &[E::Mg], &[E::Si]),
        mg_al = quotient("Mg/Al", &[E::Mg], &[E::Al]),
        k_al = quotient("K/Al", &[E::K], &[E::Al]),
        fe_al = quotient("Fe/Al", &[E::Fe], &[E::Al]),
        rel_si = relative("|Si|", &[E::Si]),
    }
}

mineral_classes! {
    /// Donarummo leaf labels.
    pub enum DonarummoClass {
        #[default]
        Unclassified => ("U-", "Unclassified"),
        UnknownD0 => ("U-D0", "Unclassified, Al/Si above the published range"),
        UnknownD1 => ("U-D1", "Unclassified Fe-bearing silicate"),
        UnknownD2 => ("U-D2", "Unclassified Al-poor silicate"),
        UnknownD3 => ("U-D3", "Unclassified Al-rich silicate"),
        Hectorite => ("Htr", "Hectorite"),
        Talc => ("Tlc", "Talc"),
        Sepiolite => ("Sep", "Sepiolite"),
        Nontronite => ("Non", "Nontronite"),
        Albite => ("Ab", "Albite"),
        Oligoclase => ("Olg", "Oligoclase"),
        Andesine => ("And", "Andesine"),
        Labradorite => ("Lab", "Labradorite"),
        Bytownite => ("Byt", "Bytownite"),
        Anorthite => ("An", "Anorthite"),
        Montmorillonite => ("Mnt", "Montmorillonite"),
        Saponite => ("Sap", "Saponite"),
        Palygorskite => ("Plg", "Palygorskite"),
        KFeldspar => ("Kfs", "K-feldspar"),
        Illite => ("Ilt", "Illite"),
        Biotite => ("Bt", "Biotite"),
        Glauconite => ("Glt", "Glauconite"),
        Chlorite => ("Chl", "Chlorite"),
        Muscovite => ("Ms", "Muscovite"),
        Kaolinite => ("Kln", "Kaolinite"),
    }
}

/// Donarummo threshold constants
pub mod thresholds {
    /// Al/Si: pathway 1 below, pathway 2 from here
    pub const AL_SI_LOW: f64 = 0.1;
    /// Al/Si: pathway 3 from here
    pub const AL_SI_MID: f64 = 0.7;
    /// Al/Si: above the published tree
    pub const AL_SI_HIGH: f64 = 1.5;

    /// Fe/Si: iron-free Mg silicate
    pub const FE_SI_TRACE: f64 = 0.02;
    /// Fe/Si: Fe-dominant smectite
    pub const FE_SI_RICH: f64 = 0.3;

    /// K/(K+Na+Ca): potassic branch
    pub const K_FRACTION: f64 = 0.35;
    /// (Mg+Fe)/Al: mafic branch in pathway 2
    pub const MAFIC_AL: f64 = 0.3;
    /// (Ca+Na)/Al: plagioclase versus montmorillonite
    pub const ALKALI_AL: f64 = 0.23;

    /// Ca/Na plagioclase series boundaries (Ab | Olg | And | Lab | Byt)
    pub const CA_NA_SERIES: [f64; 4] = [0.2, 0.6, 1.5, 4.0];
}

fn in_range(value: f64, low: f64, high: f64) -> bool {
    value >= low && value < high
}

/// Fe-bearing silicate that no pathway leaf claimed.
pub fn ud1(r: &DonarummoRatios) -> bool {
    r.fe_si >= thresholds::FE_SI_TRACE && r.rel_si >= 0.3
}

/// Al-poor Mg/Fe silicate outside the talc and sepiolite windows.
///
/// Defined alongside [`ud1`] but the pathway 1 fallback consults [`ud1`],
/// so no branch of [`classify`] can currently return `U-D2`.
pub fn ud2(r: &DonarummoRatios) -> bool {
    r.al_si < thresholds::AL_SI_LOW && r.fe_si >= thresholds::FE_SI_TRACE && r.mg_si < 0.4
}

/// Al-rich silicate outside the pathway 3 leaves.
pub fn ud3(r: &DonarummoRatios) -> bool {
    r.al_si >= thresholds::AL_SI_MID && r.rel_si >= 0.2
}

/// Classify one row.
pub fn classify(r: &DonarummoRatios) -> DonarummoClass {
    use thresholds::{AL_SI_HIGH, AL_SI_LOW, AL_SI_MID};

    if r.al_si < AL_SI_LOW {
        pathway_one(r)
    } else if in_range(r.al_si, AL_SI_LOW, AL_SI_MID) {
        pathway_two(r)
    } else if in_range(r.al_si, AL_SI_MID, AL_SI_HIGH) {
        pathway_three(r)
    } else if r.al_si >= AL_SI_HIGH {
        DonarummoClass::UnknownD0
    } else {
        DonarummoClass::Unclassified
    }
}

// ============================================================================
// Pathway 1: Al/Si < 0.1
// ============================================================================

fn pathway_one(r: &DonarummoRatios) -> DonarummoClass {
    use thresholds::{FE_SI_RICH, FE_SI_TRACE};
    use DonarummoClass as C;

    if r.fe_si < FE_SI_TRACE {
        C::Hectorite
    } else if r.fe_si >= FE_SI_TRACE {
        if r.mg_fe >= 1.0 {
            if r.mg_si >= 0.7 {
                C::Talc
            } else if in_range(r.mg_si, 0.4, 0.7) {
                C::Sepiolite
            } else {
                unmatched(r)
            }
        } else if r.mg_fe < 1.0 {
            if r.fe_si >= FE_SI_RICH {
                C::Nontronite
            } else {
                unmatched(r)
            }
        } else {
            C::Unclassified
        }
    } else {
        C::Unclassified
    }
}

/// Shared fallback of pathways 1 and 2.
fn unmatched(r: &DonarummoRatios) -> DonarummoClass {
    if ud1(r) {
        DonarummoClass::UnknownD1
    } else {
        DonarummoClass::Unclassified
    }
}

// ============================================================================
// Pathway 2: 0.1 <= Al/Si < 0.7
// ============================================================================

fn pathway_two(r: &DonarummoRatios) -> DonarummoClass {
    use thresholds::{K_FRACTION, MAFIC_AL};
    use DonarummoClass as C;

    if r.k_kna_ca < K_FRACTION {
        if r.mgfe_al < MAFIC_AL {
            sodic_calcic(r)
        } else if r.mgfe_al >= MAFIC_AL {
            if r.mg_fe >= 1.0 {
                if r.mg_al >= 2.0 {
                    C::Saponite
                } else if r.mg_al < 2.0 {
                    C::Palygorskite
                } else {
                    C::Unclassified
                }
            } else if r.mg_fe < 1.0 {
                if r.fe_al >= 1.0 {
                    C::Nontronite
                } else {
                    unmatched(r)
                }
            } else {
                C::Unclassified
            }
        } else {
            C::Unclassified
        }
    } else if r.k_kna_ca >= K_FRACTION {
        if r.mgfe_al < MAFIC_AL {
            if r.k_al >= 0.6 {
                C::KFeldspar
            } else if in_range(r.k_al, 0.15, 0.6) {
                C::Illite
            } else {
                unmatched(r)
            }
        } else if r.mgfe_al >= MAFIC_AL {
            if r.k_al >= 0.5 && r.mg_fe >= 0.5 {
                C::Biotite
            } else if r.fe_al >= 1.0 {
                C::Glauconite
            } else {
                unmatched(r)
            }
        } else {
            C::Unclassified
        }
    } else {
        C::Unclassified
    }
}

/// Plagioclase series and montmorillonite.
fn sodic_calcic(r: &DonarummoRatios) -> DonarummoClass {
    use thresholds::{ALKALI_AL, CA_NA_SERIES};
    use DonarummoClass as C;

    let [ab_olg, olg_and, and_lab, lab_byt] = CA_NA_SERIES;

    if r.cana_al >= ALKALI_AL {
        if r.ca_na < ab_olg {
            C::Albite
        } else if in_range(r.ca_na, ab_olg, olg_and) {
            C::Oligoclase
        } else if in_range(r.ca_na, olg_and, and_lab) {
            C::Andesine
        } else if in_range(r.ca_na, and_lab, lab_byt) {
            C::Labradorite
        } else if r.ca_na >= lab_byt {
            C::Bytownite
        } else {
            C::Unclassified
        }
    } else if r.cana_al < ALKALI_AL {
        C::Montmorillonite
    } else {
        C::Unclassified
    }
}

// ============================================================================
// Pathway 3: 0.7 <= Al/Si < 1.5
// ============================================================================

fn pathway_three(r: &DonarummoRatios) -> DonarummoClass {
    use DonarummoClass as C;

    if r.mgfe_al >= 1.0 {
        C::Chlorite
    } else if r.mgfe_al < 1.0 {
        if r.k_al >= 0.2 && r.k_kna_ca >= 0.5 {
            C::Muscovite
        } else if r.cana_al >= 0.3 && r.ca_na >= thresholds::CA_NA_SERIES[3] {
            C::Anorthite
        } else if r.k_al < 0.1 && r.cana_al < 0.1 && r.mgfe_al < 0.1 {
            C::Kaolinite
        } else if ud3(r) {
            C::UnknownD3
        } else {
            C::Unclassified
        }
    } else {
        C::Unclassified
    }
}

/// Classify every row of a Donarummo ratio table.
pub fn classify_table(ratios: &RatioTable, parallel: bool) -> Vec<DonarummoClass> {
    map_rows(ratios.n_rows(), parallel, |i| {
        classify(&DonarummoRatios::from_row(&ratios.rows()[i]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratios::{compute_row, Composition};
    use crate::schemes::MineralLabel;

    fn ratios(pairs: &[(E, f64)]) -> DonarummoRatios {
        let c = Composition::from_pairs(pairs);
        DonarummoRatios::from_row(&compute_row(DONARUMMO_RATIOS, &c, REQUIRED_ELEMENTS))
    }

    /// Row builder in REQUIRED_ELEMENTS order.
    fn row(na: f64, mg: f64, al: f64, si: f64, k: f64, ca: f64, fe: f64) -> DonarummoRatios {
        ratios(&[
            (E::Na, na),
            (E::Mg, mg),
            (E::Al, al),
            (E::Si, si),
            (E::K, k),
            (E::Ca, ca),
            (E::Fe, fe),
        ])
    }

    #[test]
    fn test_ratio_list_shape() {
        assert_eq!(DONARUMMO_RATIOS.len(), 12);
        assert_eq!(DONARUMMO_RATIOS[0].name, "Al/Si");
        // Ca only enters the tree through Ca/Na and the alkali sums.
        assert!(DONARUMMO_RATIOS.iter().all(|r| r.name != "Ca/Si" && r.name != "|Ca|"));
    }

    #[test]
    fn test_hectorite_scenario() {
        // Al/Si = 0.05, Fe/Si = 0.01
        let r = row(1.0, 5.0, 0.5, 10.0, 0.2, 0.3, 0.1);
        assert_eq!(classify(&r), DonarummoClass::Hectorite);
        assert_eq!(classify(&r).code(), "Htr");
    }

    #[test]
    fn test_albite_scenario() {
        // Al/Si = 0.333, K/(K+Na+Ca) = 0.09, (Mg+Fe)/Al = 0.15,
        // (Ca+Na)/Al = 1.0, Ca/Na = 0.111
        let r = row(9.0, 0.5, 10.0, 30.0, 1.0, 1.0, 1.0);
        assert_eq!(classify(&r).code(), "Ab");
    }

    #[test]
    fn test_plagioclase_series_by_ca_na() {
        let label = |ca: f64| classify(&row(10.0 - ca, 0.5, 10.0, 30.0, 0.5, ca, 1.0)).code();
        assert_eq!(label(1.0), "Ab"); // Ca/Na 0.11
        assert_eq!(label(3.0), "Olg"); // 0.43
        assert_eq!(label(5.0), "And"); // 1.0
        assert_eq!(label(7.0), "Lab"); // 2.33
        assert_eq!(label(9.0), "Byt"); // 9.0
    }

    #[test]
    fn test_al_si_lower_boundary_is_inclusive() {
        // Al/Si exactly 0.1 enters pathway 2 (montmorillonite here).
        let r = row(0.1, 0.05, 1.0, 10.0, 0.01, 0.01, 0.05);
        assert!((r.al_si - 0.1).abs() < f64::EPSILON);
        assert_eq!(classify(&r), DonarummoClass::Montmorillonite);
    }

    #[test]
    fn test_al_si_upper_boundary_is_exclusive() {
        // Al/Si exactly 0.7 leaves pathway 2 and reaches kaolinite.
        let r = row(0.01, 0.01, 7.0, 10.0, 0.01, 0.01, 0.01);
        assert!((r.al_si - 0.7).abs() < 1e-12);
        assert_eq!(classify(&r), DonarummoClass::Kaolinite);
    }

    #[test]
    fn test_pathway_three_leaves() {
        assert_eq!(classify(&row(0.1, 6.0, 8.0, 10.0, 0.1, 0.1, 5.0)).code(), "Chl");
        assert_eq!(classify(&row(0.2, 0.2, 9.0, 10.0, 3.0, 0.1, 0.3)).code(), "Ms");
        assert_eq!(classify(&row(0.5, 0.1, 9.0, 10.0, 0.1, 4.0, 0.1)).code(), "An");
    }

    #[test]
    fn test_potassic_branch() {
        assert_eq!(classify(&row(0.5, 0.2, 5.0, 15.0, 4.0, 0.2, 0.3)).code(), "Kfs");
        assert_eq!(classify(&row(0.2, 0.3, 8.0, 15.0, 2.0, 0.1, 0.5)).code(), "Ilt");
    }

    #[test]
    fn test_al_si_above_tree_is_ud0() {
        let r = row(1.0, 1.0, 20.0, 10.0, 1.0, 1.0, 1.0);
        assert_eq!(classify(&r), DonarummoClass::UnknownD0);
        assert!(classify(&r).is_unknown());
    }

    #[test]
    fn test_nan_row_is_unclassified() {
        let r = row(0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert!(r.al_si.is_nan());
        assert_eq!(classify(&r).code(), "U-");
    }

    #[test]
    fn test_pathway_one_fallback_uses_ud1() {
        // Al-poor, Mg-dominant, Mg/Si below the sepiolite window:
        // ud2 describes the row but the fallback reports U-D1.
        let r = row(0.1, 2.0, 0.5, 10.0, 0.1, 0.1, 0.5);
        assert!(ud2(&r));
        assert!(ud1(&r));
        assert_eq!(classify(&r), DonarummoClass::UnknownD1);
    }

    #[test]
    fn test_ud2_is_never_produced() {
        let mut seen = Vec::new();
        for mg in [0.1, 1.0, 2.0, 5.0, 9.0] {
            for fe in [0.01, 0.5, 2.0, 5.0] {
                for al in [0.1, 0.5, 3.0, 8.0] {
                    seen.push(classify(&row(0.3, mg, al, 10.0, 0.2, 0.2, fe)));
                }
            }
        }
        assert!(!seen.contains(&DonarummoClass::UnknownD2));
    }

    #[test]
    fn test_infinite_ratios_do_not_panic() {
        // Si = 0 makes every */Si ratio infinite.
        let r = row(1.0, 1.0, 1.0, 0.0, 1.0, 1.0, 1.0);
        assert!(r.al_si.is_infinite());
        assert!(DonarummoClass::ALL.contains(&classify(&r)));
    }

    #[test]
    fn test_classify_table_preserves_order() {
        let rows = vec![
            compute_row(
                DONARUMMO_RATIOS,
                &Composition::from_pairs(&[
                    (E::Na, 1.0), (E::Mg, 5.0), (E::Al, 0.5), (E::Si, 10.0),
                    (E::K, 0.2), (E::Ca, 0.3), (E::Fe, 0.1),
                ]),
                REQUIRED_ELEMENTS,
            ),
            vec![f64::NAN; DONARUMMO_RATIOS.len()],
        ];
        let table = RatioTable::from_parts(DONARUMMO_RATIOS, rows);
        let labels = classify_table(&table, true);
        assert_eq!(labels, vec![DonarummoClass::Hectorite, DonarummoClass::Unclassified]);
    }
}
