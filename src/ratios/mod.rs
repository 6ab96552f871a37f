//! Ratio Engine
//!
//! Every scheme classifies on derived ratios rather than raw intensities.
//! Ratios are declared as data ([`RatioSpec`]): a numerator and denominator,
//! each either a sum of elements or the total over all of the scheme's
//! elements (the "relative abundance" |X| of the literature).
//!
//! Division follows IEEE-754. `x / 0.0` is `±inf` and `0.0 / 0.0` is NaN;
//! nothing is clamped or rejected here. Downstream comparisons against NaN
//! are false, so degenerate rows fall through to the scheme's unknown label.

use rayon::prelude::*;
use serde::Serialize;

use crate::normalize::NormalizedTable;
use crate::types::Element;

/// One side of a ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term {
    /// Sum of the listed elements
    Sum(&'static [Element]),
    /// Sum of every element the scheme requires
    Total,
}

/// A named ratio formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatioSpec {
    pub name: &'static str,
    pub numerator: Term,
    pub denominator: Term,
}

/// `sum(numerator) / sum(denominator)`
pub const fn quotient(
    name: &'static str,
    numerator: &'static [Element],
    denominator: &'static [Element],
) -> RatioSpec {
    RatioSpec {
        name,
        numerator: Term::Sum(numerator),
        denominator: Term::Sum(denominator),
    }
}

/// `|X|`: element over the total of all scheme elements
pub const fn relative(name: &'static str, element: &'static [Element]) -> RatioSpec {
    RatioSpec {
        name,
        numerator: Term::Sum(element),
        denominator: Term::Total,
    }
}

/// Declares a scheme's ratio list together with a typed view of one row.
///
/// The field order is the column order of the ratio table, so the struct and
/// the ratio list cannot drift apart.
macro_rules! ratio_set {
    (
        $(#[$meta:meta])*
        pub struct $name:ident, specs = $specs:ident {
            $( $(#[$fmeta:meta])* $field:ident = $spec:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $name {
            $( $(#[$fmeta])* pub $field: f64 ),+
        }

        pub const $specs: &[$crate::ratios::RatioSpec] = &[ $( $spec ),+ ];

        impl $name {
            /// Read a row of the ratio table built from the matching ratio list.
            pub fn from_row(row: &[f64]) -> Self {
                let mut values = row.iter().copied();
                Self {
                    $( $field: values.next().unwrap_or(f64::NAN) ),+
                }
            }
        }
    };
}
pub(crate) use ratio_set;

/// One row of element values, indexed by [`Element`].
///
/// Elements not required by the scheme are NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Composition {
    values: [f64; Element::COUNT],
}

impl Composition {
    /// Composition from `(element, value)` pairs; absent elements are NaN.
    pub fn from_pairs(pairs: &[(Element, f64)]) -> Self {
        let mut values = [f64::NAN; Element::COUNT];
        for &(element, value) in pairs {
            values[element as usize] = value;
        }
        Self { values }
    }

    fn from_table_row(table: &NormalizedTable, row: usize) -> Self {
        let mut values = [f64::NAN; Element::COUNT];
        let cells = &table.table().rows()[row];
        for &element in table.scheme().required_elements() {
            if let Some(idx) = table.column_of(element) {
                values[element as usize] = cells[idx];
            }
        }
        Self { values }
    }

    pub fn get(&self, element: Element) -> f64 {
        self.values[element as usize]
    }

    fn sum(&self, elements: &[Element]) -> f64 {
        elements.iter().map(|&e| self.get(e)).sum()
    }
}

/// Evaluate one ratio. `total_of` is the scheme's element list.
pub fn evaluate(spec: &RatioSpec, composition: &Composition, total_of: &[Element]) -> f64 {
    let side = |term: Term| match term {
        Term::Sum(elements) => composition.sum(elements),
        Term::Total => composition.sum(total_of),
    };
    side(spec.numerator) / side(spec.denominator)
}

/// Evaluate a whole ratio list for one composition.
pub fn compute_row(
    specs: &[RatioSpec],
    composition: &Composition,
    total_of: &[Element],
) -> Vec<f64> {
    specs
        .iter()
        .map(|spec| evaluate(spec, composition, total_of))
        .collect()
}

/// Table of ratio values, one row per input row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioTable {
    names: Vec<&'static str>,
    rows: Vec<Vec<f64>>,
}

impl RatioTable {
    /// Assemble a table from precomputed rows.
    pub fn from_parts(specs: &[RatioSpec], rows: Vec<Vec<f64>>) -> Self {
        Self {
            names: specs.iter().map(|s| s.name).collect(),
            rows,
        }
    }

    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Values of one named ratio across all rows.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.names.iter().position(|n| *n == name)?;
        Some(self.rows.iter().map(|r| r[idx]).collect())
    }

    /// Rows where at least one ratio is NaN or infinite.
    pub fn degenerate_rows(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.iter().any(|v| !v.is_finite()))
            .count()
    }
}

/// Compute a scheme's ratio table.
pub fn compute_ratios(table: &NormalizedTable, specs: &[RatioSpec], parallel: bool) -> RatioTable {
    let total_of = table.scheme().required_elements();
    let rows = map_rows(table.n_rows(), parallel, |i| {
        let composition = Composition::from_table_row(table, i);
        compute_row(specs, &composition, total_of)
    });

    RatioTable::from_parts(specs, rows)
}

/// Map row indices to values, optionally on the rayon pool.
///
/// Output order always matches row order.
pub(crate) fn map_rows<T, F>(n: usize, parallel: bool, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    if parallel {
        (0..n).into_par_iter().map(f).collect()
    } else {
        (0..n).map(f).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_columns;
    use crate::types::{ElementTable, Scheme};

    const AL_SI: RatioSpec = quotient("Al/Si", &[Element::Al], &[Element::Si]);
    const ALK_AL: RatioSpec =
        quotient("(Na+K)/Al", &[Element::Na, Element::K], &[Element::Al]);
    const REL_SI: RatioSpec = relative("|Si|", &[Element::Si]);

    #[test]
    fn test_quotient_and_sum() {
        let c = Composition::from_pairs(&[
            (Element::Na, 1.0),
            (Element::K, 3.0),
            (Element::Al, 2.0),
            (Element::Si, 8.0),
        ]);
        let total = [Element::Na, Element::K, Element::Al, Element::Si];
        assert!((evaluate(&AL_SI, &c, &total) - 0.25).abs() < 1e-12);
        assert!((evaluate(&ALK_AL, &c, &total) - 2.0).abs() < 1e-12);
        assert!((evaluate(&REL_SI, &c, &total) - 8.0 / 14.0).abs() < 1e-12);
    }

    #[test]
    fn test_division_by_zero_follows_ieee() {
        let c = Composition::from_pairs(&[(Element::Al, 1.0), (Element::Si, 0.0)]);
        assert_eq!(evaluate(&AL_SI, &c, &[]), f64::INFINITY);

        let zero = Composition::from_pairs(&[(Element::Al, 0.0), (Element::Si, 0.0)]);
        assert!(evaluate(&AL_SI, &zero, &[]).is_nan());
    }

    #[test]
    fn test_compute_ratios_parallel_matches_serial() {
        let rows: Vec<Vec<f64>> = (0..500)
            .map(|i| {
                let x = f64::from(i);
                vec![x, x * 0.5, x * 0.1 + 1.0, x + 10.0, 1.0, 2.0, 0.0]
            })
            .collect();
        let table = ElementTable::from_rows(&["Na", "Mg", "Al", "Si", "K", "Ca", "Fe"], rows)
            .unwrap();
        let normalized = normalize_columns(&table, Scheme::Donarummo).unwrap();
        let specs = [AL_SI, REL_SI];

        let serial = compute_ratios(&normalized, &specs, false);
        let parallel = compute_ratios(&normalized, &specs, true);
        assert_eq!(serial, parallel);
        assert_eq!(serial.names(), &["Al/Si", "|Si|"]);
        assert_eq!(serial.n_rows(), 500);
    }

    #[test]
    fn test_degenerate_rows_counted() {
        let table = ElementTable::from_rows(
            &["Na", "Mg", "Al", "Si", "K", "Ca", "Fe"],
            vec![vec![1.0; 7], vec![0.0; 7]],
        )
        .unwrap();
        let normalized = normalize_columns(&table, Scheme::Donarummo).unwrap();
        let ratios = compute_ratios(&normalized, &[AL_SI], false);
        assert_eq!(ratios.degenerate_rows(), 1);
        assert_eq!(ratios.column("Al/Si").unwrap()[0], 1.0);
    }
}
