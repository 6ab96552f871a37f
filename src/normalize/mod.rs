//! Column Normalizer
//!
//! Maps the heterogeneous column headers that EDS software exports
//! ("Aluminium", "Aluminum Wt%", "AL", "al") onto canonical element symbols,
//! then checks that the active scheme's elements are all present.
//!
//! ## Matching
//!
//! 1. Every column name is lower-cased.
//! 2. Alias rules are applied in declaration order. A rule renames every
//!    column whose current name equals the lower-cased symbol or *contains*
//!    one of the rule's patterns.
//! 3. The number of columns carrying a required symbol must equal the number
//!    of required elements. Missing and duplicated elements are both errors.
//!
//! The alias lists are declared per scheme and their order is part of the
//! contract: "contains" matching means a later pattern could match a column
//! that an earlier rule already claimed.

use std::collections::HashMap;

use tracing::debug;

use crate::error::SchemaError;
use crate::types::{Element, ElementTable, Scheme};

/// One ordered alias rule: any column containing a pattern becomes `symbol`.
#[derive(Debug, Clone, Copy)]
pub struct AliasRule {
    pub symbol: Element,
    pub patterns: &'static [&'static str],
}

const fn rule(symbol: Element, patterns: &'static [&'static str]) -> AliasRule {
    AliasRule { symbol, patterns }
}

const SODIUM: AliasRule = rule(Element::Na, &["sodium", "natrium"]);
const MAGNESIUM: AliasRule = rule(Element::Mg, &["magnesium"]);
const ALUMINIUM: AliasRule = rule(Element::Al, &["aluminum", "aluminium"]);
const SILICON: AliasRule = rule(Element::Si, &["silicon"]);
const PHOSPHORUS: AliasRule = rule(Element::P, &["phosphorus", "phosphorous"]);
const SULFUR: AliasRule = rule(Element::S, &["sulfur", "sulphur"]);
const CHLORINE: AliasRule = rule(Element::Cl, &["chlorine"]);
const POTASSIUM: AliasRule = rule(Element::K, &["potassium", "kalium"]);
const CALCIUM: AliasRule = rule(Element::Ca, &["calcium"]);
const TITANIUM: AliasRule = rule(Element::Ti, &["titanium"]);
const CHROMIUM: AliasRule = rule(Element::Cr, &["chromium"]);
const MANGANESE: AliasRule = rule(Element::Mn, &["manganese"]);
const IRON: AliasRule = rule(Element::Fe, &["iron", "ferrum"]);
const FLUORINE: AliasRule = rule(Element::F, &["fluorine"]);

/// Donarummo: Na, Mg, Al, Si, K, Ca, Fe
pub const DONARUMMO_ALIASES: &[AliasRule] = &[
    SODIUM, MAGNESIUM, ALUMINIUM, SILICON, POTASSIUM, CALCIUM, IRON,
];

/// Panta: the full 14-element alphabet, fluorine last
pub const PANTA_ALIASES: &[AliasRule] = &[
    SODIUM, MAGNESIUM, ALUMINIUM, SILICON, PHOSPHORUS, SULFUR, CHLORINE, POTASSIUM, CALCIUM,
    TITANIUM, CHROMIUM, MANGANESE, IRON, FLUORINE,
];

/// Kandler: 13 elements, no fluorine
pub const KANDLER_ALIASES: &[AliasRule] = &[
    SODIUM, MAGNESIUM, ALUMINIUM, SILICON, PHOSPHORUS, SULFUR, CHLORINE, POTASSIUM, CALCIUM,
    TITANIUM, CHROMIUM, MANGANESE, IRON,
];

/// ML (Weber) model: Na, Mg, Al, Si, S, K, Ca, Ti, Fe
pub const WEBER_ALIASES: &[AliasRule] = &[
    SODIUM, MAGNESIUM, ALUMINIUM, SILICON, SULFUR, POTASSIUM, CALCIUM, TITANIUM, IRON,
];

/// Ordered alias table for a scheme.
pub const fn alias_table(scheme: Scheme) -> &'static [AliasRule] {
    match scheme {
        Scheme::Donarummo => DONARUMMO_ALIASES,
        Scheme::Panta => PANTA_ALIASES,
        Scheme::Kandler => KANDLER_ALIASES,
        Scheme::Ml => WEBER_ALIASES,
    }
}

/// A table whose required element columns are known to be present exactly once.
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    scheme: Scheme,
    table: ElementTable,
    element_columns: HashMap<Element, usize>,
}

impl NormalizedTable {
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn table(&self) -> &ElementTable {
        &self.table
    }

    pub fn into_table(self) -> ElementTable {
        self.table
    }

    pub fn n_rows(&self) -> usize {
        self.table.n_rows()
    }

    /// Column index of a required element.
    ///
    /// Returns `None` only for elements outside the scheme's required set.
    pub fn column_of(&self, element: Element) -> Option<usize> {
        self.element_columns.get(&element).copied()
    }
}

/// Apply the scheme's alias rules to one list of column names.
///
/// Exposed separately so the renaming can be inspected without a table.
pub fn canonicalize_names(columns: &[String], scheme: Scheme) -> Vec<String> {
    let mut names: Vec<String> = columns.iter().map(|c| c.to_lowercase()).collect();

    for rule in alias_table(scheme) {
        let symbol = rule.symbol.symbol();
        let symbol_lower = symbol.to_lowercase();
        for name in &mut names {
            if *name == symbol_lower || rule.patterns.iter().any(|p| name.contains(p)) {
                *name = symbol.to_string();
            }
        }
    }

    names
}

/// Rename columns to canonical symbols and validate the scheme's elements.
pub fn normalize_columns(
    table: &ElementTable,
    scheme: Scheme,
) -> Result<NormalizedTable, SchemaError> {
    let names = canonicalize_names(table.columns(), scheme);

    for (before, after) in table.columns().iter().zip(&names) {
        if before != after {
            debug!(scheme = %scheme, from = %before, to = %after, "Renamed column");
        }
    }

    let required = scheme.required_elements();
    let mut missing = Vec::new();
    let mut duplicated = Vec::new();
    let mut found = 0usize;
    let mut element_columns = HashMap::with_capacity(required.len());

    for &element in required {
        let positions: Vec<usize> = names
            .iter()
            .enumerate()
            .filter(|(_, n)| n.as_str() == element.symbol())
            .map(|(i, _)| i)
            .collect();
        found += positions.len();
        match positions.as_slice() {
            [] => missing.push(element),
            [idx] => {
                element_columns.insert(element, *idx);
            }
            _ => duplicated.push(element),
        }
    }

    if found != required.len() || !missing.is_empty() || !duplicated.is_empty() {
        return Err(SchemaError {
            scheme,
            required: required.len(),
            found,
            missing,
            duplicated,
        });
    }

    let mut normalized = table.clone();
    normalized.set_columns(names);

    Ok(NormalizedTable {
        scheme,
        table: normalized,
        element_columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| (*c).to_string()).collect()
    }

    #[test]
    fn test_alias_tables_cover_required_elements() {
        for scheme in Scheme::ALL {
            let aliased: Vec<Element> = alias_table(scheme).iter().map(|r| r.symbol).collect();
            assert_eq!(aliased, scheme.required_elements(), "{scheme}");
        }
    }

    #[test]
    fn test_full_names_and_symbols_canonicalize() {
        let cols = names(&["Sodium", "MAGNESIUM", "Aluminium", "si", "Potassium", "CA", "Iron"]);
        assert_eq!(
            canonicalize_names(&cols, Scheme::Donarummo),
            names(&["Na", "Mg", "Al", "Si", "K", "Ca", "Fe"])
        );
    }

    #[test]
    fn test_contains_matching_on_decorated_headers() {
        let cols = names(&["Aluminum Wt%", "Net Silicon Counts"]);
        assert_eq!(canonicalize_names(&cols, Scheme::Ml)[..2], names(&["Al", "Si"])[..]);
    }

    #[test]
    fn test_symbol_is_not_a_substring_pattern() {
        // "calcium" contains "al", but symbols only match exactly.
        let cols = names(&["Calcium"]);
        assert_eq!(canonicalize_names(&cols, Scheme::Donarummo), names(&["Ca"]));
    }

    #[test]
    fn test_non_element_columns_lowercased_only() {
        let cols = names(&["Particle_ID", "Area"]);
        assert_eq!(
            canonicalize_names(&cols, Scheme::Panta),
            names(&["particle_id", "area"])
        );
    }

    #[test]
    fn test_missing_element_is_schema_error() {
        let table = ElementTable::from_rows(
            &["Na", "Mg", "Al", "Si", "K", "Ca"],
            vec![vec![1.0; 6]],
        )
        .unwrap();
        let err = normalize_columns(&table, Scheme::Donarummo).unwrap_err();
        assert_eq!(err.missing, vec![Element::Fe]);
        assert_eq!(err.found, 6);
        assert_eq!(err.required, 7);
    }

    #[test]
    fn test_duplicate_element_is_schema_error() {
        // "Iron" and "Fe" both become Fe.
        let table = ElementTable::from_rows(
            &["Na", "Mg", "Al", "Si", "K", "Ca", "Fe", "Iron"],
            vec![vec![1.0; 8]],
        )
        .unwrap();
        let err = normalize_columns(&table, Scheme::Donarummo).unwrap_err();
        assert_eq!(err.duplicated, vec![Element::Fe]);
        assert!(err.missing.is_empty());
        assert_eq!(err.found, 8);
    }

    #[test]
    fn test_column_of_resolves_indices() {
        let table = ElementTable::from_rows(
            &["id", "Iron", "Calcium", "K", "Silicon", "Aluminium", "Mg", "Sodium"],
            vec![vec![0.0; 8]],
        )
        .unwrap();
        let normalized = normalize_columns(&table, Scheme::Donarummo).unwrap();
        assert_eq!(normalized.column_of(Element::Fe), Some(1));
        assert_eq!(normalized.column_of(Element::Na), Some(7));
        assert_eq!(normalized.column_of(Element::Ti), None);
        assert_eq!(normalized.table().columns()[0], "id");
    }
}
