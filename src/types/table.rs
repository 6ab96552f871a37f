//! Row-major composition table
//!
//! The classifiers consume a plain table: named columns, one `f64` per cell,
//! one row per particle. Column names arrive in whatever spelling the
//! instrument software exported and are canonicalized by
//! [`crate::normalize`] before any ratio is computed.

use super::Element;

/// A table of measured values with named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementTable {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

/// Row whose width differs from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaggedRow {
    pub row: usize,
    pub expected: usize,
    pub found: usize,
}

impl ElementTable {
    /// Build a table, checking that every row is as wide as the header.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self, RaggedRow> {
        let expected = columns.len();
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(RaggedRow {
                row,
                expected,
                found: r.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    /// Convenience constructor from `&str` headers.
    pub fn from_rows(columns: &[&str], rows: Vec<Vec<f64>>) -> Result<Self, RaggedRow> {
        Self::new(columns.iter().map(|c| (*c).to_string()).collect(), rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first column with exactly this name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Index of the column holding an element, once normalized.
    pub fn element_index(&self, element: Element) -> Option<usize> {
        self.column_index(element.symbol())
    }

    /// Copy of one column's values.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[idx]).collect())
    }

    /// Replace the header. Used by the normalizer; width must not change.
    pub(crate) fn set_columns(&mut self, columns: Vec<String>) {
        debug_assert_eq!(columns.len(), self.columns.len());
        self.columns = columns;
    }
}

impl std::fmt::Display for RaggedRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "row {} has {} values, header has {}",
            self.row, self.found, self.expected
        )
    }
}
