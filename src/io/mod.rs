//! Table input and output
//!
//! Delimited text in, delimited text out. The classifiers themselves only
//! see [`crate::types::ElementTable`].

mod csv;

pub use csv::*;
