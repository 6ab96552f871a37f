//! Shared data structures for EDS mineral classification
//!
//! - `Element`: the closed element alphabet
//! - `ElementTable`: row-major measurement table with named columns
//! - `Scheme`: the closed set of classification schemes

mod element;
mod scheme;
mod table;

pub use element::*;
pub use scheme::*;
pub use table::*;
