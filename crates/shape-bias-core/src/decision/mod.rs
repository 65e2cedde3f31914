//! Per-stimulus decisions in the 16-category space.
//!
//! - `reducer`: unrestricted and restricted decisions from a score vector
//! - `book`: shape category -> specimen -> record mapping
//! - `row`: the persisted per-shape-category table row

mod book;
mod reducer;
mod row;

pub use book::{DecisionBook, SpecimenKey};
pub use reducer::{classify, reduce, DecisionRecord};
pub use row::DecisionRow;
