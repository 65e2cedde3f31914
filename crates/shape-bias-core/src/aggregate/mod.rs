//! Aggregation of per-stimulus decisions into shape/texture statistics.
//!
//! Counting only considers records whose restricted shape flag differs from
//! the restricted texture flag. For cue-conflict stimuli exactly one of the
//! two is always set; for controls (shape == texture) both are, so controls
//! never contribute. This filter is kept as-is for comparability with
//! earlier result sets, even though it also hides any control-stimulus
//! "neither" decisions.
//!
//! - `counts`: the filtered counter
//! - `totals`: per-category roll-up and `totals.csv`
//! - `proportions`: the six summary proportions and `proportions.txt`

mod counts;
mod proportions;
mod totals;


pub use counts::DecisionCounts;
pub use proportions::{Proportions, PROPORTIONS_FILE};
pub use totals::{aggregate_records, aggregate_tables, TotalsRow, TotalsTable, TOTALS_FILE};
