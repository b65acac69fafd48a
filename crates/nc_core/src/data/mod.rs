//! Tabular inputs: race result sheets and cross-race history totals.

pub mod history;
pub mod table;

pub use history::RaceHistory;
pub use table::{race_distance_m, RaceRecord, RaceTable};
