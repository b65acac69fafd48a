//! Post-race analysis.

pub mod scoring;

pub use scoring::{adapted_rate, adapted_rate_of, exact_rate, exact_rate_of};
