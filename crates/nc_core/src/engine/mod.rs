//! Discrete-time race engine: athletes, slipstream boosts, pacing and
//! interaction strategies, and the simulation loop that ties them together.

pub mod athlete;
pub mod boost;
pub mod config;
pub mod constants;
pub mod interaction;
pub mod pacing;
pub mod progress;
pub mod simulation;

#[cfg(test)]
mod scenario_tests;

pub use athlete::{performance_factor, Athlete};
pub use boost::Boost;
pub use config::SimConfig;
pub use interaction::{InteractionModel, NoInteraction, SlipstreamModel, TickCommand};
pub use pacing::{BasePacing, HistoryPacing, PacingModel};
pub use progress::{FinishRecord, FrameSnapshot, NullSink, ProgressSink, SlotState};
pub use simulation::Simulation;

/// Round to whole milliseconds.
#[inline]
pub(crate) fn round_ms(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Round to 6 decimal digits, enough to keep float drift from accumulating
/// into spurious boundary crossings.
#[inline]
pub(crate) fn round_energy(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}
