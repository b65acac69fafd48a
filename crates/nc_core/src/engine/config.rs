//! Simulation parameters.

use serde::{Deserialize, Serialize};

use super::constants::draft;

/// Knobs for one simulation run.
///
/// The same config + the same seed replays the same race.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Fixed step in seconds (default: 0.05). The engine clock advances in
    /// whole milliseconds, so the step is rounded to the nearest ms.
    pub dt: f64,

    /// Seed for the run's RNG.
    pub seed: u64,

    /// Enable the per-tick uniform speed jitter.
    pub use_random: bool,

    /// Half-width of the speed jitter; 0.10 means ±10% around 1.0.
    pub random_spread: f64,

    /// Chance per tick that a detected draft feeds the boost charge.
    pub activation_probability: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.05,
            seed: 0,
            use_random: true,
            random_spread: 0.10,
            activation_probability: draft::ACTIVATION_PROBABILITY,
        }
    }
}

impl SimConfig {
    /// Step width in whole milliseconds, never zero.
    pub fn dt_ms(&self) -> u64 {
        ((self.dt * 1000.0).round() as u64).max(1)
    }
}
