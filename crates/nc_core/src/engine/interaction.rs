//! Per-tick interaction between a skiing athlete and the rest of the field.
//!
//! The model only reads positions; the engine applies the returned command.
//! Reads happen against whatever state the field is in mid-tick: athletes
//! earlier in the list have already moved this tick, which the sequential
//! scan tolerates.

use rand::RngCore;

use super::athlete::Athlete;
use super::constants::draft;

/// What the engine should do with one athlete this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickCommand {
    /// Advance at exactly this speed; the energy model is skipped and the
    /// boost is not evaluated.
    Fixed(f64),
    /// Run the full physical model; `drafting` reports whether a slipstream
    /// opportunity exists this tick.
    Free { drafting: bool },
}

/// Per-tick decision seam between simulation variants.
pub trait InteractionModel {
    fn resolve(
        &self,
        idx: usize,
        skiing: &[Athlete],
        t: f64,
        dt: f64,
        rng: &mut dyn RngCore,
    ) -> TickCommand;
}

/// The plain variant: no drafting, no noise, no energy dynamics. Every tick
/// advances at exactly the baseline speed.
pub struct NoInteraction;

impl InteractionModel for NoInteraction {
    fn resolve(
        &self,
        idx: usize,
        skiing: &[Athlete],
        _t: f64,
        _dt: f64,
        _rng: &mut dyn RngCore,
    ) -> TickCommand {
        TickCommand::Fixed(skiing[idx].avg_speed())
    }
}

/// Slipstream-aware variant: scans for an athlete strictly inside the
/// drafting band ahead and either reports a drafting opportunity or, when
/// enabled and the athlete ahead is clearly slower, orders a forced
/// overtake: one tick at `2 * gap / dt`, enough to catch up and pass
/// without lingering inside the band.
pub struct SlipstreamModel {
    pub forced_overtake: bool,
}

impl Default for SlipstreamModel {
    fn default() -> Self {
        Self { forced_overtake: true }
    }
}

impl InteractionModel for SlipstreamModel {
    fn resolve(
        &self,
        idx: usize,
        skiing: &[Athlete],
        _t: f64,
        dt: f64,
        _rng: &mut dyn RngCore,
    ) -> TickCommand {
        let a = &skiing[idx];
        for (j, other) in skiing.iter().enumerate() {
            if j == idx {
                continue;
            }
            let gap = other.distance() - a.distance();
            if gap > draft::MIN_GAP_M && gap < draft::MAX_GAP_M {
                if self.forced_overtake
                    && a.avg_speed() - other.avg_speed() > draft::OVERTAKE_SPEED_GAP
                {
                    return TickCommand::Fixed(2.0 * gap / dt);
                }
                return TickCommand::Free { drafting: true };
            }
        }
        TickCommand::Free { drafting: false }
    }
}
