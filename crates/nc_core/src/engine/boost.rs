//! Slipstream boost state machine.
//!
//! A drafting opportunity has to be held for a sustained window before the
//! speed benefit arms, and the benefit then persists for a bounded window
//! after the draft condition disappears. Splitting "charging" from "active"
//! avoids abrupt speed discontinuities at the moment a draft breaks.

use serde::{Deserialize, Serialize};

use super::constants::boost;

/// Per-athlete drafting/boost state. Owned exclusively by one athlete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boost {
    /// Sustained drafting required before the boost arms.
    time_activation: f64,
    /// How long an armed boost stays active.
    time_boost: f64,
    /// When the current charge began, if any.
    activate_start: Option<f64>,
    /// When the boost armed, if it has.
    start_boost: Option<f64>,
}

impl Default for Boost {
    fn default() -> Self {
        Self::new()
    }
}

impl Boost {
    pub fn new() -> Self {
        Self {
            time_activation: boost::ACTIVATION_WINDOW_S,
            time_boost: boost::BOOST_WINDOW_S,
            activate_start: None,
            start_boost: None,
        }
    }

    /// Feed one tick of drafting opportunity at time `t`.
    ///
    /// Starts a charge when idle; arms the boost once the charge has been
    /// held longer than the activation window. Calls made while still inside
    /// the activation window change nothing.
    pub fn change(&mut self, t: f64) {
        match self.activate_start {
            None => self.activate_start = Some(t),
            Some(start) if t - start > self.time_activation => {
                self.start_boost = Some(t);
            }
            Some(_) => {}
        }
    }

    /// Whether the boost is granting its speed multiplier at time `t`.
    pub fn is_active(&self, t: f64) -> bool {
        match self.start_boost {
            Some(start) => t - start < self.time_boost,
            None => false,
        }
    }

    /// Whether a charge has been started. Intentionally permissive: stays
    /// true after the boost armed or expired, until `reset` clears it.
    pub fn is_charging(&self) -> bool {
        self.activate_start.is_some()
    }

    /// Re-arm the boost at time `t`, keeping an in-reach boost alive while
    /// its owner lacks the energy to spend it.
    pub fn extend(&mut self, t: f64) {
        self.start_boost = Some(t);
    }

    /// Clear both timestamps; the next `change` starts a fresh charge.
    pub fn reset(&mut self) {
        self.activate_start = None;
        self.start_boost = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_boost_is_inactive() {
        let b = Boost::new();
        assert!(!b.is_active(0.0));
        assert!(!b.is_charging());
    }

    #[test]
    fn test_charge_then_arm_after_window() {
        let mut b = Boost::new();
        b.change(10.0);
        assert!(b.is_charging());
        assert!(!b.is_active(10.0));

        // Still inside the activation window: nothing arms.
        b.change(11.0);
        assert!(!b.is_active(11.0));

        // Past the window: the boost arms and reports active.
        b.change(12.1);
        assert!(b.is_active(12.1));
    }

    #[test]
    fn test_boost_expires_after_its_window() {
        let mut b = Boost::new();
        b.change(0.0);
        b.change(2.5);
        assert!(b.is_active(2.5));
        assert!(b.is_active(7.4));
        assert!(!b.is_active(7.5));
        // Charging stays set until an explicit reset.
        assert!(b.is_charging());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut b = Boost::new();
        b.change(0.0);
        b.change(3.0);
        b.reset();
        assert!(!b.is_active(3.0));
        assert!(!b.is_active(1000.0));
        assert!(!b.is_charging());
    }

    #[test]
    fn test_extend_rearms_the_active_window() {
        let mut b = Boost::new();
        b.change(0.0);
        b.change(2.5);
        // Deferred at t=7.0: the window restarts instead of expiring.
        b.extend(7.0);
        assert!(b.is_active(11.9));
        assert!(!b.is_active(12.0));
    }
}
