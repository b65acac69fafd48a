//! Reporting surface of the engine.
//!
//! The engine never prints; it reports to a [`ProgressSink`]. Renderers,
//! log writers, and tests plug in behind this trait.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Final state of one finished athlete, as exposed to reporters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishRecord {
    pub name: String,
    pub starting_place: u32,
    pub expected_rank: i32,
    pub rank: i32,
    /// Elapsed racing time in seconds.
    pub time: f64,
}

/// Per-athlete state inside one display frame, keyed by display slot
/// (the athlete's starting place).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SlotState {
    pub rank: i32,
    /// Left edge of the plotted window: the field minimum pulled back 500 m,
    /// floored at the start line.
    pub window_min_m: f64,
    pub distance_m: f64,
}

/// Snapshot taken at each whole-second boundary of the race clock.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub slots: BTreeMap<u32, SlotState>,
}

/// Event sink the engine reports to. All callbacks default to no-ops so a
/// sink only implements what it cares about.
pub trait ProgressSink {
    /// Called once per tick with the advanced race clock.
    fn on_clock(&mut self, _t: f64) {}

    /// Called at each whole-second boundary with the fresh display frame.
    fn on_frame(&mut self, _snapshot: &FrameSnapshot) {}

    /// Called when an athlete crosses the finish line.
    fn on_finish(&mut self, _record: &FinishRecord) {}

    /// Called once, when both the waiting and skiing pools are empty.
    fn on_end(&mut self) {}
}

/// Discards everything.
pub struct NullSink;

impl ProgressSink for NullSink {}
