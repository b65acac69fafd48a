//! Baseline speed strategies.
//!
//! Assigned once per athlete before the start; the per-tick energy model
//! then modulates around this baseline.

use super::athlete::Athlete;
use crate::clock::parse_clock;
use crate::data::RaceHistory;
use crate::error::Result;

/// Strategy for guessing an athlete's baseline average speed.
pub trait PacingModel {
    fn avg_speed(&self, athlete: &Athlete, race_distance_m: f64) -> Result<f64>;
}

/// Race distance over the athlete's own cross-country time from the sheet.
pub struct BasePacing;

impl PacingModel for BasePacing {
    fn avg_speed(&self, athlete: &Athlete, race_distance_m: f64) -> Result<f64> {
        let cross = athlete.require("cross_time")?;
        Ok(race_distance_m / parse_clock(cross)?)
    }
}

/// Aggregate distance/time over previously prepared races, falling back to
/// the single-race figure for athletes without any history.
pub struct HistoryPacing {
    history: RaceHistory,
}

impl HistoryPacing {
    pub fn new(history: RaceHistory) -> Self {
        Self { history }
    }
}

impl PacingModel for HistoryPacing {
    fn avg_speed(&self, athlete: &Athlete, race_distance_m: f64) -> Result<f64> {
        match self.history.average_speed(athlete.name()) {
            Some(speed) => Ok(speed),
            None => BasePacing.avg_speed(athlete, race_distance_m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{RaceRecord, RaceTable};
    use std::collections::HashMap;

    fn athlete(name: &str, cross_time: &str) -> Athlete {
        let mut fields = HashMap::new();
        fields.insert("name".to_string(), name.to_string());
        fields.insert("jump_rank".to_string(), "1".to_string());
        fields.insert("rank".to_string(), "1".to_string());
        fields.insert("cross_time".to_string(), cross_time.to_string());
        Athlete::from_record(RaceRecord::new(fields), false, 0.0).unwrap()
    }

    #[test]
    fn test_base_pacing_uses_sheet_time() {
        // 10 km in 25:00 → 6.667 m/s.
        let speed = BasePacing.avg_speed(&athlete("A", "25:00"), 10_000.0).unwrap();
        assert!((speed - 10_000.0 / 1_500.0).abs() < 1e-9);
    }

    #[test]
    fn test_history_pacing_falls_back_without_history() {
        let mut history = RaceHistory::new();
        history
            .prepare_race(&RaceTable::new(
                "01 Ruka_10.0.csv",
                vec!["name".into(), "cross_time".into()],
                vec![vec!["A".into(), "30:00".into()]],
            ))
            .unwrap();
        let pacing = HistoryPacing::new(history);

        // A has history: 10000 m / 1800 s, ignoring today's sheet time.
        let a = pacing.avg_speed(&athlete("A", "25:00"), 10_000.0).unwrap();
        assert!((a - 10_000.0 / 1_800.0).abs() < 1e-9);

        // B has none: today's sheet figure.
        let b = pacing.avg_speed(&athlete("B", "25:00"), 10_000.0).unwrap();
        assert!((b - 10_000.0 / 1_500.0).abs() < 1e-9);
    }
}
