//! Historical distance/time totals per athlete.
//!
//! Feeding earlier races of the season into the history sharpens the
//! baseline speed guess for the race being simulated.

use std::collections::HashMap;

use crate::clock::parse_clock;
use crate::data::table::RaceTable;
use crate::error::Result;

/// Accumulated cross-country distance and time per athlete name.
#[derive(Debug, Clone, Default)]
pub struct RaceHistory {
    totals: HashMap<String, (f64, f64)>,
}

impl RaceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one prior race into the totals.
    ///
    /// Rows without a parsable `cross_time` are skipped with a warning; a
    /// thin history beats failing the race being prepared. The race's own
    /// distance token must still decode.
    pub fn prepare_race(&mut self, table: &RaceTable) -> Result<()> {
        let distance = table.distance_m()?;
        for record in table.records() {
            let Some(name) = record.get("name") else { continue };
            let Some(cross) = record.get("cross_time") else { continue };
            match parse_clock(cross) {
                Ok(secs) if secs > 0.0 => {
                    let entry = self.totals.entry(name.to_string()).or_insert((0.0, 0.0));
                    entry.0 += distance;
                    entry.1 += secs;
                }
                _ => {
                    tracing::warn!(
                        race = table.identifier(),
                        name,
                        cross_time = cross,
                        "skipping history row with unusable cross time"
                    );
                }
            }
        }
        Ok(())
    }

    /// Average speed over every prepared race, if the athlete appears in any.
    pub fn average_speed(&self, name: &str) -> Option<f64> {
        self.totals.get(name).map(|(d, t)| d / t)
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}
