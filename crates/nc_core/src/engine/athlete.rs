//! Athlete entity and its per-tick physical update.

use rand::Rng;

use super::boost::Boost;
use super::constants::{boost, energy};
use super::{round_energy, round_ms};
use crate::data::RaceRecord;
use crate::error::{RaceError, Result};

/// Performance factor over baseline speed for a given energy level.
///
/// Three segments: a high band with a flat 25% premium, a middle band that
/// scales gently, and a low band that falls off more steeply. Monotone
/// non-decreasing in energy, and only the high band exceeds 100%.
#[inline]
pub fn performance_factor(e: f64) -> f64 {
    if e >= energy::HIGH_BAND {
        energy::HIGH_FACTOR
    } else if e >= energy::MID_FLOOR {
        let span = energy::HIGH_BAND - energy::MID_FLOOR;
        energy::MID_BASE + energy::MID_SPAN * (e - energy::MID_FLOOR) / span
    } else {
        energy::LOW_BASE + energy::LOW_SPAN * e / energy::MID_FLOOR
    }
}

/// One race entrant.
///
/// Constructed once from a results-sheet record, mutated every tick while
/// skiing, frozen once it reaches the finished set.
#[derive(Debug, Clone)]
pub struct Athlete {
    name: String,
    record: RaceRecord,
    starting_place: u32,
    expected_rank: i32,

    avg_speed: f64,
    time: f64,
    distance: f64,
    energy: f64,
    rank: i32,
    locked: bool,
    boost: Boost,

    use_random: bool,
    random_spread: f64,

    // Diagnostic traces, sampled once per whole second of race time. Never
    // consulted by the model itself.
    energy_history: Vec<f64>,
    speed_history: Vec<f64>,
    /// Meters covered since the previous whole-second sample.
    speed_acc: f64,
}

impl Athlete {
    /// Build an athlete from its raw record.
    ///
    /// `starting_place` comes from the `jump_rank` column and
    /// `expected_rank` from `rank`, with the provisional-finish prefix
    /// (`"PF "`) stripped before the integer parse.
    pub fn from_record(record: RaceRecord, use_random: bool, random_spread: f64) -> Result<Self> {
        let name = record
            .get("name")
            .ok_or_else(|| RaceError::MissingColumn {
                column: "name".into(),
                who: "a table row".into(),
            })?
            .to_string();

        let jump_rank = record.get("jump_rank").ok_or_else(|| RaceError::MissingColumn {
            column: "jump_rank".into(),
            who: format!("athlete '{name}'"),
        })?;
        let starting_place: u32 =
            jump_rank.trim().parse().map_err(|_| RaceError::InvalidNumber {
                column: "jump_rank".into(),
                value: jump_rank.to_string(),
            })?;

        let raw_rank = record.get("rank").ok_or_else(|| RaceError::MissingColumn {
            column: "rank".into(),
            who: format!("athlete '{name}'"),
        })?;
        let expected_rank: i32 = raw_rank
            .trim()
            .strip_prefix("PF ")
            .unwrap_or(raw_rank.trim())
            .trim()
            .parse()
            .map_err(|_| RaceError::InvalidRank { name: name.clone(), value: raw_rank.into() })?;

        Ok(Self {
            name,
            record,
            starting_place,
            expected_rank,
            avg_speed: 0.0,
            time: 0.0,
            distance: 0.0,
            energy: energy::FULL,
            rank: -1,
            locked: false,
            boost: Boost::new(),
            use_random,
            random_spread,
            energy_history: Vec::new(),
            speed_history: Vec::new(),
            speed_acc: 0.0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Query a raw record column.
    pub fn field(&self, column: &str) -> Option<&str> {
        self.record.get(column)
    }

    /// Like [`field`](Self::field) but failing with the athlete's name.
    pub fn require(&self, column: &str) -> Result<&str> {
        self.field(column).ok_or_else(|| RaceError::MissingColumn {
            column: column.into(),
            who: format!("athlete '{}'", self.name),
        })
    }

    pub fn starting_place(&self) -> u32 {
        self.starting_place
    }

    pub fn expected_rank(&self) -> i32 {
        self.expected_rank
    }

    pub fn avg_speed(&self) -> f64 {
        self.avg_speed
    }

    pub fn set_avg_speed(&mut self, speed: f64) {
        self.avg_speed = speed;
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn rank(&self) -> i32 {
        self.rank
    }

    pub(crate) fn set_rank(&mut self, rank: i32) {
        self.rank = rank;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn boost(&self) -> &Boost {
        &self.boost
    }

    pub(crate) fn boost_mut(&mut self) -> &mut Boost {
        &mut self.boost
    }

    /// Whether the athlete can spend an armed boost right now.
    pub fn can_boost(&self) -> bool {
        !self.locked && self.energy > boost::MIN_ENERGY
    }

    pub fn energy_history(&self) -> &[f64] {
        &self.energy_history
    }

    pub fn speed_history(&self) -> &[f64] {
        &self.speed_history
    }

    /// Advance the athlete by one tick.
    ///
    /// `t` is the global race clock (boost timestamps live on it), `dt` the
    /// step width. A `forced_speed` bypasses the whole energy model: no
    /// curve, no jitter, no boost, no energy accounting. Used for the
    /// fixed-speed paths (simple variant, forced overtake).
    ///
    /// This is the sole mutator of `distance`, `time`, and `energy`, and it
    /// never fails for non-negative `dt`.
    pub fn update<R: Rng>(&mut self, t: f64, dt: f64, forced_speed: Option<f64>, rng: &mut R) {
        self.sample_history();

        let s = match forced_speed {
            Some(v) => v,
            None => {
                let mut s = self.avg_speed * performance_factor(self.energy);
                if self.use_random {
                    s *= rng.gen_range(1.0 - self.random_spread..=1.0 + self.random_spread);
                }

                if self.boost.is_charging() {
                    self.energy += energy::DRAFT_RECOVERY_RATE * dt;
                }
                if self.locked && self.energy > boost::LOCK_RELEASE_ENERGY {
                    self.locked = false;
                }
                if self.boost.is_active(t) {
                    if self.can_boost() {
                        s *= boost::SPEED_FACTOR;
                    } else {
                        // Not enough energy to spend the boost: keep it in
                        // reach instead of letting it expire, and lock until
                        // the reserve recovers.
                        self.boost.extend(t);
                        self.locked = true;
                    }
                }

                // Skiing over baseline burns the reserve, skiing under it
                // recovers; depletion runs faster than recovery. The
                // 6-decimal rounding keeps float drift from creeping across
                // band boundaries.
                let gap = s - self.avg_speed;
                let rate = if gap > 0.0 {
                    energy::RECOVERY_RATE * energy::DRAIN_FACTOR
                } else {
                    energy::RECOVERY_RATE
                };
                self.energy = round_energy((self.energy - gap * rate * dt).clamp(0.0, energy::FULL));

                s
            }
        };

        self.distance += s * dt;
        self.speed_acc += s * dt;
        self.time = round_ms(self.time + dt);
    }

    /// Append the current energy level and the meters covered over the last
    /// second whenever the race time sits on a whole-second boundary.
    fn sample_history(&mut self) {
        let ms = (self.time * 1000.0).round() as u64;
        if ms % 1000 == 0 {
            self.energy_history.push(self.energy);
            self.speed_history.push(self.speed_acc);
            self.speed_acc = 0.0;
        }
    }
}
