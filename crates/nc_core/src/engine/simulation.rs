//! The race: waiting/skiing/done lifecycle, fixed-step tick loop, live
//! ranking, and frame capture.
//!
//! One tick is a sequential scan over the skiing pool. Updates are applied
//! one athlete at a time; an athlete later in the list may observe an
//! already-updated athlete ahead of it within the same tick, which the
//! reference order tolerates. Whole simulations may run concurrently, but
//! never the athletes of one tick.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::athlete::Athlete;
use super::config::SimConfig;
use super::interaction::{InteractionModel, NoInteraction, SlipstreamModel, TickCommand};
use super::pacing::{BasePacing, HistoryPacing, PacingModel};
use super::progress::{FinishRecord, FrameSnapshot, ProgressSink, SlotState};
use crate::clock::parse_clock;
use crate::data::{RaceHistory, RaceTable};
use crate::error::{RaceError, Result};

/// Margin (m) kept behind the trailing athlete when framing the display
/// window.
const WINDOW_TRAIL_M: f64 = 500.0;

/// One race simulation. Owns its athletes and its RNG; two simulations
/// share nothing.
pub struct Simulation {
    identifier: String,
    distance: f64,
    config: SimConfig,
    dt: f64,
    dt_ms: u64,
    t_ms: u64,
    frame: u64,
    num_athlete: usize,
    started: bool,
    ended: bool,

    /// Athletes not yet released, keyed by start offset in milliseconds.
    waiting: BTreeMap<u64, Vec<Athlete>>,
    /// Currently racing, in release order.
    skiing: Vec<Athlete>,
    /// Finished, in finishing order.
    done: Vec<Athlete>,

    rng: ChaCha8Rng,
    pacing: Box<dyn PacingModel>,
    interaction: Box<dyn InteractionModel>,
    sink: Box<dyn ProgressSink>,
}

impl Simulation {
    /// Build a race from a results table with explicit strategy choices.
    pub fn new(
        table: &RaceTable,
        config: SimConfig,
        pacing: Box<dyn PacingModel>,
        interaction: Box<dyn InteractionModel>,
        sink: Box<dyn ProgressSink>,
    ) -> Result<Self> {
        if table.is_empty() {
            return Err(RaceError::EmptyTable);
        }
        let distance = table.distance_m()?;

        let mut waiting: BTreeMap<u64, Vec<Athlete>> = BTreeMap::new();
        let mut num_athlete = 0;
        for record in table.records() {
            let athlete =
                Athlete::from_record(record, config.use_random, config.random_spread)?;
            let offset = parse_clock(athlete.require("jump_time_diff")?)?;
            waiting.entry((offset * 1000.0).round() as u64).or_default().push(athlete);
            num_athlete += 1;
        }

        tracing::info!(
            race = table.identifier(),
            athletes = num_athlete,
            distance_m = distance,
            "race loaded"
        );

        let dt_ms = config.dt_ms();
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Ok(Self {
            identifier: table.identifier().to_string(),
            distance,
            dt: dt_ms as f64 / 1000.0,
            dt_ms,
            config,
            t_ms: 0,
            frame: 0,
            num_athlete,
            started: false,
            ended: false,
            waiting,
            skiing: Vec::new(),
            done: Vec::new(),
            rng,
            pacing,
            interaction,
            sink,
        })
    }

    /// The plain variant: sheet-time pacing, no interaction, no noise.
    pub fn simple(
        table: &RaceTable,
        mut config: SimConfig,
        sink: Box<dyn ProgressSink>,
    ) -> Result<Self> {
        config.use_random = false;
        Self::new(table, config, Box::new(BasePacing), Box::new(NoInteraction), sink)
    }

    /// The slipstream variant: drafting, boosts, forced overtakes, and,
    /// when a history is supplied, season-aware pacing.
    pub fn slipstream(
        table: &RaceTable,
        config: SimConfig,
        history: Option<RaceHistory>,
        sink: Box<dyn ProgressSink>,
    ) -> Result<Self> {
        let pacing: Box<dyn PacingModel> = match history {
            Some(h) if !h.is_empty() => Box::new(HistoryPacing::new(h)),
            _ => Box::new(BasePacing),
        };
        Self::new(table, config, pacing, Box::new(SlipstreamModel::default()), sink)
    }

    /// Assign baseline speeds and release the athletes that start at the
    /// gun (zero jump time difference).
    pub fn start(&mut self) -> Result<()> {
        for batch in self.waiting.values_mut() {
            for athlete in batch {
                let speed = self.pacing.avg_speed(athlete, self.distance)?;
                athlete.set_avg_speed(speed);
            }
        }
        self.t_ms = 0;
        self.frame = 0;
        self.ended = false;
        if let Some(batch) = self.waiting.remove(&0) {
            self.skiing.extend(batch);
        }
        self.recompute_ranks();
        self.started = true;
        Ok(())
    }

    /// Advance the race by one fixed step.
    pub fn update(&mut self) {
        assert!(self.started, "start() must be called before update()");
        if self.ended {
            return;
        }

        // a. advance the clock and release due starters.
        self.t_ms += self.dt_ms;
        let t = self.t();
        self.sink.on_clock(t);
        self.release_waiting();

        // b–e. per-athlete interaction, physical update, finish promotion.
        // Index bookkeeping tolerates in-place removal of finishers.
        let mut i = 0;
        while i < self.skiing.len() {
            let command = self.interaction.resolve(i, &self.skiing, t, self.dt, &mut self.rng);
            match command {
                TickCommand::Fixed(speed) => {
                    self.skiing[i].update(t, self.dt, Some(speed), &mut self.rng);
                }
                TickCommand::Free { drafting } => {
                    if !self.skiing[i].boost().is_active(t) {
                        if drafting {
                            if self.rng.gen::<f64>() < self.config.activation_probability {
                                self.skiing[i].boost_mut().change(t);
                            }
                        } else {
                            self.skiing[i].boost_mut().reset();
                        }
                    }
                    self.skiing[i].update(t, self.dt, None, &mut self.rng);
                }
            }

            if self.skiing[i].distance() >= self.distance {
                let mut athlete = self.skiing.remove(i);
                athlete.set_rank(self.done.len() as i32 + 1);
                let record = finish_record(&athlete);
                tracing::debug!(
                    name = %record.name,
                    rank = record.rank,
                    expected = record.expected_rank,
                    time = record.time,
                    "athlete finished"
                );
                self.sink.on_finish(&record);
                self.done.push(athlete);
            } else {
                i += 1;
            }
        }

        // f. live ranks for the field still out on the course.
        self.recompute_ranks();

        // g. frame capture on whole seconds.
        if self.t_ms % 1000 == 0 {
            self.frame += 1;
            let snapshot = self.snapshot();
            self.sink.on_frame(&snapshot);
        }

        // h. termination.
        if self.skiing.is_empty() && self.waiting.is_empty() {
            self.ended = true;
            tracing::info!(race = %self.identifier, frames = self.frame, "race ended");
            self.sink.on_end();
        }
    }

    /// Tick until the race ends, starting it first if needed.
    pub fn run(&mut self) -> Result<()> {
        if !self.started {
            self.start()?;
        }
        while !self.ended {
            self.update();
        }
        Ok(())
    }

    fn release_waiting(&mut self) {
        // Drain every bucket due by now rather than only an exact match, so
        // a step that does not divide a start offset cannot strand one.
        while let Some((&key, _)) = self.waiting.first_key_value() {
            if key > self.t_ms {
                break;
            }
            let batch = self.waiting.remove(&key).unwrap_or_default();
            for athlete in batch {
                tracing::trace!(name = athlete.name(), t = self.t(), "starter released");
                self.skiing.push(athlete);
            }
        }
    }

    /// Stable sort on descending distance; equal distances keep release
    /// order. Live ranks continue after the finished athletes.
    fn recompute_ranks(&mut self) {
        let base = self.done.len() as i32;
        let mut order: Vec<usize> = (0..self.skiing.len()).collect();
        order.sort_by(|&x, &y| {
            self.skiing[y]
                .distance()
                .partial_cmp(&self.skiing[x].distance())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for (pos, &idx) in order.iter().enumerate() {
            self.skiing[idx].set_rank(base + pos as i32 + 1);
        }
    }

    fn snapshot(&self) -> FrameSnapshot {
        let mut trailing = f64::INFINITY;
        for athlete in self.athletes() {
            trailing = trailing.min(athlete.distance());
        }
        let window_min = if trailing.is_finite() && trailing > WINDOW_TRAIL_M {
            trailing - WINDOW_TRAIL_M
        } else {
            0.0
        };

        let mut snapshot = FrameSnapshot { frame: self.frame, ..Default::default() };
        for athlete in self.skiing.iter().chain(&self.done) {
            snapshot.slots.insert(
                athlete.starting_place(),
                SlotState {
                    rank: athlete.rank(),
                    window_min_m: window_min,
                    distance_m: athlete.distance(),
                },
            );
        }
        snapshot
    }

    /// Every athlete across the three pools.
    pub fn athletes(&self) -> impl Iterator<Item = &Athlete> {
        self.waiting.values().flatten().chain(&self.skiing).chain(&self.done)
    }

    /// Athletes not yet released.
    pub fn waiting_count(&self) -> usize {
        self.waiting.values().map(Vec::len).sum()
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Race distance in meters.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Race clock in seconds, always a whole number of milliseconds.
    pub fn t(&self) -> f64 {
        self.t_ms as f64 / 1000.0
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn ended(&self) -> bool {
        self.ended
    }

    pub fn num_athlete(&self) -> usize {
        self.num_athlete
    }

    pub fn skiing(&self) -> &[Athlete] {
        &self.skiing
    }

    /// Finished athletes in finishing order.
    pub fn done(&self) -> &[Athlete] {
        &self.done
    }

    /// Final records of the finished athletes, in finishing order.
    pub fn results(&self) -> Vec<FinishRecord> {
        self.done.iter().map(finish_record).collect()
    }

    /// Diagnostic energy traces keyed by athlete name.
    pub fn energy_traces(&self) -> BTreeMap<String, Vec<f64>> {
        self.athletes().map(|a| (a.name().to_string(), a.energy_history().to_vec())).collect()
    }

    /// Diagnostic per-second speed traces keyed by athlete name.
    pub fn speed_traces(&self) -> BTreeMap<String, Vec<f64>> {
        self.athletes().map(|a| (a.name().to_string(), a.speed_history().to_vec())).collect()
    }
}

fn finish_record(athlete: &Athlete) -> FinishRecord {
    FinishRecord {
        name: athlete.name().to_string(),
        starting_place: athlete.starting_place(),
        expected_rank: athlete.expected_rank(),
        rank: athlete.rank(),
        time: athlete.time(),
    }
}
