//! Race Simulation CLI
//!
//! Loads result-sheet CSVs, runs single or sampled simulations, and folds
//! run logs back into aggregate rankings.

mod report;

use std::ffi::OsStr;
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;

use nc_core::{
    adapted_rate, exact_rate, FinishRecord, NullSink, ProgressSink, RaceHistory, RaceTable,
    SimConfig, Simulation,
};

#[derive(Parser)]
#[command(name = "nc_cli")]
#[command(about = "Simulate Nordic Combined cross-country races", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate one race from a results CSV
    Simulate {
        /// Input race CSV; the file name must carry the distance as its
        /// last underscore token, e.g. "01 Ruka 30112024 S24_25_10.0.csv"
        race: PathBuf,

        /// Prior-race CSVs folded into the season history for pacing
        #[arg(long)]
        history: Vec<PathBuf>,

        /// Plain variant: no drafting, no boosts, no noise
        #[arg(long)]
        simple: bool,

        /// Fixed step in seconds
        #[arg(long, default_value_t = 0.05)]
        dt: f64,

        /// RNG seed; omitted means a fresh random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Independent runs to sample (run i uses seed + i)
        #[arg(long, default_value_t = 1)]
        runs: usize,

        /// Append per-athlete results to this run log
        #[arg(long)]
        log: Option<PathBuf>,

        /// Write energy/speed traces to this JSON file (single run only)
        #[arg(long)]
        traces: Option<PathBuf>,
    },

    /// Fold a run log into an aggregate ranking and score it
    Summarize {
        /// Run log produced by `simulate --log`
        log: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match Cli::parse().command {
        Commands::Simulate { race, history, simple, dt, seed, runs, log, traces } => {
            simulate(&race, &history, simple, dt, seed, runs, log.as_deref(), traces.as_deref())
        }
        Commands::Summarize { log } => summarize(&log),
    }
}

#[allow(clippy::too_many_arguments)]
fn simulate(
    race: &Path,
    history_paths: &[PathBuf],
    simple: bool,
    dt: f64,
    seed: Option<u64>,
    runs: usize,
    log: Option<&Path>,
    traces: Option<&Path>,
) -> Result<()> {
    let table = load_race(race)?;

    let mut history = RaceHistory::new();
    for path in history_paths {
        history.prepare_race(&load_race(path)?)?;
    }
    let history = if history.is_empty() { None } else { Some(history) };

    let base_seed = seed.unwrap_or_else(rand::random);
    let build = |seed: u64, sink: Box<dyn ProgressSink>| -> Result<Simulation> {
        let config = SimConfig { dt, seed, ..Default::default() };
        let sim = if simple {
            Simulation::simple(&table, config, sink)?
        } else {
            Simulation::slipstream(&table, config, history.clone(), sink)?
        };
        Ok(sim)
    };

    if runs <= 1 {
        let mut sim = build(base_seed, Box::new(report::ConsoleSink))?;
        sim.run()?;
        let results = sim.results();
        println!(
            "seed {}  exact {:.2}%  adapted {:.2}%",
            base_seed,
            exact_rate(&sim),
            adapted_rate(&sim)
        );
        if let Some(path) = log {
            report::append_run_log(path, &results)?;
        }
        if let Some(path) = traces {
            dump_traces(path, &sim)?;
        }
        return Ok(());
    }

    if traces.is_some() {
        tracing::warn!("--traces applies to single runs only; ignoring");
    }

    // Independent whole simulations in parallel: each run owns a private
    // simulation, results are aggregated only after every run completes.
    let outcomes: Vec<(Vec<FinishRecord>, f64, f64)> = (0..runs)
        .into_par_iter()
        .map(|i| -> Result<(Vec<FinishRecord>, f64, f64)> {
            let mut sim = build(base_seed.wrapping_add(i as u64), Box::new(NullSink))?;
            sim.run()?;
            let exact = exact_rate(&sim);
            let adapted = adapted_rate(&sim);
            Ok((sim.results(), exact, adapted))
        })
        .collect::<Result<_>>()?;

    let n = outcomes.len() as f64;
    let exact_mean = outcomes.iter().map(|(_, e, _)| e).sum::<f64>() / n;
    let adapted_mean = outcomes.iter().map(|(_, _, a)| a).sum::<f64>() / n;
    println!(
        "{} runs from seed {}  exact {:.2}%  adapted {:.2}%",
        runs, base_seed, exact_mean, adapted_mean
    );

    if let Some(path) = log {
        for (results, _, _) in &outcomes {
            report::append_run_log(path, results)?;
        }
        println!("run log appended to {}", path.display());
    }
    Ok(())
}

fn summarize(log: &Path) -> Result<()> {
    let text = std::fs::read_to_string(log)
        .with_context(|| format!("cannot read run log {}", log.display()))?;
    let summary = report::summarize_run_log(&text)?;
    for row in &summary.rows {
        println!(
            "{:>3} expected / {:>3} simulated  {:30} ({} runs)",
            row.expected_rank, row.sim_rank, row.name, row.runs
        );
    }
    println!("exact {:.2}%  adapted {:.2}%", summary.exact, summary.adapted);
    Ok(())
}

/// Read a results CSV into a race table; the file name becomes the table
/// identifier (and carries the race distance).
fn load_race(path: &Path) -> Result<RaceTable> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("cannot open race sheet {}", path.display()))?;
    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    let identifier =
        path.file_name().and_then(OsStr::to_str).unwrap_or_default().to_string();
    Ok(RaceTable::new(identifier, columns, rows))
}

fn dump_traces(path: &Path, sim: &Simulation) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create trace file {}", path.display()))?;
    serde_json::to_writer_pretty(
        file,
        &serde_json::json!({
            "race": sim.identifier(),
            "energy": sim.energy_traces(),
            "speed": sim.speed_traces(),
        }),
    )?;
    Ok(())
}
