//! Run reporting: console progress, the append log consumed by offline
//! aggregation, and the fold that turns many logged runs back into one
//! ranking.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use nc_core::{adapted_rate_of, exact_rate_of, format_clock, FinishRecord, ProgressSink};

/// Prints finish-line crossings and the final standings to stdout.
#[derive(Default)]
pub struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn on_finish(&mut self, record: &FinishRecord) {
        println!(
            "{:>3}. {:30} {}  (expected {:>3})",
            record.rank,
            record.name,
            format_clock(record.time),
            record.expected_rank,
        );
    }
}

/// Append one run's finish records to a plain-text log, one athlete per
/// line: `name, rank, expected_rank, time`.
pub fn append_run_log(path: &Path, records: &[FinishRecord]) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open run log {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for r in records {
        writeln!(out, "{}, {}, {}, {:.3}", r.name, r.rank, r.expected_rank, r.time)?;
    }
    Ok(())
}

#[derive(Debug, Default, Clone, Copy)]
struct RankTotals {
    sim: i64,
    expected: i64,
    runs: u32,
}

/// Fold an append log back into one ranking per source and score their
/// agreement.
///
/// Each athlete's ranks are averaged over its logged runs; the athletes
/// are then re-ranked by average on both the simulated and the expected
/// side, and the two orderings are compared with the same metrics a single
/// race uses.
pub fn summarize_run_log(text: &str) -> Result<Summary> {
    let mut totals: HashMap<String, RankTotals> = HashMap::new();
    for (lineno, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        // Split from the right: the athlete name may itself contain ", ".
        let mut parts = line.rsplitn(4, ", ");
        let (Some(_time), Some(expected), Some(rank), Some(name)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            bail!("malformed run log line {}: '{line}'", lineno + 1);
        };
        let entry = totals.entry(name.to_string()).or_default();
        entry.sim += rank
            .trim()
            .parse::<i64>()
            .with_context(|| format!("bad rank on line {}", lineno + 1))?;
        entry.expected += expected
            .trim()
            .parse::<i64>()
            .with_context(|| format!("bad expected rank on line {}", lineno + 1))?;
        entry.runs += 1;
    }
    if totals.is_empty() {
        bail!("run log holds no completed runs");
    }

    let names: Vec<&String> = totals.keys().collect();
    let sim_order = ranked(&names, |n| {
        let t = totals[n];
        t.sim as f64 / t.runs as f64
    });
    let expected_order = ranked(&names, |n| {
        let t = totals[n];
        t.expected as f64 / t.runs as f64
    });

    let mut rows: Vec<SummaryRow> = names
        .iter()
        .map(|&name| SummaryRow {
            name: name.clone(),
            runs: totals[name].runs,
            sim_rank: sim_order[name],
            expected_rank: expected_order[name],
        })
        .collect();
    rows.sort_by_key(|r| r.expected_rank);

    let pairs: Vec<(i32, i32)> = rows.iter().map(|r| (r.sim_rank, r.expected_rank)).collect();
    Ok(Summary {
        exact: exact_rate_of(&pairs),
        adapted: adapted_rate_of(&pairs),
        rows,
    })
}

/// Rank names 1.. by ascending key, ties broken by name for stability.
fn ranked<'a>(names: &[&'a String], key: impl Fn(&str) -> f64) -> HashMap<&'a String, i32> {
    let mut order: Vec<&'a String> = names.to_vec();
    order.sort_by(|a, b| {
        key(a).partial_cmp(&key(b)).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.cmp(b))
    });
    order.into_iter().enumerate().map(|(i, name)| (name, i as i32 + 1)).collect()
}

#[derive(Debug, Clone)]
pub struct SummaryRow {
    pub name: String,
    pub runs: u32,
    pub sim_rank: i32,
    pub expected_rank: i32,
}

#[derive(Debug, Clone)]
pub struct Summary {
    pub exact: f64,
    pub adapted: f64,
    pub rows: Vec<SummaryRow>,
}
