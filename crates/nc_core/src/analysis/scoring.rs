//! # Ranking correctness
//!
//! Post-race comparison of the simulated finishing order against the
//! historical one.
//!
//! Two metrics:
//! - **exact**: share of athletes whose simulated rank equals the
//!   historical rank. Very strict; randomized speed noise makes perfect
//!   placement rare even for good models.
//! - **adapted**: pairwise order agreement. Rewards getting the relative
//!   order of athlete pairs right even when absolute placement is off;
//!   this is the primary metric for validating model changes.
//!
//! The simulation-level entry points require a finished race with a
//! complete done set. Violations are internal-consistency failures (a lost
//! or duplicated athlete) and abort rather than return an error. The
//! slice-level functions also serve offline aggregation, where rankings
//! come from an accumulated run log instead of a live simulation.

use crate::engine::Simulation;

/// Percentage of `(rank, expected_rank)` pairs that match. Entries with a
/// gap in either ranking (non-positive rank) are skipped from the hit
/// count but still weigh in the denominator.
pub fn exact_rate_of(pairs: &[(i32, i32)]) -> f64 {
    if pairs.is_empty() {
        return 0.0;
    }
    let hits = pairs.iter().filter(|(rank, expected)| rank > &0 && rank == expected).count();
    100.0 * hits as f64 / pairs.len() as f64
}

/// Pairwise order-agreement percentage between two rankings given as
/// `(rank, expected_rank)` pairs.
///
/// For each athlete, count how many others placed after it in the expected
/// ordering that also placed after it in the simulated one, and
/// symmetrically for before; the sum over all athletes is divided by the
/// maximum possible count `n * (n - 1)`. Entries with a gap in either
/// ranking are skipped.
pub fn adapted_rate_of(pairs: &[(i32, i32)]) -> f64 {
    let n = pairs.len();
    if n < 2 {
        return 100.0;
    }

    let mut agree = 0usize;
    for (i, &(rank_a, exp_a)) in pairs.iter().enumerate() {
        if rank_a <= 0 || exp_a <= 0 {
            continue;
        }
        for (j, &(rank_b, exp_b)) in pairs.iter().enumerate() {
            if i == j || rank_b <= 0 || exp_b <= 0 {
                continue;
            }
            let agrees_after = rank_b > rank_a && exp_b > exp_a;
            let agrees_before = rank_b < rank_a && exp_b < exp_a;
            if agrees_after || agrees_before {
                agree += 1;
            }
        }
    }
    100.0 * agree as f64 / (n * (n - 1)) as f64
}

fn check_complete(sim: &Simulation) {
    assert!(sim.ended(), "scoring requires an ended simulation");
    assert_eq!(
        sim.done().len(),
        sim.num_athlete(),
        "finished set does not match the field size"
    );
}

fn rank_pairs(sim: &Simulation) -> Vec<(i32, i32)> {
    sim.done().iter().map(|a| (a.rank(), a.expected_rank())).collect()
}

/// Percentage of finished athletes whose live rank equals the expected one.
pub fn exact_rate(sim: &Simulation) -> f64 {
    check_complete(sim);
    exact_rate_of(&rank_pairs(sim))
}

/// Pairwise order-agreement percentage between the simulated and expected
/// rankings of a finished race.
pub fn adapted_rate(sim: &Simulation) -> f64 {
    check_complete(sim);
    adapted_rate_of(&rank_pairs(sim))
}
