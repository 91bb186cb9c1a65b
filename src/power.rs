/*
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

//! Deterministic power iteration for Personalized PageRank.
//!
//! # The formula
//!
//! Each iteration computes
//!
//! > r ← (1 − α) · (rᵀM) + ((1 − α) · m_d(r) + α) · p
//!
//! where `M` is the row-stochastic transition obtained from `A` by scaling
//! each non-dangling row by its inverse out-degree, and `m_d(r)` is the
//! total mass currently sitting on dangling nodes. At each step the random
//! surfer teleports via `p` with probability α; otherwise it follows an
//! outgoing edge if one exists, or also teleports if the current node is
//! dangling. Collecting both teleportation sources gives the `p` factor
//! above.
//!
//! Termination: up to `max_iter` iterations, stopping early once the L1
//! error `∑|r − r_old|` drops below `tol`. Non-convergence is not an error:
//! the last iterate is returned together with its iteration count and
//! measured error.

use kahan::KahanSum;

use crate::error::{FraudPprError, Result};
use crate::graph::Csr;
use crate::personalization::normalize_or_uniform;
use crate::result::{CancelToken, Outcome, RunResult, is_cancelled};

/// Computes Personalized PageRank via power iteration.
///
/// `p` is normalized internally; an all-zero `p` falls back to uniform
/// rather than failing. `r0`, if provided, is the warm-start vector,
/// renormalized to sum to 1; absent, the run starts from `p`.
///
/// Fails with [`FraudPprError::InvalidAlpha`] if `alpha` is not strictly
/// between 0 and 1, or if `p`/`r0` has a length different from `A`'s.
pub fn pr_power(
    a: &Csr,
    alpha: f64,
    p: &[f64],
    tol: f64,
    max_iter: usize,
    r0: Option<&[f64]>,
    cancel: CancelToken<'_>,
) -> Result<RunResult> {
    pr_power_with_logging(a, alpha, p, tol, max_iter, r0, cancel, true)
}

pub(crate) fn pr_power_with_logging(
    a: &Csr,
    alpha: f64,
    p: &[f64],
    tol: f64,
    max_iter: usize,
    r0: Option<&[f64]>,
    cancel: CancelToken<'_>,
    log_progress: bool,
) -> Result<RunResult> {
    let n = a.n();
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(FraudPprError::InvalidAlpha(alpha));
    }
    if p.len() != n {
        return Err(FraudPprError::ShapeMismatch(format!(
            "personalization vector has length {} but graph has {n} nodes",
            p.len()
        )));
    }

    let mut p = p.to_vec();
    normalize_or_uniform(&mut p);

    let mut r = match r0 {
        Some(v) => {
            if v.len() != n {
                return Err(FraudPprError::ShapeMismatch(format!(
                    "warm-start vector has length {} but graph has {n} nodes",
                    v.len()
                )));
            }
            let mut v = v.to_vec();
            normalize_or_uniform(&mut v);
            v
        }
        None => p.clone(),
    };

    if log_progress {
        log::info!(
            "power iteration: n={n}, alpha={alpha}, tol={tol}, max_iter={max_iter}, warm_start={}",
            r0.is_some()
        );
    }

    let mut walk = vec![0.0; n];
    let mut iters = 0usize;
    let mut err = f64::INFINITY;
    let mut outcome = Outcome::Converged;

    for it in 1..=max_iter {
        if is_cancelled(cancel) {
            outcome = Outcome::Cancelled;
            break;
        }

        a.mul_vec_transpose(&r, &mut walk);

        let mut dangling_mass = KahanSum::new();
        for i in 0..n {
            if a.is_dangling(i) {
                dangling_mass += r[i];
            }
        }
        let dangling_mass = dangling_mass.sum();
        let teleport_mass = (1.0 - alpha) * dangling_mass + alpha;

        let mut err_acc = KahanSum::new();
        for i in 0..n {
            let new_r = (1.0 - alpha) * walk[i] + teleport_mass * p[i];
            err_acc += (new_r - r[i]).abs();
            r[i] = new_r;
        }
        err = err_acc.sum();
        iters = it;

        if log_progress {
            log::trace!("iteration {it}: l1 err = {err}");
        }

        if err < tol {
            break;
        }
    }

    normalize_or_uniform(&mut r);

    if log_progress {
        log::info!("power iteration finished after {iters} iterations, err = {err}");
    }

    if !r.iter().all(|x| x.is_finite()) || !r.iter().sum::<f64>().is_finite() {
        return Err(FraudPprError::InvalidAlpha(alpha));
    }

    Ok(RunResult {
        scores: r,
        iters,
        err,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::personalization::make_p;

    fn toy_graph() -> Csr {
        // S1/S2: 0->1, 0->2, 1->3, 2->4
        Csr::build(&[(0, 1, 1.0), (0, 2, 1.0), (1, 3, 1.0), (2, 4, 1.0)], 5).unwrap()
    }

    #[test]
    fn s1_uniform_seed_zero_ranks_highest() {
        let a = toy_graph();
        let p = make_p(5, &[0]).unwrap();
        let result = pr_power(&a, 0.85, &p, 1e-9, 100, None, None).unwrap();
        let r = &result.scores;

        assert!(r[0] > r[1]);
        assert!(r[0] > r[2]);
        assert!((r[1] - r[2]).abs() < 1e-12, "r1 and r2 should tie: {r:?}");
        assert!(r[1] > r[3]);
        assert!(r[2] > r[4]);
    }

    #[test]
    fn s2_dangling_seed_is_absorbing() {
        // Seeding a node that is itself dangling (node 3, a leaf with no
        // outgoing edges) is a degenerate case of dangling redistribution:
        // since the entire teleport mass lands back on the seed and the
        // seed never forwards any mass along an edge, the chain never
        // leaves node 3. Node 4 is *also* a leaf (dangling) in this toy
        // graph, so it receives nothing either — every other node is tied
        // at 0. This is the correct fixed point of spec.md's power-iteration
        // formula, not merely a qualitative approximation.
        let a = toy_graph();
        let p = make_p(5, &[3]).unwrap();
        let result = pr_power(&a, 0.85, &p, 1e-9, 100, None, None).unwrap();
        let r = &result.scores;

        assert!(r[3] > r[4]);
        assert!((r[0] - r[1]).abs() < 1e-9);
        assert!((r[1] - r[2]).abs() < 1e-9);
        assert!((r[2] - r[4]).abs() < 1e-9);
    }

    #[test]
    fn scores_sum_to_one() {
        let a = toy_graph();
        let p = make_p(5, &[0]).unwrap();
        let result = pr_power(&a, 0.85, &p, 1e-9, 200, None, None).unwrap();
        let sum: f64 = result.scores.iter().sum();
        assert!((sum - 1.0).abs() <= 1e-9);
    }

    #[test]
    fn strongly_connected_graph_converges_quickly() {
        // 0->1->2->0, plus a chord 0->2, strongly connected.
        let a = Csr::build(&[(0, 1, 1.0), (1, 2, 1.0), (2, 0, 1.0), (0, 2, 1.0)], 3).unwrap();
        let p = make_p(3, &[]).unwrap();
        let result = pr_power(&a, 0.85, &p, 1e-8, 200, None, None).unwrap();
        assert!(result.iters < 200, "expected convergence: {result:?}");
        assert!(result.err < 1e-8);
    }

    #[test]
    fn warm_start_from_fixed_point_converges_in_few_iterations() {
        let a = toy_graph();
        let p = make_p(5, &[0]).unwrap();
        let cold = pr_power(&a, 0.85, &p, 1e-10, 500, None, None).unwrap();
        let warm = pr_power(&a, 0.85, &p, 1e-8, 500, Some(&cold.scores), None).unwrap();
        assert!(warm.iters <= 2, "warm start took {} iterations", warm.iters);
        assert!(warm.err < 1e-8);
    }

    #[test]
    fn invalid_alpha_is_rejected() {
        let a = toy_graph();
        let p = make_p(5, &[0]).unwrap();
        assert_eq!(
            pr_power(&a, 0.0, &p, 1e-6, 10, None, None).unwrap_err(),
            FraudPprError::InvalidAlpha(0.0)
        );
        assert_eq!(
            pr_power(&a, 1.0, &p, 1e-6, 10, None, None).unwrap_err(),
            FraudPprError::InvalidAlpha(1.0)
        );
    }

    #[test]
    fn mismatched_personalization_length_is_shape_mismatch() {
        let a = toy_graph();
        let err = pr_power(&a, 0.85, &[1.0], 1e-6, 10, None, None).unwrap_err();
        assert!(matches!(err, FraudPprError::ShapeMismatch(_)));
    }

    #[test]
    fn cancellation_returns_partial_iterate() {
        use std::sync::atomic::AtomicBool;
        let a = toy_graph();
        let p = make_p(5, &[0]).unwrap();
        let flag = AtomicBool::new(true);
        let result = pr_power(&a, 0.85, &p, 1e-12, 1000, None, Some(&flag)).unwrap();
        assert_eq!(result.outcome, Outcome::Cancelled);
        assert_eq!(result.iters, 0);
    }
}
