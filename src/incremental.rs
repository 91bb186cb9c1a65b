/*
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

//! Warm-start incremental update: absorbs a batch of new edges into an
//! existing adjacency matrix and re-solves for scores without a full
//! cold-start power iteration.

use crate::error::{FraudPprError, Result};
use crate::graph::Csr;
use crate::id_map::NodeIndex;
use crate::power::pr_power_with_logging;
use crate::result::{CancelToken, RunResult};

/// Reduced iteration budget used for warm-started updates (spec.md §4.6):
/// the previous score vector is already close to the new fixed point, so a
/// cold-start iteration count is unnecessary.
pub const INCREMENTAL_MAX_ITER: usize = 50;

/// Applies `new_edges` to `a`, resizing and zero-padding `r_prev`/`p` if any
/// edge introduces a node index beyond the current size, then re-solves via
/// warm-started power iteration.
///
/// Edges are applied by overwrite (`A[s,d] <- w`), not accumulation — this
/// is an intentional asymmetry with [`crate::graph::Csr::build`]'s
/// duplicate-summing behaviour, documented in spec.md §9.
///
/// Fails with [`FraudPprError::InvalidEdge`] on a negative weight.
pub fn update(
    a: &Csr,
    r_prev: &[f64],
    p: &[f64],
    alpha: f64,
    new_edges: &[(NodeIndex, NodeIndex, f64)],
    tol: f64,
    cancel: CancelToken<'_>,
) -> Result<(Csr, RunResult)> {
    for &(src, dst, w) in new_edges {
        if w < 0.0 {
            return Err(FraudPprError::InvalidEdge {
                src,
                dst,
                weight: w,
            });
        }
    }

    let mut a_new = a.clone();
    let max_idx = new_edges
        .iter()
        .map(|&(s, d, _)| s.max(d) as usize)
        .max()
        .map(|m| m + 1)
        .unwrap_or(0);

    let new_n = max_idx.max(a.n());
    if new_n > a.n() {
        a_new.resize(new_n);
    }

    let mut r0 = r_prev.to_vec();
    r0.resize(new_n, 0.0);
    let mut p = p.to_vec();
    p.resize(new_n, 0.0);
    crate::personalization::normalize_or_uniform(&mut p);

    for &(src, dst, w) in new_edges {
        let w = if w <= 0.0 { 1.0 } else { w };
        a_new.apply_edge(src, dst, w);
    }

    log::info!(
        "incremental update: {} new edges, n {} -> {}",
        new_edges.len(),
        a.n(),
        a_new.n()
    );

    let result =
        pr_power_with_logging(&a_new, alpha, &p, tol, INCREMENTAL_MAX_ITER, Some(&r0), cancel, true)?;

    Ok((a_new, result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::personalization::make_p;
    use crate::power::pr_power;

    fn toy_graph() -> Csr {
        // S1/S3: 0->1, 0->2, 1->3, 2->4
        Csr::build(&[(0, 1, 1.0), (0, 2, 1.0), (1, 3, 1.0), (2, 4, 1.0)], 5).unwrap()
    }

    #[test]
    fn s3_incremental_matches_cold_start() {
        let a = toy_graph();
        let p = make_p(5, &[0]).unwrap();
        let cold0 = pr_power(&a, 0.85, &p, 1e-10, 200, None, None).unwrap();

        let new_edges = vec![(4, 1, 1.0)];
        let (a_new, updated) =
            update(&a, &cold0.scores, &p, 0.85, &new_edges, 1e-10, None).unwrap();

        assert!(updated.scores[1] > cold0.scores[1]);

        let cold_new = pr_power(&a_new, 0.85, &p, 1e-10, 500, None, None).unwrap();
        let diff: f64 = updated
            .scores
            .iter()
            .zip(cold_new.scores.iter())
            .map(|(a, b)| (a - b).abs())
            .sum();
        assert!(diff < 1e-6, "warm start diverged from cold start: {diff}");
    }

    #[test]
    fn new_node_grows_graph_and_pads_vectors() {
        let a = toy_graph();
        let p = make_p(5, &[0]).unwrap();
        let r_prev = vec![0.2; 5];
        let new_edges = vec![(2, 10, 3.0)];
        let (a_new, result) = update(&a, &r_prev, &p, 0.85, &new_edges, 1e-8, None).unwrap();

        assert_eq!(a_new.n(), 11);
        assert_eq!(result.scores.len(), 11);
    }

    #[test]
    fn negative_weight_is_rejected() {
        let a = toy_graph();
        let p = make_p(5, &[0]).unwrap();
        let r_prev = vec![0.2; 5];
        let err = update(&a, &r_prev, &p, 0.85, &[(0, 1, -1.0)], 1e-8, None).unwrap_err();
        assert_eq!(
            err,
            FraudPprError::InvalidEdge {
                src: 0,
                dst: 1,
                weight: -1.0
            }
        );
    }

    #[test]
    fn edges_overwrite_not_accumulate() {
        let a = toy_graph();
        let p = make_p(5, &[0]).unwrap();
        let r_prev = vec![0.2; 5];
        let (a_new, _) = update(&a, &r_prev, &p, 0.85, &[(0, 1, 9.0)], 1e-8, None).unwrap();
        assert_eq!(a_new.row(0).collect::<Vec<_>>(), vec![(1, 9.0), (2, 1.0)]);
    }
}
