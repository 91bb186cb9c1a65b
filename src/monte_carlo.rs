/*
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

//! Random-walk approximation of Personalized PageRank.
//!
//! Each of `num_walks` independent walks starts at a node sampled from `p`
//! and takes up to `max_steps` steps: at each step the current node's visit
//! counter is incremented, then with probability α the walk terminates
//! (teleport) and otherwise it follows an outgoing edge sampled in
//! proportion to edge weight — or terminates anyway if the current node is
//! dangling.
//!
//! α is, at this boundary, the *teleport* probability, matching the power
//! solver's convention (spec.md §4.5, §9): the per-step continuation
//! probability used internally is `1 - α`.
//!
//! Walks are independent and are partitioned across a fixed number of
//! chunks executed in parallel with rayon; each chunk gets its own
//! [`SmallRng`] seeded from a base seed XORed with the chunk index, so the
//! result is reproducible for a given `(num_walks, num_chunks, seed)` no
//! matter how many worker threads actually execute them.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::error::{FraudPprError, Result};
use crate::graph::Csr;
use crate::personalization::normalize_or_uniform;
use crate::result::{CancelToken, Outcome, RunResult, is_cancelled};

/// Precomputed per-row outgoing distribution: destination indices paired
/// with cumulative, normalized weight (so sampling is a single scan/binary
/// search against a uniform draw in `[0, 1)`).
struct RowDistribution {
    neighbors: Vec<u32>,
    cumulative: Vec<f64>,
}

impl RowDistribution {
    fn sample(&self, u: f64) -> u32 {
        let pos = self
            .cumulative
            .partition_point(|&c| c < u)
            .min(self.neighbors.len() - 1);
        self.neighbors[pos]
    }
}

fn build_row_distributions(a: &Csr) -> Vec<Option<RowDistribution>> {
    (0..a.n())
        .map(|i| {
            if a.is_dangling(i) {
                return None;
            }
            let total = a.out_degree()[i];
            let mut acc = 0.0;
            let mut neighbors = Vec::new();
            let mut cumulative = Vec::new();
            for (j, w) in a.row(i) {
                acc += w / total;
                neighbors.push(j);
                cumulative.push(acc);
            }
            Some(RowDistribution {
                neighbors,
                cumulative,
            })
        })
        .collect()
}

fn build_start_distribution(p: &[f64]) -> RowDistribution {
    let total: f64 = p.iter().sum();
    let mut acc = 0.0;
    let mut neighbors = Vec::with_capacity(p.len());
    let mut cumulative = Vec::with_capacity(p.len());
    for (i, &w) in p.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        acc += w / total;
        neighbors.push(i as u32);
        cumulative.push(acc);
    }
    RowDistribution {
        neighbors,
        cumulative,
    }
}

const DEFAULT_NUM_CHUNKS: usize = 32;

/// Computes a ranking-equivalent Personalized PageRank approximation via
/// Monte Carlo random walks.
///
/// `seed` fixes the deterministic per-chunk RNG partition described above.
/// `r[i] = visits[i] / (num_walks * max_steps)`; the result is not
/// normalized to sum to 1 (spec.md §4.5) and should be treated as a score
/// for ordering only.
#[allow(clippy::too_many_arguments)]
pub fn pr_mc(
    a: &Csr,
    alpha: f64,
    p: &[f64],
    num_walks: usize,
    max_steps: usize,
    seed: u64,
    cancel: CancelToken<'_>,
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
    if n == 0 || num_walks == 0 || max_steps == 0 {
        return Ok(RunResult {
            scores: vec![0.0; n],
            iters: 0,
            err: 0.0,
            outcome: Outcome::Converged,
        });
    }

    log::info!(
        "monte carlo pagerank: n={n}, alpha={alpha}, num_walks={num_walks}, max_steps={max_steps}"
    );

    let row_dists = build_row_distributions(a);
    let mut p = p.to_vec();
    normalize_or_uniform(&mut p);
    let start_dist = build_start_distribution(&p);
    let continue_prob = 1.0 - alpha;

    let num_chunks = DEFAULT_NUM_CHUNKS.min(num_walks.max(1));
    let base = num_walks / num_chunks;
    let remainder = num_walks % num_chunks;

    let mut cancelled = false;
    let visits: Vec<f64> = (0..num_chunks)
        .into_par_iter()
        .map(|chunk| {
            let walks_in_chunk = base + usize::from(chunk < remainder);
            let mut local = vec![0.0f64; n];
            if is_cancelled(cancel) || walks_in_chunk == 0 {
                return local;
            }

            let mut rng = SmallRng::seed_from_u64(seed ^ (chunk as u64));
            for _ in 0..walks_in_chunk {
                if is_cancelled(cancel) {
                    break;
                }
                let mut current = start_dist.sample(rng.random::<f64>());
                for _ in 0..max_steps {
                    local[current as usize] += 1.0;
                    if rng.random::<f64>() < continue_prob {
                        match &row_dists[current as usize] {
                            Some(dist) => current = dist.sample(rng.random::<f64>()),
                            None => break,
                        }
                    } else {
                        break;
                    }
                }
            }
            local
        })
        .collect::<Vec<_>>()
        .into_iter()
        .fold(vec![0.0; n], |mut acc, local| {
            for (a, l) in acc.iter_mut().zip(local.iter()) {
                *a += l;
            }
            acc
        });

    if is_cancelled(cancel) {
        cancelled = true;
    }

    let denom = (num_walks * max_steps) as f64;
    let scores: Vec<f64> = visits.into_iter().map(|v| v / denom).collect();

    Ok(RunResult {
        scores,
        iters: num_walks,
        err: 0.0,
        outcome: if cancelled {
            Outcome::Cancelled
        } else {
            Outcome::Converged
        },
    })
}
