/*
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

//! Construction of the teleportation distribution `p` from a seed set.

use crate::error::{FraudPprError, Result};
use crate::id_map::NodeIndex;

/// Builds a normalized personalization vector of length `n`.
///
/// If `seeds` is empty, returns the uniform distribution `1/n`. Otherwise
/// puts mass `1/|seeds|` on each distinct seed and zero elsewhere.
///
/// Fails with [`FraudPprError::SeedOutOfRange`] if any seed is `>= n`.
pub fn make_p(n: usize, seeds: &[NodeIndex]) -> Result<Vec<f64>> {
    if n == 0 {
        return Ok(Vec::new());
    }

    if seeds.is_empty() {
        return Ok(vec![1.0 / n as f64; n]);
    }

    let mut distinct: Vec<NodeIndex> = seeds.to_vec();
    distinct.sort_unstable();
    distinct.dedup();

    for &s in distinct.iter() {
        if s as usize >= n {
            return Err(FraudPprError::SeedOutOfRange {
                seed: s,
                n: n as u32,
            });
        }
    }

    let mass = 1.0 / distinct.len() as f64;
    let mut p = vec![0.0; n];
    for s in distinct {
        p[s as usize] = mass;
    }
    Ok(p)
}

/// Renormalizes `v` in place so that it sums to 1. If `v` sums to zero (or a
/// non-finite value), falls back to the uniform distribution — this is the
/// "all-zero personalization" fallback spec.md prescribes for `p`, and is
/// reused by solvers for warm-start vectors.
pub fn normalize_or_uniform(v: &mut [f64]) {
    let sum: f64 = v.iter().sum();
    if sum.is_finite() && sum > 0.0 {
        for x in v.iter_mut() {
            *x /= sum;
        }
    } else {
        let n = v.len();
        if n > 0 {
            v.fill(1.0 / n as f64);
        }
    }
}
