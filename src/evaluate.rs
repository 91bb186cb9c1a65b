/*
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

//! Precision@K: the fraction of the top-K ranked nodes with ground-truth
//! label 1.

use std::collections::HashMap;

use crate::id_map::NodeIndex;

/// A partial map from node index to a binary ground-truth label.
/// Unspecified nodes are treated as 0 (spec.md §3).
pub type Labels = HashMap<NodeIndex, u8>;

/// Computes Precision@K over `scores`, ranking indices by score descending
/// and breaking ties by ascending index for determinism.
///
/// `k` is clamped to `scores.len()` (spec.md §9: "Precision@K with k > N"
/// clamps to N rather than returning 0). Returns 0.0 if the effective K is
/// 0.
pub fn precision_at_k(scores: &[f64], labels: &Labels, k: usize) -> f64 {
    let n = scores.len();
    let k_eff = k.min(n);
    if k_eff == 0 {
        return 0.0;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| {
        scores[j]
            .partial_cmp(&scores[i])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(i.cmp(&j))
    });

    let relevant = order[..k_eff]
        .iter()
        .filter(|&&i| labels.get(&(i as NodeIndex)).copied().unwrap_or(0) == 1)
        .count();

    relevant as f64 / k_eff as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s5_example() {
        let scores = vec![0.5, 0.1, 0.3, 0.05, 0.05];
        let labels: Labels = [(0, 1), (2, 1), (3, 0), (4, 0)].into_iter().collect();
        assert_eq!(precision_at_k(&scores, &labels, 2), 1.0);
    }

    #[test]
    fn ties_break_by_ascending_index() {
        let scores = vec![1.0, 1.0, 1.0];
        let labels: Labels = [(0, 1)].into_iter().collect();
        // top-1 by score with a three-way tie must pick index 0.
        assert_eq!(precision_at_k(&scores, &labels, 1), 1.0);
    }

    #[test]
    fn k_zero_is_zero() {
        let scores = vec![0.5, 0.5];
        let labels = Labels::new();
        assert_eq!(precision_at_k(&scores, &labels, 0), 0.0);
    }

    #[test]
    fn k_greater_than_n_clamps_to_n() {
        let scores = vec![0.9, 0.1];
        let labels: Labels = [(0, 1), (1, 1)].into_iter().collect();
        assert_eq!(precision_at_k(&scores, &labels, 100), 1.0);
    }

    #[test]
    fn monotone_refinement_as_k_grows() {
        let scores = vec![0.9, 0.4, 0.3, 0.2, 0.1];
        let labels: Labels = [(0, 1), (1, 0), (2, 1), (3, 0), (4, 1)]
            .into_iter()
            .collect();
        for k1 in 1..scores.len() {
            for k2 in k1..=scores.len() {
                let p1 = precision_at_k(&scores, &labels, k1);
                let p2 = precision_at_k(&scores, &labels, k2);
                assert!(
                    p1 * k1 as f64 <= p2 * k2 as f64 + 1e-12,
                    "k1={k1} k2={k2} p1={p1} p2={p2}"
                );
            }
        }
    }

    #[test]
    fn empty_scores_is_zero() {
        let labels = Labels::new();
        assert_eq!(precision_at_k(&[], &labels, 5), 0.0);
    }
}
