/*
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

//! The sparse adjacency matrix `A`, stored in compressed-sparse-row form,
//! and the operations a solver needs against it.
//!
//! `A` never materializes the row-stochastic transition matrix `M`: each row
//! is scaled by its inverse out-degree on the fly in
//! [`Csr::mul_vec_transpose`], matching spec.md's "conceptually derived; may
//! be... applied lazily" note on the transition operator.

use crate::error::{FraudPprError, Result};
use crate::id_map::NodeIndex;

/// A square, directed, weighted adjacency matrix in compressed-sparse-row
/// form. Rows are sorted by destination index with duplicates summed.
#[derive(Debug, Clone)]
pub struct Csr {
    n: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<NodeIndex>,
    weight: Vec<f64>,
    out_degree: Vec<f64>,
}

impl Csr {
    /// Builds a CSR matrix from mapped edge triples. Duplicate `(i, j)`
    /// pairs sum their weights; weights `<= 0.0` are coerced to `1.0`.
    ///
    /// Fails with [`FraudPprError::ShapeMismatch`] if any index is `>= n`.
    pub fn build(edges: &[(NodeIndex, NodeIndex, f64)], n: usize) -> Result<Self> {
        for &(src, dst, _) in edges {
            if src as usize >= n || dst as usize >= n {
                return Err(FraudPprError::ShapeMismatch(format!(
                    "edge ({src}, {dst}) out of bounds for {n} nodes"
                )));
            }
        }

        // Accumulate duplicate (src, dst) pairs per row before laying out CSR.
        let mut rows: Vec<Vec<(NodeIndex, f64)>> = vec![Vec::new(); n];
        for &(src, dst, w) in edges {
            let w = if w <= 0.0 { 1.0 } else { w };
            rows[src as usize].push((dst, w));
        }

        let mut row_ptr = Vec::with_capacity(n + 1);
        let mut col_idx = Vec::new();
        let mut weight = Vec::new();
        row_ptr.push(0);

        for row in rows.iter_mut() {
            row.sort_unstable_by_key(|&(dst, _)| dst);
            let mut merged: Vec<(NodeIndex, f64)> = Vec::with_capacity(row.len());
            for &(dst, w) in row.iter() {
                if let Some(last) = merged.last_mut() {
                    if last.0 == dst {
                        last.1 += w;
                        continue;
                    }
                }
                merged.push((dst, w));
            }
            for (dst, w) in merged {
                col_idx.push(dst);
                weight.push(w);
            }
            row_ptr.push(col_idx.len());
        }

        let out_degree = (0..n)
            .map(|i| {
                let (start, end) = (row_ptr[i], row_ptr[i + 1]);
                weight[start..end].iter().sum()
            })
            .collect();

        Ok(Csr {
            n,
            row_ptr,
            col_idx,
            weight,
            out_degree,
        })
    }

    /// The number of nodes.
    pub fn n(&self) -> usize {
        self.n
    }

    /// The out-degree vector `d`, `d[i] = sum of weights of edges i -> *`.
    pub fn out_degree(&self) -> &[f64] {
        &self.out_degree
    }

    /// Whether node `i` is dangling (zero out-degree).
    pub fn is_dangling(&self, i: usize) -> bool {
        self.out_degree[i] == 0.0
    }

    /// The `(neighbor, weight)` pairs of the outgoing edges of node `i`, in
    /// ascending destination order.
    pub fn row(&self, i: usize) -> impl Iterator<Item = (NodeIndex, f64)> + '_ {
        let (start, end) = (self.row_ptr[i], self.row_ptr[i + 1]);
        self.col_idx[start..end]
            .iter()
            .copied()
            .zip(self.weight[start..end].iter().copied())
    }

    /// Computes `out = r^T M`, where `M` is the row-stochastic transition
    /// matrix implicitly obtained from `A` by scaling each non-dangling row
    /// by its inverse out-degree. Dangling rows contribute nothing (their
    /// mass is handled separately by the caller via the dangling term).
    ///
    /// Summation within a row follows CSR order, which is deterministic for
    /// a given `A`.
    pub fn mul_vec_transpose(&self, r: &[f64], out: &mut [f64]) {
        debug_assert_eq!(r.len(), self.n);
        debug_assert_eq!(out.len(), self.n);
        out.fill(0.0);
        for i in 0..self.n {
            let d = self.out_degree[i];
            if d == 0.0 || r[i] == 0.0 {
                continue;
            }
            let contribution = r[i] / d;
            for (j, w) in self.row(i) {
                out[j as usize] += contribution * w;
            }
        }
    }

    /// Overwrites (does not accumulate) the weight of edge `(src, dst)`,
    /// resizing the matrix first if either endpoint is out of range.
    ///
    /// This mirrors the incremental updater's documented overwrite
    /// semantics (spec.md §4.6, §9), distinct from [`Csr::build`]'s
    /// duplicate-summing behaviour.
    pub fn apply_edge(&mut self, src: NodeIndex, dst: NodeIndex, weight: f64) {
        let needed = (src.max(dst) as usize) + 1;
        if needed > self.n {
            self.resize(needed);
        }

        let (start, end) = (self.row_ptr[src as usize], self.row_ptr[src as usize + 1]);
        let row_cols = &mut self.col_idx[start..end];
        if let Some(pos) = row_cols.iter().position(|&c| c == dst) {
            let old = self.weight[start + pos];
            self.weight[start + pos] = weight;
            self.out_degree[src as usize] += weight - old;
            return;
        }

        // Insert a new column, keeping the row sorted by destination.
        let insert_at = start
            + self.col_idx[start..end]
                .iter()
                .position(|&c| c > dst)
                .unwrap_or(end - start);
        self.col_idx.insert(insert_at, dst);
        self.weight.insert(insert_at, weight);
        for ptr in self.row_ptr[(src as usize + 1)..].iter_mut() {
            *ptr += 1;
        }
        self.out_degree[src as usize] += weight;
    }

    /// Grows the matrix to `new_n` nodes, padding with empty rows.
    pub fn resize(&mut self, new_n: usize) {
        debug_assert!(new_n >= self.n);
        let last = *self.row_ptr.last().unwrap();
        self.row_ptr
            .extend(std::iter::repeat(last).take(new_n - self.n));
        self.out_degree.resize(new_n, 0.0);
        self.n = new_n;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_edges_sum_weights() {
        let csr = Csr::build(&[(0, 1, 1.0), (0, 1, 2.0)], 2).unwrap();
        assert_eq!(csr.row(0).collect::<Vec<_>>(), vec![(1, 3.0)]);
        assert_eq!(csr.out_degree(), &[3.0, 0.0]);
    }

    #[test]
    fn non_positive_weights_coerce_to_one() {
        let csr = Csr::build(&[(0, 1, -5.0), (0, 2, 0.0)], 3).unwrap();
        assert_eq!(csr.row(0).collect::<Vec<_>>(), vec![(1, 1.0), (2, 1.0)]);
    }

    #[test]
    fn out_of_bounds_edge_is_shape_mismatch() {
        let err = Csr::build(&[(0, 5, 1.0)], 2).unwrap_err();
        assert!(matches!(err, FraudPprError::ShapeMismatch(_)));
    }

    #[test]
    fn mul_vec_transpose_scales_by_inverse_out_degree() {
        // 0 -> 1 (w=1), 0 -> 2 (w=1): row 0 splits r[0] evenly.
        let csr = Csr::build(&[(0, 1, 1.0), (0, 2, 1.0)], 3).unwrap();
        let r = [1.0, 0.0, 0.0];
        let mut out = [0.0; 3];
        csr.mul_vec_transpose(&r, &mut out);
        assert_eq!(out, [0.0, 0.5, 0.5]);
    }

    #[test]
    fn apply_edge_overwrites_and_resizes() {
        let mut csr = Csr::build(&[(0, 1, 1.0)], 2).unwrap();
        csr.apply_edge(0, 1, 9.0);
        assert_eq!(csr.row(0).collect::<Vec<_>>(), vec![(1, 9.0)]);

        csr.apply_edge(4, 1, 2.0);
        assert_eq!(csr.n(), 5);
        assert_eq!(csr.row(4).collect::<Vec<_>>(), vec![(1, 2.0)]);
    }
}
