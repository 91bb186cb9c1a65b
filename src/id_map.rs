/*
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

//! Compaction of arbitrary, possibly sparse, integer node identifiers into a
//! dense `[0, N)` index range.
//!
//! Two runs over the same raw input produce byte-identical mappings: indices
//! are assigned in ascending order of the original identifier, not in order
//! of first appearance.

use std::collections::BTreeMap;

use crate::error::{FraudPprError, Result};

/// The original, possibly sparse, node identifier as it appeared in the
/// source data (a CSV file, a manual entry session, ...).
pub type NodeId = i64;

/// A dense index in `[0, N)`, stable for the lifetime of the graph.
pub type NodeIndex = u32;

/// A single raw `(source, destination, weight)` triple as read from the
/// ingestion layer, before ID compaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawEdge {
    pub src: NodeId,
    pub dst: NodeId,
    pub weight: f64,
}

/// A bijection between [`NodeId`] and [`NodeIndex`], extended monotonically
/// as new identifiers are observed.
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    forward: BTreeMap<NodeId, NodeIndex>,
    reverse: Vec<NodeId>,
}

impl Mapping {
    /// The number of distinct node identifiers observed so far.
    pub fn len(&self) -> usize {
        self.reverse.len()
    }

    /// Whether the mapping has observed any identifier.
    pub fn is_empty(&self) -> bool {
        self.reverse.is_empty()
    }

    /// Looks up the dense index for a node identifier, if known.
    pub fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.forward.get(&id).copied()
    }

    /// Recovers the original identifier for a dense index, if in range.
    pub fn id_of(&self, index: NodeIndex) -> Option<NodeId> {
        self.reverse.get(index as usize).copied()
    }

    /// Extends the mapping with any identifiers in `ids` not already known,
    /// assigning them the next free indices in ascending order of their
    /// value. Returns the number of newly assigned indices.
    pub fn extend(&mut self, ids: impl IntoIterator<Item = NodeId>) -> usize {
        let mut fresh: Vec<NodeId> = ids
            .into_iter()
            .filter(|id| !self.forward.contains_key(id))
            .collect();
        fresh.sort_unstable();
        fresh.dedup();
        for id in fresh.iter() {
            let idx = self.reverse.len() as NodeIndex;
            self.reverse.push(*id);
            self.forward.insert(*id, idx);
        }
        fresh.len()
    }
}

/// The result of [`compact`]: rewritten edges and seeds using dense indices,
/// plus both direction maps and the node count.
#[derive(Debug, Clone)]
pub struct CompactGraph {
    pub edges: Vec<(NodeIndex, NodeIndex, f64)>,
    pub seeds: Vec<NodeIndex>,
    pub mapping: Mapping,
    pub n: usize,
}

/// Compacts arbitrary integer node IDs appearing in `raw_edges` (both
/// endpoints) and in `raw_seeds` into a dense `[0, N)` index range.
///
/// Fails with [`FraudPprError::EmptyGraph`] if `raw_edges` is empty.
pub fn compact(raw_edges: &[RawEdge], raw_seeds: &[NodeId]) -> Result<CompactGraph> {
    if raw_edges.is_empty() {
        return Err(FraudPprError::EmptyGraph);
    }

    let mut ids: Vec<NodeId> = Vec::with_capacity(raw_edges.len() * 2 + raw_seeds.len());
    for e in raw_edges {
        ids.push(e.src);
        ids.push(e.dst);
    }
    ids.extend_from_slice(raw_seeds);

    let mut mapping = Mapping::default();
    mapping.extend(ids);

    let edges = raw_edges
        .iter()
        .map(|e| {
            (
                mapping.index_of(e.src).expect("id was just inserted"),
                mapping.index_of(e.dst).expect("id was just inserted"),
                e.weight,
            )
        })
        .collect();

    let seeds = raw_seeds
        .iter()
        .map(|s| mapping.index_of(*s).expect("id was just inserted"))
        .collect();

    let n = mapping.len();
    Ok(CompactGraph {
        edges,
        seeds,
        mapping,
        n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(src: NodeId, dst: NodeId, weight: f64) -> RawEdge {
        RawEdge { src, dst, weight }
    }

    #[test]
    fn sparse_ids_compact_to_dense_ascending_order() {
        // S4: raw edges (1000, 2000, 5), (2000, 3000, 7)
        let raw = vec![edge(1000, 2000, 5.0), edge(2000, 3000, 7.0)];
        let g = compact(&raw, &[]).unwrap();
        assert_eq!(g.n, 3);
        assert_eq!(g.mapping.index_of(1000), Some(0));
        assert_eq!(g.mapping.index_of(2000), Some(1));
        assert_eq!(g.mapping.index_of(3000), Some(2));
        assert_eq!(g.mapping.id_of(0), Some(1000));
        assert_eq!(g.mapping.id_of(1), Some(2000));
        assert_eq!(g.mapping.id_of(2), Some(3000));
        assert_eq!(g.edges, vec![(0, 1, 5.0), (1, 2, 7.0)]);
    }

    #[test]
    fn empty_edges_fail_empty_graph() {
        assert_eq!(compact(&[], &[]), Err(FraudPprError::EmptyGraph));
    }

    #[test]
    fn unknown_seeds_are_admitted() {
        let raw = vec![edge(0, 1, 1.0)];
        let g = compact(&raw, &[5]).unwrap();
        assert_eq!(g.n, 3);
        assert_eq!(g.mapping.index_of(5), Some(2));
        assert_eq!(g.seeds, vec![2]);
    }

    #[test]
    fn compaction_is_idempotent_on_already_compact_input() {
        let raw = vec![edge(0, 1, 1.0), edge(1, 2, 1.0)];
        let once = compact(&raw, &[0]).unwrap();
        let reedges: Vec<RawEdge> = once
            .edges
            .iter()
            .map(|&(s, d, w)| edge(s as i64, d as i64, w))
            .collect();
        let reseeds: Vec<NodeId> = once.seeds.iter().map(|&s| s as i64).collect();
        let twice = compact(&reedges, &reseeds).unwrap();
        assert_eq!(once.edges, twice.edges);
        assert_eq!(once.seeds, twice.seeds);
        assert_eq!(once.n, twice.n);
    }
}
