/*
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

//! The public facade: the single orchestration object a caller (a CLI, a
//! GUI, a notebook kernel) drives. It is the only thread-affine, stateful
//! piece of the engine — everything it calls into (`id_map`, `graph`,
//! `personalization`, `power`, `monte_carlo`, `incremental`, `evaluate`) is
//! a pure function over immutable views (spec.md §4.8, §9 "global mutable
//! facade state... model as an explicit owned object").

use crate::error::{FraudPprError, Result};
use crate::evaluate::{self, Labels};
use crate::graph::Csr;
use crate::id_map::{self, Mapping, NodeId, NodeIndex, RawEdge};
use crate::incremental;
use crate::monte_carlo::pr_mc;
use crate::personalization::make_p;
use crate::power::pr_power;
use crate::result::{CancelToken, RunResult};

/// Which solver `run` should invoke. α carries a single meaning — teleport
/// probability — at this boundary regardless of which variant is chosen
/// (spec.md §4.5, §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Power,
    MonteCarlo,
}

/// Tunables for a single `run`, bundled the way the teacher bundles a
/// solver's stopping criteria into one `preds`-style settings value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunParams {
    pub max_iter: usize,
    pub tol: f64,
    pub num_walks: usize,
    pub max_steps: usize,
    pub mc_seed: u64,
}

impl RunParams {
    pub const DEFAULT_MAX_ITER: usize = 100;
    pub const DEFAULT_TOL: f64 = 1e-6;
    pub const DEFAULT_NUM_WALKS: usize = 10_000;
    pub const DEFAULT_MAX_STEPS: usize = 50;
}

impl Default for RunParams {
    fn default() -> Self {
        RunParams {
            max_iter: Self::DEFAULT_MAX_ITER,
            tol: Self::DEFAULT_TOL,
            num_walks: Self::DEFAULT_NUM_WALKS,
            max_steps: Self::DEFAULT_MAX_STEPS,
            mc_seed: 0,
        }
    }
}

/// One ranked row as returned by [`FraudPprEngine::top_k`]: 1-based rank,
/// the node's original identifier, its score, and its ground-truth label
/// if known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopKRow {
    pub rank: usize,
    pub node_id: NodeId,
    pub score: f64,
    pub label: Option<u8>,
}

/// Holds the current graph, scores, personalization, α and mappings — the
/// only object a caller needs (spec.md §4.8). Solvers only ever see
/// read-only views borrowed out of this struct.
#[derive(Debug, Clone)]
pub struct FraudPprEngine {
    mapping: Mapping,
    /// The mapped edge triples as last built/extended, weights as ingested
    /// (pre-coercion); retained so `run(weighted = false)` can rebuild `A`
    /// with unit weights without re-ingesting from the original source.
    edges: Vec<(NodeIndex, NodeIndex, f64)>,
    a: Csr,
    seeds: Vec<NodeIndex>,
    p: Vec<f64>,
    alpha: f64,
    r: Vec<f64>,
    labels: Labels,
    last_algorithm: Option<Algorithm>,
}

impl FraudPprEngine {
    /// Ingests a fresh graph from mapped raw edges, a seed set and ground
    /// truth labels, replacing any previously held state.
    ///
    /// `raw_seeds` and the node IDs appearing in `raw_labels` are both
    /// admitted to the ID mapping even when a node is never the endpoint of
    /// an edge (spec.md §4.1: "unknown seeds... still admitted").
    pub fn ingest(
        raw_edges: &[RawEdge],
        raw_seeds: &[NodeId],
        raw_labels: &[(NodeId, u8)],
    ) -> Result<Self> {
        let mut seed_ids: Vec<NodeId> = raw_seeds.to_vec();
        seed_ids.extend(raw_labels.iter().map(|&(id, _)| id));

        let compacted = id_map::compact(raw_edges, &seed_ids)?;
        let a = Csr::build(&compacted.edges, compacted.n)?;

        let seeds: Vec<NodeIndex> = raw_seeds
            .iter()
            .filter_map(|id| compacted.mapping.index_of(*id))
            .collect();
        let p = make_p(compacted.n, &seeds)?;

        let labels: Labels = raw_labels
            .iter()
            .filter_map(|&(id, label)| compacted.mapping.index_of(id).map(|idx| (idx, label)))
            .collect();

        Ok(FraudPprEngine {
            mapping: compacted.mapping,
            edges: compacted.edges,
            a,
            seeds,
            p,
            alpha: 0.85,
            r: vec![0.0; compacted.n],
            labels,
            last_algorithm: None,
        })
    }

    /// The number of nodes currently known to the engine.
    pub fn n(&self) -> usize {
        self.mapping.len()
    }

    /// The original identifier of dense index `idx`, if known.
    pub fn node_id(&self, idx: NodeIndex) -> Option<NodeId> {
        self.mapping.id_of(idx)
    }

    /// Runs a solver over the current graph and personalization, storing
    /// the result as the facade's current score vector.
    ///
    /// `weighted = false` rebuilds `A` from the retained edge list with
    /// every weight forced to `1.0` before building (spec.md §4.8).
    pub fn run(
        &mut self,
        alpha: f64,
        algorithm: Algorithm,
        weighted: bool,
        params: RunParams,
        cancel: CancelToken<'_>,
    ) -> Result<RunResult> {
        let n = self.mapping.len();
        self.p = make_p(n, &self.seeds)?;
        self.alpha = alpha;

        let a = if weighted {
            self.a.clone()
        } else {
            let unit_edges: Vec<(NodeIndex, NodeIndex, f64)> = self
                .edges
                .iter()
                .map(|&(s, d, _)| (s, d, 1.0))
                .collect();
            Csr::build(&unit_edges, n)?
        };

        let result = match algorithm {
            Algorithm::Power => {
                pr_power(&a, alpha, &self.p, params.tol, params.max_iter, None, cancel)?
            }
            Algorithm::MonteCarlo => pr_mc(
                &a,
                alpha,
                &self.p,
                params.num_walks,
                params.max_steps,
                params.mc_seed,
                cancel,
            )?,
        };

        self.r = result.scores.clone();
        self.last_algorithm = Some(algorithm);
        Ok(result)
    }

    /// Absorbs a batch of new edges (in original node-identifier space) via
    /// the warm-started incremental updater, committing the new graph and
    /// score vector only on success (spec.md §4.6, §7: no partial
    /// side-effects on the facade except on normal return).
    pub fn add_edges(
        &mut self,
        new_edges: &[(NodeId, NodeId, f64)],
        tol: f64,
        cancel: CancelToken<'_>,
    ) -> Result<RunResult> {
        let new_ids: Vec<NodeId> = new_edges
            .iter()
            .flat_map(|&(s, d, _)| [s, d])
            .collect();
        self.mapping.extend(new_ids);

        let mapped_edges: Vec<(NodeIndex, NodeIndex, f64)> = new_edges
            .iter()
            .map(|&(s, d, w)| {
                (
                    self.mapping.index_of(s).expect("id was just inserted"),
                    self.mapping.index_of(d).expect("id was just inserted"),
                    w,
                )
            })
            .collect();

        let n = self.mapping.len();
        self.p.resize(n, 0.0);
        let mut p = self.p.clone();
        crate::personalization::normalize_or_uniform(&mut p);

        let (a_new, result) =
            incremental::update(&self.a, &self.r, &p, self.alpha, &mapped_edges, tol, cancel)?;

        self.edges.extend(mapped_edges);
        self.a = a_new;
        self.p = p;
        self.r = result.scores.clone();
        Ok(result)
    }

    /// Returns the top `k` nodes by current score, descending, ties broken
    /// by ascending index, paired with their original identifier and label.
    pub fn top_k(&self, k: usize) -> Vec<TopKRow> {
        let n = self.r.len();
        let k_eff = k.min(n);
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&i, &j| {
            self.r[j]
                .partial_cmp(&self.r[i])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(i.cmp(&j))
        });

        order[..k_eff]
            .iter()
            .enumerate()
            .map(|(rank, &idx)| TopKRow {
                rank: rank + 1,
                node_id: self.mapping.id_of(idx as NodeIndex).unwrap_or(idx as NodeId),
                score: self.r[idx],
                label: self.labels.get(&(idx as NodeIndex)).copied(),
            })
            .collect()
    }

    /// Precision@K over the current score vector and ground-truth labels.
    pub fn precision_at_k(&self, k: usize) -> f64 {
        evaluate::precision_at_k(&self.r, &self.labels, k)
    }

    /// Writes `rank,node_id,score,label` rows for the current top `k` to
    /// `writer` (spec.md §6: `export_top_k`).
    pub fn export_top_k<W: std::io::Write>(&self, k: usize, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["rank", "node_id", "score", "label"])
            .map_err(|e| FraudPprError::MalformedInput(e.to_string()))?;
        for row in self.top_k(k) {
            wtr.write_record([
                row.rank.to_string(),
                row.node_id.to_string(),
                row.score.to_string(),
                row.label.map(|l| l.to_string()).unwrap_or_default(),
            ])
            .map_err(|e| FraudPprError::MalformedInput(e.to_string()))?;
        }
        wtr.flush()
            .map_err(|e| FraudPprError::MalformedInput(e.to_string()))
    }

    /// The algorithm used for the most recent `run`, if any.
    pub fn last_algorithm(&self) -> Option<Algorithm> {
        self.last_algorithm
    }

    /// The current score vector, in dense-index order.
    pub fn scores(&self) -> &[f64] {
        &self.r
    }
}
