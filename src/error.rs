/*
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

use thiserror::Error;

/// The error kinds recognized by the engine, propagated to the hosting UI
/// layer unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FraudPprError {
    /// A raw edge or seed triple could not be parsed.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Ingestion produced zero valid edges.
    #[error("graph has no edges")]
    EmptyGraph,

    /// `alpha` was outside the open interval (0, 1).
    #[error("alpha must be in (0, 1), got {0}")]
    InvalidAlpha(f64),

    /// A matrix or vector had a shape incompatible with the graph size.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A seed index was not a valid node index.
    #[error("seed {seed} is out of range for a graph of {n} nodes")]
    SeedOutOfRange {
        /// The offending seed index.
        seed: u32,
        /// The number of nodes in the graph.
        n: u32,
    },

    /// A new edge offered to the incremental updater had a negative weight.
    #[error("edge ({src}, {dst}) has invalid weight {weight}")]
    InvalidEdge {
        /// Source node index.
        src: u32,
        /// Destination node index.
        dst: u32,
        /// The offending weight.
        weight: f64,
    },

    /// The computation was interrupted by a cancellation token.
    #[error("computation was cancelled")]
    Cancelled,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FraudPprError>;
