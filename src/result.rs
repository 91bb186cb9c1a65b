/*
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

//! The single structured return shape shared by both solvers (spec.md §9:
//! "replace dynamic duck-typed 'result is either a tuple or an array' with
//! a single structured RunResult").

use std::sync::atomic::{AtomicBool, Ordering};

/// A cancellation token checked at iteration (power) or walk (Monte Carlo)
/// boundaries. `None` means the computation cannot be cancelled.
pub type CancelToken<'a> = Option<&'a AtomicBool>;

/// Returns whether `token` has been set, treating the absence of a token as
/// "never cancelled".
pub fn is_cancelled(token: CancelToken<'_>) -> bool {
    token.is_some_and(|flag| flag.load(Ordering::Relaxed))
}

/// The outcome of a solver run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The solver ran to completion (convergence is not required; a
    /// non-converged last iterate is still `Converged` in this sense — see
    /// [`RunResult::err`] to check the residual).
    Converged,
    /// The solver was interrupted by a cancellation token; `scores` holds
    /// the latest partial iterate.
    Cancelled,
}

/// The result of a solver invocation: the score vector plus enough metadata
/// for the caller to assess convergence.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// The score vector `r`, nonnegative, summing to 1 for the power solver.
    /// The Monte-Carlo solver's vector is a ranking-equivalent approximation
    /// and is not guaranteed to sum to 1 (spec.md §4.5).
    pub scores: Vec<f64>,
    /// The number of iterations (power) or walks (Monte Carlo) performed.
    pub iters: usize,
    /// The last-measured L1 error, for the power solver. Not meaningful for
    /// the Monte Carlo solver, which reports `0.0`.
    pub err: f64,
    /// Whether this result is a cancelled partial iterate.
    pub outcome: Outcome,
}
