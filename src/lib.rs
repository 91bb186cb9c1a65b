/*
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

#![doc = include_str!("../README.md")]

pub mod error;
pub mod evaluate;
pub mod facade;
pub mod graph;
pub mod id_map;
pub mod incremental;
pub mod io;
pub mod monte_carlo;
pub mod personalization;
pub mod power;
pub mod result;

pub use error::{FraudPprError, Result};
pub use facade::{Algorithm, FraudPprEngine, RunParams, TopKRow};
pub use result::{CancelToken, Outcome, RunResult};
