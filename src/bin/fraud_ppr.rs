/*
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

//! Thin CLI over [`fraud_ppr::facade::FraudPprEngine`]. This binary is the
//! crate's stand-in for the hosting GUI the engine excludes (spec.md §1):
//! it ingests a graph, runs a solver, and reports the ranking, without
//! owning any presentation logic beyond formatting a table.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use fraud_ppr::facade::{Algorithm as EngineAlgorithm, FraudPprEngine, RunParams};
use fraud_ppr::io::csv::parse_csv;
use fraud_ppr::io::manual::{parse_manual_edges, parse_manual_seeds};

#[derive(Parser, Debug)]
#[command(
    name = "fraud-ppr",
    about = "Personalized PageRank fraud-suspicion ranking over a directed transaction graph."
)]
struct Cli {
    /// CSV file with columns source,target,amount[,label]. Omit to read the
    /// manual `src dst weight` format from stdin, terminated by `end`.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Known-fraud seed node IDs (original identifiers). Rows labeled 1 in
    /// the input CSV are also treated as seeds.
    #[arg(long, value_delimiter = ',')]
    seeds: Vec<i64>,

    /// Teleport probability.
    #[arg(short, long, default_value_t = 0.85)]
    alpha: f64,

    /// Which solver to run.
    #[arg(long, value_enum, default_value_t = CliAlgorithm::Power)]
    algorithm: CliAlgorithm,

    /// Ignore edge weights; treat every edge as weight 1.
    #[arg(long, default_value_t = false)]
    unweighted: bool,

    /// Maximum power-iteration count.
    #[arg(long, default_value_t = RunParams::DEFAULT_MAX_ITER)]
    max_iter: usize,

    /// L1 convergence threshold.
    #[arg(long, default_value_t = RunParams::DEFAULT_TOL)]
    tol: f64,

    /// Number of Monte Carlo walks.
    #[arg(long, default_value_t = RunParams::DEFAULT_NUM_WALKS)]
    num_walks: usize,

    /// Maximum steps per Monte Carlo walk.
    #[arg(long, default_value_t = RunParams::DEFAULT_MAX_STEPS)]
    max_steps: usize,

    /// RNG seed for the Monte Carlo solver.
    #[arg(long, default_value_t = 0)]
    mc_seed: u64,

    /// A second CSV of edges to absorb incrementally after the initial run.
    #[arg(long)]
    add_edges: Option<PathBuf>,

    /// Number of top-ranked nodes to report.
    #[arg(short, long, default_value_t = 10)]
    top_k: usize,

    /// Compute Precision@K for this K against ingested labels (defaults to
    /// `--top-k`).
    #[arg(long)]
    precision_k: Option<usize>,

    /// Write the top-k table as CSV to this path instead of stdout.
    #[arg(long)]
    export: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum CliAlgorithm {
    Power,
    MonteCarlo,
}

impl From<CliAlgorithm> for EngineAlgorithm {
    fn from(value: CliAlgorithm) -> Self {
        match value {
            CliAlgorithm::Power => EngineAlgorithm::Power,
            CliAlgorithm::MonteCarlo => EngineAlgorithm::MonteCarlo,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
    let (raw_edges, raw_labels, mut seeds) = match &cli.input {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            let parsed = parse_csv(BufReader::new(file)).context("parsing CSV input")?;
            let labels = parsed.fraud_seeds.iter().map(|&id| (id, 1u8)).collect();
            let seeds = parsed.fraud_seeds.clone();
            (parsed.edges, labels, seeds)
        }
        None => {
            let stdin = io::stdin();
            let edges = parse_manual_edges(stdin.lock()).context("parsing manual edge input")?;
            let mut seed_line = String::new();
            io::stdin().read_line(&mut seed_line).ok();
            let seeds = parse_manual_seeds(seed_line.trim()).unwrap_or_default();
            (edges, Vec::new(), seeds)
        }
    };
    seeds.extend(cli.seeds.iter().copied());

    let mut engine =
        FraudPprEngine::ingest(&raw_edges, &seeds, &raw_labels).context("ingesting graph")?;

    let params = RunParams {
        max_iter: cli.max_iter,
        tol: cli.tol,
        num_walks: cli.num_walks,
        max_steps: cli.max_steps,
        mc_seed: cli.mc_seed,
    };
    let result = engine
        .run(cli.alpha, cli.algorithm.into(), !cli.unweighted, params, None)
        .context("running solver")?;
    log::info!(
        "run complete: algorithm={:?} iters={} err={:.3e} outcome={:?}",
        cli.algorithm,
        result.iters,
        result.err,
        result.outcome
    );

    if let Some(path) = &cli.add_edges {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let parsed = parse_csv(BufReader::new(file)).context("parsing incremental edges")?;
        let new_edges: Vec<(i64, i64, f64)> = parsed
            .edges
            .into_iter()
            .map(|e| (e.src, e.dst, e.weight))
            .collect();
        let update_result = engine
            .add_edges(&new_edges, cli.tol, None)
            .context("absorbing incremental edges")?;
        log::info!(
            "incremental update complete: iters={} err={:.3e}",
            update_result.iters,
            update_result.err
        );
    }

    let precision_k = cli.precision_k.unwrap_or(cli.top_k);
    log::info!(
        "precision@{precision_k} = {:.4}",
        engine.precision_at_k(precision_k)
    );

    match &cli.export {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("creating {}", path.display()))?;
            engine
                .export_top_k(cli.top_k, file)
                .context("exporting top-k")?;
        }
        None => {
            println!("rank,node_id,score,label");
            for row in engine.top_k(cli.top_k) {
                println!(
                    "{},{},{:.6},{}",
                    row.rank,
                    row.node_id,
                    row.score,
                    row.label.map(|l| l.to_string()).unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}
