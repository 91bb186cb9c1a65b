/*
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

//! CSV ingestion: `source,target,amount[,label]`, one header line.
//!
//! Malformed rows (wrong column count, unparseable numbers) are skipped
//! silently; a file with zero valid rows fails with
//! [`FraudPprError::EmptyGraph`] (spec.md §6).

use std::io::Read;

use crate::error::{FraudPprError, Result};
use crate::id_map::{NodeId, RawEdge};

/// The outcome of parsing a CSV ingestion source: rewritable raw edges plus
/// the node IDs implied as fraud seeds by a `label == 1` column.
#[derive(Debug, Default)]
pub struct ParsedCsv {
    pub edges: Vec<RawEdge>,
    /// Node IDs whose `label` column was `1`. Labels are associated with
    /// the *target* node only (spec.md §9).
    pub fraud_seeds: Vec<NodeId>,
}

/// Parses a `source,target,amount[,label]` CSV file from any `Read`r.
///
/// Non-positive amounts are coerced to `1.0`. Fails with
/// [`FraudPprError::EmptyGraph`] if no row parses successfully.
pub fn parse_csv<R: Read>(reader: R) -> Result<ParsedCsv> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut out = ParsedCsv::default();

    for record in rdr.records() {
        let Ok(record) = record else {
            continue;
        };
        if record.len() < 3 {
            continue;
        }

        let Some(src) = record.get(0).and_then(|s| s.trim().parse::<NodeId>().ok()) else {
            continue;
        };
        let Some(dst) = record.get(1).and_then(|s| s.trim().parse::<NodeId>().ok()) else {
            continue;
        };
        let Some(amount) = record.get(2).and_then(|s| s.trim().parse::<f64>().ok()) else {
            continue;
        };
        let weight = if amount <= 0.0 { 1.0 } else { amount };

        out.edges.push(RawEdge {
            src,
            dst,
            weight,
        });

        if let Some(label_field) = record.get(3) {
            let label_field = label_field.trim();
            if !label_field.is_empty() {
                if let Ok(1) = label_field.parse::<i32>() {
                    out.fraud_seeds.push(dst);
                }
            }
        }
    }

    if out.edges.is_empty() {
        return Err(FraudPprError::EmptyGraph);
    }

    Ok(out)
}
