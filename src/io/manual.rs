/*
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

//! Free-form manual-entry ingestion: one edge per line, `src dst weight`,
//! whitespace- or comma-separated, terminated by the sentinel line `end`
//! (interactive use) or end-of-input (programmatic use); a single following
//! line of whitespace/comma-separated seed identifiers (spec.md §6.2).

use std::io::BufRead;

use crate::error::{FraudPprError, Result};
use crate::id_map::{NodeId, RawEdge};

const SENTINEL: &str = "end";

fn split_fields(line: &str) -> Vec<&str> {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parses edges from `reader`, one per line as `src dst weight`, stopping at
/// the `end` sentinel or end-of-input. Blank lines are ignored.
///
/// Fails with [`FraudPprError::MalformedInput`] on the first line that has
/// the wrong number of fields or an unparseable number — unlike the CSV
/// path, manual entry is typed live and errors are reported immediately
/// rather than skipped.
pub fn parse_manual_edges<R: BufRead>(reader: R) -> Result<Vec<RawEdge>> {
    let mut edges = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|e| FraudPprError::MalformedInput(e.to_string()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case(SENTINEL) {
            break;
        }

        let fields = split_fields(trimmed);
        if fields.len() != 3 {
            return Err(FraudPprError::MalformedInput(format!(
                "expected `src dst weight`, got {trimmed:?}"
            )));
        }
        let src: NodeId = fields[0]
            .parse()
            .map_err(|_| FraudPprError::MalformedInput(format!("bad source id: {}", fields[0])))?;
        let dst: NodeId = fields[1]
            .parse()
            .map_err(|_| FraudPprError::MalformedInput(format!("bad target id: {}", fields[1])))?;
        let weight: f64 = fields[2]
            .parse()
            .map_err(|_| FraudPprError::MalformedInput(format!("bad weight: {}", fields[2])))?;

        edges.push(RawEdge { src, dst, weight });
    }

    if edges.is_empty() {
        return Err(FraudPprError::EmptyGraph);
    }
    Ok(edges)
}

/// Parses a single line of whitespace/comma-separated seed identifiers.
pub fn parse_manual_seeds(line: &str) -> Result<Vec<NodeId>> {
    split_fields(line)
        .into_iter()
        .map(|field| {
            field
                .parse::<NodeId>()
                .map_err(|_| FraudPprError::MalformedInput(format!("bad seed id: {field}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whitespace_and_comma_separated_edges() {
        let input = "0 1 1.0\n1,2,3.5\nend\n999 999 999\n";
        let edges = parse_manual_edges(input.as_bytes()).unwrap();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[1], RawEdge { src: 1, dst: 2, weight: 3.5 });
    }

    #[test]
    fn stops_at_eof_without_sentinel() {
        let input = "0 1 1.0\n2 3 1.0\n";
        let edges = parse_manual_edges(input.as_bytes()).unwrap();
        assert_eq!(edges.len(), 2);
    }

    #[test]
    fn blank_lines_are_ignored() {
        let input = "0 1 1.0\n\n  \n1 2 1.0\nend\n";
        let edges = parse_manual_edges(input.as_bytes()).unwrap();
        assert_eq!(edges.len(), 2);
    }

    #[test]
    fn wrong_field_count_is_malformed() {
        let input = "0 1\nend\n";
        assert!(matches!(
            parse_manual_edges(input.as_bytes()),
            Err(FraudPprError::MalformedInput(_))
        ));
    }

    #[test]
    fn no_edges_is_empty_graph() {
        assert_eq!(
            parse_manual_edges("end\n".as_bytes()).unwrap_err(),
            FraudPprError::EmptyGraph
        );
    }

    #[test]
    fn seeds_line_parses_mixed_separators() {
        let seeds = parse_manual_seeds("1, 2  3,4").unwrap();
        assert_eq!(seeds, vec![1, 2, 3, 4]);
    }
}
