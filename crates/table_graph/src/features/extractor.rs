//! Feature vector derivation and the analysis-tool subprocess front-end.
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::{Error, Result};
use crate::features::artifact::{ActionDescription, GressDescription, TableDescription};
use crate::features::{unknown_features, FeatureVector};

/// Marker substring of synthetic action tables the compiler creates for bare
/// action invocations. Their node names carry no table of their own; the
/// action behind them is found by stripping the marker.
pub const ACTION_TABLE_MARKER: &str = "tbl_";

/// Derives the feature vector for one described table.
///
/// `op_num` values are summed over the table's actions (absent actions count
/// 0); `lpm`/`exact`/`ternary` match entries contribute their key counts and
/// other match kinds are ignored. A table whose five structural fields all
/// come out 0 carries no information and is marked unknown.
pub fn table_features(
    table: &TableDescription,
    actions: &HashMap<String, ActionDescription>,
) -> FeatureVector {
    let op_num_sum: u64 = table
        .actions
        .iter()
        .map(|name| actions.get(name).map_or(0, |a| a.op_num))
        .sum();

    let mut lpm_count = 0usize;
    let mut exact_count = 0usize;
    let mut ternary_count = 0usize;
    for (kind, keys) in &table.matches {
        match kind.as_str() {
            "lpm" => lpm_count += keys.len(),
            "exact" => exact_count += keys.len(),
            "ternary" => ternary_count += keys.len(),
            _ => {}
        }
    }

    if table.size == 0 && op_num_sum == 0 && lpm_count + exact_count + ternary_count == 0 {
        return unknown_features();
    }

    [
        table.size as f64,
        op_num_sum as f64,
        lpm_count as f64,
        exact_count as f64,
        ternary_count as f64,
        0.0,
    ]
}

/// Derives one feature vector per graph node, in node order.
///
/// A node naming a described table uses that table directly. A node carrying
/// the synthetic action-table marker is matched against action names
/// containing its marker-stripped stem and described as a zero-size table
/// holding just that action. Everything else is unknown.
pub fn node_features(nodes: &[String], gress: &GressDescription) -> Vec<FeatureVector> {
    nodes
        .iter()
        .map(|node| match gress.tables.get(node) {
            Some(table) => table_features(table, &gress.actions),
            None => action_table_features(node, gress).unwrap_or_else(unknown_features),
        })
        .collect()
}

fn action_table_features(node: &str, gress: &GressDescription) -> Option<FeatureVector> {
    let marker_at = node.find(ACTION_TABLE_MARKER)?;
    let stem = &node[marker_at + ACTION_TABLE_MARKER.len()..];
    debug!("node '{node}' looks like an action table; searching for '{stem}'");

    // Smallest matching name keeps the choice deterministic across runs.
    let action = gress.actions.keys().filter(|name| name.contains(stem)).min()?;
    let synthetic = TableDescription {
        size: 0,
        actions: vec![action.clone()],
        matches: Vec::new(),
    };
    Some(table_features(&synthetic, &gress.actions))
}

/// Runs the analysis tool on a program source and parses the description it
/// writes to `output`.
///
/// A nonzero exit or an unreadable artifact is an explicit error; callers in
/// the batch layer log it and leave the program's record without node
/// features rather than aborting the corpus run.
pub fn describe_program(
    tool: &Path,
    program: &Path,
    output: &Path,
) -> Result<crate::features::ProgramDescription> {
    let result = Command::new(tool)
        .arg(program)
        .arg("-f")
        .arg(output)
        .output()
        .map_err(|e| Error::Tool {
            tool: tool.display().to_string(),
            detail: e.to_string(),
        })?;

    if !result.status.success() {
        return Err(Error::Tool {
            tool: tool.display().to_string(),
            detail: format!(
                "exit status {}: {}",
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            ),
        });
    }

    let text = fs::read_to_string(output)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ProgramDescription;

    fn described_gress() -> GressDescription {
        let text = r#"{
            "tables": {
                "t1": {
                    "size": 4,
                    "actions": ["a1"],
                    "matches": [["exact", ["f1", "f2"]]]
                },
                "wide": {
                    "size": 16,
                    "actions": ["a1", "a2", "missing"],
                    "matches": [
                        ["lpm", ["dst"]],
                        ["ternary", ["p1", "p2", "p3"]],
                        ["range", ["ignored"]]
                    ]
                }
            },
            "actions": {
                "a1": {"op_num": 3},
                "a2": {"op_num": 2},
                "set_port_0": {"op_num": 5}
            }
        }"#;
        serde_json::from_str(text).expect("valid gress")
    }

    #[test]
    fn known_table_vector() {
        let gress = described_gress();
        let vector = table_features(&gress.tables["t1"], &gress.actions);
        assert_eq!(vector, [4.0, 3.0, 0.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn match_kinds_count_their_keys_and_others_are_ignored() {
        let gress = described_gress();
        let vector = table_features(&gress.tables["wide"], &gress.actions);
        assert_eq!(vector, [16.0, 5.0, 1.0, 0.0, 3.0, 0.0]);
    }

    #[test]
    fn unknown_flag_set_exactly_when_all_fields_are_zero() {
        let empty = TableDescription::default();
        let vector = table_features(&empty, &HashMap::new());
        assert_eq!(vector, unknown_features());

        let gress = described_gress();
        for vector in node_features(
            &["t1".into(), "wide".into(), "mystery".into()],
            &gress,
        ) {
            let structural_sum: f64 = vector[..5].iter().sum();
            assert_eq!(vector[5] == 1.0, structural_sum == 0.0);
        }
    }

    #[test]
    fn action_table_nodes_resolve_through_their_action() {
        let gress = described_gress();
        let vectors = node_features(&["tbl_set_port_0".into()], &gress);
        assert_eq!(vectors, vec![[0.0, 5.0, 0.0, 0.0, 0.0, 0.0]]);
    }

    #[test]
    fn action_table_without_matching_action_is_unknown() {
        let gress = described_gress();
        let vectors = node_features(&["tbl_nothing_like_this".into()], &gress);
        assert_eq!(vectors, vec![unknown_features()]);
    }

    #[test]
    fn unmatched_plain_node_is_unknown() {
        let gress = described_gress();
        let vectors = node_features(&["mystery".into()], &gress);
        assert_eq!(vectors, vec![unknown_features()]);
    }

    #[test]
    fn vectors_follow_node_order() {
        let gress = described_gress();
        let vectors = node_features(&["mystery".into(), "t1".into()], &gress);
        assert_eq!(vectors[0], unknown_features());
        assert_eq!(vectors[1], [4.0, 3.0, 0.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn empty_description_marks_everything_unknown() {
        let desc = ProgramDescription::default();
        let vectors = node_features(&["a".into(), "tbl_b".into()], &desc.ingress);
        assert!(vectors.iter().all(|v| *v == unknown_features()));
    }
}
