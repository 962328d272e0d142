//! Serde model of the table/action description JSON emitted by the analysis
//! tool.
//!
//! Shape:
//! `{"ingress": {"tables": {name: {size, actions, matches}}, "actions": {name: {op_num}}}}`.
//! Every field is defaulted so a partially emitted artifact still
//! deserializes; unknown sections (e.g. egress) are ignored.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A match-key entry: the match kind (`lpm`, `exact`, `ternary`, ...) and the
/// key fields it covers.
pub type MatchEntry = (String, Vec<String>);

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ProgramDescription {
    #[serde(default)]
    pub ingress: GressDescription,
}

/// Tables and actions of one traffic direction.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct GressDescription {
    #[serde(default)]
    pub tables: HashMap<String, TableDescription>,
    #[serde(default)]
    pub actions: HashMap<String, ActionDescription>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TableDescription {
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub matches: Vec<MatchEntry>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ActionDescription {
    #[serde(default)]
    pub op_num: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_the_tool_output_shape() {
        let text = r#"{
            "ingress": {
                "tables": {
                    "t1": {
                        "size": 4,
                        "actions": ["a1"],
                        "matches": [["exact", ["f1", "f2"]]]
                    }
                },
                "actions": {"a1": {"op_num": 3}}
            },
            "egress": {"tables": {}, "actions": {}}
        }"#;

        let desc: ProgramDescription = serde_json::from_str(text).expect("valid artifact");
        let table = desc.ingress.tables.get("t1").expect("table present");
        assert_eq!(table.size, 4);
        assert_eq!(table.matches, vec![("exact".to_owned(), vec!["f1".into(), "f2".into()])]);
        assert_eq!(desc.ingress.actions["a1"].op_num, 3);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let desc: ProgramDescription = serde_json::from_str("{}").expect("empty artifact");
        assert!(desc.ingress.tables.is_empty());
        assert!(desc.ingress.actions.is_empty());
    }
}
