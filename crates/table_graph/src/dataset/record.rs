//! The persisted per-program dataset record.
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::depgraph::TableGraph;
use crate::error::{Error, Result};
use crate::features::FeatureVector;

/// Number of scalar performance labels per record.
pub const LABEL_LEN: usize = 4;

/// Performance labels:
/// `[mau_stage_count, ingress_latency_cycles, sram_count, tcam_count]`.
pub type LabelVector = [f64; LABEL_LEN];

/// One compiled program's dataset record: graph skeleton, node features,
/// performance labels, and (after normalization) normalized copies.
///
/// Optional fields are omitted from the JSON while absent, so a record is
/// readable at every stage of the pipeline. `node_attr` rows follow `nodes`
/// order; `edge_attr` follows the `edge_index` column order.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ProgramRecord {
    pub nodes: Vec<String>,
    pub edge_index: [Vec<usize>; 2],
    pub edge_attr: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_attr: Option<Vec<FeatureVector>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<LabelVector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_attr_normalized: Option<Vec<FeatureVector>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_normalized: Option<LabelVector>,
}

impl ProgramRecord {
    /// Starts a record from a built graph skeleton.
    pub fn from_graph(graph: TableGraph) -> Self {
        Self {
            nodes: graph.nodes,
            edge_index: graph.edge_index,
            edge_attr: graph.edge_attr,
            ..Self::default()
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Writes the record as pretty JSON, atomically: the full serialization
    /// lands in a sibling temp file which then replaces the target, so a
    /// record on disk is never partially written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;

        let file_name = path
            .file_name()
            .ok_or_else(|| Error::Other(format!("record path '{}' has no file name", path.display())))?;
        let mut tmp_name = file_name.to_owned();
        tmp_name.push(".tmp");
        let tmp = path.with_file_name(tmp_name);

        fs::write(&tmp, text)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// True once both features and labels are attached; only such records
    /// participate in normalization.
    pub fn is_complete(&self) -> bool {
        self.node_attr.is_some() && self.y.is_some()
    }
}
