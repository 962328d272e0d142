//! Directed table graph construction from a parsed dependency summary.
use std::collections::HashMap;

use tracing::debug;

use crate::depgraph::{encoder, DependencySummary};
use crate::error::{Error, Result};

/// Index-based edge-list representation of a table dependency graph.
///
/// `nodes` lists table names in first-discovery order over the edges that were
/// actually added; `edge_index` holds source and destination indices into
/// `nodes` as two parallel arrays; `edge_attr` holds one rendered dependency
/// bitmask per edge, in matching order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableGraph {
    pub nodes: Vec<String>,
    pub edge_index: [Vec<usize>; 2],
    pub edge_attr: Vec<String>,
}

impl TableGraph {
    /// Builds the graph from a parsed summary.
    ///
    /// Matrix cell `[i][j]` describes the dependency of row table `i` on
    /// column table `j`: an alphabetic label resolves through the legend and
    /// adds a directed edge `tables[j] -> tables[i]`; anything else means no
    /// dependency. A label missing from the legend is a fatal error, as is a
    /// column index beyond the table list. Duplicate `(src, dst)` pairs merge
    /// by ORing their masks. Tables with no incident edges do not appear in
    /// the graph.
    pub fn from_summary(summary: &DependencySummary) -> Result<TableGraph> {
        let mut nodes: Vec<String> = Vec::new();
        let mut node_ids: HashMap<String, usize> = HashMap::new();
        let mut edges: Vec<(usize, usize, u32)> = Vec::new();
        let mut edge_slots: HashMap<(usize, usize), usize> = HashMap::new();

        let mut intern = |name: &str, nodes: &mut Vec<String>| -> usize {
            if let Some(&id) = node_ids.get(name) {
                return id;
            }
            let id = nodes.len();
            nodes.push(name.to_owned());
            node_ids.insert(name.to_owned(), id);
            id
        };

        for (i, row) in summary.matrix.iter().enumerate() {
            for (j, &label) in row.iter().enumerate() {
                if !label.is_alphabetic() {
                    continue;
                }
                if j >= summary.tables.len() {
                    return Err(Error::Summary(format!(
                        "row {i} has a label in column {j} but only {} tables are declared",
                        summary.tables.len()
                    )));
                }
                let kinds = summary
                    .legend
                    .resolve(label)
                    .ok_or(Error::UnresolvedLabel { label })?;
                let mask = encoder::encode(kinds);

                let src = intern(&summary.tables[j], &mut nodes);
                let dst = intern(&summary.tables[i], &mut nodes);
                match edge_slots.get(&(src, dst)) {
                    Some(&slot) => edges[slot].2 |= mask,
                    None => {
                        edge_slots.insert((src, dst), edges.len());
                        edges.push((src, dst, mask));
                    }
                }
            }
        }

        for table in &summary.tables {
            if !node_ids.contains_key(table) {
                debug!("table '{table}' has no dependencies; dropped from graph");
            }
        }

        let mut graph = TableGraph {
            nodes,
            ..TableGraph::default()
        };
        for (src, dst, mask) in edges {
            graph.edge_index[0].push(src);
            graph.edge_index[1].push(dst);
            graph.edge_attr.push(encoder::decode_display(mask));
        }
        Ok(graph)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_attr.len()
    }
}
