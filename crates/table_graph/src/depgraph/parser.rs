//! Parser for the compiler's table dependency summary log.
//!
//! The log is free text: stage banners, a matrix of single-character
//! dependency labels (one row per table, one column per earlier table), and a
//! `#dependencies` legend section mapping each label character to a list of
//! dependency-kind tokens.
//!
//! Typical usage:
//! - [`parse_summary`] on the full log text, then
//!   [`TableGraph::from_summary`](crate::depgraph::TableGraph::from_summary).
use crate::depgraph::DependencyLegend;
use crate::error::Result;

/// Marker line that opens the legend section.
const LEGEND_MARKER: &str = "#dependencies";

/// Separator between a row's label prefix and its table description.
const ROW_SEPARATOR: char = '^';

/// Parsed form of one dependency summary: the tables in row order, the
/// label matrix (row i holds the labels of table i's inbound dependencies,
/// one column per table), and the legend scoped to this file.
#[derive(Clone, Debug, Default)]
pub struct DependencySummary {
    pub tables: Vec<String>,
    pub matrix: Vec<Vec<char>>,
    pub legend: DependencyLegend,
}

/// Parses a dependency summary log into tables, label matrix, and legend.
///
/// Lines are scanned sequentially. Once the legend marker is seen, every
/// remaining `key : tokens` line feeds the legend; a legend token outside the
/// dependency vocabulary aborts the parse. Before the legend, stage and
/// pipeline banners, separators, comments, and blank lines are skipped, and
/// any line containing the `^` separator is taken as a matrix row.
pub fn parse_summary(text: &str) -> Result<DependencySummary> {
    let mut summary = DependencySummary::default();
    let mut in_legend = false;

    for raw in text.lines() {
        let line = raw.trim();

        if line.starts_with(LEGEND_MARKER) {
            in_legend = true;
            continue;
        }

        if in_legend {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, tokens)) = line.split_once(':') else {
                continue;
            };
            summary.legend.insert(key.trim(), tokens.trim())?;
            continue;
        }

        if line.starts_with("#stage")
            || line.starts_with("#pipeline")
            || line.starts_with("***")
            || line.starts_with('#')
            || line.is_empty()
        {
            continue;
        }

        if let Some((prefix, rest)) = line.split_once(ROW_SEPARATOR) {
            summary.matrix.push(row_labels(prefix));
            summary.tables.push(row_table_name(rest));
        }
    }

    Ok(summary)
}

/// One label per table column: the prefix with whitespace and the `-`
/// placeholder stripped.
fn row_labels(prefix: &str) -> Vec<char> {
    prefix
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// The table name for a row: everything after the separator up to the first
/// `:`, then after the final `-`, with parenthetical annotations removed.
fn row_table_name(rest: &str) -> String {
    let described = rest.split(':').next().unwrap_or("").trim();
    let name = described.rsplit('-').next().unwrap_or("").trim();
    clean_node_name(name)
}

/// Strips `(...)` annotations and surrounding whitespace from a table name.
fn clean_node_name(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    let mut in_parens = false;
    for c in raw.chars() {
        match c {
            '(' if !in_parens => in_parens = true,
            ')' if in_parens => in_parens = false,
            _ if !in_parens => cleaned.push(c),
            _ => {}
        }
    }
    cleaned.trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depgraph::DependencyKind;
    use crate::error::Error;

    const SUMMARY: &str = "\
#pipeline ingress
#stage 0
***************
AB ^ 0 - t_forward (stage 0) : exact
-- ^ 1 - tbl_drop : ternary

#dependencies
# label : kinds
A : IXBAR_READ OUTPUT
B : CONTROL_TABLE_HIT
";

    #[test]
    fn parses_tables_matrix_and_legend() {
        let summary = parse_summary(SUMMARY).expect("valid summary");

        assert_eq!(summary.tables, vec!["t_forward", "tbl_drop"]);
        assert_eq!(summary.matrix, vec![vec!['A', 'B'], Vec::new()]);
        assert_eq!(
            summary.legend.resolve('A'),
            Some([DependencyKind::IxbarRead, DependencyKind::Output].as_slice())
        );
        assert_eq!(
            summary.legend.resolve('B'),
            Some([DependencyKind::ControlTableHit].as_slice())
        );
    }

    #[test]
    fn unknown_legend_token_aborts_the_parse() {
        let text = "#dependencies\nA : SOMETHING_ELSE\n";
        let err = parse_summary(text).expect_err("must abort");
        assert!(matches!(err, Error::UnknownDependency { token } if token == "SOMETHING_ELSE"));
    }

    #[test]
    fn table_name_takes_segment_after_final_dash() {
        let text = "- ^ 3 - cond-12 : true\n";
        let summary = parse_summary(text).expect("valid row");
        assert_eq!(summary.tables, vec!["12"]);
    }

    #[test]
    fn parenthetical_annotations_are_removed() {
        assert_eq!(clean_node_name("t_forward (stage 0)"), "t_forward");
        assert_eq!(clean_node_name("plain"), "plain");
        assert_eq!(clean_node_name("a (x) b (y)"), "a  b");
    }

    #[test]
    fn comment_and_banner_lines_are_skipped() {
        let text = "#stage 1\n***---***\n# note\n\n";
        let summary = parse_summary(text).expect("nothing to parse");
        assert!(summary.tables.is_empty());
        assert!(summary.matrix.is_empty());
        assert!(summary.legend.is_empty());
    }

    #[test]
    fn legend_lines_without_separator_are_skipped() {
        let text = "#dependencies\nnot a legend line\nA : NONE\n";
        let summary = parse_summary(text).expect("valid legend");
        assert_eq!(
            summary.legend.resolve('A'),
            Some([DependencyKind::None].as_slice())
        );
    }
}
