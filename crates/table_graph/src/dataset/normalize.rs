//! Corpus-wide z-score normalization of node features and labels.
//!
//! Two passes over the flat dataset directory: pass 1 stacks every complete
//! record's feature rows and label vector, computes column-wise mean and
//! standard deviation, and persists them; pass 2 rewrites each record with
//! normalized copies under separate field names. The source fields are kept,
//! so re-running pass 2 with the same statistics is idempotent. Each file is
//! rewritten independently; a crash mid-pass leaves a partially normalized
//! corpus, which a rerun completes.
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::dataset::record::{ProgramRecord, LABEL_LEN};
use crate::error::{Error, Result};
use crate::features::FEATURE_LEN;

/// File the statistics are persisted to, alongside the dataset. Consumers of
/// normalized data use it to de-normalize predictions.
pub const STATISTICS_FILE: &str = "corpus_stats.json";

/// Column-wise mean and standard deviation over the whole corpus.
///
/// Standard deviations are never 0: zero-variance columns are clamped to 1 so
/// normalization cannot divide by zero.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct CorpusStatistics {
    pub node_mean: Vec<f64>,
    pub node_std: Vec<f64>,
    pub label_mean: Vec<f64>,
    pub label_std: Vec<f64>,
}

impl CorpusStatistics {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }
}

/// Column-wise mean and population standard deviation, with zero columns
/// clamped to 1. All rows must share `width`.
fn column_statistics(rows: &[Vec<f64>], width: usize) -> (Vec<f64>, Vec<f64>) {
    let n = rows.len() as f64;
    let mut mean = vec![0.0; width];
    for row in rows {
        for (m, v) in mean.iter_mut().zip(row) {
            *m += v;
        }
    }
    for m in &mut mean {
        *m /= n;
    }

    let mut std = vec![0.0; width];
    for row in rows {
        for ((s, v), m) in std.iter_mut().zip(row).zip(&mean) {
            *s += (v - m) * (v - m);
        }
    }
    for s in &mut std {
        *s = (*s / n).sqrt();
        if *s == 0.0 {
            *s = 1.0;
        }
    }

    (mean, std)
}

/// Record files eligible for normalization, in stable order. Records lacking
/// features or labels are excluded and logged per file.
fn eligible_records(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_none_or(|ext| ext != "json") {
            continue;
        }
        if path.file_name().is_some_and(|name| name == STATISTICS_FILE) {
            continue;
        }
        paths.push(path);
    }
    paths.sort();
    Ok(paths)
}

/// Pass 1: loads every complete record under `dir` and computes the corpus
/// statistics. Returns the statistics and the files that contributed.
pub fn compute_statistics(dir: &Path) -> Result<(CorpusStatistics, Vec<PathBuf>)> {
    let mut node_rows: Vec<Vec<f64>> = Vec::new();
    let mut label_rows: Vec<Vec<f64>> = Vec::new();
    let mut contributing = Vec::new();

    for path in eligible_records(dir)? {
        let record = match ProgramRecord::load(&path) {
            Ok(record) => record,
            Err(e) => {
                warn!("skipping unreadable record '{}': {e}", path.display());
                continue;
            }
        };
        let (Some(node_attr), Some(y)) = (&record.node_attr, &record.y) else {
            warn!(
                "skipping '{}': missing node features or labels",
                path.display()
            );
            continue;
        };
        node_rows.extend(node_attr.iter().map(|v| v.to_vec()));
        label_rows.push(y.to_vec());
        contributing.push(path);
    }

    if node_rows.is_empty() || label_rows.is_empty() {
        return Err(Error::Other(format!(
            "no records with both node features and labels under '{}'",
            dir.display()
        )));
    }

    let (node_mean, node_std) = column_statistics(&node_rows, FEATURE_LEN);
    let (label_mean, label_std) = column_statistics(&label_rows, LABEL_LEN);
    info!(
        "statistics over {} records ({} node rows)",
        label_rows.len(),
        node_rows.len()
    );

    Ok((
        CorpusStatistics {
            node_mean,
            node_std,
            label_mean,
            label_std,
        },
        contributing,
    ))
}

/// Pass 2 for one record: fills the `*_normalized` fields from the preserved
/// source fields. Does nothing for fields the record does not carry.
pub fn normalize_record(record: &mut ProgramRecord, stats: &CorpusStatistics) {
    if let Some(node_attr) = &record.node_attr {
        let normalized = node_attr
            .iter()
            .map(|row| {
                let mut out = *row;
                for (i, value) in out.iter_mut().enumerate() {
                    *value = (*value - stats.node_mean[i]) / stats.node_std[i];
                }
                out
            })
            .collect();
        record.node_attr_normalized = Some(normalized);
    }

    if let Some(y) = &record.y {
        let mut normalized = *y;
        for (i, value) in normalized.iter_mut().enumerate() {
            *value = (*value - stats.label_mean[i]) / stats.label_std[i];
        }
        record.y_normalized = Some(normalized);
    }
}

/// Pass 2 for one file: read, normalize, rewrite in place.
pub fn normalize_file(path: &Path, stats: &CorpusStatistics) -> Result<()> {
    let mut record = ProgramRecord::load(path)?;
    normalize_record(&mut record, stats);
    record.save(path)
}

/// Runs both passes over the flat dataset directory and persists the
/// statistics next to it.
pub fn normalize_corpus(dir: &Path) -> Result<CorpusStatistics> {
    let (stats, paths) = compute_statistics(dir)?;
    stats.save(&dir.join(STATISTICS_FILE))?;

    for path in &paths {
        normalize_file(path, &stats)?;
    }
    info!("normalized {} records", paths.len());
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn scratch_dir(tag: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let dir = std::env::temp_dir().join(format!(
            "table_graph_normalize_{tag}_{}_{}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir_all(&dir).expect("scratch dir");
        dir
    }

    fn record_with(node_attr: Vec<[f64; 6]>, y: [f64; 4]) -> ProgramRecord {
        ProgramRecord {
            nodes: (0..node_attr.len()).map(|i| format!("t{i}")).collect(),
            node_attr: Some(node_attr),
            y: Some(y),
            ..ProgramRecord::default()
        }
    }

    #[test]
    fn column_statistics_match_hand_computation() {
        let rows = vec![vec![1.0, 10.0], vec![3.0, 10.0]];
        let (mean, std) = column_statistics(&rows, 2);
        assert_eq!(mean, vec![2.0, 10.0]);
        // Population std of {1, 3} is 1; the zero column clamps to 1.
        assert_eq!(std, vec![1.0, 1.0]);
    }

    #[test]
    fn zero_variance_columns_never_stay_zero() {
        let dir = scratch_dir("clamp");
        record_with(vec![[2.0, 0.0, 0.0, 0.0, 0.0, 1.0]], [5.0, 5.0, 5.0, 5.0])
            .save(&dir.join("a.json"))
            .unwrap();
        record_with(vec![[2.0, 0.0, 0.0, 0.0, 0.0, 1.0]], [5.0, 5.0, 5.0, 5.0])
            .save(&dir.join("b.json"))
            .unwrap();

        let (stats, _) = compute_statistics(&dir).expect("statistics");
        assert!(stats.node_std.iter().all(|s| *s != 0.0));
        assert!(stats.label_std.iter().all(|s| *s != 0.0));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn incomplete_records_are_excluded() {
        let dir = scratch_dir("exclude");
        record_with(vec![[1.0, 0.0, 0.0, 0.0, 0.0, 0.0]], [1.0, 2.0, 3.0, 4.0])
            .save(&dir.join("complete.json"))
            .unwrap();
        let mut incomplete = record_with(vec![[9.0; 6]], [9.0; 4]);
        incomplete.y = None;
        incomplete.save(&dir.join("incomplete.json")).unwrap();

        let (_, contributing) = compute_statistics(&dir).expect("statistics");
        assert_eq!(contributing.len(), 1);
        assert!(contributing[0].ends_with("complete.json"));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn normalization_centers_the_corpus() {
        let dir = scratch_dir("center");
        record_with(vec![[1.0, 0.0, 0.0, 0.0, 0.0, 0.0]], [10.0, 0.0, 0.0, 0.0])
            .save(&dir.join("a.json"))
            .unwrap();
        record_with(vec![[3.0, 0.0, 0.0, 0.0, 0.0, 0.0]], [20.0, 0.0, 0.0, 0.0])
            .save(&dir.join("b.json"))
            .unwrap();

        normalize_corpus(&dir).expect("normalizes");

        let a = ProgramRecord::load(&dir.join("a.json")).unwrap();
        let b = ProgramRecord::load(&dir.join("b.json")).unwrap();
        assert_eq!(a.node_attr_normalized.unwrap()[0][0], -1.0);
        assert_eq!(b.node_attr_normalized.unwrap()[0][0], 1.0);
        assert_eq!(a.y_normalized.unwrap()[0], -1.0);
        assert_eq!(b.y_normalized.unwrap()[0], 1.0);

        let stats = CorpusStatistics::load(&dir.join(STATISTICS_FILE)).expect("persisted");
        assert_eq!(stats.node_mean[0], 2.0);
        assert_eq!(stats.label_mean[0], 15.0);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn pass_two_is_idempotent() {
        let dir = scratch_dir("idempotent");
        record_with(vec![[1.0, 2.0, 0.0, 0.0, 0.0, 0.0]], [10.0, 1.0, 2.0, 3.0])
            .save(&dir.join("a.json"))
            .unwrap();
        record_with(vec![[5.0, 4.0, 0.0, 0.0, 0.0, 0.0]], [30.0, 3.0, 4.0, 5.0])
            .save(&dir.join("b.json"))
            .unwrap();

        let (stats, paths) = compute_statistics(&dir).expect("statistics");
        for path in &paths {
            normalize_file(path, &stats).expect("first pass");
        }
        let first: Vec<_> = paths
            .iter()
            .map(|p| ProgramRecord::load(p).unwrap())
            .collect();

        for path in &paths {
            normalize_file(path, &stats).expect("second pass");
        }
        let second: Vec<_> = paths
            .iter()
            .map(|p| ProgramRecord::load(p).unwrap())
            .collect();

        assert_eq!(first, second);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn empty_corpus_is_an_error() {
        let dir = scratch_dir("empty");
        assert!(compute_statistics(&dir).is_err());
        fs::remove_dir_all(&dir).ok();
    }
}
