//! Per-program record assembly and corpus collection.
//!
//! One compiled-program directory holds the compiler's artifacts in a fixed
//! layout. Assembly reads the dependency log, the analysis-tool description,
//! and the two resource reports, and writes the program's record; collection
//! copies every record into one flat dataset directory.
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::dataset::record::{LabelVector, ProgramRecord};
use crate::depgraph::{parse_summary, TableGraph};
use crate::error::Result;
use crate::features::{describe_program, node_features};

/// Relative locations of the compiler artifacts inside one program directory.
#[derive(Clone, Debug)]
pub struct ProgramLayout {
    /// Marker file whose presence identifies a program directory.
    pub marker: PathBuf,
    /// Program source handed to the analysis tool.
    pub source: PathBuf,
    /// The compiler's table dependency summary log.
    pub dependency_log: PathBuf,
    /// Resources report (MAU stage usage).
    pub resources: PathBuf,
    /// Metrics report (latency, SRAM/TCAM counts).
    pub metrics: PathBuf,
    /// Description artifact the analysis tool is asked to write.
    pub description: PathBuf,
    /// The record file written by assembly.
    pub record: PathBuf,
}

impl Default for ProgramLayout {
    fn default() -> Self {
        Self {
            marker: "smith.p4".into(),
            source: "opt.p4".into(),
            dependency_log: "smith.tofino/pipe/logs/table_dependency_summary.log".into(),
            resources: "smith.tofino/pipe/logs/resources.json".into(),
            metrics: "smith.tofino/pipe/metrics.json".into(),
            description: "node_features.json".into(),
            record: "data.json".into(),
        }
    }
}

impl ProgramLayout {
    fn resolve(&self, dir: &Path, relative: &Path) -> PathBuf {
        dir.join(relative)
    }
}

/// The gress whose latency entries contribute to the label vector.
const INGRESS: &str = "ingress";

#[derive(Debug, Default, Deserialize)]
struct ResourcesReport {
    #[serde(default)]
    resources: ResourcesSection,
}

#[derive(Debug, Default, Deserialize)]
struct ResourcesSection {
    #[serde(default)]
    mau: MauResources,
}

#[derive(Debug, Default, Deserialize)]
struct MauResources {
    #[serde(default)]
    mau_stages: Vec<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct MetricsReport {
    #[serde(default)]
    mau: MauMetrics,
}

#[derive(Debug, Default, Deserialize)]
struct MauMetrics {
    #[serde(default)]
    latency: Vec<LatencyEntry>,
    #[serde(default)]
    srams: u64,
    #[serde(default)]
    tcams: u64,
}

#[derive(Debug, Default, Deserialize)]
struct LatencyEntry {
    #[serde(default)]
    gress: String,
    #[serde(default)]
    cycles: u64,
}

/// Number of allocated MAU stages, from the resources report.
fn read_stage_count(path: &Path) -> Result<usize> {
    let text = fs::read_to_string(path)?;
    let report: ResourcesReport = serde_json::from_str(&text)?;
    Ok(report.resources.mau.mau_stages.len())
}

fn read_mau_metrics(path: &Path) -> Result<MauMetrics> {
    let text = fs::read_to_string(path)?;
    let report: MetricsReport = serde_json::from_str(&text)?;
    Ok(report.mau)
}

/// Reads the label vector for one program directory.
///
/// A missing or malformed report is logged and contributes zero to the
/// affected fields; labels never fail assembly.
pub fn read_labels(dir: &Path, layout: &ProgramLayout) -> LabelVector {
    let mut labels = [0.0; crate::dataset::record::LABEL_LEN];

    let resources = layout.resolve(dir, &layout.resources);
    match read_stage_count(&resources) {
        Ok(stages) => labels[0] = stages as f64,
        Err(e) => warn!(
            "no stage count from '{}': {e}; label left at 0",
            resources.display()
        ),
    }

    let metrics = layout.resolve(dir, &layout.metrics);
    match read_mau_metrics(&metrics) {
        Ok(mau) => {
            let cycles: u64 = mau
                .latency
                .iter()
                .filter(|entry| entry.gress == INGRESS)
                .map(|entry| entry.cycles)
                .sum();
            labels[1] = cycles as f64;
            labels[2] = mau.srams as f64;
            labels[3] = mau.tcams as f64;
        }
        Err(e) => warn!(
            "no metrics from '{}': {e}; labels left at 0",
            metrics.display()
        ),
    }

    labels
}

/// Tagged result of assembling one program directory.
#[derive(Clone, Debug)]
pub struct ProgramOutcome {
    pub dir: PathBuf,
    pub status: ProgramStatus,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgramStatus {
    /// Record written. `features` is false when the analysis tool failed and
    /// the record carries no `node_attr`.
    Assembled { features: bool },
    /// No record written; the reason is preserved for the batch summary.
    Failed(String),
}

/// Assembles and writes one program's record.
///
/// The dependency graph is the only fatal input: a corrupt summary fails this
/// program. A missing summary yields a degenerate (empty-graph) record; a
/// failing analysis tool yields a record without node features; missing
/// resource reports yield zero labels. `tool` is the analysis executable, or
/// `None` to skip feature extraction.
pub fn assemble_program(
    dir: &Path,
    layout: &ProgramLayout,
    tool: Option<&Path>,
) -> ProgramOutcome {
    let failed = |detail: String| ProgramOutcome {
        dir: dir.to_owned(),
        status: ProgramStatus::Failed(detail),
    };

    let log_path = layout.resolve(dir, &layout.dependency_log);
    let graph = if log_path.is_file() {
        let text = match fs::read_to_string(&log_path) {
            Ok(text) => text,
            Err(e) => return failed(format!("unreadable dependency log: {e}")),
        };
        let summary = match parse_summary(&text) {
            Ok(summary) => summary,
            Err(e) => return failed(format!("dependency summary: {e}")),
        };
        match TableGraph::from_summary(&summary) {
            Ok(graph) => graph,
            Err(e) => return failed(format!("graph construction: {e}")),
        }
    } else {
        warn!(
            "'{}' missing; writing a degenerate record",
            log_path.display()
        );
        TableGraph::default()
    };

    let mut record = ProgramRecord::from_graph(graph);

    let mut features = false;
    if let Some(tool) = tool {
        let source = layout.resolve(dir, &layout.source);
        let description_path = layout.resolve(dir, &layout.description);
        match describe_program(tool, &source, &description_path) {
            Ok(description) => {
                record.node_attr = Some(node_features(&record.nodes, &description.ingress));
                features = true;
            }
            Err(e) => error!(
                "feature extraction failed for '{}': {e}; record left without node features",
                dir.display()
            ),
        }
    }

    record.y = Some(read_labels(dir, layout));

    let record_path = layout.resolve(dir, &layout.record);
    if let Err(e) = record.save(&record_path) {
        return failed(format!("record write: {e}"));
    }

    ProgramOutcome {
        dir: dir.to_owned(),
        status: ProgramStatus::Assembled { features },
    }
}

/// Per-item outcomes of one corpus run.
#[derive(Clone, Debug, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<ProgramOutcome>,
}

impl BatchSummary {
    pub fn assembled(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ProgramStatus::Assembled { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.assembled()
    }
}

/// Walks `root` for program directories (those containing the layout's
/// marker file), sorted for deterministic processing order.
pub(crate) fn find_program_dirs(root: &Path, marker: &Path) -> Result<Vec<PathBuf>> {
    // BTreeSet keeps the walk order stable across platforms.
    let mut found = BTreeSet::new();
    let mut pending = vec![root.to_owned()];
    while let Some(dir) = pending.pop() {
        if dir.join(marker).is_file() {
            found.insert(dir.clone());
        }
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            }
        }
    }
    Ok(found.into_iter().collect())
}

/// Assembles every program directory under `root`.
///
/// One item's failure never halts the run; every directory gets a tagged
/// outcome and a log line.
pub fn process_corpus(
    root: &Path,
    layout: &ProgramLayout,
    tool: Option<&Path>,
) -> Result<BatchSummary> {
    let dirs = find_program_dirs(root, &layout.marker)?;
    info!("assembling {} program directories", dirs.len());

    let mut summary = BatchSummary::default();
    for dir in dirs {
        let outcome = assemble_program(&dir, layout, tool);
        match &outcome.status {
            ProgramStatus::Assembled { features } => {
                info!("assembled '{}' (features: {features})", dir.display());
            }
            ProgramStatus::Failed(reason) => {
                warn!("failed '{}': {reason}", dir.display());
            }
        }
        summary.outcomes.push(outcome);
    }
    Ok(summary)
}

/// Copies every program record into `out_dir`, keyed by the source
/// directory's base name. Directories already inside `out_dir` are skipped,
/// so collection never recurses into its own output.
pub fn collect_dataset(root: &Path, out_dir: &Path, layout: &ProgramLayout) -> Result<usize> {
    fs::create_dir_all(out_dir)?;
    // Path-form differences (`./dataset` vs `dataset`) must not defeat the
    // self-output guard; compare canonical forms.
    let out_canonical = fs::canonicalize(out_dir)?;

    let mut copied = 0;
    for dir in find_program_dirs(root, &layout.marker)? {
        if fs::canonicalize(&dir)?.starts_with(&out_canonical) {
            continue;
        }
        let record = layout.resolve(&dir, &layout.record);
        if !record.is_file() {
            continue;
        }
        let Some(base) = dir.file_name() else {
            continue;
        };
        let mut target_name = base.to_owned();
        target_name.push(".json");
        fs::copy(&record, out_dir.join(target_name))?;
        copied += 1;
    }
    info!("collected {copied} records into '{}'", out_dir.display());
    Ok(copied)
}
