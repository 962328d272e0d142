//! Normalizes a collected dataset directory: computes corpus statistics,
//! persists them, and rewrites every record with normalized fields.
//!
//! Usage: `normalize-dataset [DATASET_DIR]` (default: `dataset`).
use std::env;
use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use table_graph::prelude::*;
use table_graph_tools::init_tracing;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let dir = PathBuf::from(
        env::args()
            .nth(1)
            .unwrap_or_else(|| "dataset".into()),
    );

    let (stats, paths) = compute_statistics(&dir)?;
    stats.save(&dir.join(STATISTICS_FILE))?;
    println!("statistics written to {}", dir.join(STATISTICS_FILE).display());

    let bar = ProgressBar::new(paths.len() as u64).with_style(
        ProgressStyle::with_template("Normalizing {bar:40} {pos}/{len}")?,
    );
    for path in &paths {
        normalize_file(path, &stats)?;
        bar.inc(1);
    }
    bar.finish();

    println!("{} records normalized", paths.len());
    Ok(())
}
