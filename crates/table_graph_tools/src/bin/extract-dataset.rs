//! Assembles a record for every compiled program under a root directory and
//! collects the records into one flat dataset directory.
//!
//! Usage: `extract-dataset [ROOT] [OUT_DIR]` (defaults: `.` and `dataset`).
//! The analysis tool defaults to `p4lacpp` on `PATH`; override with the
//! `TABLE_GRAPH_ANALYZER` environment variable, or set it empty to skip
//! feature extraction.
use std::env;
use std::path::PathBuf;

use table_graph::prelude::*;
use table_graph_tools::init_tracing;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut args = env::args().skip(1);
    let root = PathBuf::from(args.next().unwrap_or_else(|| ".".into()));
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "dataset".into()));

    let analyzer = match env::var("TABLE_GRAPH_ANALYZER") {
        Ok(value) if value.is_empty() => None,
        Ok(value) => Some(PathBuf::from(value)),
        Err(_) => Some(PathBuf::from("p4lacpp")),
    };

    let layout = ProgramLayout::default();
    let summary = process_corpus(&root, &layout, analyzer.as_deref())?;

    for outcome in &summary.outcomes {
        match &outcome.status {
            ProgramStatus::Assembled { features } => {
                println!("ok   {} (features: {features})", outcome.dir.display());
            }
            ProgramStatus::Failed(reason) => {
                println!("FAIL {}: {reason}", outcome.dir.display());
            }
        }
    }
    println!(
        "{} assembled, {} failed",
        summary.assembled(),
        summary.failed()
    );

    let copied = collect_dataset(&root, &out_dir, &layout)?;
    println!("{copied} records collected into {}", out_dir.display());
    Ok(())
}
