//! Produces compiled-program directories by running the external synthesizer
//! and compiler under a bounded worker pool until the target count of clean
//! compiles is reached.
//!
//! Usage: `harvest TARGET SYNTHESIZER COMPILER [WORKERS] [ROOT]`.
use std::env;
use std::path::PathBuf;

use anyhow::Context;
use table_graph::prelude::*;
use table_graph_tools::init_tracing;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut args = env::args().skip(1);
    let target: usize = args
        .next()
        .context("usage: harvest TARGET SYNTHESIZER COMPILER [WORKERS] [ROOT]")?
        .parse()
        .context("TARGET must be a number")?;
    let synthesizer = PathBuf::from(args.next().context("missing SYNTHESIZER path")?);
    let compiler = PathBuf::from(args.next().context("missing COMPILER path")?);

    let mut config = HarvestConfig::new(synthesizer, compiler, target);
    if let Some(workers) = args.next() {
        config = config.with_workers(workers.parse().context("WORKERS must be a number")?);
    }
    if let Some(root) = args.next() {
        config = config.with_root(root);
    }

    let report = table_graph::harvest::run(&config)?;
    println!(
        "{} programs produced in {} attempts",
        report.produced.len(),
        report.attempts
    );
    for dir in &report.produced {
        println!("  {}", dir.display());
    }
    Ok(())
}
