#![forbid(unsafe_code)]
//! table_graph: performance-prediction dataset extraction for compiled
//! switch programs.
//!
//! Modules:
//! - depgraph: parse compiler dependency summaries, encode dependency kinds
//!   as bitmasks, and build directed table graphs
//! - features: per-node structural feature vectors from the analysis tool's
//!   table/action description
//! - dataset: per-program record assembly, corpus collection, and z-score
//!   normalization
//! - harvest: worker-pool orchestration of the external synthesizer and
//!   compiler
pub mod dataset;
pub mod depgraph;
pub mod error;
pub mod features;
pub mod harvest;

/// Convenient re-exports for common types. Import with `use table_graph::prelude::*;`.
pub mod prelude {
    pub use crate::dataset::assemble::{
        assemble_program, collect_dataset, process_corpus, read_labels, BatchSummary,
        ProgramLayout, ProgramOutcome, ProgramStatus,
    };
    pub use crate::dataset::normalize::{
        compute_statistics, normalize_corpus, normalize_file, normalize_record,
        CorpusStatistics, STATISTICS_FILE,
    };
    pub use crate::dataset::record::{LabelVector, ProgramRecord, LABEL_LEN};
    pub use crate::depgraph::encoder::{decode_display, encode, parse_display};
    pub use crate::depgraph::{
        parse_summary, DependencyKind, DependencyLegend, DependencySummary, TableGraph,
        MASK_BITS,
    };
    pub use crate::error::{Error, Result};
    pub use crate::features::{
        describe_program, node_features, table_features, FeatureVector, GressDescription,
        ProgramDescription, FEATURE_LEN,
    };
    pub use crate::harvest::{prune_failed_programs, HarvestConfig, HarvestReport};
}
