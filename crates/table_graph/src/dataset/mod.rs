//! Dataset assembly and normalization: one persisted record per compiled
//! program, plus corpus-wide statistics and normalized rewrites.
pub mod assemble;
pub mod normalize;
pub mod record;

pub use assemble::{
    assemble_program, collect_dataset, process_corpus, BatchSummary, ProgramLayout,
    ProgramOutcome, ProgramStatus,
};
pub use normalize::{compute_statistics, normalize_corpus, normalize_record, CorpusStatistics};
pub use record::{LabelVector, ProgramRecord, LABEL_LEN};
