//! Per-node structural feature vectors derived from the companion analysis
//! tool's table/action description of a program's ingress pipeline.
pub mod artifact;
pub mod extractor;

pub use artifact::{ActionDescription, GressDescription, ProgramDescription, TableDescription};
pub use extractor::{describe_program, node_features, table_features};

/// Number of numeric fields in a node feature vector.
pub const FEATURE_LEN: usize = 6;

/// One node's features:
/// `[size, op_num_sum, lpm_count, exact_count, ternary_count, unknown]`.
///
/// Invariant: `unknown == 1` exactly when the other five fields are all 0;
/// the node carries no structural information.
pub type FeatureVector = [f64; FEATURE_LEN];

/// The reserved vector for nodes that cannot be matched to any table or
/// action in the description artifact.
pub const fn unknown_features() -> FeatureVector {
    [0.0, 0.0, 0.0, 0.0, 0.0, 1.0]
}
