//! Table-dependency subsystem: parsing compiler dependency summaries,
//! encoding dependency kinds as bitmasks, and building directed table graphs.
//!
//! The compiler emits a textual summary describing, for every pair of
//! match-action tables, why one table's processing depends on the other's
//! outcome. This module turns that summary into a graph whose edges carry a
//! fixed-width bitmask over the dependency vocabulary.
pub mod builder;
pub mod encoder;
pub mod legend;
pub mod parser;

pub use builder::TableGraph;
pub use legend::DependencyLegend;
pub use parser::{parse_summary, DependencySummary};

/// Width of the dependency bitmask. Bit positions are assigned by
/// [`DependencyKind::bit`] and shared with every consumer of edge attributes.
pub const MASK_BITS: usize = 20;

/// A symbolic reason one table depends on another, with a fixed bit position.
///
/// The vocabulary is a schema shared between the encoder and all downstream
/// consumers of edge attributes; tokens, variants, and bit values are defined
/// here once. `None` occupies bit 0 and `Concurrent` maps to the zero mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    None,
    ControlAction,
    ControlCondTrue,
    ControlCondFalse,
    ControlTableHit,
    ControlTableMiss,
    ControlDefaultNextTable,
    IxbarRead,
    ActionRead,
    Output,
    ReductionOrRead,
    ReductionOrOutput,
    ContConflict,
    AntiExit,
    AntiTableRead,
    AntiActionRead,
    AntiNextTableData,
    AntiNextTableControl,
    AntiNextTableMetadata,
    ControlExit,
    Concurrent,
}

impl DependencyKind {
    /// Every kind in the vocabulary, in bit order.
    pub const ALL: [DependencyKind; 21] = [
        DependencyKind::None,
        DependencyKind::ControlAction,
        DependencyKind::ControlCondTrue,
        DependencyKind::ControlCondFalse,
        DependencyKind::ControlTableHit,
        DependencyKind::ControlTableMiss,
        DependencyKind::ControlDefaultNextTable,
        DependencyKind::IxbarRead,
        DependencyKind::ActionRead,
        DependencyKind::Output,
        DependencyKind::ReductionOrRead,
        DependencyKind::ReductionOrOutput,
        DependencyKind::ContConflict,
        DependencyKind::AntiExit,
        DependencyKind::AntiTableRead,
        DependencyKind::AntiActionRead,
        DependencyKind::AntiNextTableData,
        DependencyKind::AntiNextTableControl,
        DependencyKind::AntiNextTableMetadata,
        DependencyKind::ControlExit,
        DependencyKind::Concurrent,
    ];

    /// The bit value contributed to an edge mask. `Concurrent` contributes
    /// nothing; all other kinds occupy one of the [`MASK_BITS`] positions.
    pub fn bit(self) -> u32 {
        match self {
            DependencyKind::None => 1,
            DependencyKind::ControlAction => 1 << 1,
            DependencyKind::ControlCondTrue => 1 << 2,
            DependencyKind::ControlCondFalse => 1 << 3,
            DependencyKind::ControlTableHit => 1 << 4,
            DependencyKind::ControlTableMiss => 1 << 5,
            DependencyKind::ControlDefaultNextTable => 1 << 6,
            DependencyKind::IxbarRead => 1 << 7,
            DependencyKind::ActionRead => 1 << 8,
            DependencyKind::Output => 1 << 9,
            DependencyKind::ReductionOrRead => 1 << 10,
            DependencyKind::ReductionOrOutput => 1 << 11,
            DependencyKind::ContConflict => 1 << 12,
            DependencyKind::AntiExit => 1 << 13,
            DependencyKind::AntiTableRead => 1 << 14,
            DependencyKind::AntiActionRead => 1 << 15,
            DependencyKind::AntiNextTableData => 1 << 16,
            DependencyKind::AntiNextTableControl => 1 << 17,
            DependencyKind::AntiNextTableMetadata => 1 << 18,
            DependencyKind::ControlExit => 1 << 19,
            DependencyKind::Concurrent => 0,
        }
    }

    /// The token used for this kind in compiler legend sections.
    pub fn token(self) -> &'static str {
        match self {
            DependencyKind::None => "NONE",
            DependencyKind::ControlAction => "CONTROL_ACTION",
            DependencyKind::ControlCondTrue => "CONTROL_COND_TRUE",
            DependencyKind::ControlCondFalse => "CONTROL_COND_FALSE",
            DependencyKind::ControlTableHit => "CONTROL_TABLE_HIT",
            DependencyKind::ControlTableMiss => "CONTROL_TABLE_MISS",
            DependencyKind::ControlDefaultNextTable => "CONTROL_DEFAULT_NEXT_TABLE",
            DependencyKind::IxbarRead => "IXBAR_READ",
            DependencyKind::ActionRead => "ACTION_READ",
            DependencyKind::Output => "OUTPUT",
            DependencyKind::ReductionOrRead => "REDUCTION_OR_READ",
            DependencyKind::ReductionOrOutput => "REDUCTION_OR_OUTPUT",
            DependencyKind::ContConflict => "CONT_CONFLICT",
            DependencyKind::AntiExit => "ANTI_EXIT",
            DependencyKind::AntiTableRead => "ANTI_TABLE_READ",
            DependencyKind::AntiActionRead => "ANTI_ACTION_READ",
            DependencyKind::AntiNextTableData => "ANTI_NEXT_TABLE_DATA",
            DependencyKind::AntiNextTableControl => "ANTI_NEXT_TABLE_CONTROL",
            DependencyKind::AntiNextTableMetadata => "ANTI_NEXT_TABLE_METADATA",
            DependencyKind::ControlExit => "CONTROL_EXIT",
            DependencyKind::Concurrent => "CONCURRENT",
        }
    }

    /// Resolves a legend token to its kind, or `None` if the token is not in
    /// the vocabulary.
    pub fn from_token(token: &str) -> Option<Self> {
        DependencyKind::ALL.iter().copied().find(|k| k.token() == token)
    }
}
