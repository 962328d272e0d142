//! Bitmask encoding of dependency-kind sets and the on-disk display form.
use crate::depgraph::DependencyKind;
use crate::error::{Error, Result};

/// ORs the bit values of every kind in the set into one mask.
///
/// `None` contributes bit 0 and `Concurrent` contributes nothing, so a purely
/// concurrent relation encodes to the zero mask.
pub fn encode(kinds: &[DependencyKind]) -> u32 {
    kinds.iter().fold(0, |mask, kind| mask | kind.bit())
}

/// Renders a mask in its on-disk edge-attribute form: natural binary digits
/// with no leading-zero padding. Consumers re-pad to [`MASK_BITS`] when
/// reconstructing a mask.
///
/// [`MASK_BITS`]: crate::depgraph::MASK_BITS
pub fn decode_display(mask: u32) -> String {
    format!("{mask:b}")
}

/// Parses the display form back into a mask.
pub fn parse_display(attr: &str) -> Result<u32> {
    u32::from_str_radix(attr, 2)
        .map_err(|e| Error::Summary(format!("invalid edge attribute '{attr}': {e}")))
}
