//! Module: codec::bounds
//! Responsibility: byte-size constants of the shared key layout.
//! Does not own: parsing logic.
//! Boundary: consumed by the component core and the adapters.

pub(super) const TOTAL_SIZE_LEN: usize = 4;
pub(super) const COUNT_LEN: usize = 4;
pub(super) const HEADER_LEN: usize = TOTAL_SIZE_LEN + COUNT_LEN;

pub(super) const TYPE_CODE_LEN: usize = 1;
pub(super) const LEN_PREFIX_LEN: usize = 4;

pub(super) const DECIMAL_SCALE_LEN: usize = 4;
pub(super) const DECIMAL_MAX_UNSCALED_LEN: usize = 16;
pub(super) const DECIMAL_MAX_SCALE: u32 = 28;

pub(super) const LINK_CLUSTER_LEN: usize = 2;
pub(super) const LINK_WIDTH_LEN: usize = 1;
pub(super) const LINK_MAX_POSITION_LEN: usize = 8;

/// Maximum nesting of composites accepted by the wire decoder.
pub const MAX_WIRE_DEPTH: usize = 8;
