//! Module: codec::error
//! Responsibility: stable corruption reason strings for key decode.
//! Does not own: error class mapping.
//! Boundary: referenced by the component core, the adapters and tests.

pub(crate) const ERR_TRUNCATED_KEY: &str = "corrupted key: truncated key";
pub(crate) const ERR_INVALID_SIZE: &str = "corrupted key: invalid declared size";
pub(crate) const ERR_SIZE_MISMATCH: &str = "corrupted key: declared size does not match content";
pub(crate) const ERR_TOO_MANY_COMPONENTS: &str = "corrupted key: too many components";
pub(crate) const ERR_UNKNOWN_TYPE_CODE: &str = "corrupted key: unknown type code";
pub(crate) const ERR_NESTED_COMPOSITE: &str = "corrupted key: nested composite in disk key";
pub(crate) const ERR_INVALID_BOOLEAN: &str = "corrupted key: invalid boolean byte";
pub(crate) const ERR_INVALID_UTF8: &str = "corrupted key: invalid utf-8 string";
pub(crate) const ERR_OVERLONG_SEGMENT: &str = "corrupted key: overlong length prefix";
pub(crate) const ERR_INVALID_DECIMAL: &str = "corrupted key: invalid decimal";
pub(crate) const ERR_INVALID_DATE: &str = "corrupted key: date out of range";
pub(crate) const ERR_INVALID_LINK: &str = "corrupted key: invalid link position width";
pub(crate) const ERR_WIRE_DEPTH: &str = "corrupted key: wire nesting too deep";
