//! Core engine for keyforge: composite keys, index definitions, change
//! reconciliation and the binary key codecs.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod codec;
pub mod error;
pub mod index;
pub mod key;
pub mod obs;
pub mod serialize;
pub mod types;
pub mod value;

///
/// CONSTANTS
///

/// Maximum number of components in one composite key.
///
/// The encoded count is a `u32`; decoders reject anything above this bound
/// before allocating.
pub const MAX_KEY_COMPONENTS: usize = 255;

/// Upper bound on one encoded key, and on any length prefix inside it.
pub const MAX_KEY_BYTES: usize = 16 * 1024 * 1024;

///
/// Prelude
///
/// Domain vocabulary only. Codecs, errors and metrics stay in their modules.
///

pub mod prelude {
    pub use crate::{
        index::{
            ChangeEvent, CompositeIndexDefinition, IndexDefinition, IndexKeys, KeyDefinition,
            KeyDelta, MapIndexBy, PropertyIndexDefinition, PropertyListIndexDefinition,
            PropertyMapIndexDefinition, PropertyRefBagIndexDefinition, Record,
            SimpleKeyIndexDefinition,
        },
        key::CompositeKey,
        types::RecordId,
        value::{PropertyValue, Value},
    };
    pub use keyforge_primitives::PropertyType;
}
