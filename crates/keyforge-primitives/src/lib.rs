#[macro_use]
mod macros;

use std::fmt;

///
/// PropertyType
///
/// Declared type of one indexed property component.
/// The numeric id doubles as the serialized type code of a key component and
/// must remain fixed once keys have been written to disk.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum PropertyType {
    Boolean,
    Integer,
    Short,
    Long,
    Float,
    Double,
    DateTime,
    String,
    Binary,
    Link,
    Byte,
    Date,
    Decimal,
}

impl PropertyType {
    /// Return the full metadata descriptor for one property type.
    #[must_use]
    pub const fn metadata(self) -> PropertyMetadata {
        property_type_registry!(metadata_from_registry, self)
    }

    /// Stable numeric id (also the on-disk type code).
    #[must_use]
    pub const fn id(self) -> u8 {
        self.metadata().id
    }

    /// Stable upper-case name used by persisted metadata and DDL.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.metadata().name
    }

    /// Encoded payload width for fixed-width types, `None` for
    /// length-prefixed ones. Key codecs size components from this.
    #[must_use]
    pub const fn fixed_size(self) -> Option<usize> {
        self.metadata().fixed_size
    }

    /// Resolve a type from its stable numeric id.
    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        property_type_registry!(from_id_from_registry, id)
    }

    /// Resolve a type from its name, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_PROPERTY_TYPES
            .into_iter()
            .find(|ty| ty.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

///
/// PropertyMetadata
///
/// Registry row for one property type.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PropertyMetadata {
    pub id: u8,
    pub name: &'static str,
    pub fixed_size: Option<usize>,
}

/// Ordered list of all property types in registry order.
pub const ALL_PROPERTY_TYPES: [PropertyType; 13] = property_type_registry!(all_types_from_registry);

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_for_every_registered_type() {
        for ty in ALL_PROPERTY_TYPES {
            assert_eq!(PropertyType::from_id(ty.id()), Some(ty));
        }
    }

    #[test]
    fn ids_are_unique() {
        for (i, left) in ALL_PROPERTY_TYPES.iter().enumerate() {
            for right in &ALL_PROPERTY_TYPES[i + 1..] {
                assert_ne!(left.id(), right.id(), "{left} and {right} share an id");
            }
        }
    }

    #[test]
    fn names_resolve_case_insensitively() {
        assert_eq!(PropertyType::from_name("integer"), Some(PropertyType::Integer));
        assert_eq!(PropertyType::from_name(" DateTime "), Some(PropertyType::DateTime));
        assert_eq!(PropertyType::from_name("embedded"), None);
    }

    #[test]
    fn unknown_id_is_rejected() {
        assert_eq!(PropertyType::from_id(9), None);
        assert_eq!(PropertyType::from_id(0xFE), None);
    }

    #[test]
    fn fixed_sizes_match_wire_widths() {
        assert_eq!(PropertyType::Long.fixed_size(), Some(8));
        assert_eq!(PropertyType::Short.fixed_size(), Some(2));
        assert_eq!(PropertyType::String.fixed_size(), None);
        assert_eq!(PropertyType::Link.fixed_size(), None);
    }
}
