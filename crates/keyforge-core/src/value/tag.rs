use crate::value::Value;
use keyforge_primitives::PropertyType;

///
/// ValueTag
///
/// Stable type code of one key component.
///
/// IMPORTANT:
/// Typed codes equal the `PropertyType` id and, together with the two
/// sentinels, are written to disk by every key codec. They must never change.
///
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ValueTag {
    Boolean = 0,
    Integer = 1,
    Short = 2,
    Long = 3,
    Float = 4,
    Double = 5,
    DateTime = 6,
    String = 7,
    Binary = 8,
    Link = 13,
    Byte = 17,
    Date = 19,
    Decimal = 21,
    Null = 0xFE,
    Composite = 0xFF,
}

impl ValueTag {
    /// Stable on-disk byte for this tag.
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Resolve a stored type byte, rejecting unknown codes.
    #[must_use]
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            0xFE => Some(Self::Null),
            0xFF => Some(Self::Composite),
            id => match PropertyType::from_id(id) {
                Some(ty) => Some(Self::from_property_type(ty)),
                None => None,
            },
        }
    }

    #[must_use]
    pub const fn from_property_type(ty: PropertyType) -> Self {
        match ty {
            PropertyType::Boolean => Self::Boolean,
            PropertyType::Integer => Self::Integer,
            PropertyType::Short => Self::Short,
            PropertyType::Long => Self::Long,
            PropertyType::Float => Self::Float,
            PropertyType::Double => Self::Double,
            PropertyType::DateTime => Self::DateTime,
            PropertyType::String => Self::String,
            PropertyType::Binary => Self::Binary,
            PropertyType::Link => Self::Link,
            PropertyType::Byte => Self::Byte,
            PropertyType::Date => Self::Date,
            PropertyType::Decimal => Self::Decimal,
        }
    }

    /// Cross-kind ordering rank. Null sorts first, nested keys last.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Boolean => 1,
            Self::Byte => 2,
            Self::Short => 3,
            Self::Integer => 4,
            Self::Long => 5,
            Self::Float => 6,
            Self::Double => 7,
            Self::Decimal => 8,
            Self::String => 9,
            Self::Binary => 10,
            Self::Date => 11,
            Self::DateTime => 12,
            Self::Link => 13,
            Self::Composite => 14,
        }
    }

    /// Stable human-readable value kind label for diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Composite => "Composite",
            Self::Boolean => "Boolean",
            Self::Integer => "Integer",
            Self::Short => "Short",
            Self::Long => "Long",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::DateTime => "DateTime",
            Self::String => "String",
            Self::Binary => "Binary",
            Self::Link => "Link",
            Self::Byte => "Byte",
            Self::Date => "Date",
            Self::Decimal => "Decimal",
        }
    }
}

#[must_use]
pub(super) const fn canonical_tag(value: &Value) -> ValueTag {
    match value {
        Value::Null => ValueTag::Null,
        Value::Boolean(_) => ValueTag::Boolean,
        Value::Byte(_) => ValueTag::Byte,
        Value::Short(_) => ValueTag::Short,
        Value::Integer(_) => ValueTag::Integer,
        Value::Long(_) => ValueTag::Long,
        Value::Float(_) => ValueTag::Float,
        Value::Double(_) => ValueTag::Double,
        Value::Decimal(_) => ValueTag::Decimal,
        Value::String(_) => ValueTag::String,
        Value::Binary(_) => ValueTag::Binary,
        Value::Date(_) => ValueTag::Date,
        Value::DateTime(_) => ValueTag::DateTime,
        Value::Link(_) => ValueTag::Link,
        Value::Composite(_) => ValueTag::Composite,
    }
}
