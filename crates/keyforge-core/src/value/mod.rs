mod coerce;
mod compare;
mod property;
mod tag;


use crate::{
    key::CompositeKey,
    types::{Date, DateTime, Decimal, RecordId},
};
use keyforge_primitives::PropertyType;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    hash::{Hash, Hasher},
};

// re-exports
pub use coerce::CoercionError;
pub use compare::canonical_cmp;
pub use property::PropertyValue;
pub use tag::ValueTag;

///
/// Value
///
/// One comparable key component.
///
/// Null      → an explicit null component (orders before every non-null value).
/// Composite → a nested key; appending it to a `CompositeKey` flattens it, so it
///             only survives as a standalone value or on the wire.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    String(String),
    Binary(Vec<u8>),
    Date(Date),
    DateTime(DateTime),
    Link(RecordId),
    Composite(CompositeKey),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Declared property type this value already satisfies, if any.
    #[must_use]
    pub const fn property_type(&self) -> Option<PropertyType> {
        match self {
            Self::Null | Self::Composite(_) => None,
            Self::Boolean(_) => Some(PropertyType::Boolean),
            Self::Byte(_) => Some(PropertyType::Byte),
            Self::Short(_) => Some(PropertyType::Short),
            Self::Integer(_) => Some(PropertyType::Integer),
            Self::Long(_) => Some(PropertyType::Long),
            Self::Float(_) => Some(PropertyType::Float),
            Self::Double(_) => Some(PropertyType::Double),
            Self::Decimal(_) => Some(PropertyType::Decimal),
            Self::String(_) => Some(PropertyType::String),
            Self::Binary(_) => Some(PropertyType::Binary),
            Self::Date(_) => Some(PropertyType::Date),
            Self::DateTime(_) => Some(PropertyType::DateTime),
            Self::Link(_) => Some(PropertyType::Link),
        }
    }

    /// Stable serialization tag for this value.
    #[must_use]
    pub const fn tag(&self) -> ValueTag {
        tag::canonical_tag(self)
    }

    /// Human-readable kind label for diagnostics.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        self.tag().label()
    }

    #[must_use]
    pub const fn as_composite(&self) -> Option<&CompositeKey> {
        match self {
            Self::Composite(key) => Some(key),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_link(&self) -> Option<RecordId> {
        match self {
            Self::Link(rid) => Some(*rid),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }

    /// Convert this value into the declared property type.
    pub fn coerce_to(&self, ty: PropertyType) -> Result<Self, CoercionError> {
        coerce::coerce(self, ty)
    }
}

// Floats compare by bit pattern so `Eq` and `Hash` stay lawful.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Byte(a), Self::Byte(b)) => a == b,
            (Self::Short(a), Self::Short(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            (Self::Decimal(a), Self::Decimal(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Binary(a), Self::Binary(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::Link(a), Self::Link(b)) => a == b,
            (Self::Composite(a), Self::Composite(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag().to_u8().hash(state);

        match self {
            Self::Null => {}
            Self::Boolean(v) => v.hash(state),
            Self::Byte(v) => v.hash(state),
            Self::Short(v) => v.hash(state),
            Self::Integer(v) => v.hash(state),
            Self::Long(v) => v.hash(state),
            Self::Float(v) => v.to_bits().hash(state),
            Self::Double(v) => v.to_bits().hash(state),
            Self::Decimal(v) => v.hash(state),
            Self::String(v) => v.hash(state),
            Self::Binary(v) => v.hash(state),
            Self::Date(v) => v.hash(state),
            Self::DateTime(v) => v.hash(state),
            Self::Link(v) => v.hash(state),
            Self::Composite(v) => v.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Byte(v) => write!(f, "{v}"),
            Self::Short(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::Binary(v) => write!(f, "<{} bytes>", v.len()),
            Self::Date(v) => write!(f, "{v}"),
            Self::DateTime(v) => write!(f, "{v}"),
            Self::Link(v) => write!(f, "{v}"),
            Self::Composite(v) => write!(f, "{v}"),
        }
    }
}

///
/// CONVERSIONS
///

macro_rules! value_from {
    ( $( $ty:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    bool => Boolean,
    i8 => Byte,
    i16 => Short,
    i32 => Integer,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    Decimal => Decimal,
    String => String,
    Vec<u8> => Binary,
    Date => Date,
    DateTime => DateTime,
    RecordId => Link,
    CompositeKey => Composite,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
