use crate::{
    error::InternalError,
    index::Collate,
    value::{CoercionError, PropertyValue, Value},
};
use keyforge_primitives::PropertyType;

///
/// IndexKeys
///
/// Non-null result of building keys for one record or parameter list.
/// `Many` is produced whenever a collection-valued definition took part,
/// even when it yielded a single key.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum IndexKeys {
    One(Value),
    Many(Vec<Value>),
}

impl IndexKeys {
    #[must_use]
    pub const fn is_many(&self) -> bool {
        matches!(self, Self::Many(_))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(keys) => keys.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub const fn as_one(&self) -> Option<&Value> {
        match self {
            Self::One(key) => Some(key),
            Self::Many(_) => None,
        }
    }

    /// Flatten into the ordered list of keys.
    #[must_use]
    pub fn into_vec(self) -> Vec<Value> {
        match self {
            Self::One(key) => vec![key],
            Self::Many(keys) => keys,
        }
    }
}

impl IntoIterator for IndexKeys {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}

///
/// ChildKeys
///
/// Key material of one definition before the null policy is applied.
/// `Many(vec![])` is an empty collection, distinct from an absent value.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum ChildKeys {
    Absent,
    One(Value),
    Many(Vec<Value>),
}

impl ChildKeys {
    pub(crate) fn into_keys(self) -> Option<IndexKeys> {
        match self {
            Self::Absent => None,
            Self::One(key) => Some(IndexKeys::One(key)),
            Self::Many(keys) if keys.is_empty() => None,
            Self::Many(keys) => Some(IndexKeys::Many(keys)),
        }
    }
}

/// Coerce one raw component to its declared type and apply the collate.
pub(crate) fn coerce_component(
    field: Option<&str>,
    value: &Value,
    ty: PropertyType,
    collate: Collate,
) -> Result<Value, InternalError> {
    value
        .coerce_to(ty)
        .map(|coerced| collate.apply(coerced))
        .map_err(|err| InternalError::coercion(field, err))
}

/// Reject a collection handed to a scalar slot.
pub(crate) fn not_indexable(field: Option<&str>, param: &PropertyValue) -> InternalError {
    InternalError::coercion(
        field,
        CoercionError::NotIndexable {
            kind: param.kind_label(),
        },
    )
}
