use crate::{types::RecordId, value::Value};

///
/// PropertyValue
///
/// Raw property content handed to a definition, before coercion.
/// Lists keep duplicates, sets are expected to be unique, maps keep their
/// entry order and reference bags may hold the same record more than once.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PropertyValue {
    Scalar(Value),
    List(Vec<Value>),
    Set(Vec<Value>),
    Map(Vec<(Value, Value)>),
    RefBag(Vec<RecordId>),
}

impl PropertyValue {
    pub const NULL: Self = Self::Scalar(Value::Null);

    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    pub fn set<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::Set(items.into_iter().map(Into::into).collect())
    }

    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    pub fn ref_bag(items: impl IntoIterator<Item = RecordId>) -> Self {
        Self::RefBag(items.into_iter().collect())
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Scalar(Value::Null))
    }

    #[must_use]
    pub const fn is_collection(&self) -> bool {
        !matches!(self, Self::Scalar(_))
    }

    #[must_use]
    pub const fn as_scalar(&self) -> Option<&Value> {
        match self {
            Self::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Human-readable kind label for diagnostics.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Scalar(value) => value.kind_label(),
            Self::List(_) => "List",
            Self::Set(_) => "Set",
            Self::Map(_) => "Map",
            Self::RefBag(_) => "RefBag",
        }
    }
}

impl<T: Into<Value>> From<T> for PropertyValue {
    fn from(value: T) -> Self {
        Self::Scalar(value.into())
    }
}
