//! Module: key
//! Responsibility: the ordered multi-component key value.
//! Does not own: component coercion or on-disk layout.
//! Boundary: definitions build keys here, codecs persist them.

#[cfg(test)]
mod tests;

use crate::value::{Value, canonical_cmp};
use derive_more::{Deref, IntoIterator};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

///
/// CompositeKey
///
/// Ordered sequence of key components.
///
/// Appending a composite flattens its components into this key, so a built
/// key never nests. Equality and hashing are structural. Ordering is the
/// prefix comparison of `compare_to`, under which keys of different length
/// can compare equal while being unequal, so there is no `Ord` impl.
///
/// No `DerefMut`: a key handed to storage can only be changed through `append`.
///

#[derive(Clone, Debug, Default, Deref, Deserialize, Eq, Hash, IntoIterator, PartialEq, Serialize)]
#[into_iterator(owned, ref)]
#[serde(from = "Vec<Value>", into = "Vec<Value>")]
pub struct CompositeKey(Vec<Value>);

impl CompositeKey {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Build a key from components, flattening any nested composite.
    pub fn from_values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut key = Self::new();
        for value in values {
            key.append(value);
        }

        key
    }

    /// Append one component; a composite contributes each of its components.
    pub fn append(&mut self, value: impl Into<Value>) {
        match value.into() {
            Value::Composite(nested) => self.0.extend(nested.0),
            other => self.0.push(other),
        }
    }

    #[must_use]
    pub fn components(&self) -> &[Value] {
        &self.0
    }

    #[must_use]
    pub fn into_components(self) -> Vec<Value> {
        self.0
    }

    /// Prefix comparison.
    ///
    /// Compares component-wise over the shorter length; if every compared pair
    /// is equal the keys compare equal, whatever their lengths.
    #[must_use]
    pub fn compare_to(&self, other: &Self) -> Ordering {
        self.0
            .iter()
            .zip(&other.0)
            .map(|(left, right)| canonical_cmp(left, right))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl From<Vec<Value>> for CompositeKey {
    fn from(values: Vec<Value>) -> Self {
        Self::from_values(values)
    }
}

impl From<CompositeKey> for Vec<Value> {
    fn from(key: CompositeKey) -> Self {
        key.0
    }
}

impl<V: Into<Value>> FromIterator<V> for CompositeKey {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::from_values(iter)
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, component) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{component}")?;
        }
        f.write_str("]")
    }
}

/// Build a `CompositeKey` from a list of component expressions.
#[macro_export]
macro_rules! composite_key {
    () => {
        $crate::key::CompositeKey::new()
    };
    ( $( $value:expr ),+ $(,)? ) => {{
        let mut key = $crate::key::CompositeKey::new();
        $( key.append($value); )+
        key
    }};
}
