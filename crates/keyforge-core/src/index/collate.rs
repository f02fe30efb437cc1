use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// Collate
///
/// String comparison mode applied to coerced key components.
/// Only string components are affected.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Collate {
    #[default]
    #[serde(rename = "default")]
    Default,

    #[serde(rename = "ci")]
    CaseInsensitive,
}

impl Collate {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::CaseInsensitive => "ci",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            n if n.eq_ignore_ascii_case("default") => Some(Self::Default),
            n if n.eq_ignore_ascii_case("ci") => Some(Self::CaseInsensitive),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }

    /// Normalize one component for storage under this collate.
    #[must_use]
    pub fn apply(self, value: Value) -> Value {
        match (self, value) {
            (Self::CaseInsensitive, Value::String(text)) => Value::String(text.to_lowercase()),
            (_, other) => other,
        }
    }
}

impl fmt::Display for Collate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
