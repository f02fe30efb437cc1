use crate::{error::InternalError, value::Value};
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// ChangeKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Add,
    Remove,
    Update,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Update => "update",
        };
        write!(f, "{label}")
    }
}

///
/// ChangeEvent
///
/// One mutation of a tracked collection, as reported by the collection itself.
/// `key` is the list position, set element or map key; `value` is the new
/// element (add, update) and `old_value` the previous one (remove, update).
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChangeEvent {
    kind: ChangeKind,
    key: Value,
    value: Option<Value>,
    old_value: Option<Value>,
}

impl ChangeEvent {
    pub fn add(key: impl Into<Value>, value: impl Into<Value>) -> Self {
        Self {
            kind: ChangeKind::Add,
            key: key.into(),
            value: Some(value.into()),
            old_value: None,
        }
    }

    pub fn remove(key: impl Into<Value>, old_value: impl Into<Value>) -> Self {
        Self {
            kind: ChangeKind::Remove,
            key: key.into(),
            value: None,
            old_value: Some(old_value.into()),
        }
    }

    pub fn update(
        key: impl Into<Value>,
        value: impl Into<Value>,
        old_value: impl Into<Value>,
    ) -> Self {
        Self {
            kind: ChangeKind::Update,
            key: key.into(),
            value: Some(value.into()),
            old_value: Some(old_value.into()),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ChangeKind {
        self.kind
    }

    #[must_use]
    pub const fn key(&self) -> &Value {
        &self.key
    }

    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    #[must_use]
    pub const fn old_value(&self) -> Option<&Value> {
        self.old_value.as_ref()
    }

    pub(crate) fn new_value_required(&self) -> Result<&Value, InternalError> {
        self.value.as_ref().ok_or_else(|| {
            InternalError::index_invariant(format!("{} event carries no new value", self.kind))
        })
    }

    pub(crate) fn old_value_required(&self) -> Result<&Value, InternalError> {
        self.old_value.as_ref().ok_or_else(|| {
            InternalError::index_invariant(format!("{} event carries no old value", self.kind))
        })
    }
}

///
/// DeltaOp
///
/// One key-level step derived from a change event, applied in order.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum DeltaOp {
    Add(Value),
    Remove(Value),
}

impl DeltaOp {
    pub(crate) fn map(self, f: impl FnOnce(Value) -> Value) -> Self {
        match self {
            Self::Add(key) => Self::Add(f(key)),
            Self::Remove(key) => Self::Remove(f(key)),
        }
    }
}

/// Standard element ops: add the new element, remove the old one, or both
/// (remove first) for an update. `convert` turns a raw element into a key;
/// a null key contributes no op.
pub(crate) fn element_ops(
    event: &ChangeEvent,
    mut convert: impl FnMut(&Value) -> Result<Value, InternalError>,
) -> Result<Vec<DeltaOp>, InternalError> {
    let mut ops = Vec::with_capacity(2);

    if matches!(event.kind(), ChangeKind::Remove | ChangeKind::Update) {
        let key = convert(event.old_value_required()?)?;
        if !key.is_null() {
            ops.push(DeltaOp::Remove(key));
        }
    }

    if matches!(event.kind(), ChangeKind::Add | ChangeKind::Update) {
        let key = convert(event.new_value_required()?)?;
        if !key.is_null() {
            ops.push(DeltaOp::Add(key));
        }
    }

    Ok(ops)
}
