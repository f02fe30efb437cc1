mod composite;
mod property;

use crate::{
    index::IndexKeys,
    key::CompositeKey,
    value::{PropertyValue, Value},
};

pub(super) fn scalar(value: impl Into<Value>) -> PropertyValue {
    PropertyValue::Scalar(value.into())
}

pub(super) fn one(keys: Option<IndexKeys>) -> Value {
    match keys {
        Some(IndexKeys::One(key)) => key,
        other => panic!("expected a single key, got {other:?}"),
    }
}

pub(super) fn many(keys: Option<IndexKeys>) -> Vec<Value> {
    match keys {
        Some(IndexKeys::Many(keys)) => keys,
        other => panic!("expected a key collection, got {other:?}"),
    }
}

pub(super) fn composite(key: CompositeKey) -> Value {
    Value::Composite(key)
}
