use crate::value::PropertyValue;
use std::collections::{BTreeMap, HashMap};

///
/// FieldSource
///
/// Read access to a loaded record's properties by name.
///

pub trait FieldSource {
    fn field(&self, name: &str) -> Option<&PropertyValue>;
}

impl FieldSource for BTreeMap<String, PropertyValue> {
    fn field(&self, name: &str) -> Option<&PropertyValue> {
        self.get(name)
    }
}

impl FieldSource for HashMap<String, PropertyValue> {
    fn field(&self, name: &str) -> Option<&PropertyValue> {
        self.get(name)
    }
}

///
/// Record
///
/// Minimal owned record: an optional class name and named properties.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Record {
    class_name: Option<String>,
    fields: BTreeMap<String, PropertyValue>,
}

impl Record {
    #[must_use]
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: Some(class_name.into()),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field assignment.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Set one field, returning the previous value.
    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Option<PropertyValue> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<PropertyValue> {
        self.fields.remove(name)
    }

    #[must_use]
    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl FieldSource for Record {
    fn field(&self, name: &str) -> Option<&PropertyValue> {
        self.fields.get(name)
    }
}
