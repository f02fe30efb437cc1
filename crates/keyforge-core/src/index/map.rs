use crate::{
    error::InternalError,
    index::{
        Collate, DefinitionKind, FieldSource, IndexDefinitionMetadata, IndexKeys, KeyDefinition,
        KeyDelta,
        binding::FieldBinding,
        event::{self, ChangeEvent, ChangeKind, DeltaOp},
        keys::ChildKeys,
    },
    value::{PropertyValue, Value},
};
use keyforge_primitives::PropertyType;
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// MapIndexBy
///
/// Which half of each map entry a map definition indexes.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MapIndexBy {
    ByKey,
    ByValue,
}

impl MapIndexBy {
    /// DDL decoration, e.g. `by key`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ByKey => "by key",
            Self::ByValue => "by value",
        }
    }
}

impl fmt::Display for MapIndexBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

///
/// PropertyMapIndexDefinition
///
/// Index over the keys or the values of a map property, one key per entry.
/// Input that is not a map produces no key.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropertyMapIndexDefinition {
    binding: FieldBinding,
    index_by: MapIndexBy,
}

impl PropertyMapIndexDefinition {
    #[must_use]
    pub fn new(
        class_name: impl Into<String>,
        field: impl Into<String>,
        key_type: PropertyType,
        index_by: MapIndexBy,
    ) -> Self {
        Self {
            binding: FieldBinding::new(class_name, field, key_type),
            index_by,
        }
    }

    #[must_use]
    pub fn with_collate(mut self, collate: Collate) -> Self {
        self.binding.collate = collate;
        self
    }

    #[must_use]
    pub fn with_null_values_ignored(mut self, ignored: bool) -> Self {
        self.binding.null_values_ignored = ignored;
        self
    }

    #[must_use]
    pub fn field(&self) -> &str {
        &self.binding.field
    }

    #[must_use]
    pub const fn key_type(&self) -> PropertyType {
        self.binding.key_type
    }

    #[must_use]
    pub const fn index_by(&self) -> MapIndexBy {
        self.index_by
    }

    /// Coerce one map key (or value, depending on mode) to its index key.
    pub fn create_single_value(&self, element: &Value) -> Result<Value, InternalError> {
        self.binding.coerce(element)
    }

    /// Fold one map mutation into `delta`.
    ///
    /// By-key definitions index the entry key, which an update never changes,
    /// so updates produce nothing. By-value definitions treat the entry value
    /// like a list element.
    pub fn process_change_event(
        &self,
        event: &ChangeEvent,
        delta: &mut KeyDelta,
    ) -> Result<(), InternalError> {
        for op in self.event_ops(event)? {
            delta.apply(op);
        }

        Ok(())
    }

    pub(crate) fn event_ops(&self, event: &ChangeEvent) -> Result<Vec<DeltaOp>, InternalError> {
        match self.index_by {
            MapIndexBy::ByValue => event::element_ops(event, |value| self.binding.coerce(value)),
            MapIndexBy::ByKey => {
                let key = self.binding.coerce(event.key())?;
                if key.is_null() {
                    return Ok(Vec::new());
                }

                Ok(match event.kind() {
                    ChangeKind::Add => vec![DeltaOp::Add(key)],
                    ChangeKind::Remove => vec![DeltaOp::Remove(key)],
                    ChangeKind::Update => Vec::new(),
                })
            }
        }
    }

    pub(crate) fn child_keys(&self, params: &[PropertyValue]) -> Result<ChildKeys, InternalError> {
        params
            .first()
            .map_or(Ok(ChildKeys::Absent), |param| self.keys_for(param))
    }

    pub(crate) fn child_keys_from_record(
        &self,
        record: &dyn FieldSource,
    ) -> Result<ChildKeys, InternalError> {
        record
            .field(&self.binding.field)
            .map_or(Ok(ChildKeys::Absent), |param| self.keys_for(param))
    }

    pub(crate) fn fields_to_index(&self) -> Vec<String> {
        vec![self.binding.decorated_field(Some(self.index_by.label()))]
    }

    pub(crate) fn field_clauses(&self) -> Vec<String> {
        vec![self.binding.field_clause(Some(self.index_by.label()))]
    }

    pub(crate) fn restore(meta: &IndexDefinitionMetadata) -> Result<Self, InternalError> {
        let index_by = meta.map_mode.ok_or_else(|| {
            InternalError::index_configuration("map index definition requires an index mode")
        })?;

        Ok(Self {
            binding: FieldBinding::restore(meta)?,
            index_by,
        })
    }

    fn keys_for(&self, param: &PropertyValue) -> Result<ChildKeys, InternalError> {
        let PropertyValue::Map(entries) = param else {
            return Ok(ChildKeys::Absent);
        };

        let mut keys = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let source = match self.index_by {
                MapIndexBy::ByKey => key,
                MapIndexBy::ByValue => value,
            };
            let coerced = self.binding.coerce(source)?;
            if !coerced.is_null() {
                keys.push(coerced);
            }
        }

        Ok(ChildKeys::Many(keys))
    }
}

impl KeyDefinition for PropertyMapIndexDefinition {
    fn kind(&self) -> DefinitionKind {
        DefinitionKind::Map
    }

    fn class_name(&self) -> Option<&str> {
        Some(&self.binding.class_name)
    }

    fn field_names(&self) -> Vec<&str> {
        vec![self.binding.field.as_str()]
    }

    fn declared_types(&self) -> Vec<PropertyType> {
        vec![self.binding.key_type]
    }

    fn param_count(&self) -> usize {
        1
    }

    fn is_null_values_ignored(&self) -> bool {
        self.binding.null_values_ignored
    }

    fn create_value(&self, params: &[PropertyValue]) -> Result<Option<IndexKeys>, InternalError> {
        Ok(self.child_keys(params)?.into_keys())
    }

    fn value_from_record(
        &self,
        record: &dyn FieldSource,
    ) -> Result<Option<IndexKeys>, InternalError> {
        Ok(self.child_keys_from_record(record)?.into_keys())
    }

    fn persisted_form(&self) -> IndexDefinitionMetadata {
        let mut meta = self.binding.metadata(DefinitionKind::Map);
        meta.map_mode = Some(self.index_by);
        meta
    }

    fn to_create_index_ddl(&self, index_name: &str, index_type: &str, engine: Option<&str>) -> String {
        self.binding
            .ddl(index_name, index_type, engine, Some(self.index_by.label()))
    }
}
