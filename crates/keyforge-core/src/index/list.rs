use crate::{
    error::InternalError,
    index::{
        Collate, DefinitionKind, FieldSource, IndexDefinitionMetadata, IndexKeys, KeyDefinition,
        KeyDelta,
        binding::FieldBinding,
        event::{self, ChangeEvent, DeltaOp},
        keys::{self, ChildKeys},
    },
    value::{PropertyValue, Value},
};
use keyforge_primitives::PropertyType;

///
/// PropertyListIndexDefinition
///
/// Index over the elements of a list or set property: one key per element,
/// in element order. Null elements produce no key; a plain scalar is indexed
/// as a one-element collection.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropertyListIndexDefinition {
    binding: FieldBinding,
}

impl PropertyListIndexDefinition {
    #[must_use]
    pub fn new(
        class_name: impl Into<String>,
        field: impl Into<String>,
        element_type: PropertyType,
    ) -> Self {
        Self {
            binding: FieldBinding::new(class_name, field, element_type),
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
    pub const fn element_type(&self) -> PropertyType {
        self.binding.key_type
    }

    /// Coerce one element to its key.
    pub fn create_single_value(&self, element: &Value) -> Result<Value, InternalError> {
        self.binding.coerce(element)
    }

    /// Fold one collection mutation into `delta`.
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
        event::element_ops(event, |element| self.binding.coerce(element))
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
        vec![self.binding.decorated_field(None)]
    }

    pub(crate) fn field_clauses(&self) -> Vec<String> {
        vec![self.binding.field_clause(None)]
    }

    pub(crate) fn restore(meta: &IndexDefinitionMetadata) -> Result<Self, InternalError> {
        Ok(Self {
            binding: FieldBinding::restore(meta)?,
        })
    }

    fn keys_for(&self, param: &PropertyValue) -> Result<ChildKeys, InternalError> {
        match param {
            PropertyValue::Scalar(Value::Null) => Ok(ChildKeys::Absent),
            PropertyValue::Scalar(value) => self.collect(std::iter::once(value)),
            PropertyValue::List(items) | PropertyValue::Set(items) => self.collect(items),
            PropertyValue::RefBag(links) => {
                let values: Vec<Value> = links.iter().copied().map(Value::Link).collect();
                self.collect(&values)
            }
            PropertyValue::Map(_) => Err(keys::not_indexable(Some(&self.binding.field), param)),
        }
    }

    fn collect<'a>(
        &self,
        items: impl IntoIterator<Item = &'a Value>,
    ) -> Result<ChildKeys, InternalError> {
        let mut keys = Vec::new();
        for item in items {
            let key = self.binding.coerce(item)?;
            if !key.is_null() {
                keys.push(key);
            }
        }

        Ok(ChildKeys::Many(keys))
    }
}

impl KeyDefinition for PropertyListIndexDefinition {
    fn kind(&self) -> DefinitionKind {
        DefinitionKind::List
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
        self.binding.metadata(DefinitionKind::List)
    }

    fn to_create_index_ddl(&self, index_name: &str, index_type: &str, engine: Option<&str>) -> String {
        self.binding.ddl(index_name, index_type, engine, None)
    }
}
