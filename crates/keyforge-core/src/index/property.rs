use crate::{
    error::InternalError,
    index::{
        Collate, DefinitionKind, FieldSource, IndexDefinitionMetadata, IndexKeys, KeyDefinition,
        binding::FieldBinding,
        keys::{self, ChildKeys},
    },
    value::{PropertyValue, Value},
};
use keyforge_primitives::PropertyType;

///
/// PropertyIndexDefinition
///
/// Index over one scalar property. A null value produces no key; a value
/// that cannot be coerced to the declared type is an error.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropertyIndexDefinition {
    binding: FieldBinding,
}

impl PropertyIndexDefinition {
    #[must_use]
    pub fn new(
        class_name: impl Into<String>,
        field: impl Into<String>,
        key_type: PropertyType,
    ) -> Self {
        Self {
            binding: FieldBinding::new(class_name, field, key_type),
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
    pub const fn collate(&self) -> Collate {
        self.binding.collate
    }

    /// Coerce one raw value to this definition's key.
    pub fn create_single_value(&self, value: &Value) -> Result<Value, InternalError> {
        self.binding.coerce(value)
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
        let PropertyValue::Scalar(value) = param else {
            return Err(keys::not_indexable(Some(&self.binding.field), param));
        };

        let key = self.binding.coerce(value)?;
        if key.is_null() {
            return Ok(ChildKeys::Absent);
        }

        Ok(ChildKeys::One(key))
    }
}

impl KeyDefinition for PropertyIndexDefinition {
    fn kind(&self) -> DefinitionKind {
        DefinitionKind::Property
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
        self.binding.metadata(DefinitionKind::Property)
    }

    fn to_create_index_ddl(&self, index_name: &str, index_type: &str, engine: Option<&str>) -> String {
        self.binding.ddl(index_name, index_type, engine, None)
    }
}
