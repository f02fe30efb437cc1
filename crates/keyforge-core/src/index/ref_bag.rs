use crate::{
    error::InternalError,
    index::{
        DefinitionKind, FieldSource, IndexDefinitionMetadata, IndexKeys, KeyDefinition, KeyDelta,
        binding::FieldBinding,
        event::{self, ChangeEvent, DeltaOp},
        keys::ChildKeys,
    },
    value::{PropertyValue, Value},
};
use keyforge_primitives::PropertyType;

///
/// PropertyRefBagIndexDefinition
///
/// Index over a reference bag: one `LINK` key per contained record id.
/// A record referenced twice produces two keys.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropertyRefBagIndexDefinition {
    binding: FieldBinding,
}

impl PropertyRefBagIndexDefinition {
    #[must_use]
    pub fn new(class_name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            binding: FieldBinding::new(class_name, field, PropertyType::Link),
        }
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

    pub fn create_single_value(&self, element: &Value) -> Result<Value, InternalError> {
        self.binding.coerce(element)
    }

    /// Fold one bag mutation into `delta`.
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
        let binding = FieldBinding::restore(meta)?;
        if binding.key_type != PropertyType::Link {
            return Err(InternalError::index_configuration(format!(
                "ref_bag index definition must be declared as LINK, found {}",
                binding.key_type
            )));
        }

        Ok(Self { binding })
    }

    fn keys_for(&self, param: &PropertyValue) -> Result<ChildKeys, InternalError> {
        match param {
            PropertyValue::RefBag(links) => Ok(ChildKeys::Many(
                links.iter().copied().map(Value::Link).collect(),
            )),
            PropertyValue::List(items) | PropertyValue::Set(items) => {
                let mut keys = Vec::with_capacity(items.len());
                for item in items {
                    let key = self.binding.coerce(item)?;
                    if !key.is_null() {
                        keys.push(key);
                    }
                }
                Ok(ChildKeys::Many(keys))
            }
            PropertyValue::Scalar(_) | PropertyValue::Map(_) => Ok(ChildKeys::Absent),
        }
    }
}

impl KeyDefinition for PropertyRefBagIndexDefinition {
    fn kind(&self) -> DefinitionKind {
        DefinitionKind::RefBag
    }

    fn class_name(&self) -> Option<&str> {
        Some(&self.binding.class_name)
    }

    fn field_names(&self) -> Vec<&str> {
        vec![self.binding.field.as_str()]
    }

    fn declared_types(&self) -> Vec<PropertyType> {
        vec![PropertyType::Link]
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
        self.binding.metadata(DefinitionKind::RefBag)
    }

    fn to_create_index_ddl(&self, index_name: &str, index_type: &str, engine: Option<&str>) -> String {
        self.binding.ddl(index_name, index_type, engine, None)
    }
}
