use crate::{
    error::InternalError,
    index::{
        Collate, DefinitionKind, FieldSource, IndexDefinitionMetadata, IndexKeys, KeyDefinition,
        ddl::IndexDdl,
        keys::{self, ChildKeys},
        metadata::FieldMetadata,
    },
    key::CompositeKey,
    value::{PropertyValue, Value},
};
use keyforge_primitives::PropertyType;

///
/// SimpleKeyIndexDefinition
///
/// Positional definition with declared types and no schema binding.
///
/// Every declared slot must receive a non-null scalar; otherwise the whole
/// key is dropped. One declared type yields a plain value, several yield a
/// composite key.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SimpleKeyIndexDefinition {
    key_types: Vec<PropertyType>,
    collate: Collate,
    null_values_ignored: bool,
}

impl SimpleKeyIndexDefinition {
    #[must_use]
    pub fn new(key_types: impl IntoIterator<Item = PropertyType>) -> Self {
        Self {
            key_types: key_types.into_iter().collect(),
            collate: Collate::Default,
            null_values_ignored: true,
        }
    }

    #[must_use]
    pub fn with_collate(mut self, collate: Collate) -> Self {
        self.collate = collate;
        self
    }

    #[must_use]
    pub fn with_null_values_ignored(mut self, ignored: bool) -> Self {
        self.null_values_ignored = ignored;
        self
    }

    #[must_use]
    pub fn key_types(&self) -> &[PropertyType] {
        &self.key_types
    }

    #[must_use]
    pub const fn collate(&self) -> Collate {
        self.collate
    }

    pub(crate) fn child_keys(&self, params: &[PropertyValue]) -> Result<ChildKeys, InternalError> {
        if self.key_types.is_empty() || params.len() < self.key_types.len() {
            return Ok(ChildKeys::Absent);
        }

        let mut key = CompositeKey::with_capacity(self.key_types.len());
        for (param, ty) in params.iter().zip(&self.key_types) {
            let PropertyValue::Scalar(value) = param else {
                return Err(keys::not_indexable(None, param));
            };
            if value.is_null() {
                return Ok(ChildKeys::Absent);
            }

            let component = keys::coerce_component(None, value, *ty, self.collate)?;
            if component.is_null() {
                return Ok(ChildKeys::Absent);
            }
            key.append(component);
        }

        if self.key_types.len() == 1 {
            let mut components = key.into_components();
            return Ok(components.pop().map_or(ChildKeys::Absent, ChildKeys::One));
        }

        Ok(ChildKeys::One(Value::Composite(key)))
    }

    pub(crate) fn restore(meta: &IndexDefinitionMetadata) -> Result<Self, InternalError> {
        if meta.fields.is_empty() {
            return Err(InternalError::index_configuration(
                "simple index definition requires at least one key type",
            ));
        }

        let key_types = meta
            .fields
            .iter()
            .map(FieldMetadata::property_type)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            key_types,
            collate: meta.collate,
            null_values_ignored: meta.null_values_ignored,
        })
    }
}

impl KeyDefinition for SimpleKeyIndexDefinition {
    fn kind(&self) -> DefinitionKind {
        DefinitionKind::Simple
    }

    fn class_name(&self) -> Option<&str> {
        None
    }

    fn field_names(&self) -> Vec<&str> {
        Vec::new()
    }

    fn declared_types(&self) -> Vec<PropertyType> {
        self.key_types.clone()
    }

    fn param_count(&self) -> usize {
        self.key_types.len()
    }

    fn is_null_values_ignored(&self) -> bool {
        self.null_values_ignored
    }

    fn create_value(&self, params: &[PropertyValue]) -> Result<Option<IndexKeys>, InternalError> {
        Ok(self.child_keys(params)?.into_keys())
    }

    // Not bound to any record field.
    fn value_from_record(
        &self,
        _record: &dyn FieldSource,
    ) -> Result<Option<IndexKeys>, InternalError> {
        Ok(None)
    }

    fn persisted_form(&self) -> IndexDefinitionMetadata {
        IndexDefinitionMetadata {
            kind: DefinitionKind::Simple,
            class_name: None,
            fields: self
                .key_types
                .iter()
                .map(|ty| FieldMetadata::new(None, *ty))
                .collect(),
            null_values_ignored: self.null_values_ignored,
            map_mode: None,
            collate: self.collate,
            children: Vec::new(),
        }
    }

    fn to_create_index_ddl(&self, index_name: &str, index_type: &str, engine: Option<&str>) -> String {
        IndexDdl {
            index_name,
            class_name: None,
            field_clauses: Vec::new(),
            index_type,
            engine,
            key_types: self.key_types.clone(),
        }
        .render()
    }
}
