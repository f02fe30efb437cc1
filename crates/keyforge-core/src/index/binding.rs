use crate::{
    error::InternalError,
    index::{
        Collate, DefinitionKind, IndexDefinitionMetadata,
        ddl::{self, IndexDdl},
        keys,
        metadata::FieldMetadata,
    },
    value::Value,
};
use keyforge_primitives::PropertyType;

///
/// FieldBinding
///
/// The schema binding shared by every single-field definition: owning class,
/// field name, declared key type, collate and null policy.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct FieldBinding {
    pub(crate) class_name: String,
    pub(crate) field: String,
    pub(crate) key_type: PropertyType,
    pub(crate) collate: Collate,
    pub(crate) null_values_ignored: bool,
}

impl FieldBinding {
    pub(crate) fn new(
        class_name: impl Into<String>,
        field: impl Into<String>,
        key_type: PropertyType,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            field: field.into(),
            key_type,
            collate: Collate::Default,
            null_values_ignored: true,
        }
    }

    pub(crate) fn coerce(&self, value: &Value) -> Result<Value, InternalError> {
        keys::coerce_component(Some(&self.field), value, self.key_type, self.collate)
    }

    /// Field name as listed by `fields_to_index`.
    pub(crate) fn decorated_field(&self, decoration: Option<&str>) -> String {
        let mut field = self.field.clone();
        if let Some(decoration) = decoration {
            field.push(' ');
            field.push_str(decoration);
        }
        if !self.collate.is_default() {
            field.push_str(" collate ");
            field.push_str(self.collate.name());
        }

        field
    }

    pub(crate) fn field_clause(&self, decoration: Option<&str>) -> String {
        let mut clause = ddl::quote_field(&self.field, decoration);
        if !self.collate.is_default() {
            clause.push_str(" collate ");
            clause.push_str(self.collate.name());
        }

        clause
    }

    pub(crate) fn ddl(
        &self,
        index_name: &str,
        index_type: &str,
        engine: Option<&str>,
        decoration: Option<&str>,
    ) -> String {
        IndexDdl {
            index_name,
            class_name: Some(&self.class_name),
            field_clauses: vec![self.field_clause(decoration)],
            index_type,
            engine,
            key_types: Vec::new(),
        }
        .render()
    }

    pub(crate) fn metadata(&self, kind: DefinitionKind) -> IndexDefinitionMetadata {
        IndexDefinitionMetadata {
            kind,
            class_name: Some(self.class_name.clone()),
            fields: vec![FieldMetadata::new(Some(&self.field), self.key_type)],
            null_values_ignored: self.null_values_ignored,
            map_mode: None,
            collate: self.collate,
            children: Vec::new(),
        }
    }

    /// Rebuild from a single-field metadata record.
    pub(crate) fn restore(meta: &IndexDefinitionMetadata) -> Result<Self, InternalError> {
        let class_name = meta.class_name.as_deref().ok_or_else(|| {
            InternalError::index_configuration(format!(
                "{} index definition requires a class name",
                meta.kind
            ))
        })?;

        let [field] = meta.fields.as_slice() else {
            return Err(InternalError::index_configuration(format!(
                "{} index definition requires exactly one field, found {}",
                meta.kind,
                meta.fields.len()
            )));
        };

        let name = field.name.as_deref().ok_or_else(|| {
            InternalError::index_configuration(format!(
                "{} index definition requires a field name",
                meta.kind
            ))
        })?;

        Ok(Self {
            class_name: class_name.to_string(),
            field: name.to_string(),
            key_type: field.property_type()?,
            collate: meta.collate,
            null_values_ignored: meta.null_values_ignored,
        })
    }
}
