//! Module: index::composite
//! Responsibility: multi-field definitions and their cartesian key expansion.
//! Does not own: per-field coercion (delegated to child definitions).
//! Boundary: children are consumed positionally, in declaration order.

use crate::{
    error::InternalError,
    index::{
        Collate, DefinitionKind, FieldSource, IndexDefinition, IndexDefinitionMetadata, IndexKeys,
        KeyDefinition, KeyDelta,
        ddl::IndexDdl,
        event::{ChangeEvent, DeltaOp},
        keys::{self, ChildKeys},
    },
    key::CompositeKey,
    value::{PropertyValue, Value},
};
use keyforge_primitives::PropertyType;

const ERR_MULTIPLE_COLLECTIONS: &str = "composite key cannot contain more than one collection item";

///
/// CompositeIndexDefinition
///
/// Ordered list of child definitions producing one composite key per record.
///
/// At most one child may be collection-valued; that child expands the
/// result into one key per element, each sharing the other children's
/// components.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompositeIndexDefinition {
    class_name: String,
    definitions: Vec<IndexDefinition>,
    multi_value_index: Option<usize>,
    null_values_ignored: bool,
}

impl CompositeIndexDefinition {
    #[must_use]
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            definitions: Vec::new(),
            multi_value_index: None,
            null_values_ignored: true,
        }
    }

    /// Build from `definitions`, rejecting a second collection-valued child.
    pub fn try_new<I, D>(class_name: impl Into<String>, definitions: I) -> Result<Self, InternalError>
    where
        I: IntoIterator<Item = D>,
        D: Into<IndexDefinition>,
    {
        let mut composite = Self::new(class_name);
        for definition in definitions {
            composite.add_definition(definition)?;
        }

        Ok(composite)
    }

    #[must_use]
    pub fn with_null_values_ignored(mut self, ignored: bool) -> Self {
        self.null_values_ignored = ignored;
        self
    }

    /// Append one child definition.
    pub fn add_definition(
        &mut self,
        definition: impl Into<IndexDefinition>,
    ) -> Result<(), InternalError> {
        let definition = definition.into();

        if definition.is_multi_value() {
            if self.multi_value_index.is_some() {
                return Err(InternalError::index_configuration(ERR_MULTIPLE_COLLECTIONS));
            }
            self.multi_value_index = Some(self.definitions.len());
        }
        self.definitions.push(definition);

        Ok(())
    }

    #[must_use]
    pub fn definitions(&self) -> &[IndexDefinition] {
        &self.definitions
    }

    #[must_use]
    pub const fn multi_value_definition_index(&self) -> Option<usize> {
        self.multi_value_index
    }

    #[must_use]
    pub fn multi_value_definition(&self) -> Option<&IndexDefinition> {
        self.multi_value_index
            .and_then(|index| self.definitions.get(index))
    }

    /// Field name of the collection-valued child, if any.
    #[must_use]
    pub fn multi_value_field(&self) -> Option<&str> {
        self.multi_value_definition()
            .and_then(|definition| definition.field_names().into_iter().next())
    }

    /// Indexed fields in order, decorated with map mode and collate.
    #[must_use]
    pub fn fields_to_index(&self) -> Vec<String> {
        self.definitions
            .iter()
            .flat_map(IndexDefinition::fields_to_index)
            .collect()
    }

    /// One composite key where the collection-valued child receives a single
    /// element rather than a whole collection.
    pub fn create_single_value(
        &self,
        params: &[PropertyValue],
    ) -> Result<Option<CompositeKey>, InternalError> {
        let mut key = CompositeKey::with_capacity(self.definitions.len());
        let mut offset = 0;

        for (position, definition) in self.definitions.iter().enumerate() {
            if offset >= params.len() {
                break;
            }
            let end = (offset + definition.param_count()).min(params.len());
            let slice = &params[offset..end];
            offset += definition.param_count();

            let component = if self.multi_value_index == Some(position) {
                match slice.first() {
                    Some(PropertyValue::Scalar(element)) => {
                        definition.create_single_value(element)?
                    }
                    Some(other) => {
                        let field = definition.field_names().into_iter().next();
                        return Err(keys::not_indexable(field, other));
                    }
                    None => Value::Null,
                }
            } else {
                match definition.child_keys(slice)? {
                    ChildKeys::Absent => Value::Null,
                    ChildKeys::One(value) => value,
                    ChildKeys::Many(_) => {
                        return Err(InternalError::index_configuration(ERR_MULTIPLE_COLLECTIONS));
                    }
                }
            };

            if component.is_null() && self.null_values_ignored {
                return Ok(None);
            }
            key.append(component);
        }

        Ok(Some(key))
    }

    /// Fold one mutation of the collection-valued child into `delta`.
    ///
    /// `sibling_params` carries the current values of every other child in
    /// declaration order, `param_count` values per child. Each element key is
    /// wrapped into a full composite key at the collection child's position.
    pub fn process_change_event(
        &self,
        event: &ChangeEvent,
        delta: &mut KeyDelta,
        sibling_params: &[PropertyValue],
    ) -> Result<(), InternalError> {
        for op in self.event_ops(event, sibling_params)? {
            delta.apply(op);
        }

        Ok(())
    }

    pub(crate) fn event_ops(
        &self,
        event: &ChangeEvent,
        sibling_params: &[PropertyValue],
    ) -> Result<Vec<DeltaOp>, InternalError> {
        let (index, definition) = self
            .multi_value_index
            .and_then(|index| self.definitions.get(index).map(|def| (index, def)))
            .ok_or_else(|| {
                InternalError::index_configuration(format!(
                    "composite index definition on '{}' has no collection-valued field",
                    self.class_name
                ))
            })?;

        let element_ops = definition.event_ops(event)?;
        if element_ops.is_empty() {
            return Ok(element_ops);
        }

        let Some(siblings) = self.sibling_components(index, sibling_params)? else {
            return Ok(Vec::new());
        };

        Ok(element_ops
            .into_iter()
            .map(|op| op.map(|element| Value::Composite(wrap(index, &siblings, element))))
            .collect())
    }

    // One component per non-collection child; `None` when a sibling is null
    // and nulls are ignored.
    fn sibling_components(
        &self,
        index: usize,
        params: &[PropertyValue],
    ) -> Result<Option<Vec<Value>>, InternalError> {
        let expected: usize = self
            .definitions
            .iter()
            .enumerate()
            .filter(|(position, _)| *position != index)
            .map(|(_, definition)| definition.param_count())
            .sum();

        if params.len() < expected {
            return Err(InternalError::index_configuration(format!(
                "composite change event expects {expected} sibling values, got {}",
                params.len()
            )));
        }

        let mut components = Vec::with_capacity(self.definitions.len().saturating_sub(1));
        let mut offset = 0;

        for (position, definition) in self.definitions.iter().enumerate() {
            if position == index {
                continue;
            }
            let count = definition.param_count();
            let slice = &params[offset..offset + count];
            offset += count;

            match definition.child_keys(slice)? {
                ChildKeys::Absent if self.null_values_ignored => return Ok(None),
                ChildKeys::Absent => components.push(Value::Null),
                ChildKeys::One(value) => components.push(value),
                ChildKeys::Many(_) => {
                    return Err(InternalError::index_configuration(ERR_MULTIPLE_COLLECTIONS));
                }
            }
        }

        Ok(Some(components))
    }

    pub(crate) fn child_keys(&self, params: &[PropertyValue]) -> Result<ChildKeys, InternalError> {
        let mut expansion = Expansion::new();
        let mut offset = 0;

        for definition in &self.definitions {
            if offset >= params.len() {
                break;
            }
            let end = (offset + definition.param_count()).min(params.len());
            let child = definition.child_keys(&params[offset..end])?;
            offset += definition.param_count();

            if !expansion.merge(child, self.null_values_ignored)? {
                return Ok(ChildKeys::Absent);
            }
        }

        Ok(expansion.finish())
    }

    pub(crate) fn child_keys_from_record(
        &self,
        record: &dyn FieldSource,
    ) -> Result<ChildKeys, InternalError> {
        let mut expansion = Expansion::new();

        for definition in &self.definitions {
            let child = definition.child_keys_from_record(record)?;
            if !expansion.merge(child, self.null_values_ignored)? {
                return Ok(ChildKeys::Absent);
            }
        }

        Ok(expansion.finish())
    }

    pub(crate) fn field_clauses(&self) -> Vec<String> {
        self.definitions
            .iter()
            .flat_map(IndexDefinition::field_clauses)
            .collect()
    }

    pub(crate) fn restore(meta: &IndexDefinitionMetadata) -> Result<Self, InternalError> {
        let class_name = meta.class_name.as_deref().ok_or_else(|| {
            InternalError::index_configuration("composite index definition requires a class name")
        })?;

        if meta.children.is_empty() {
            return Err(InternalError::index_configuration(
                "composite index definition requires at least one child definition",
            ));
        }

        let mut composite =
            Self::new(class_name).with_null_values_ignored(meta.null_values_ignored);
        for child in &meta.children {
            composite.add_definition(IndexDefinition::restore(child)?)?;
        }

        if !meta.fields.is_empty() && meta.fields != composite.persisted_form().fields {
            return Err(InternalError::index_configuration(format!(
                "composite index definition on '{class_name}' lists fields that do not match its children"
            )));
        }

        Ok(composite)
    }
}

impl KeyDefinition for CompositeIndexDefinition {
    fn kind(&self) -> DefinitionKind {
        DefinitionKind::Composite
    }

    fn class_name(&self) -> Option<&str> {
        Some(&self.class_name)
    }

    fn field_names(&self) -> Vec<&str> {
        self.definitions
            .iter()
            .flat_map(IndexDefinition::field_names)
            .collect()
    }

    fn declared_types(&self) -> Vec<PropertyType> {
        self.definitions
            .iter()
            .flat_map(IndexDefinition::declared_types)
            .collect()
    }

    fn param_count(&self) -> usize {
        self.definitions.iter().map(IndexDefinition::param_count).sum()
    }

    fn is_null_values_ignored(&self) -> bool {
        self.null_values_ignored
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
        let children: Vec<IndexDefinitionMetadata> = self
            .definitions
            .iter()
            .map(IndexDefinition::persisted_form)
            .collect();

        IndexDefinitionMetadata {
            kind: DefinitionKind::Composite,
            class_name: Some(self.class_name.clone()),
            fields: children
                .iter()
                .flat_map(|child| child.fields.iter().cloned())
                .collect(),
            null_values_ignored: self.null_values_ignored,
            map_mode: None,
            collate: Collate::Default,
            children,
        }
    }

    fn to_create_index_ddl(&self, index_name: &str, index_type: &str, engine: Option<&str>) -> String {
        let key_types = if self.multi_value_index.is_none() {
            self.declared_types()
        } else {
            Vec::new()
        };

        IndexDdl {
            index_name,
            class_name: Some(&self.class_name),
            field_clauses: self.field_clauses(),
            index_type,
            engine,
            key_types,
        }
        .render()
    }
}

fn wrap(index: usize, siblings: &[Value], element: Value) -> CompositeKey {
    let (before, after) = siblings.split_at(index.min(siblings.len()));

    let mut key = CompositeKey::with_capacity(siblings.len() + 1);
    for component in before {
        key.append(component.clone());
    }
    key.append(element);
    for component in after {
        key.append(component.clone());
    }

    key
}

///
/// Expansion
///
/// Keys under construction. Holds a single key until a collection child
/// splits it into one key per element.
///

struct Expansion {
    keys: Vec<CompositeKey>,
    collection: bool,
}

impl Expansion {
    fn new() -> Self {
        Self {
            keys: vec![CompositeKey::new()],
            collection: false,
        }
    }

    // Returns false when the whole result must be dropped.
    fn merge(&mut self, child: ChildKeys, ignore_nulls: bool) -> Result<bool, InternalError> {
        match child {
            ChildKeys::Absent if ignore_nulls => return Ok(false),
            ChildKeys::Absent => self.push(&Value::Null),
            ChildKeys::One(value) => self.push(&value),
            ChildKeys::Many(items) if items.is_empty() && ignore_nulls => return Ok(false),
            ChildKeys::Many(items) => self.expand(items)?,
        }

        Ok(true)
    }

    fn push(&mut self, value: &Value) {
        for key in &mut self.keys {
            key.append(value.clone());
        }
    }

    fn expand(&mut self, items: Vec<Value>) -> Result<(), InternalError> {
        if self.collection {
            return Err(InternalError::index_configuration(ERR_MULTIPLE_COLLECTIONS));
        }
        self.collection = true;

        // an empty collection contributes one null component
        if items.is_empty() {
            self.push(&Value::Null);
            return Ok(());
        }

        let base = std::mem::take(&mut self.keys);
        self.keys = base
            .iter()
            .flat_map(|key| {
                items.iter().map(move |item| {
                    let mut expanded = key.clone();
                    expanded.append(item.clone());
                    expanded
                })
            })
            .collect();

        Ok(())
    }

    fn finish(self) -> ChildKeys {
        if self.collection {
            return ChildKeys::Many(self.keys.into_iter().map(Value::Composite).collect());
        }

        self.keys
            .into_iter()
            .next()
            .map_or(ChildKeys::Absent, |key| ChildKeys::One(Value::Composite(key)))
    }
}
