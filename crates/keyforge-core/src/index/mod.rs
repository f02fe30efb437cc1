//! Module: index
//! Responsibility: index definitions, key building and change reconciliation.
//! Does not own: key storage, encoding, or schema management.
//! Boundary: definitions are immutable once built and hold no external state.

mod binding;
mod collate;
mod composite;
mod ddl;
mod delta;
mod event;
mod keys;
mod list;
mod map;
mod metadata;
mod property;
mod record;
mod ref_bag;
mod simple;

#[cfg(test)]
mod tests;

use crate::{
    error::InternalError,
    obs::sink::{self, MetricsEvent},
    value::{PropertyValue, Value},
};
use event::DeltaOp;
use keyforge_primitives::PropertyType;
use keys::ChildKeys;
use serde::{Deserialize, Serialize};
use std::fmt;

// re-exports
pub use collate::Collate;
pub use composite::CompositeIndexDefinition;
pub use delta::KeyDelta;
pub use event::{ChangeEvent, ChangeKind};
pub use keys::IndexKeys;
pub use list::PropertyListIndexDefinition;
pub use map::{MapIndexBy, PropertyMapIndexDefinition};
pub use metadata::{FieldMetadata, IndexDefinitionMetadata, MAX_METADATA_BYTES};
pub use property::PropertyIndexDefinition;
pub use record::{FieldSource, Record};
pub use ref_bag::PropertyRefBagIndexDefinition;
pub use simple::SimpleKeyIndexDefinition;

///
/// DefinitionKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    Property,
    List,
    Map,
    RefBag,
    Composite,
    Simple,
}

impl DefinitionKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Property => "property",
            Self::List => "list",
            Self::Map => "map",
            Self::RefBag => "ref_bag",
            Self::Composite => "composite",
            Self::Simple => "simple",
        }
    }

    /// True for definitions that produce one key per collection element.
    #[must_use]
    pub const fn is_multi_value(self) -> bool {
        matches!(self, Self::List | Self::Map | Self::RefBag)
    }
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

///
/// KeyDefinition
///
/// Contract shared by every definition variant.
///

pub trait KeyDefinition {
    fn kind(&self) -> DefinitionKind;

    /// Owning class; `None` for positional definitions.
    fn class_name(&self) -> Option<&str>;

    fn field_names(&self) -> Vec<&str>;

    fn declared_types(&self) -> Vec<PropertyType>;

    /// Number of positional params `create_value` consumes.
    fn param_count(&self) -> usize;

    fn is_null_values_ignored(&self) -> bool;

    /// Build keys from positional params.
    ///
    /// Trailing params beyond `param_count` are ignored. `Ok(None)` means
    /// the input produces no key at all.
    fn create_value(&self, params: &[PropertyValue]) -> Result<Option<IndexKeys>, InternalError>;

    /// Build keys by reading each declared field from `record`.
    fn value_from_record(
        &self,
        record: &dyn FieldSource,
    ) -> Result<Option<IndexKeys>, InternalError>;

    fn persisted_form(&self) -> IndexDefinitionMetadata;

    fn to_create_index_ddl(&self, index_name: &str, index_type: &str, engine: Option<&str>) -> String;
}

///
/// IndexDefinition
///
/// Closed set of definition variants. Composite definitions nest this type.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum IndexDefinition {
    Property(PropertyIndexDefinition),
    List(PropertyListIndexDefinition),
    Map(PropertyMapIndexDefinition),
    RefBag(PropertyRefBagIndexDefinition),
    Composite(CompositeIndexDefinition),
    Simple(SimpleKeyIndexDefinition),
}

macro_rules! dispatch {
    ($self:expr, $def:ident => $body:expr) => {
        match $self {
            IndexDefinition::Property($def) => $body,
            IndexDefinition::List($def) => $body,
            IndexDefinition::Map($def) => $body,
            IndexDefinition::RefBag($def) => $body,
            IndexDefinition::Composite($def) => $body,
            IndexDefinition::Simple($def) => $body,
        }
    };
}

impl IndexDefinition {
    /// Rebuild a definition from its persisted form, validating its shape.
    pub fn restore(meta: &IndexDefinitionMetadata) -> Result<Self, InternalError> {
        Ok(match meta.kind {
            DefinitionKind::Property => Self::Property(PropertyIndexDefinition::restore(meta)?),
            DefinitionKind::List => Self::List(PropertyListIndexDefinition::restore(meta)?),
            DefinitionKind::Map => Self::Map(PropertyMapIndexDefinition::restore(meta)?),
            DefinitionKind::RefBag => Self::RefBag(PropertyRefBagIndexDefinition::restore(meta)?),
            DefinitionKind::Composite => {
                Self::Composite(CompositeIndexDefinition::restore(meta)?)
            }
            DefinitionKind::Simple => Self::Simple(SimpleKeyIndexDefinition::restore(meta)?),
        })
    }

    /// Decode persisted metadata bytes and restore the definition.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, InternalError> {
        Self::restore(&IndexDefinitionMetadata::from_bytes(bytes)?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, InternalError> {
        self.persisted_form().to_bytes()
    }

    #[must_use]
    pub fn is_multi_value(&self) -> bool {
        self.kind().is_multi_value()
    }

    #[must_use]
    pub const fn as_composite(&self) -> Option<&CompositeIndexDefinition> {
        match self {
            Self::Composite(def) => Some(def),
            _ => None,
        }
    }

    /// Indexed fields, decorated with map mode and collate.
    #[must_use]
    pub fn fields_to_index(&self) -> Vec<String> {
        match self {
            Self::Property(def) => def.fields_to_index(),
            Self::List(def) => def.fields_to_index(),
            Self::Map(def) => def.fields_to_index(),
            Self::RefBag(def) => def.fields_to_index(),
            Self::Composite(def) => def.fields_to_index(),
            Self::Simple(_) => Vec::new(),
        }
    }

    /// Coerce one element (or one scalar) to its key.
    pub fn create_single_value(&self, element: &Value) -> Result<Value, InternalError> {
        match self {
            Self::Property(def) => def.create_single_value(element),
            Self::List(def) => def.create_single_value(element),
            Self::Map(def) => def.create_single_value(element),
            Self::RefBag(def) => def.create_single_value(element),
            Self::Composite(_) | Self::Simple(_) => Err(InternalError::index_configuration(
                format!("{} index definition has no single-element form", self.kind()),
            )),
        }
    }

    /// Fold one collection mutation into `delta`.
    ///
    /// `sibling_params` is only read by composite definitions and carries the
    /// values of the non-collection children in declaration order.
    pub fn process_change_event(
        &self,
        event: &ChangeEvent,
        delta: &mut KeyDelta,
        sibling_params: &[PropertyValue],
    ) -> Result<(), InternalError> {
        let ops = match self {
            Self::Composite(def) => def.event_ops(event, sibling_params)?,
            other => other.event_ops(event)?,
        };
        for op in ops {
            delta.apply(op);
        }

        Ok(())
    }

    /// Reconcile an ordered batch of events into one net delta.
    ///
    /// Events must arrive in the order they happened; a failing event leaves
    /// no partial delta behind.
    pub fn reconcile(
        &self,
        events: &[ChangeEvent],
        sibling_params: &[PropertyValue],
    ) -> Result<KeyDelta, InternalError> {
        let mut delta = KeyDelta::new();
        for event in events {
            self.process_change_event(event, &mut delta, sibling_params)?;
        }

        sink::record(MetricsEvent::KeyDelta {
            inserts: delta.inserts(),
            removes: delta.removes(),
        });

        Ok(delta)
    }

    pub(crate) fn event_ops(&self, event: &ChangeEvent) -> Result<Vec<DeltaOp>, InternalError> {
        match self {
            Self::List(def) => def.event_ops(event),
            Self::Map(def) => def.event_ops(event),
            Self::RefBag(def) => def.event_ops(event),
            Self::Property(_) | Self::Composite(_) | Self::Simple(_) => {
                Err(InternalError::index_configuration(format!(
                    "{} index definition does not track collection changes",
                    self.kind()
                )))
            }
        }
    }

    pub(crate) fn child_keys(&self, params: &[PropertyValue]) -> Result<ChildKeys, InternalError> {
        dispatch!(self, def => def.child_keys(params))
    }

    pub(crate) fn child_keys_from_record(
        &self,
        record: &dyn FieldSource,
    ) -> Result<ChildKeys, InternalError> {
        match self {
            Self::Property(def) => def.child_keys_from_record(record),
            Self::List(def) => def.child_keys_from_record(record),
            Self::Map(def) => def.child_keys_from_record(record),
            Self::RefBag(def) => def.child_keys_from_record(record),
            Self::Composite(def) => def.child_keys_from_record(record),
            Self::Simple(_) => Ok(ChildKeys::Absent),
        }
    }

    pub(crate) fn field_clauses(&self) -> Vec<String> {
        match self {
            Self::Property(def) => def.field_clauses(),
            Self::List(def) => def.field_clauses(),
            Self::Map(def) => def.field_clauses(),
            Self::RefBag(def) => def.field_clauses(),
            Self::Composite(def) => def.field_clauses(),
            Self::Simple(_) => Vec::new(),
        }
    }

    fn observe(&self, result: &Result<Option<IndexKeys>, InternalError>) {
        let kind = self.kind();
        match result {
            Ok(Some(keys)) => sink::record(MetricsEvent::KeysBuilt {
                kind,
                keys: keys.len() as u64,
            }),
            Ok(None) => sink::record(MetricsEvent::KeysDropped { kind }),
            Err(_) => {}
        }
    }
}

impl KeyDefinition for IndexDefinition {
    fn kind(&self) -> DefinitionKind {
        dispatch!(self, def => def.kind())
    }

    fn class_name(&self) -> Option<&str> {
        dispatch!(self, def => def.class_name())
    }

    fn field_names(&self) -> Vec<&str> {
        dispatch!(self, def => def.field_names())
    }

    fn declared_types(&self) -> Vec<PropertyType> {
        dispatch!(self, def => def.declared_types())
    }

    fn param_count(&self) -> usize {
        dispatch!(self, def => def.param_count())
    }

    fn is_null_values_ignored(&self) -> bool {
        dispatch!(self, def => def.is_null_values_ignored())
    }

    fn create_value(&self, params: &[PropertyValue]) -> Result<Option<IndexKeys>, InternalError> {
        let result = dispatch!(self, def => def.create_value(params));
        self.observe(&result);

        result
    }

    fn value_from_record(
        &self,
        record: &dyn FieldSource,
    ) -> Result<Option<IndexKeys>, InternalError> {
        let result = dispatch!(self, def => def.value_from_record(record));
        self.observe(&result);

        result
    }

    fn persisted_form(&self) -> IndexDefinitionMetadata {
        dispatch!(self, def => def.persisted_form())
    }

    fn to_create_index_ddl(&self, index_name: &str, index_type: &str, engine: Option<&str>) -> String {
        dispatch!(self, def => def.to_create_index_ddl(index_name, index_type, engine))
    }
}

macro_rules! index_definition_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for IndexDefinition {
                fn from(def: $ty) -> Self {
                    Self::$variant(def)
                }
            }
        )*
    };
}

index_definition_from! {
    Property => PropertyIndexDefinition,
    List => PropertyListIndexDefinition,
    Map => PropertyMapIndexDefinition,
    RefBag => PropertyRefBagIndexDefinition,
    Composite => CompositeIndexDefinition,
    Simple => SimpleKeyIndexDefinition,
}
