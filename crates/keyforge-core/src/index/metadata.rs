use crate::{
    error::InternalError,
    index::{Collate, DefinitionKind, MapIndexBy},
    serialize::{self, deserialize_bounded},
};
use keyforge_primitives::PropertyType;
use serde::{Deserialize, Serialize};

/// Upper bound on an encoded metadata record.
pub const MAX_METADATA_BYTES: usize = 64 * 1024;

///
/// IndexDefinitionMetadata
///
/// Persisted configuration of one definition. Composite definitions carry
/// their children in declaration order and repeat the flattened field list.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct IndexDefinitionMetadata {
    pub kind: DefinitionKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,

    #[serde(default)]
    pub fields: Vec<FieldMetadata>,

    pub null_values_ignored: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_mode: Option<MapIndexBy>,

    #[serde(default)]
    pub collate: Collate,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Self>,
}

impl IndexDefinitionMetadata {
    /// Encode as CBOR.
    pub fn to_bytes(&self) -> Result<Vec<u8>, InternalError> {
        Ok(serialize::serialize(self)?)
    }

    /// Decode a record produced by [`Self::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, InternalError> {
        Ok(deserialize_bounded(bytes, MAX_METADATA_BYTES)?)
    }
}

///
/// FieldMetadata
///
/// One declared field: its name (absent for positional definitions) and
/// the upper-case property type name.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FieldMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type")]
    pub type_name: String,
}

impl FieldMetadata {
    #[must_use]
    pub fn new(name: Option<&str>, ty: PropertyType) -> Self {
        Self {
            name: name.map(str::to_string),
            type_name: ty.name().to_string(),
        }
    }

    /// Resolve the declared type name.
    pub fn property_type(&self) -> Result<PropertyType, InternalError> {
        PropertyType::from_name(&self.type_name).ok_or_else(|| {
            InternalError::index_configuration(format!(
                "unknown property type '{}'",
                self.type_name
            ))
        })
    }
}
