//! Module: serialize
//! Responsibility: CBOR encoding of persisted definition metadata.
//! Does not own: key encodings (see `codec`).
//! Boundary: every decode is size-bounded by the caller.

mod cbor;

#[cfg(test)]
mod tests;

use crate::error::{ErrorClass, InternalError};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error as ThisError;

///
/// SerializeError
///

#[derive(Debug, ThisError)]
pub enum SerializeError {
    #[error("serialize error: {0}")]
    Serialize(String),

    #[error("deserialize error: {0}")]
    Deserialize(String),

    #[error("deserialize size limit exceeded: {len} bytes (limit {max_bytes})")]
    DeserializeSizeLimitExceeded { len: usize, max_bytes: usize },
}

///
/// SerializeErrorKind
///
/// Stable error-kind taxonomy for serializer failures.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SerializeErrorKind {
    Serialize,
    Deserialize,
    DeserializeSizeLimitExceeded,
}

impl SerializeErrorKind {
    /// Runtime class of a failure of this kind.
    ///
    /// Bytes that fail to decode are treated as corrupt persisted state; an
    /// oversized payload is refused before decoding.
    #[must_use]
    pub const fn class(self) -> ErrorClass {
        match self {
            Self::Serialize => ErrorClass::Internal,
            Self::Deserialize => ErrorClass::Corruption,
            Self::DeserializeSizeLimitExceeded => ErrorClass::Unsupported,
        }
    }
}

impl SerializeError {
    /// Stable error kind independent of backend message text.
    #[must_use]
    pub const fn kind(&self) -> SerializeErrorKind {
        match self {
            Self::Serialize(_) => SerializeErrorKind::Serialize,
            Self::Deserialize(_) => SerializeErrorKind::Deserialize,
            Self::DeserializeSizeLimitExceeded { .. } => {
                SerializeErrorKind::DeserializeSizeLimitExceeded
            }
        }
    }
}

impl From<SerializeError> for InternalError {
    fn from(err: SerializeError) -> Self {
        Self::serialize(err.kind().class(), err.to_string())
    }
}

/// Serialize a value to CBOR.
pub fn serialize<T>(ty: &T) -> Result<Vec<u8>, SerializeError>
where
    T: Serialize,
{
    cbor::serialize(ty)
}

/// Deserialize a value produced by [`serialize`], with an explicit size limit.
pub fn deserialize_bounded<T>(bytes: &[u8], max_bytes: usize) -> Result<T, SerializeError>
where
    T: DeserializeOwned,
{
    if bytes.len() > max_bytes {
        return Err(SerializeError::DeserializeSizeLimitExceeded {
            len: bytes.len(),
            max_bytes,
        });
    }

    cbor::deserialize(bytes)
}
