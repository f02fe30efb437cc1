use crate::{codec::CodecError, value::CoercionError};
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable classification.
/// Every fallible operation in this crate returns it synchronously; nothing is
/// retried or partially applied on failure.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    /// The variant (if present) must correspond to `origin`.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    /// Construct an InternalError without a structured detail payload.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct an index-origin configuration error.
    pub(crate) fn index_configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Configuration, ErrorOrigin::Index, message)
    }

    /// Construct an index-origin invariant violation.
    pub(crate) fn index_invariant(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvariantViolation, ErrorOrigin::Index, message)
    }

    /// Construct a serialize-origin error of the given class.
    pub(crate) fn serialize(class: ErrorClass, message: impl Into<String>) -> Self {
        Self::new(class, ErrorOrigin::Serialize, message)
    }

    /// Wrap a coercion failure for one declared field.
    pub(crate) fn coercion(field: Option<&str>, err: CoercionError) -> Self {
        let message = match field {
            Some(field) => format!("field '{field}': {err}"),
            None => err.to_string(),
        };

        Self {
            class: ErrorClass::Coercion,
            origin: ErrorOrigin::Value,
            message,
            detail: Some(ErrorDetail::Coercion {
                field: field.map(str::to_string),
                source: err,
            }),
        }
    }

    #[must_use]
    pub const fn is_corruption(&self) -> bool {
        matches!(self.class, ErrorClass::Corruption)
    }

    #[must_use]
    pub const fn is_coercion(&self) -> bool {
        matches!(self.class, ErrorClass::Coercion)
    }

    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self.class, ErrorClass::Configuration)
    }

    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self.class, ErrorClass::Unsupported)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorDetail
///
/// Structured, origin-specific error detail carried by [`InternalError`].
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{source}")]
    Coercion {
        field: Option<String>,
        source: CoercionError,
    },

    #[error("{0}")]
    Codec(CodecError),
}

impl From<CodecError> for InternalError {
    fn from(err: CodecError) -> Self {
        let class = match err {
            CodecError::Corrupt { .. } => ErrorClass::Corruption,
            CodecError::UnsupportedType { .. } | CodecError::LimitExceeded { .. } => {
                ErrorClass::Unsupported
            }
            CodecError::Io { .. } | CodecError::BufferTooSmall { .. } => ErrorClass::Internal,
        };

        Self {
            class,
            origin: ErrorOrigin::Codec,
            message: err.to_string(),
            detail: Some(ErrorDetail::Codec(err)),
        }
    }
}

///
/// ErrorClass
/// Error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Coercion,
    Configuration,
    Corruption,
    Unsupported,
    InvariantViolation,
    Internal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Coercion => "coercion",
            Self::Configuration => "configuration",
            Self::Corruption => "corruption",
            Self::Unsupported => "unsupported",
            Self::InvariantViolation => "invariant_violation",
            Self::Internal => "internal",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Value,
    Key,
    Index,
    Codec,
    Serialize,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Value => "value",
            Self::Key => "key",
            Self::Index => "index",
            Self::Codec => "codec",
            Self::Serialize => "serialize",
        };
        write!(f, "{label}")
    }
}
