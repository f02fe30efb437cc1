//! Module: codec
//! Responsibility: the four binary encodings of `CompositeKey`.
//! Does not own: key construction or storage size-limit policy.
//! Boundary: every key handed to storage or the network passes through here.
//!
//! All four adapters drive the same component core, so the compact, positioned
//! and log-delta forms are byte-identical and the wire form differs only in its
//! framing and nested-composite support.

mod bounds;
mod compact;
mod component;
pub(crate) mod error;
mod positioned;
mod wal;
mod wire;

#[cfg(test)]
mod tests;

use std::fmt;
use thiserror::Error as ThisError;

// re-exports
pub use bounds::MAX_WIRE_DEPTH;
pub use compact::CompactCodec;
pub use positioned::PositionedCodec;
pub use wal::{LogDeltaCodec, PageChange, PageChanges, WalChanges};
pub use wire::{BinaryValueSerializer, ValueSerializer, WireCodec};

///
/// CodecKind
///
/// Which encoding produced an error or a metrics event.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum CodecKind {
    Compact,
    Positioned,
    LogDelta,
    Wire,
}

impl CodecKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Positioned => "positioned",
            Self::LogDelta => "log_delta",
            Self::Wire => "wire",
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

///
/// CodecError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CodecError {
    #[error("{codec} decode failed at offset {offset}: {reason}")]
    Corrupt {
        codec: CodecKind,
        offset: usize,
        reason: &'static str,
    },

    #[error("{codec} codec cannot encode {kind} components")]
    UnsupportedType { codec: CodecKind, kind: &'static str },

    #[error("{codec} codec limit exceeded for {what}: {actual} > {max}")]
    LimitExceeded {
        codec: CodecKind,
        what: &'static str,
        actual: usize,
        max: usize,
    },

    #[error("{codec} destination too small: need {needed} bytes, {available} available")]
    BufferTooSmall {
        codec: CodecKind,
        needed: usize,
        available: usize,
    },

    #[error("{codec} stream failure: {message}")]
    Io { codec: CodecKind, message: String },
}

impl CodecError {
    #[must_use]
    pub const fn codec(&self) -> CodecKind {
        match self {
            Self::Corrupt { codec, .. }
            | Self::UnsupportedType { codec, .. }
            | Self::LimitExceeded { codec, .. }
            | Self::BufferTooSmall { codec, .. }
            | Self::Io { codec, .. } => *codec,
        }
    }

    #[must_use]
    pub const fn is_corruption(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }
}
