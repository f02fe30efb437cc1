use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

///
/// RecordId
///
/// Physical identity of one record: a cluster id plus a position inside that
/// cluster. Orders by cluster first, then position.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct RecordId {
    cluster: i16,
    position: i64,
}

impl RecordId {
    #[must_use]
    pub const fn new(cluster: i16, position: i64) -> Self {
        Self { cluster, position }
    }

    #[must_use]
    pub const fn cluster(&self) -> i16 {
        self.cluster
    }

    #[must_use]
    pub const fn position(&self) -> i64 {
        self.position
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}:{}", self.cluster, self.position)
    }
}

///
/// RecordIdParseError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum RecordIdParseError {
    #[error("record id '{0}' is missing the ':' separator")]
    MissingSeparator(String),

    #[error("record id '{0}' has an invalid cluster id")]
    InvalidCluster(String),

    #[error("record id '{0}' has an invalid cluster position")]
    InvalidPosition(String),
}

impl FromStr for RecordId {
    type Err = RecordIdParseError;

    // Accepts both `#12:7` and `12:7`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let body = raw.strip_prefix('#').unwrap_or(raw);

        let (cluster, position) = body
            .split_once(':')
            .ok_or_else(|| RecordIdParseError::MissingSeparator(raw.to_string()))?;

        let cluster = cluster
            .parse::<i16>()
            .map_err(|_| RecordIdParseError::InvalidCluster(raw.to_string()))?;
        let position = position
            .parse::<i64>()
            .map_err(|_| RecordIdParseError::InvalidPosition(raw.to_string()))?;

        Ok(Self::new(cluster, position))
    }
}

///
/// TESTS
///
