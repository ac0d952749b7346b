//! Core data types and enums for transit data.

use std::fmt;
use std::str::FromStr;

use crate::identifiers::*;

// ============================================================================
// Enums
// ============================================================================

/// Kind of vehicle serving a line.
///
/// Only affects how a consumer draws the vehicle; the simulation treats all
/// kinds the same.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TransportKind {
    #[default]
    Bus,
    Ferry,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bus => "bus",
            Self::Ferry => "ferry",
        }
    }
}

impl FromStr for TransportKind {
    type Err = TransitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "bus" => Ok(Self::Bus),
            "ferry" | "boat" => Ok(Self::Ferry),
            other => Err(TransitError::InvalidData(format!(
                "Unknown transport kind: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TransitError {
    #[error("Line not found: {0}")]
    LineNotFound(LineIdentifier),

    #[error("Invalid schedule time: {0:?}")]
    InvalidTime(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Route unavailable for line {line}: {reason}")]
    RouteUnavailable {
        line: LineIdentifier,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, TransitError>;
