//! Identifier types for topology elements.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::naming;

/// Identifier of a lineup, as named in the configuration (e.g. `"UPS-A01"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineupId(String);

impl LineupId {
    /// Wraps a lineup name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the lineup name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for LineupId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Identifier of a PDU, derived from its lineup and 1-based position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PduId(String);

impl PduId {
    /// Derives the id of the PDU at `position` (1-based) within `lineup`.
    pub fn derive(lineup: &LineupId, position: usize) -> Self {
        Self(naming::pdu_id(lineup.as_str(), position))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PduId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for PduId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Identifier of a subfeed breaker: its PDU and 0-based slot index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubfeedId {
    /// Owning PDU.
    pub pdu: PduId,
    /// Slot index on the PDU (0-based).
    pub index: usize,
}

impl SubfeedId {
    /// Creates a subfeed id.
    pub fn new(pdu: PduId, index: usize) -> Self {
        Self { pdu, index }
    }
}

impl fmt::Display for SubfeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&naming::subfeed_key(self.pdu.as_str(), self.index))
    }
}
