//! Lineup → PDU → subfeed topology.

/// Construction of a topology from a validated configuration.
pub mod build;
/// Lineups, PDUs, subfeeds, and their capacity accessors.
pub mod model;
pub mod naming;
/// Identifier newtypes.
pub mod types;

pub use model::{Lineup, Pdu, Subfeed, Topology};
pub use types::{LineupId, PduId, SubfeedId};
