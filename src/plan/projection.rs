//! Subfeed loads derived from PDU loads.
//!
//! Subfeed load is never stored. It is projected from the assignment, the
//! active-subfeed counts, and a [`SharingMode`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::assignment::Assignment;
use crate::capacity::round2;
use crate::error::ConfigError;
use crate::topology::{LineupId, PduId, SubfeedId, Topology};

/// How load spreads across the loadbanks on active subfeeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SharingMode {
    /// Loadbanks are networked: a lineup's load splits evenly over every
    /// active subfeed in that lineup.
    #[default]
    Networked,
    /// Loadbanks are isolated per PDU: a PDU's load splits over its own
    /// active subfeeds only.
    PerPdu,
}

impl fmt::Display for SharingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Networked => write!(f, "networked"),
            Self::PerPdu => write!(f, "perPdu"),
        }
    }
}

impl FromStr for SharingMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "networked" => Ok(Self::Networked),
            "perpdu" | "isolated" => Ok(Self::PerPdu),
            _ => Err(ConfigError::new(
                "sharingMode",
                format!("unknown sharing mode \"{s}\", expected networked or per-pdu"),
            )),
        }
    }
}

/// Projected load on one active subfeed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubfeedLoad {
    /// Subfeed slot.
    pub id: SubfeedId,
    /// Lineup of the owning PDU.
    pub lineup_id: LineupId,
    /// Share of load carried by this subfeed (kW).
    pub load_kw: f64,
    /// Breaker-derived ceiling (kW).
    pub breaker_kw: f64,
    /// Physical loadbank-unit ceiling (kW).
    pub loadbank_max_kw: f64,
}

/// Per-subfeed share for every active subfeed on `pdu`.
///
/// Returns 0 when the divisor (active subfeeds in the lineup or on the PDU)
/// is zero.
pub fn subfeed_share_kw(
    topology: &Topology,
    assignment: &Assignment,
    pdu: &PduId,
    mode: SharingMode,
) -> f64 {
    let (load, count) = match mode {
        SharingMode::Networked => {
            let lineup = &topology.pdu(pdu).lineup_id;
            let count: usize = topology
                .enabled_pdus_of(lineup)
                .map(|p| p.active_subfeed_count())
                .sum();
            (assignment.enabled_lineup_kw(topology, lineup), count)
        }
        SharingMode::PerPdu => (
            assignment.get(pdu),
            topology.active_subfeeds_of(pdu).count(),
        ),
    };
    if count == 0 {
        0.0
    } else {
        round2(load / count as f64)
    }
}

/// Projected loads of every active subfeed on the participating PDUs, in
/// traversal order then slot order.
pub fn subfeed_loads(
    topology: &Topology,
    assignment: &Assignment,
    mode: SharingMode,
) -> Vec<SubfeedLoad> {
    let mut loads = Vec::new();
    for pdu in topology.participating_pdus() {
        let share = subfeed_share_kw(topology, assignment, &pdu.id, mode);
        for subfeed in pdu.active_subfeeds() {
            loads.push(SubfeedLoad {
                id: SubfeedId::new(pdu.id.clone(), subfeed.index),
                lineup_id: pdu.lineup_id.clone(),
                load_kw: share,
                breaker_kw: round2(topology.subfeed_rating_kw(subfeed)),
                loadbank_max_kw: subfeed.loadbank_max_kw,
            });
        }
    }
    loads
}
