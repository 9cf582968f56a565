//! Per-PDU load assignment.

use serde::Serialize;

use crate::capacity::{non_negative, parse_kw, round2};
use crate::topology::{LineupId, PduId, Topology};

/// Load assigned to one PDU.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PduLoad {
    /// PDU receiving the load.
    pub pdu_id: PduId,
    /// Lineup the PDU belongs to.
    pub lineup_id: LineupId,
    /// Assigned load (kW).
    pub kw: f64,
}

/// Mapping from PDU to assigned kW, kept in traversal order.
///
/// Produced wholesale by [`distribute`](super::distribute::distribute); the
/// only in-place mutation is the manual override path.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Assignment {
    loads: Vec<PduLoad>,
}

impl Assignment {
    /// All participating PDUs of `topology` at 0 kW.
    pub fn zeroed(topology: &Topology) -> Self {
        Self {
            loads: topology
                .participating_pdus()
                .map(|p| PduLoad {
                    pdu_id: p.id.clone(),
                    lineup_id: p.lineup_id.clone(),
                    kw: 0.0,
                })
                .collect(),
        }
    }

    pub(crate) fn from_loads(loads: Vec<PduLoad>) -> Self {
        Self { loads }
    }

    /// Assigned kW of a PDU; 0 for PDUs without an entry.
    pub fn get(&self, pdu: &PduId) -> f64 {
        self.loads
            .iter()
            .find(|l| &l.pdu_id == pdu)
            .map_or(0.0, |l| l.kw)
    }

    /// Sets a PDU's load directly, bypassing every ceiling.
    ///
    /// Non-finite and negative values clamp to 0; the value is rounded to two
    /// decimals. A PDU without an entry is appended.
    pub fn set_kw(&mut self, pdu: &PduId, lineup: &LineupId, kw: f64) {
        let kw = round2(non_negative(kw));
        match self.loads.iter_mut().find(|l| &l.pdu_id == pdu) {
            Some(entry) => entry.kw = kw,
            None => self.loads.push(PduLoad {
                pdu_id: pdu.clone(),
                lineup_id: lineup.clone(),
                kw,
            }),
        }
    }

    /// Manual override from user-entered text; unparseable input becomes 0.
    pub fn set_manual(&mut self, pdu: &PduId, lineup: &LineupId, input: &str) {
        self.set_kw(pdu, lineup, parse_kw(input));
    }

    /// Sum of all assigned load.
    pub fn total_kw(&self) -> f64 {
        round2(self.loads.iter().map(|l| l.kw).sum())
    }

    /// Sum of the load assigned to PDUs of `lineup`.
    pub fn lineup_total_kw(&self, lineup: &LineupId) -> f64 {
        round2(
            self.loads
                .iter()
                .filter(|l| &l.lineup_id == lineup)
                .map(|l| l.kw)
                .sum(),
        )
    }

    /// Sum of the load on PDUs that currently participate in `topology`.
    ///
    /// Entries left behind by a disabled PDU or lineup (a manual load, or a
    /// distribution that predates the toggle) are ignored.
    pub fn participating_total_kw(&self, topology: &Topology) -> f64 {
        round2(topology.participating_pdus().map(|p| self.get(&p.id)).sum())
    }

    /// Sum of the load on the enabled PDUs of `lineup`.
    ///
    /// # Panics
    ///
    /// Panics if `lineup` is not a lineup of `topology`.
    pub fn enabled_lineup_kw(&self, topology: &Topology, lineup: &LineupId) -> f64 {
        round2(topology.enabled_pdus_of(lineup).map(|p| self.get(&p.id)).sum())
    }

    /// Entries in traversal order.
    pub fn iter(&self) -> impl Iterator<Item = &PduLoad> {
        self.loads.iter()
    }

    /// Number of PDUs with an entry.
    pub fn len(&self) -> usize {
        self.loads.len()
    }

    /// Returns `true` if no PDU has an entry.
    pub fn is_empty(&self) -> bool {
        self.loads.is_empty()
    }
}
