//! Bounded round-robin load distribution.
//!
//! Load is handed out in fixed steps, one PDU at a time, cycling through
//! every participating PDU before any receives a second step. This spreads
//! load evenly across lineups instead of filling PDUs to capacity in order.
//!
//! Internally all quantities are integer hundredths of a kW. Ceilings are
//! floored to that grid and the target is rounded to it, so the placed load
//! plus the remainder always equals the rounded target exactly and no PDU or
//! lineup ever ends above its ceiling.

use serde::Serialize;
use tracing::debug;

use super::assignment::{Assignment, PduLoad};
use crate::capacity::non_negative;
use crate::topology::{LineupId, PduId, Topology};

/// Allocation granularity per PDU per round (kW).
pub const STEP_KW: f64 = 10.0;

const CENTS_PER_KW: f64 = 100.0;
const STEP_CENTS: i64 = (STEP_KW * CENTS_PER_KW) as i64;

/// Output of [`distribute`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionResult {
    /// Load placed on each participating PDU.
    pub assignment: Assignment,
    /// Target load that could not be placed (kW).
    pub unassigned_kw: f64,
    /// Enabled lineups whose placed load reached their effective maximum,
    /// in lineup order.
    pub saturated_lineups: Vec<LineupId>,
}

struct LineupBudget {
    id: LineupId,
    max: i64,
    used: i64,
}

struct PduSlot {
    id: PduId,
    lineup: usize,
    ceiling: i64,
    assigned: i64,
}

/// Distributes `target_kw` across the enabled PDUs of the enabled lineups.
///
/// Each round visits PDUs in traversal order (lineup order, then PDU
/// position) and gives each one `min(PDU headroom, lineup headroom,
/// remaining target, STEP_KW)`. A PDU is skipped once it reaches its
/// distribution ceiling ([`Topology::pdu_ceiling_kw`]) or its lineup reaches
/// its effective maximum. Rounds stop when the target is placed or a full
/// round places nothing.
///
/// Never fails: a negative or non-finite target is treated as 0.
///
/// # Arguments
///
/// * `topology` - Lineups, PDUs and active subfeeds to fill
/// * `target_kw` - Total load to place (kW)
///
/// # Returns
///
/// The assignment, the load left unplaced, and the lineups that reached
/// their effective maximum.
///
/// # Examples
///
/// ```
/// use loadplan::config::PlanConfig;
/// use loadplan::plan::distribute;
/// use loadplan::topology::Topology;
///
/// let topology = Topology::from_config(&PlanConfig::baseline()).unwrap();
/// let result = distribute(&topology, 0.0);
/// assert_eq!(result.assignment.total_kw(), 0.0);
/// assert_eq!(result.unassigned_kw, 0.0);
/// ```
pub fn distribute(topology: &Topology, target_kw: f64) -> DistributionResult {
    let mut lineups: Vec<LineupBudget> = Vec::new();
    let mut slots: Vec<PduSlot> = Vec::new();
    for lineup in topology.enabled_lineups() {
        let index = lineups.len();
        lineups.push(LineupBudget {
            id: lineup.id.clone(),
            max: floor_cents(topology.effective_lineup_max_kw(&lineup.id)),
            used: 0,
        });
        for pdu in lineup.pdus().iter().filter(|p| p.is_enabled()) {
            slots.push(PduSlot {
                id: pdu.id.clone(),
                lineup: index,
                ceiling: floor_cents(topology.pdu_ceiling_kw(&pdu.id)),
                assigned: 0,
            });
        }
    }

    let target = round_cents(target_kw);
    let mut remaining = target;
    let mut rounds = 0usize;
    // Slots with headroom left, in traversal order. A full PDU or lineup
    // never regains headroom, so dropping it keeps each round proportional
    // to the PDUs still filling.
    let mut live: Vec<usize> = (0..slots.len()).collect();
    while remaining > 0 && !live.is_empty() {
        let mut placed_this_round = false;
        for &i in &live {
            let slot = &mut slots[i];
            let budget = &mut lineups[slot.lineup];
            let amount = (slot.ceiling - slot.assigned)
                .min(budget.max - budget.used)
                .min(remaining)
                .min(STEP_CENTS);
            if amount <= 0 {
                continue;
            }
            slot.assigned += amount;
            budget.used += amount;
            remaining -= amount;
            placed_this_round = true;
            if remaining == 0 {
                break;
            }
        }
        rounds += 1;
        if !placed_this_round {
            break;
        }
        live.retain(|&i| {
            let slot = &slots[i];
            let budget = &lineups[slot.lineup];
            slot.assigned < slot.ceiling && budget.used < budget.max
        });
    }

    let saturated_lineups: Vec<LineupId> = lineups
        .iter()
        .filter(|l| l.used >= l.max)
        .map(|l| l.id.clone())
        .collect();
    debug!(
        target_kw = to_kw(target),
        unassigned_kw = to_kw(remaining),
        pdus = slots.len(),
        rounds,
        saturated = saturated_lineups.len(),
        "distributed load"
    );

    let loads = slots
        .into_iter()
        .map(|slot| PduLoad {
            pdu_id: slot.id,
            lineup_id: lineups[slot.lineup].id.clone(),
            kw: to_kw(slot.assigned),
        })
        .collect();

    DistributionResult {
        assignment: Assignment::from_loads(loads),
        unassigned_kw: to_kw(remaining),
        saturated_lineups,
    }
}

// Tolerance keeps ratings that land exactly on a cent from losing it to
// float error.
fn floor_cents(kw: f64) -> i64 {
    (non_negative(kw) * CENTS_PER_KW + 1e-6).floor() as i64
}

fn round_cents(kw: f64) -> i64 {
    (non_negative(kw) * CENTS_PER_KW).round() as i64
}

fn to_kw(cents: i64) -> f64 {
    cents as f64 / CENTS_PER_KW
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capacity::CircuitRating;
    use crate::topology::{Lineup, Pdu, SubfeedId};

    fn rating_for_kw(kw: f64, amps: f64) -> CircuitRating {
        CircuitRating::new(kw * 1000.0 / (3.0_f64.sqrt() * amps), amps)
    }

    /// `lineups` lineups of `pdus` PDUs each, every PDU with main rating
    /// `pdu_kw` and no active subfeeds.
    fn grid(lineups: usize, pdus: usize, pdu_kw: f64, lineup_max_kw: f64) -> Topology {
        let lineups = (1..=lineups)
            .map(|i| {
                let id = LineupId::new(format!("A{i:02}"));
                let pdus = (1..=pdus)
                    .map(|p| {
                        Pdu::new(
                            id.clone(),
                            p,
                            rating_for_kw(pdu_kw, 1000.0),
                            rating_for_kw(50.0, 100.0),
                            600.0,
                            8,
                        )
                    })
                    .collect();
                Lineup::new(id, pdus)
            })
            .collect();
        Topology::new(lineups, 1.0, lineup_max_kw)
    }

    #[test]
    fn lineup_cap_is_ceiling_not_fill_target() {
        let topo = grid(2, 2, 400.0, 600.0);
        let result = distribute(&topo, 1000.0);
        assert_eq!(result.unassigned_kw, 0.0);
        assert!(result.saturated_lineups.is_empty());
        assert_eq!(result.assignment.lineup_total_kw(&LineupId::new("A01")), 500.0);
        assert_eq!(result.assignment.lineup_total_kw(&LineupId::new("A02")), 500.0);
        for load in result.assignment.iter() {
            assert_eq!(load.kw, 250.0);
        }
    }

    #[test]
    fn zero_target_places_nothing() {
        let topo = grid(2, 2, 400.0, 600.0);
        let result = distribute(&topo, 0.0);
        assert_eq!(result.assignment.len(), 4);
        assert!(result.assignment.iter().all(|l| l.kw == 0.0));
        assert_eq!(result.unassigned_kw, 0.0);
    }

    #[test]
    fn no_enabled_pdus_leaves_whole_target() {
        let mut topo = grid(1, 2, 400.0, 600.0);
        topo.set_lineup_enabled(&LineupId::new("A01"), false);
        let result = distribute(&topo, 750.0);
        assert!(result.assignment.is_empty());
        assert_eq!(result.unassigned_kw, 750.0);
        assert!(result.saturated_lineups.is_empty());
    }

    #[test]
    fn zero_capacity_lineup_is_saturated_immediately() {
        let mut topo = grid(2, 1, 400.0, 600.0);
        topo.set_reduced_capacity(&LineupId::new("A01"), Some(0.0));
        let result = distribute(&topo, 100.0);
        assert_eq!(result.assignment.get(&PduId::from("PDU-A01-1")), 0.0);
        assert_eq!(result.assignment.get(&PduId::from("PDU-A02-1")), 100.0);
        assert_eq!(result.saturated_lineups, vec![LineupId::new("A01")]);
    }

    #[test]
    fn lineup_saturation_reported_with_remainder() {
        let topo = grid(2, 2, 400.0, 600.0);
        let result = distribute(&topo, 1500.0);
        assert_eq!(result.assignment.total_kw(), 1200.0);
        assert_eq!(result.unassigned_kw, 300.0);
        assert_eq!(
            result.saturated_lineups,
            vec![LineupId::new("A01"), LineupId::new("A02")]
        );
    }

    #[test]
    fn subfeed_ceiling_limits_pdu() {
        let mut topo = grid(1, 1, 800.0, 1200.0);
        let pdu = PduId::from("PDU-A01-1");
        for i in 0..3 {
            topo.set_subfeed_active(&SubfeedId::new(pdu.clone(), i), true);
        }
        let result = distribute(&topo, 1000.0);
        assert_eq!(result.assignment.get(&pdu), 150.0);
        assert_eq!(result.unassigned_kw, 850.0);
        assert!(result.saturated_lineups.is_empty());
    }

    #[test]
    fn partial_step_goes_to_first_pdu_in_order() {
        let topo = grid(1, 3, 400.0, 1200.0);
        let result = distribute(&topo, 25.0);
        let loads: Vec<f64> = result.assignment.iter().map(|l| l.kw).collect();
        assert_eq!(loads, vec![10.0, 10.0, 5.0]);
    }

    #[test]
    fn odd_ceilings_never_exceeded() {
        let topo = grid(1, 2, 123.456, 1200.0);
        let result = distribute(&topo, 1000.0);
        for load in result.assignment.iter() {
            assert!(load.kw <= 123.456);
            assert_eq!(load.kw, 123.45);
        }
        assert!((result.assignment.total_kw() + result.unassigned_kw - 1000.0).abs() < 0.01);
    }

    #[test]
    fn disabled_pdu_receives_nothing() {
        let mut topo = grid(1, 2, 400.0, 1200.0);
        topo.set_pdu_enabled(&PduId::from("PDU-A01-1"), false);
        let result = distribute(&topo, 100.0);
        assert_eq!(result.assignment.len(), 1);
        assert_eq!(result.assignment.get(&PduId::from("PDU-A01-2")), 100.0);
    }

    #[test]
    fn full_pdus_drop_out_of_later_rounds() {
        let id = LineupId::new("A01");
        let pdus = (1..=500)
            .map(|p| {
                let main_kw = if p == 500 { 2.0e6 } else { 10.0 };
                Pdu::new(
                    id.clone(),
                    p,
                    rating_for_kw(main_kw, 1000.0),
                    rating_for_kw(50.0, 100.0),
                    600.0,
                    8,
                )
            })
            .collect();
        let topo = Topology::new(vec![Lineup::new(id.clone(), pdus)], 1.0, 1.0e6);

        let result = distribute(&topo, 1.0e6);
        assert_eq!(result.unassigned_kw, 0.0);
        assert_eq!(result.assignment.get(&PduId::from("PDU-A01-1")), 10.0);
        assert_eq!(result.assignment.get(&PduId::from("PDU-A01-500")), 995_010.0);
        assert_eq!(result.saturated_lineups, vec![id]);
    }

    #[test]
    fn negative_target_is_zero() {
        let topo = grid(1, 1, 400.0, 1200.0);
        let result = distribute(&topo, -5.0);
        assert_eq!(result.unassigned_kw, 0.0);
        assert_eq!(result.assignment.total_kw(), 0.0);
    }
}
