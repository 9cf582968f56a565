//! Invariants of the distribution engine over generated topologies.

mod common;

use proptest::prelude::*;

use common::{activate_subfeeds, grid_topology};
use loadplan::plan::distribute;
use loadplan::topology::{LineupId, PduId, Topology};

/// Topology with varied ratings, subfeed activations, overrides, and
/// disabled elements.
fn arb_topology() -> impl Strategy<Value = Topology> {
    (
        1usize..4,
        1usize..4,
        50.0f64..900.0,
        0.0f64..2000.0,
        prop::collection::vec(0usize..9, 12),
        prop::option::of(0.0f64..800.0),
        any::<bool>(),
    )
        .prop_map(
            |(lineups, pdus, pdu_kw, lineup_max, actives, reduced, disable_one)| {
                let mut topo = grid_topology(lineups, pdus, pdu_kw, lineup_max);
                let ids: Vec<PduId> = topo.participating_pdus().map(|p| p.id.clone()).collect();
                for (id, count) in ids.iter().zip(actives) {
                    activate_subfeeds(&mut topo, id.as_str(), count.min(8));
                }
                topo.set_reduced_capacity(&LineupId::new("A01"), reduced);
                if disable_one {
                    topo.set_pdu_enabled(&ids[0], false);
                }
                topo
            },
        )
}

proptest! {
    #[test]
    fn placed_plus_unassigned_equals_target(topo in arb_topology(), target in 0.0f64..10_000.0) {
        let result = distribute(&topo, target);
        let placed: f64 = result.assignment.iter().map(|l| l.kw).sum();
        prop_assert!((placed + result.unassigned_kw - target).abs() <= 0.01);
        prop_assert!(result.unassigned_kw >= 0.0);
    }

    #[test]
    fn pdu_ceilings_hold(topo in arb_topology(), target in 0.0f64..10_000.0) {
        let result = distribute(&topo, target);
        for load in result.assignment.iter() {
            prop_assert!(load.kw >= 0.0);
            prop_assert!(load.kw <= topo.pdu_ceiling_kw(&load.pdu_id) + 1e-6);
        }
    }

    #[test]
    fn lineup_maxima_hold(topo in arb_topology(), target in 0.0f64..10_000.0) {
        let result = distribute(&topo, target);
        for lineup in topo.enabled_lineups() {
            let total = result.assignment.lineup_total_kw(&lineup.id);
            prop_assert!(total <= topo.effective_lineup_max_kw(&lineup.id) + 1e-6);
        }
    }

    #[test]
    fn distribution_is_deterministic(topo in arb_topology(), target in 0.0f64..10_000.0) {
        prop_assert_eq!(distribute(&topo, target), distribute(&topo, target));
    }

    #[test]
    fn larger_target_never_takes_load_away(
        topo in arb_topology(),
        target in 0.0f64..8_000.0,
        extra in 0.0f64..2_000.0,
    ) {
        let small = distribute(&topo, target);
        let large = distribute(&topo, target + extra);
        for load in small.assignment.iter() {
            prop_assert!(large.assignment.get(&load.pdu_id) >= load.kw);
        }
        prop_assert!(large.assignment.total_kw() >= small.assignment.total_kw());
    }

    #[test]
    fn saturated_lineups_are_full(topo in arb_topology(), target in 0.0f64..10_000.0) {
        let result = distribute(&topo, target);
        for id in &result.saturated_lineups {
            let total = result.assignment.lineup_total_kw(id);
            prop_assert!(topo.effective_lineup_max_kw(id) - total < 0.01);
        }
    }
}
