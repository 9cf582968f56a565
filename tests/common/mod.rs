//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use loadplan::capacity::CircuitRating;
use loadplan::config::PlanConfig;
use loadplan::topology::{Lineup, LineupId, Pdu, PduId, SubfeedId, Topology};

/// Rating that yields exactly `kw` at unity power factor for `amps`.
pub fn rating_for_kw(kw: f64, amps: f64) -> CircuitRating {
    CircuitRating::new(kw * 1000.0 / (3.0_f64.sqrt() * amps), amps)
}

/// `lineups` lineups (`A01`, `A02`, ...) of `pdus` PDUs each.
///
/// Every PDU has main rating `pdu_kw`, eight 50 kW subfeed slots (none
/// active), and 600 kW loadbanks.
pub fn grid_topology(lineups: usize, pdus: usize, pdu_kw: f64, lineup_max_kw: f64) -> Topology {
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

/// Activates the first `count` subfeeds of `pdu`.
pub fn activate_subfeeds(topology: &mut Topology, pdu: &str, count: usize) {
    for i in 0..count {
        topology.set_subfeed_active(&SubfeedId::new(PduId::from(pdu), i), true);
    }
}

/// Two plain lineups with default ratings and a 1 MW target.
pub fn two_lineup_config() -> PlanConfig {
    PlanConfig {
        job_name: "two lineups".to_string(),
        lineup_names: vec!["A01".to_string(), "A02".to_string()],
        target_load_mw: 1.0,
        ..PlanConfig::default()
    }
}
