mod common;

use common::two_lineup_config;
use loadplan::config::PlanConfig;
use loadplan::plan::{SharingMode, SystemStatus, WarningCategory};
use loadplan::session::Planner;
use loadplan::topology::{LineupId, PduId, SubfeedId};

#[test]
fn default_session_places_the_target_evenly() {
    let planner = Planner::from_config(&two_lineup_config()).unwrap();
    assert_eq!(planner.unassigned_kw(), 0.0);
    for load in planner.assignment().iter() {
        assert_eq!(load.kw, 250.0);
    }
    assert!(planner.warnings().is_empty());
    assert_eq!(planner.summary().status, SystemStatus::Nominal);
}

#[test]
fn deactivating_subfeeds_moves_load_and_raises_loadbank_findings() {
    let mut planner = Planner::from_config(&two_lineup_config()).unwrap();
    planner.set_sharing_mode(SharingMode::PerPdu);
    planner.set_target_kw(2400.0);

    // 600 kW per PDU over 3 subfeeds: 200 kW each, within the 600 kW loadbank
    assert!(planner.warnings().is_empty());

    let pdu = PduId::from("PDU-A01-1");
    planner.set_subfeed_active(&SubfeedId::new(pdu.clone(), 1), false);
    planner.set_subfeed_active(&SubfeedId::new(pdu.clone(), 2), false);
    // A single 431.2806 kW subfeed now caps the PDU, floored to the cent
    assert_eq!(planner.assignment().get(&pdu), 431.28);
    assert_eq!(planner.assignment().get(&PduId::from("PDU-A01-2")), 768.72);
    assert!(planner.warnings().is_empty());

    planner.set_manual_load(&pdu, "700");
    let warnings = planner.warnings();
    let categories: Vec<_> = warnings.iter().map(|w| w.category).collect();
    assert_eq!(
        categories,
        vec![
            WarningCategory::SubfeedBreaker,
            WarningCategory::LoadbankCapacity,
            WarningCategory::LineupCapacity,
            WarningCategory::SystemCapacity,
        ]
    );
}

#[test]
fn networked_mode_shares_across_the_lineup() {
    let mut planner = Planner::from_config(&two_lineup_config()).unwrap();
    planner.set_target_kw(1800.0);
    let loads = planner.subfeed_loads();
    // 900 kW per lineup over 6 active subfeeds
    assert_eq!(loads.len(), 12);
    assert!(loads.iter().all(|l| l.load_kw == 150.0));
}

#[test]
fn disabling_a_lineup_shifts_load_and_reports_remainder() {
    let mut planner = Planner::from_config(&two_lineup_config()).unwrap();
    planner.set_target_kw(2000.0);
    planner.set_lineup_enabled(&LineupId::new("A02"), false);

    assert_eq!(planner.assignment().len(), 2);
    assert_eq!(planner.assignment().total_kw(), 1200.0);
    assert_eq!(planner.unassigned_kw(), 800.0);
    assert_eq!(planner.saturated_lineups(), &[LineupId::new("A01")]);
}

#[test]
fn isolated_preset_defaults_to_per_pdu_sharing() {
    let planner = Planner::from_config(&PlanConfig::isolated_loadbanks()).unwrap();
    assert_eq!(planner.settings().sharing_mode, SharingMode::PerPdu);
    assert_eq!(planner.topology().participating_pdus().count(), 6);
    assert_eq!(planner.assignment().total_kw(), 2000.0);
    // about 333 kW per PDU over 4 subfeeds: about 83 kW per subfeed, below the 200 kW units
    assert!(planner.warnings().is_empty());
}

#[test]
fn disabled_pdu_load_is_ignored_without_auto_distribute() {
    let config = PlanConfig {
        target_load_mw: 2.4,
        auto_distribute: false,
        ..two_lineup_config()
    };
    let mut planner = Planner::from_config(&config).unwrap();
    planner.redistribute();
    assert_eq!(planner.assignment().get(&PduId::from("PDU-A01-1")), 600.0);

    planner.set_pdu_enabled(&PduId::from("PDU-A01-1"), false);
    planner.set_manual_load(&PduId::from("PDU-A01-2"), "700");

    // The 600 kW recorded against the disabled PDU stays in the assignment
    // but no longer counts toward lineup or system load.
    assert_eq!(planner.assignment().get(&PduId::from("PDU-A01-1")), 600.0);
    assert!(planner.warnings().is_empty());

    let summary = planner.summary();
    assert_eq!(summary.total_load_kw, 1900.0);
    assert_eq!(summary.lineups[0].load_kw, 700.0);

    // 700 kW over the three active subfeeds left on PDU-A01-2
    let loads = planner.subfeed_loads();
    assert_eq!(loads.len(), 9);
    assert!(
        loads
            .iter()
            .filter(|l| l.lineup_id == LineupId::new("A01"))
            .all(|l| l.load_kw == 233.33)
    );
}
