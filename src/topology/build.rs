use tracing::debug;

use super::model::{Lineup, Pdu, Topology};
use super::types::{LineupId, SubfeedId};
use crate::capacity::CircuitRating;
use crate::config::PlanConfig;
use crate::error::PlanError;

impl Topology {
    /// Builds a session topology from a configuration.
    ///
    /// The configuration is resolved and validated first. Every lineup and
    /// PDU starts enabled; the first `default_active_subfeeds` slots of each
    /// PDU start active. Reduced-capacity overrides and custom names are
    /// carried over.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Invalid`] listing every validation problem.
    pub fn from_config(config: &PlanConfig) -> Result<Self, PlanError> {
        let config = config.clone().resolve();
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(PlanError::Invalid(errors));
        }

        let main = CircuitRating::new(config.pdu_main_voltage, config.pdu_main_breaker_amps);
        let subfeed = CircuitRating::new(config.subfeed_voltage, config.subfeed_breaker_amps);

        let lineups = config
            .lineup_names
            .iter()
            .zip(&config.pdu_configs)
            .map(|(name, pdus)| {
                let id = LineupId::new(name.as_str());
                let pdus = (1..=pdus.len())
                    .map(|position| {
                        Pdu::new(
                            id.clone(),
                            position,
                            main,
                            subfeed,
                            config.loadbank_max_kw,
                            config.subfeeds_per_pdu,
                        )
                    })
                    .collect();
                Lineup::new(id, pdus)
            })
            .collect();

        let mut topology = Topology::new(lineups, config.power_factor, config.lineup_max_kw)
            .with_custom_names(config.custom_names.clone());

        let pdu_ids: Vec<_> = topology
            .lineups()
            .iter()
            .flat_map(|l| l.pdus().iter().map(|p| p.id.clone()))
            .collect();
        for pdu in pdu_ids {
            for index in 0..config.default_active_subfeeds {
                topology.set_subfeed_active(&SubfeedId::new(pdu.clone(), index), true);
            }
        }
        for (lineup, kw) in &config.reduced_capacity {
            topology.set_reduced_capacity(&LineupId::new(lineup.as_str()), Some(*kw));
        }

        debug!(
            lineups = topology.lineups().len(),
            pdus = topology.participating_pdus().count(),
            "built topology"
        );
        Ok(topology)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::PduId;

    #[test]
    fn default_config_builds_five_lineups_of_two() {
        let topo = Topology::from_config(&PlanConfig::default());
        assert!(topo.is_ok());
        let topo = topo.unwrap();
        assert_eq!(topo.lineups().len(), 5);
        assert_eq!(topo.participating_pdus().count(), 10);
        let first = topo.pdu(&PduId::from("PDU-A01-1"));
        assert_eq!(first.subfeeds().len(), 8);
        assert_eq!(first.active_subfeed_count(), 3);
        assert!(first.subfeeds()[0].is_active());
        assert!(!first.subfeeds()[3].is_active());
    }

    #[test]
    fn ups_names_produce_stripped_pdu_ids() {
        let topo = Topology::from_config(&PlanConfig::ups_lineups()).unwrap();
        assert!(topo.contains_pdu(&PduId::from("PDU-A01-2")));
        assert!(!topo.contains_pdu(&PduId::from("PDU-UPS-A01-2")));
        assert_eq!(
            topo.effective_lineup_max_kw(&LineupId::new("UPS-B02")),
            600.0
        );
        assert_eq!(
            topo.effective_lineup_max_kw(&LineupId::new("UPS-A01")),
            1500.0
        );
    }

    #[test]
    fn pdu_count_follows_pdu_lists() {
        let cfg = PlanConfig {
            lineup_names: vec!["A01".into(), "A02".into()],
            pdu_configs: vec![vec!["a".into(); 4], vec![]],
            ..PlanConfig::default()
        };
        let topo = Topology::from_config(&cfg).unwrap();
        assert_eq!(topo.lineup(&LineupId::new("A01")).pdus().len(), 4);
        assert!(topo.lineup(&LineupId::new("A02")).pdus().is_empty());
    }

    #[test]
    fn invalid_config_is_rejected_with_every_error() {
        let cfg = PlanConfig {
            power_factor: 2.0,
            subfeeds_per_pdu: 0,
            ..PlanConfig::default()
        };
        match Topology::from_config(&cfg) {
            Err(PlanError::Invalid(errors)) => assert!(errors.len() >= 2),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }
}
