//! Planning session: owns the topology and the current assignment and
//! recomputes the distribution whenever an input changes.

use tracing::{debug, warn};

use crate::config::PlanConfig;
use crate::error::PlanError;
use crate::plan::overload::ElementStatus;
use crate::plan::{
    Assignment, PlanSummary, SharingMode, SubfeedLoad, Warning, advisories, distribute,
    overload_check, subfeed_loads,
};
use crate::topology::{LineupId, PduId, SubfeedId, Topology};

/// Session options taken from the configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerSettings {
    /// Requested total load (kW).
    pub target_kw: f64,
    /// Projection used for subfeed loads and subfeed warnings.
    pub sharing_mode: SharingMode,
    /// Recompute on every topology or target change.
    pub auto_distribute: bool,
}

impl PlannerSettings {
    /// Settings stored in `config`.
    pub fn from_config(config: &PlanConfig) -> Self {
        Self {
            target_kw: config.target_load_kw(),
            sharing_mode: config.sharing_mode(),
            auto_distribute: config.auto_distribute,
        }
    }
}

/// Controller for one planning session.
///
/// The engine itself is stateless; this type threads the topology and
/// assignment between calls. With auto-distribute on, every mutator replaces
/// the assignment with a fresh [`distribute`] result. Manual PDU loads never
/// trigger a recompute.
#[derive(Debug, Clone)]
pub struct Planner {
    initial: Topology,
    topology: Topology,
    settings: PlannerSettings,
    assignment: Assignment,
    unassigned_kw: f64,
    saturated_lineups: Vec<LineupId>,
}

impl Planner {
    /// Starts a session on `topology`.
    pub fn new(topology: Topology, settings: PlannerSettings) -> Self {
        let assignment = Assignment::zeroed(&topology);
        let mut planner = Self {
            initial: topology.clone(),
            topology,
            settings,
            assignment,
            unassigned_kw: 0.0,
            saturated_lineups: Vec::new(),
        };
        planner.auto_recompute();
        planner
    }

    /// Starts a session from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Invalid`] if the configuration fails validation.
    pub fn from_config(config: &PlanConfig) -> Result<Self, PlanError> {
        let topology = Topology::from_config(config)?;
        Ok(Self::new(topology, PlannerSettings::from_config(config)))
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn settings(&self) -> PlannerSettings {
        self.settings
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// Target load that the last distribution could not place (kW).
    pub fn unassigned_kw(&self) -> f64 {
        self.unassigned_kw
    }

    /// Lineups saturated by the last distribution.
    pub fn saturated_lineups(&self) -> &[LineupId] {
        &self.saturated_lineups
    }

    /// Runs the distribution engine and replaces the assignment.
    pub fn redistribute(&mut self) {
        let result = distribute(&self.topology, self.settings.target_kw);
        if result.unassigned_kw > 0.0 {
            warn!(
                unassigned_kw = result.unassigned_kw,
                target_kw = self.settings.target_kw,
                "target load exceeds available capacity"
            );
        }
        self.assignment = result.assignment;
        self.unassigned_kw = result.unassigned_kw;
        self.saturated_lineups = result.saturated_lineups;
    }

    fn auto_recompute(&mut self) {
        if self.settings.auto_distribute {
            self.redistribute();
        }
    }

    pub fn set_target_kw(&mut self, target_kw: f64) {
        self.settings.target_kw = target_kw;
        self.auto_recompute();
    }

    /// Changes the sharing mode. Distribution does not depend on it, so the
    /// assignment is kept.
    pub fn set_sharing_mode(&mut self, mode: SharingMode) {
        self.settings.sharing_mode = mode;
    }

    /// Turns auto-distribute on or off; turning it on recomputes immediately.
    pub fn set_auto_distribute(&mut self, enabled: bool) {
        self.settings.auto_distribute = enabled;
        self.auto_recompute();
    }

    /// # Panics
    ///
    /// Panics if `id` is not a lineup of this session.
    pub fn set_lineup_enabled(&mut self, id: &LineupId, enabled: bool) {
        self.topology.set_lineup_enabled(id, enabled);
        self.auto_recompute();
    }

    /// # Panics
    ///
    /// Panics if `id` is not a PDU of this session.
    pub fn set_pdu_enabled(&mut self, id: &PduId, enabled: bool) {
        self.topology.set_pdu_enabled(id, enabled);
        self.auto_recompute();
    }

    /// # Panics
    ///
    /// Panics if the subfeed does not exist.
    pub fn set_subfeed_active(&mut self, id: &SubfeedId, active: bool) {
        self.topology.set_subfeed_active(id, active);
        self.auto_recompute();
    }

    /// # Panics
    ///
    /// Panics if `id` is not a lineup of this session.
    pub fn set_reduced_capacity(&mut self, id: &LineupId, max_kw: Option<f64>) {
        self.topology.set_reduced_capacity(id, max_kw);
        self.auto_recompute();
    }

    /// Overrides one PDU's load with user-entered text, bypassing all
    /// ceilings. Unparseable or negative input becomes 0.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a PDU of this session.
    pub fn set_manual_load(&mut self, id: &PduId, input: &str) {
        let lineup = self.topology.pdu(id).lineup_id.clone();
        self.assignment.set_manual(id, &lineup, input);
        debug!(pdu = %id, kw = self.assignment.get(id), "manual load override");
    }

    /// Restores the initial topology and zeroes the assignment.
    pub fn reset(&mut self) {
        self.topology = self.initial.clone();
        self.assignment = Assignment::zeroed(&self.topology);
        self.unassigned_kw = 0.0;
        self.saturated_lineups.clear();
    }

    /// Overloads of the current assignment.
    pub fn warnings(&self) -> Vec<Warning> {
        overload_check(&self.topology, &self.assignment, self.settings.sharing_mode)
    }

    /// Elements in the 70–100 % bands.
    pub fn advisories(&self) -> Vec<ElementStatus> {
        advisories(&self.topology, &self.assignment, self.settings.sharing_mode)
    }

    /// Projected subfeed loads under the session's sharing mode.
    pub fn subfeed_loads(&self) -> Vec<SubfeedLoad> {
        subfeed_loads(&self.topology, &self.assignment, self.settings.sharing_mode)
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary::compute(
            &self.topology,
            &self.assignment,
            self.settings.target_kw,
            self.unassigned_kw,
        )
    }
}
