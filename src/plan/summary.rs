//! System-level calculation summary.
//!
//! Aggregates a plan into the figures shown alongside it: total and derated
//! capacity, utilisation, three-phase line current, per-PDU averages, and
//! loadbank units required per lineup.

use std::fmt;

use serde::Serialize;

use super::assignment::Assignment;
use crate::capacity::{DERATE_FACTOR, line_current_amps, round2};
use crate::topology::{LineupId, Topology};

/// Overall state of the plan against system capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SystemStatus {
    /// Load within the derated capacity.
    Nominal,
    /// Load exceeds 80 % derated capacity but is within the full rating.
    AboveDerated,
    /// Load exceeds the full rating, or an even split of the target would
    /// overload a PDU.
    OverCapacity,
}

impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nominal => write!(f, "nominal"),
            Self::AboveDerated => write!(f, "load exceeds 80% derated capacity but is within full rating"),
            Self::OverCapacity => write!(f, "over capacity"),
        }
    }
}

/// Load and loadbank requirements of one enabled lineup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineupSummary {
    pub lineup_id: LineupId,
    /// Assigned load (kW).
    pub load_kw: f64,
    /// Effective maximum (kW).
    pub max_kw: f64,
    /// Active subfeeds across the lineup's enabled PDUs.
    pub active_subfeeds: usize,
    /// Loadbank units needed to absorb `load_kw`; `None` when the units
    /// have no capacity but load is assigned.
    pub loadbanks_required: Option<usize>,
}

/// System-level figures for a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    /// Requested load (kW).
    pub target_kw: f64,
    /// Total assigned load (kW).
    pub total_load_kw: f64,
    /// Load that could not be placed (kW).
    pub unassigned_kw: f64,
    /// Participating PDUs.
    pub active_pdus: usize,
    /// Enabled lineups.
    pub active_lineups: usize,
    /// Sum of participating PDU main ratings (kW).
    pub total_capacity_kw: f64,
    /// `total_capacity_kw` after the 80 % continuous-duty derate.
    pub derated_capacity_kw: f64,
    /// Load as a percentage of full capacity.
    pub utilisation_pct: f64,
    /// Load as a percentage of derated capacity.
    pub derate_utilisation_pct: f64,
    /// Three-phase line current summed over PDUs, each at its main voltage (A).
    pub line_current_amps: f64,
    /// `line_current_amps` divided by the PDU count (A).
    pub current_per_pdu_amps: f64,
    /// Assigned load divided by the PDU count (kW).
    pub average_load_per_pdu_kw: f64,
    /// Target divided evenly over the PDUs (kW).
    pub even_load_per_pdu_kw: f64,
    /// Smallest participating PDU main rating (kW).
    pub min_pdu_rating_kw: f64,
    pub status: SystemStatus,
    pub lineups: Vec<LineupSummary>,
}

impl PlanSummary {
    /// Computes the summary of `assignment` on `topology`.
    ///
    /// With no participating PDUs, every per-PDU figure is 0 and any
    /// positive target is over capacity.
    pub fn compute(
        topology: &Topology,
        assignment: &Assignment,
        target_kw: f64,
        unassigned_kw: f64,
    ) -> Self {
        let pf = topology.power_factor();
        let mut active_pdus = 0usize;
        let mut total_capacity_kw = 0.0;
        let mut min_pdu_rating_kw = f64::INFINITY;
        let mut line_current = 0.0;
        for pdu in topology.participating_pdus() {
            let rating = topology.pdu_main_rating_kw(&pdu.id);
            active_pdus += 1;
            total_capacity_kw += rating;
            min_pdu_rating_kw = min_pdu_rating_kw.min(rating);
            line_current += line_current_amps(assignment.get(&pdu.id), pdu.main.voltage_v, pf);
        }
        if active_pdus == 0 {
            min_pdu_rating_kw = 0.0;
        }

        let total_load_kw = assignment.participating_total_kw(topology);
        let derated_capacity_kw = total_capacity_kw * DERATE_FACTOR;
        let per_pdu = |value: f64| {
            if active_pdus == 0 {
                0.0
            } else {
                value / active_pdus as f64
            }
        };
        let even_load_per_pdu_kw = per_pdu(target_kw);

        let status = if round2(total_load_kw - total_capacity_kw) > 0.0
            || round2(even_load_per_pdu_kw - min_pdu_rating_kw) > 0.0
            || (active_pdus == 0 && target_kw > 0.0)
        {
            SystemStatus::OverCapacity
        } else if round2(total_load_kw - derated_capacity_kw) > 0.0 {
            SystemStatus::AboveDerated
        } else {
            SystemStatus::Nominal
        };

        let lineups = topology
            .enabled_lineups()
            .map(|lineup| {
                let load_kw = assignment.enabled_lineup_kw(topology, &lineup.id);
                let active_subfeeds = topology
                    .enabled_pdus_of(&lineup.id)
                    .map(|p| p.active_subfeed_count())
                    .sum();
                let unit_kw = lineup
                    .pdus()
                    .iter()
                    .flat_map(|p| p.subfeeds())
                    .map(|s| s.loadbank_max_kw)
                    .next()
                    .unwrap_or(0.0);
                LineupSummary {
                    lineup_id: lineup.id.clone(),
                    load_kw,
                    max_kw: topology.effective_lineup_max_kw(&lineup.id),
                    active_subfeeds,
                    loadbanks_required: loadbanks_required(load_kw, unit_kw),
                }
            })
            .collect();

        Self {
            target_kw: round2(target_kw),
            total_load_kw,
            unassigned_kw: round2(unassigned_kw),
            active_pdus,
            active_lineups: topology.enabled_lineups().count(),
            total_capacity_kw: round2(total_capacity_kw),
            derated_capacity_kw: round2(derated_capacity_kw),
            utilisation_pct: percent(total_load_kw, total_capacity_kw),
            derate_utilisation_pct: percent(total_load_kw, derated_capacity_kw),
            line_current_amps: round2(line_current),
            current_per_pdu_amps: round2(per_pdu(line_current)),
            average_load_per_pdu_kw: round2(per_pdu(total_load_kw)),
            even_load_per_pdu_kw: round2(even_load_per_pdu_kw),
            min_pdu_rating_kw: round2(min_pdu_rating_kw),
            status,
            lineups,
        }
    }
}

fn percent(value: f64, of: f64) -> f64 {
    if of > 0.0 { value / of * 100.0 } else { 0.0 }
}

fn loadbanks_required(load_kw: f64, unit_kw: f64) -> Option<usize> {
    if load_kw <= 0.0 {
        Some(0)
    } else if unit_kw > 0.0 {
        Some((load_kw / unit_kw).ceil() as usize)
    } else {
        None
    }
}

/// Formats a power value as MW from 1 MW upward, else as whole kW.
///
/// # Examples
///
/// ```
/// use loadplan::plan::summary::format_power;
///
/// assert_eq!(format_power(4260.0), "4.3 MW");
/// assert_eq!(format_power(612.4), "612 kW");
/// ```
pub fn format_power(kw: f64) -> String {
    if kw >= 1000.0 {
        format!("{:.1} MW", kw / 1000.0)
    } else {
        format!("{:.0} kW", kw)
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Plan Summary ---")?;
        writeln!(
            f,
            "Active load:           {} of {} target",
            format_power(self.total_load_kw),
            format_power(self.target_kw)
        )?;
        writeln!(f, "Unassigned:            {:.2} kW", self.unassigned_kw)?;
        writeln!(
            f,
            "Capacity:              {} ({} derated)",
            format_power(self.total_capacity_kw),
            format_power(self.derated_capacity_kw)
        )?;
        writeln!(
            f,
            "Utilisation:           {:.1}% ({:.1}% of derated)",
            self.utilisation_pct, self.derate_utilisation_pct
        )?;
        writeln!(
            f,
            "Line current:          {:.2} A ({:.2} A per PDU)",
            self.line_current_amps, self.current_per_pdu_amps
        )?;
        writeln!(
            f,
            "PDUs / lineups:        {} / {}",
            self.active_pdus, self.active_lineups
        )?;
        writeln!(
            f,
            "Per PDU:               {:.2} kW avg, {:.2} kW even split, {:.2} kW rating",
            self.average_load_per_pdu_kw, self.even_load_per_pdu_kw, self.min_pdu_rating_kw
        )?;
        for lineup in &self.lineups {
            let units = lineup
                .loadbanks_required
                .map_or_else(|| "n/a".to_string(), |n| n.to_string());
            writeln!(
                f,
                "  {:<10} {:>9.2} / {:>9.2} kW, loadbanks {} for {} subfeeds",
                lineup.lineup_id, lineup.load_kw, lineup.max_kw, units, lineup.active_subfeeds
            )?;
        }
        write!(f, "Status:                {}", self.status)
    }
}
