//! Overload detection against breaker, loadbank, lineup, and system ceilings.
//!
//! Overloads never block anything. The detector reports them next to a
//! still-valid assignment; the 70–100 % bands are advisory only.

use std::fmt;

use serde::Serialize;

use super::assignment::Assignment;
use super::projection::{SharingMode, subfeed_loads};
use crate::capacity::{non_negative, round2};
use crate::topology::Topology;

/// Utilisation band of a load against a ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadBand {
    /// Below 70 %.
    Ok,
    /// 70 % up to 80 %.
    Elevated,
    /// 80 % up to and including 100 %.
    High,
    /// Above 100 %.
    Overloaded,
}

impl LoadBand {
    /// Classifies `value_kw` against `ceiling_kw`.
    ///
    /// A load counts as over its ceiling only when the excess is at least
    /// 0.01 kW. Against a zero ceiling every positive load is overloaded.
    pub fn classify(value_kw: f64, ceiling_kw: f64) -> Self {
        let value_kw = non_negative(value_kw);
        let ceiling_kw = non_negative(ceiling_kw);
        if round2(value_kw - ceiling_kw) > 0.0 {
            return Self::Overloaded;
        }
        if ceiling_kw == 0.0 {
            return Self::Ok;
        }
        let ratio = value_kw / ceiling_kw;
        if ratio >= 0.8 {
            Self::High
        } else if ratio >= 0.7 {
            Self::Elevated
        } else {
            Self::Ok
        }
    }

    /// Short lowercase label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Elevated => "elevated",
            Self::High => "high",
            Self::Overloaded => "overloaded",
        }
    }

    /// Whether this band is advisory (70–100 %).
    pub fn is_advisory(self) -> bool {
        matches!(self, Self::Elevated | Self::High)
    }
}

impl fmt::Display for LoadBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which ceiling a finding is measured against.
///
/// Declaration order is reporting priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WarningCategory {
    /// PDU load against its main-breaker rating.
    PduMainBreaker,
    /// Subfeed share against its breaker rating.
    SubfeedBreaker,
    /// Subfeed share against the physical loadbank unit.
    LoadbankCapacity,
    /// Lineup load against its effective maximum.
    LineupCapacity,
    /// Total load against the sum of enabled lineup maxima.
    SystemCapacity,
}

impl WarningCategory {
    /// Heading shown to operators.
    pub fn title(self) -> &'static str {
        match self {
            Self::PduMainBreaker => "PDU main breaker overload",
            Self::SubfeedBreaker => "Subfeed breaker overload",
            Self::LoadbankCapacity => "Loadbank capacity exceeded",
            Self::LineupCapacity => "Lineup capacity exceeded",
            Self::SystemCapacity => "System capacity exceeded",
        }
    }

    /// Suggested fix.
    pub fn remediation(self) -> &'static str {
        match self {
            Self::PduMainBreaker => "Reduce load or activate more PDUs",
            Self::SubfeedBreaker => "Activate more subfeeds to distribute load",
            Self::LoadbankCapacity => "Add loadbank units or activate more subfeeds",
            Self::LineupCapacity => "Reduce load or mark as reduced capacity scenario",
            Self::SystemCapacity => "Reduce the target load or enable more lineups",
        }
    }
}

/// Load of one element measured against one ceiling.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStatus {
    /// Which ceiling was checked.
    pub category: WarningCategory,
    /// PDU, subfeed, or lineup id; `"system"` for the whole system.
    pub element_id: String,
    /// Load on the element (kW).
    pub value_kw: f64,
    /// Ceiling the load was compared with, rounded to 2 decimals (kW).
    pub ceiling_kw: f64,
    pub band: LoadBand,
}

/// A ceiling exceeded by at least 0.01 kW.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    pub category: WarningCategory,
    /// Overloaded element; `"system"` for the whole system.
    pub element_id: String,
    /// Load on the element (kW).
    pub value_kw: f64,
    /// Exceeded ceiling (kW).
    pub ceiling_kw: f64,
    /// `value_kw - ceiling_kw`, rounded to 2 decimals.
    pub excess_kw: f64,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} at {:.2} kW exceeds {:.2} kW by {:.2} kW ({})",
            self.category.title(),
            self.element_id,
            self.value_kw,
            self.ceiling_kw,
            self.excess_kw,
            self.category.remediation()
        )
    }
}

/// Element id used for the system-wide check.
pub const SYSTEM_ELEMENT_ID: &str = "system";

/// Measures every element against every ceiling that applies to it.
///
/// Order: PDU main breakers, then subfeed breaker and loadbank checks per
/// active subfeed, then lineups, then the system. PDUs and lineups follow
/// traversal order. PDU loads are compared with the full main-breaker
/// rating, not the subfeed-limited distribution ceiling.
pub fn element_statuses(
    topology: &Topology,
    assignment: &Assignment,
    mode: SharingMode,
) -> Vec<ElementStatus> {
    let mut statuses = Vec::new();
    let mut push = |category, element_id: String, value_kw: f64, ceiling_kw: f64| {
        let ceiling_kw = round2(ceiling_kw);
        statuses.push(ElementStatus {
            category,
            element_id,
            value_kw,
            ceiling_kw,
            band: LoadBand::classify(value_kw, ceiling_kw),
        });
    };

    for pdu in topology.participating_pdus() {
        push(
            WarningCategory::PduMainBreaker,
            pdu.id.to_string(),
            assignment.get(&pdu.id),
            topology.pdu_main_rating_kw(&pdu.id),
        );
    }

    let subfeeds = subfeed_loads(topology, assignment, mode);
    for subfeed in &subfeeds {
        push(
            WarningCategory::SubfeedBreaker,
            subfeed.id.to_string(),
            subfeed.load_kw,
            subfeed.breaker_kw,
        );
    }
    for subfeed in &subfeeds {
        push(
            WarningCategory::LoadbankCapacity,
            subfeed.id.to_string(),
            subfeed.load_kw,
            subfeed.loadbank_max_kw,
        );
    }

    let mut system_max_kw = 0.0;
    for lineup in topology.enabled_lineups() {
        let max_kw = topology.effective_lineup_max_kw(&lineup.id);
        system_max_kw += max_kw;
        push(
            WarningCategory::LineupCapacity,
            lineup.id.to_string(),
            assignment.enabled_lineup_kw(topology, &lineup.id),
            max_kw,
        );
    }

    push(
        WarningCategory::SystemCapacity,
        SYSTEM_ELEMENT_ID.to_string(),
        assignment.participating_total_kw(topology),
        system_max_kw,
    );
    statuses
}

/// Every exceeded ceiling, ordered by category priority and then by
/// traversal order. Empty when nothing exceeds 100 % of any ceiling.
pub fn overload_check(
    topology: &Topology,
    assignment: &Assignment,
    mode: SharingMode,
) -> Vec<Warning> {
    let mut warnings: Vec<Warning> = element_statuses(topology, assignment, mode)
        .into_iter()
        .filter(|s| s.band == LoadBand::Overloaded)
        .map(|s| Warning {
            excess_kw: round2(s.value_kw - s.ceiling_kw),
            category: s.category,
            element_id: s.element_id,
            value_kw: s.value_kw,
            ceiling_kw: s.ceiling_kw,
        })
        .collect();
    warnings.sort_by_key(|w| w.category);
    warnings
}

/// Elements in the elevated or high band (70–100 %).
pub fn advisories(
    topology: &Topology,
    assignment: &Assignment,
    mode: SharingMode,
) -> Vec<ElementStatus> {
    element_statuses(topology, assignment, mode)
        .into_iter()
        .filter(|s| s.band.is_advisory())
        .collect()
}
