//! In-memory lineup/PDU/subfeed topology and its capacity accessors.

use std::collections::BTreeMap;

use serde::Serialize;

use super::types::{LineupId, PduId, SubfeedId};
use crate::capacity::{CircuitRating, non_negative};

/// A subfeed breaker slot on a PDU.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subfeed {
    /// Slot index on the owning PDU (0-based).
    pub index: usize,
    /// Breaker rating of this subfeed.
    pub breaker: CircuitRating,
    /// Physical capacity of the loadbank unit on this subfeed (kW).
    pub loadbank_max_kw: f64,
    active: bool,
}

impl Subfeed {
    /// Creates an inactive subfeed slot.
    pub fn new(index: usize, breaker: CircuitRating, loadbank_max_kw: f64) -> Self {
        Self {
            index,
            breaker,
            loadbank_max_kw: non_negative(loadbank_max_kw),
            active: false,
        }
    }

    /// Whether a loadbank is connected to this subfeed.
    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// A power distribution unit fed from a lineup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pdu {
    /// Derived id (`PDU-<lineup>-<position>`).
    pub id: PduId,
    /// Lineup this PDU belongs to.
    pub lineup_id: LineupId,
    /// Position within the lineup (1-based).
    pub position: usize,
    /// Main breaker rating.
    pub main: CircuitRating,
    subfeeds: Vec<Subfeed>,
    enabled: bool,
}

impl Pdu {
    /// Creates an enabled PDU with `slots` inactive subfeeds.
    pub fn new(
        lineup_id: LineupId,
        position: usize,
        main: CircuitRating,
        subfeed_breaker: CircuitRating,
        loadbank_max_kw: f64,
        slots: usize,
    ) -> Self {
        Self {
            id: PduId::derive(&lineup_id, position),
            lineup_id,
            position,
            main,
            subfeeds: (0..slots)
                .map(|i| Subfeed::new(i, subfeed_breaker, loadbank_max_kw))
                .collect(),
            enabled: true,
        }
    }

    /// Whether this PDU takes part in distribution.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// All subfeed slots, active or not.
    pub fn subfeeds(&self) -> &[Subfeed] {
        &self.subfeeds
    }

    /// Subfeeds with a loadbank connected.
    pub fn active_subfeeds(&self) -> impl Iterator<Item = &Subfeed> {
        self.subfeeds.iter().filter(|s| s.active)
    }

    /// Number of active subfeeds.
    pub fn active_subfeed_count(&self) -> usize {
        self.active_subfeeds().count()
    }
}

/// A top-level distribution group (typically one UPS output).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lineup {
    /// Lineup name.
    pub id: LineupId,
    pdus: Vec<Pdu>,
    enabled: bool,
}

impl Lineup {
    /// Creates an enabled lineup.
    pub fn new(id: LineupId, pdus: Vec<Pdu>) -> Self {
        Self {
            id,
            pdus,
            enabled: true,
        }
    }

    /// Whether this lineup takes part in distribution.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// PDUs in position order.
    pub fn pdus(&self) -> &[Pdu] {
        &self.pdus
    }
}

/// The full planning topology plus the capacity inputs shared by all elements.
///
/// Accessors and mutators take ids generated by the topology itself. Passing
/// an id that does not exist is a caller bug and panics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Topology {
    lineups: Vec<Lineup>,
    power_factor: f64,
    lineup_max_kw: f64,
    reduced_capacity: BTreeMap<LineupId, f64>,
    custom_names: BTreeMap<String, String>,
}

impl Topology {
    /// Creates a topology from lineups and the global lineup ceiling.
    pub fn new(lineups: Vec<Lineup>, power_factor: f64, lineup_max_kw: f64) -> Self {
        Self {
            lineups,
            power_factor: non_negative(power_factor),
            lineup_max_kw: non_negative(lineup_max_kw),
            reduced_capacity: BTreeMap::new(),
            custom_names: BTreeMap::new(),
        }
    }

    /// Attaches display-name overrides keyed by element id.
    pub fn with_custom_names(mut self, names: BTreeMap<String, String>) -> Self {
        self.custom_names = names;
        self
    }

    /// All lineups in configuration order.
    pub fn lineups(&self) -> &[Lineup] {
        &self.lineups
    }

    /// Lineups that take part in distribution.
    pub fn enabled_lineups(&self) -> impl Iterator<Item = &Lineup> {
        self.lineups.iter().filter(|l| l.enabled)
    }

    /// Enabled PDUs of enabled lineups, in lineup order then position order.
    ///
    /// This is the traversal order used by the distribution engine.
    pub fn participating_pdus(&self) -> impl Iterator<Item = &Pdu> {
        self.enabled_lineups()
            .flat_map(|l| l.pdus.iter().filter(|p| p.enabled))
    }

    /// Power factor applied to every rating.
    pub fn power_factor(&self) -> f64 {
        self.power_factor
    }

    /// Global lineup ceiling used when no reduced-capacity override exists.
    pub fn lineup_max_kw(&self) -> f64 {
        self.lineup_max_kw
    }

    /// Current reduced-capacity overrides.
    pub fn reduced_capacity(&self) -> &BTreeMap<LineupId, f64> {
        &self.reduced_capacity
    }

    /// Looks up a lineup.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a lineup of this topology.
    pub fn lineup(&self, id: &LineupId) -> &Lineup {
        self.lineups
            .iter()
            .find(|l| &l.id == id)
            .unwrap_or_else(|| panic!("unknown lineup id `{id}`"))
    }

    /// Looks up a PDU.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a PDU of this topology.
    pub fn pdu(&self, id: &PduId) -> &Pdu {
        self.lineups
            .iter()
            .flat_map(|l| l.pdus.iter())
            .find(|p| &p.id == id)
            .unwrap_or_else(|| panic!("unknown PDU id `{id}`"))
    }

    /// Returns `true` if `id` names a PDU of this topology.
    pub fn contains_pdu(&self, id: &PduId) -> bool {
        self.lineups
            .iter()
            .flat_map(|l| l.pdus.iter())
            .any(|p| &p.id == id)
    }

    /// Lineup ceiling: the reduced-capacity override if present, else the global maximum.
    pub fn effective_lineup_max_kw(&self, id: &LineupId) -> f64 {
        let lineup = self.lineup(id);
        self.reduced_capacity
            .get(&lineup.id)
            .copied()
            .unwrap_or(self.lineup_max_kw)
    }

    /// Active subfeeds of a PDU.
    pub fn active_subfeeds_of(&self, id: &PduId) -> impl Iterator<Item = &Subfeed> {
        self.pdu(id).active_subfeeds()
    }

    /// Enabled PDUs of a lineup, regardless of the lineup's own flag.
    pub fn enabled_pdus_of(&self, id: &LineupId) -> impl Iterator<Item = &Pdu> {
        self.lineup(id).pdus.iter().filter(|p| p.enabled)
    }

    /// Main-breaker rating of a PDU in kW. This is the overload threshold.
    pub fn pdu_main_rating_kw(&self, id: &PduId) -> f64 {
        self.pdu(id).main.max_kw(self.power_factor)
    }

    /// Breaker rating of one subfeed in kW.
    pub fn subfeed_rating_kw(&self, subfeed: &Subfeed) -> f64 {
        subfeed.breaker.max_kw(self.power_factor)
    }

    /// Distribution-time ceiling of a PDU.
    ///
    /// The lesser of the main-breaker rating and the summed ratings of the
    /// active subfeeds; the main rating alone when no subfeed is active.
    pub fn pdu_ceiling_kw(&self, id: &PduId) -> f64 {
        let pdu = self.pdu(id);
        let main_kw = pdu.main.max_kw(self.power_factor);
        if pdu.active_subfeed_count() == 0 {
            return main_kw;
        }
        let subfeed_kw: f64 = pdu
            .active_subfeeds()
            .map(|s| self.subfeed_rating_kw(s))
            .sum();
        main_kw.min(subfeed_kw)
    }

    /// Display name for an element id, honouring custom names.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.custom_names.get(id).map_or(id, String::as_str)
    }

    /// Enables or disables a lineup.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a lineup of this topology.
    pub fn set_lineup_enabled(&mut self, id: &LineupId, enabled: bool) {
        self.lineup_mut(id).enabled = enabled;
    }

    /// Enables or disables a PDU. Disabling also deactivates all of its subfeeds.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a PDU of this topology.
    pub fn set_pdu_enabled(&mut self, id: &PduId, enabled: bool) {
        let pdu = self.pdu_mut(id);
        pdu.enabled = enabled;
        if !enabled {
            for subfeed in &mut pdu.subfeeds {
                subfeed.active = false;
            }
        }
    }

    /// Activates or deactivates one subfeed.
    ///
    /// # Panics
    ///
    /// Panics if the PDU or the slot index does not exist.
    pub fn set_subfeed_active(&mut self, id: &SubfeedId, active: bool) {
        let pdu = self.pdu_mut(&id.pdu);
        let slots = pdu.subfeeds.len();
        let subfeed = pdu
            .subfeeds
            .get_mut(id.index)
            .unwrap_or_else(|| panic!("subfeed `{id}` out of range (PDU has {slots} slots)"));
        subfeed.active = active;
    }

    /// Sets or clears a lineup's reduced-capacity override. Negative values clamp to 0.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a lineup of this topology.
    pub fn set_reduced_capacity(&mut self, id: &LineupId, max_kw: Option<f64>) {
        let id = self.lineup(id).id.clone();
        match max_kw {
            Some(kw) => {
                self.reduced_capacity.insert(id, non_negative(kw));
            }
            None => {
                self.reduced_capacity.remove(&id);
            }
        }
    }

    fn lineup_mut(&mut self, id: &LineupId) -> &mut Lineup {
        self.lineups
            .iter_mut()
            .find(|l| &l.id == id)
            .unwrap_or_else(|| panic!("unknown lineup id `{id}`"))
    }

    fn pdu_mut(&mut self, id: &PduId) -> &mut Pdu {
        self.lineups
            .iter_mut()
            .flat_map(|l| l.pdus.iter_mut())
            .find(|p| &p.id == id)
            .unwrap_or_else(|| panic!("unknown PDU id `{id}`"))
    }
}
