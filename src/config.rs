//! Planning configuration: the persisted JSON blob, TOML files, and presets.
//!
//! Field names follow the stored JSON (`lineupMaxKW`, `pduConfigs`, ...);
//! every field also accepts a snake_case alias so TOML files read naturally.
//! Missing fields take the defaults below, and [`PlanConfig::resolve`] fills
//! the structural defaults (lineup list, PDU lists) once at load time.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::capacity::DEFAULT_POWER_FACTOR;
use crate::error::ConfigError;
use crate::plan::projection::SharingMode;
use crate::topology::naming;

/// Lineups used when a configuration names none.
pub const DEFAULT_LINEUPS: &[&str] = &["A01", "A02", "B01", "B02", "C01"];

/// PDUs created for a lineup that has no PDU list.
pub const DEFAULT_PDUS_PER_LINEUP: usize = 2;

/// Upper bound accepted for any power figure (kW): lineup maxima, reduced
/// capacities and loadbank ratings.
pub const MAX_POWER_KW: f64 = 1_000_000.0;

/// Upper bound accepted for the target load (MW).
pub const MAX_TARGET_MW: f64 = 1_000.0;

/// Upper bound accepted for any nominal voltage (V).
pub const MAX_VOLTAGE_V: f64 = 100_000.0;

/// Upper bound accepted for any breaker trip rating (A).
pub const MAX_BREAKER_AMPS: f64 = 100_000.0;

/// Upper bound accepted for subfeed slots per PDU.
pub const MAX_SUBFEEDS_PER_PDU: usize = 256;

/// Persisted planning configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Free-form job label.
    #[serde(rename = "jobName", alias = "job_name")]
    pub job_name: String,
    /// Lineup names in display order.
    #[serde(rename = "lineupNames", alias = "lineup_names")]
    pub lineup_names: Vec<String>,
    /// PDU name lists, one per lineup (index-aligned with `lineup_names`).
    ///
    /// Only the length of each list matters; PDU ids are derived from the
    /// lineup name and position.
    #[serde(rename = "pduConfigs", alias = "pdu_configs")]
    pub pdu_configs: Vec<Vec<String>>,
    /// Global lineup ceiling (kW).
    #[serde(rename = "lineupMaxKW", alias = "lineup_max_kw")]
    pub lineup_max_kw: f64,
    /// PDU main breaker voltage (V).
    #[serde(rename = "pduMainVoltage", alias = "pdu_main_voltage")]
    pub pdu_main_voltage: f64,
    /// PDU main breaker trip rating (A).
    #[serde(
        rename = "pduMainBreakerTrip",
        alias = "pduMainBreakerAmps",
        alias = "pdu_main_breaker_amps"
    )]
    pub pdu_main_breaker_amps: f64,
    /// Subfeed breaker voltage (V).
    #[serde(rename = "subfeedVoltage", alias = "subfeed_voltage")]
    pub subfeed_voltage: f64,
    /// Subfeed breaker trip rating (A).
    #[serde(
        rename = "subfeedBreakerTrip",
        alias = "subfeedBreakerAmps",
        alias = "subfeed_breaker_amps"
    )]
    pub subfeed_breaker_amps: f64,
    /// Subfeed slots per PDU.
    #[serde(rename = "subfeedsPerPDU", alias = "subfeeds_per_pdu")]
    pub subfeeds_per_pdu: usize,
    /// Subfeeds active on every PDU when a session starts.
    #[serde(rename = "defaultActiveSubfeeds", alias = "default_active_subfeeds")]
    pub default_active_subfeeds: usize,
    /// Physical capacity of one loadbank unit (kW).
    #[serde(rename = "loadbankMaxKW", alias = "loadbank_max_kw")]
    pub loadbank_max_kw: f64,
    /// Power factor applied to all ratings.
    #[serde(rename = "powerFactor", alias = "power_factor")]
    pub power_factor: f64,
    /// Per-lineup ceiling overrides (kW).
    #[serde(rename = "reducedCapacityLineups", alias = "reduced_capacity_lineups")]
    pub reduced_capacity: BTreeMap<String, f64>,
    /// Display-name overrides keyed by element id.
    #[serde(rename = "customNames", alias = "custom_names")]
    pub custom_names: BTreeMap<String, String>,
    /// Requested total system load (MW).
    #[serde(rename = "targetLoadMW", alias = "target_load_mw")]
    pub target_load_mw: f64,
    /// Whether loadbanks are networked across each lineup.
    #[serde(rename = "networkedLoadbanks", alias = "networked_loadbanks")]
    pub networked_loadbanks: bool,
    /// Whether the planner recomputes on every change.
    #[serde(rename = "autoDistribute", alias = "auto_distribute")]
    pub auto_distribute: bool,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            job_name: String::new(),
            lineup_names: Vec::new(),
            pdu_configs: Vec::new(),
            lineup_max_kw: 1200.0,
            pdu_main_voltage: 480.0,
            pdu_main_breaker_amps: 996.0,
            subfeed_voltage: 415.0,
            subfeed_breaker_amps: 600.0,
            subfeeds_per_pdu: 8,
            default_active_subfeeds: 3,
            loadbank_max_kw: 600.0,
            power_factor: DEFAULT_POWER_FACTOR,
            reduced_capacity: BTreeMap::new(),
            custom_names: BTreeMap::new(),
            target_load_mw: 5.0,
            networked_loadbanks: true,
            auto_distribute: true,
        }
    }
}

impl PlanConfig {
    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "ups_lineups", "isolated_loadbanks"];

    /// Returns the baseline configuration: five lineups of two PDUs.
    pub fn baseline() -> Self {
        Self {
            job_name: "baseline".to_string(),
            ..Self::default()
        }
        .resolve()
    }

    /// Returns a UPS-named topology with one reduced-capacity lineup.
    pub fn ups_lineups() -> Self {
        let lineup_names: Vec<String> = ["UPS-A01", "UPS-A02", "UPS-B01", "UPS-B02"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut reduced_capacity = BTreeMap::new();
        reduced_capacity.insert("UPS-B02".to_string(), 600.0);
        Self {
            job_name: "ups_lineups".to_string(),
            lineup_names,
            lineup_max_kw: 1500.0,
            reduced_capacity,
            target_load_mw: 4.0,
            ..Self::default()
        }
        .resolve()
    }

    /// Returns a topology with isolated 200 kW loadbanks and 12-slot PDUs.
    pub fn isolated_loadbanks() -> Self {
        let lineup_names = naming::generate_lineup_names("A", 2);
        let pdu_configs = lineup_names
            .iter()
            .map(|l| (1..=3).map(|i| naming::pdu_id(l, i)).collect())
            .collect();
        Self {
            job_name: "isolated_loadbanks".to_string(),
            lineup_names,
            pdu_configs,
            subfeeds_per_pdu: 12,
            default_active_subfeeds: 4,
            loadbank_max_kw: 200.0,
            target_load_mw: 2.0,
            networked_loadbanks: false,
            ..Self::default()
        }
        .resolve()
    }

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "ups_lineups" => Ok(Self::ups_lineups()),
            "isolated_loadbanks" => Ok(Self::isolated_loadbanks()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Reads a configuration file, choosing TOML for `.toml` and JSON otherwise.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::from_toml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }

    /// Parses a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the JSON is malformed or a field has the wrong type.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str::<Self>(s)
            .map(Self::resolve)
            .map_err(|e| ConfigError::new("json", e.to_string()))
    }

    /// Interprets a stored JSON blob as a configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a field has the wrong type.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        serde_json::from_value::<Self>(value)
            .map(Self::resolve)
            .map_err(|e| ConfigError::new("json", e.to_string()))
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is malformed or a field has the wrong type.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str::<Self>(s)
            .map(Self::resolve)
            .map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Serialises this configuration to the stored JSON form.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if a map key cannot be serialised.
    pub fn to_json_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Fills structural defaults: the default lineup list when none is
    /// named, and a default PDU list for each lineup without one.
    pub fn resolve(mut self) -> Self {
        if self.lineup_names.is_empty() {
            self.lineup_names = DEFAULT_LINEUPS.iter().map(|s| s.to_string()).collect();
        }
        for lineup in self.lineup_names.iter().skip(self.pdu_configs.len()) {
            self.pdu_configs.push(
                (1..=DEFAULT_PDUS_PER_LINEUP)
                    .map(|i| naming::pdu_id(lineup, i))
                    .collect(),
            );
        }
        self
    }

    /// Requested total load in kW.
    pub fn target_load_kw(&self) -> f64 {
        self.target_load_mw * 1000.0
    }

    /// Subfeed sharing mode implied by `networked_loadbanks`.
    pub fn sharing_mode(&self) -> SharingMode {
        if self.networked_loadbanks {
            SharingMode::Networked
        } else {
            SharingMode::PerPdu
        }
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let checks = [
            ("lineupMaxKW", self.lineup_max_kw, MAX_POWER_KW),
            ("pduMainVoltage", self.pdu_main_voltage, MAX_VOLTAGE_V),
            ("pduMainBreakerTrip", self.pdu_main_breaker_amps, MAX_BREAKER_AMPS),
            ("subfeedVoltage", self.subfeed_voltage, MAX_VOLTAGE_V),
            ("subfeedBreakerTrip", self.subfeed_breaker_amps, MAX_BREAKER_AMPS),
            ("loadbankMaxKW", self.loadbank_max_kw, MAX_POWER_KW),
            ("targetLoadMW", self.target_load_mw, MAX_TARGET_MW),
        ];
        for (field, value, max) in checks {
            require_in_range(&mut errors, field, value, max);
        }

        if !(self.power_factor.is_finite() && self.power_factor > 0.0 && self.power_factor <= 1.0)
        {
            errors.push(ConfigError::new("powerFactor", "must be in (0, 1]"));
        }
        if self.subfeeds_per_pdu == 0 {
            errors.push(ConfigError::new("subfeedsPerPDU", "must be > 0"));
        } else if self.subfeeds_per_pdu > MAX_SUBFEEDS_PER_PDU {
            errors.push(ConfigError::new(
                "subfeedsPerPDU",
                format!("must be <= {MAX_SUBFEEDS_PER_PDU}"),
            ));
        }
        if self.default_active_subfeeds > self.subfeeds_per_pdu {
            errors.push(ConfigError::new(
                "defaultActiveSubfeeds",
                "must be <= subfeedsPerPDU",
            ));
        }

        if self.pdu_configs.len() > self.lineup_names.len() {
            errors.push(ConfigError::new(
                "pduConfigs",
                format!(
                    "has {} PDU lists but only {} lineups",
                    self.pdu_configs.len(),
                    self.lineup_names.len()
                ),
            ));
        }

        let mut seen_names = HashSet::new();
        let mut seen_pdu_prefixes: Vec<(&str, &str)> = Vec::new();
        for name in &self.lineup_names {
            if name.trim().is_empty() {
                errors.push(ConfigError::new("lineupNames", "lineup names must not be empty"));
                continue;
            }
            if !seen_names.insert(name.as_str()) {
                errors.push(ConfigError::new(
                    "lineupNames",
                    format!("duplicate lineup \"{name}\""),
                ));
                continue;
            }
            let stripped = naming::strip_ups_prefix(name);
            if let Some((other, _)) = seen_pdu_prefixes.iter().find(|(_, s)| *s == stripped) {
                errors.push(ConfigError::new(
                    "lineupNames",
                    format!("\"{other}\" and \"{name}\" produce the same PDU ids"),
                ));
            }
            seen_pdu_prefixes.push((name.as_str(), stripped));
        }

        for (lineup, kw) in &self.reduced_capacity {
            let field = format!("reducedCapacityLineups.{lineup}");
            if !self.lineup_names.contains(lineup) {
                errors.push(ConfigError::new(field.clone(), "unknown lineup"));
            }
            require_in_range(&mut errors, &field, *kw, MAX_POWER_KW);
        }

        errors
    }
}

fn require_in_range(errors: &mut Vec<ConfigError>, field: &str, value: f64, max: f64) {
    if !(value.is_finite() && (0.0..=max).contains(&value)) {
        errors.push(ConfigError::new(
            field,
            format!("must be a finite number in [0, {max}]"),
        ));
    }
}
