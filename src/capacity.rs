//! Three-phase circuit capacity math.
//!
//! Every function here is total: negative, NaN, or infinite inputs are
//! treated as zero so a planning view always has a number to show.

use serde::{Deserialize, Serialize};

/// Continuous-duty derating multiplier applied to aggregate ratings.
pub const DERATE_FACTOR: f64 = 0.8;

/// Power factor assumed when a configuration does not provide one.
pub const DEFAULT_POWER_FACTOR: f64 = 1.0;

/// Voltage and breaker trip rating of a single three-phase circuit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircuitRating {
    /// Line-to-line voltage (V).
    pub voltage_v: f64,
    /// Breaker trip rating (A).
    pub breaker_amps: f64,
}

impl CircuitRating {
    /// Creates a rating from a voltage and a breaker trip rating.
    pub fn new(voltage_v: f64, breaker_amps: f64) -> Self {
        Self {
            voltage_v,
            breaker_amps,
        }
    }

    /// Maximum real power of this circuit in kW, without derating.
    pub fn max_kw(&self, power_factor: f64) -> f64 {
        max_circuit_kw(self.voltage_v, self.breaker_amps, power_factor, false)
    }
}

/// Maximum real power of a three-phase circuit in kW.
///
/// `kW = sqrt(3) * V * I * PF / 1000`, multiplied by [`DERATE_FACTOR`] when
/// `derate` is set.
///
/// # Examples
///
/// ```
/// use loadplan::capacity::max_circuit_kw;
///
/// let kw = max_circuit_kw(415.0, 600.0, 1.0, false);
/// assert!((kw - 431.28).abs() < 0.01);
/// assert_eq!(max_circuit_kw(0.0, 600.0, 1.0, false), 0.0);
/// ```
pub fn max_circuit_kw(voltage_v: f64, breaker_amps: f64, power_factor: f64, derate: bool) -> f64 {
    let raw_kw = 3.0_f64.sqrt()
        * non_negative(voltage_v)
        * non_negative(breaker_amps)
        * non_negative(power_factor)
        / 1000.0;
    if derate { raw_kw * DERATE_FACTOR } else { raw_kw }
}

/// Three-phase line current in amps drawn by `load_kw` at `voltage_v`.
///
/// Inverse of [`max_circuit_kw`]: `I = P * 1000 / (sqrt(3) * V * PF)`.
/// Returns `0.0` when voltage or power factor is not positive.
pub fn line_current_amps(load_kw: f64, voltage_v: f64, power_factor: f64) -> f64 {
    let voltage_v = non_negative(voltage_v);
    let power_factor = non_negative(power_factor);
    if voltage_v == 0.0 || power_factor == 0.0 {
        return 0.0;
    }
    non_negative(load_kw) * 1000.0 / (3.0_f64.sqrt() * voltage_v * power_factor)
}

/// Clamps anything that is not a finite, positive number to `0.0`.
pub fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Parses a user-entered kW value.
///
/// Parse failures and negative values become `0.0`; the result is rounded to
/// two decimal places.
pub fn parse_kw(input: &str) -> f64 {
    input
        .trim()
        .parse::<f64>()
        .map(|v| round2(non_negative(v)))
        .unwrap_or(0.0)
}
