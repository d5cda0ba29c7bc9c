//! # Current Calculator
//!
//! Converts a load specification into a full-load current (FLC) for a
//! balanced three-phase circuit:
//!
//! ```text
//! I = P / (√3 × V_LL × pf × η)      (active power, kW)
//! I = S / (√3 × V_LL)               (apparent power, kVA)
//! ```
//!
//! A zero voltage, power factor or efficiency yields 0 A. That is read as
//! "insufficient data" rather than a fault.
//!
//! ## Example
//!
//! ```rust
//! use cable_core::current::{from_power, LoadSpec};
//!
//! let flc = from_power(75.0, 415.0, 0.85, 0.95);
//! assert!((flc - 129.0).abs() < 0.5);
//!
//! let load = LoadSpec::from_fields(None, Some(75.0), Some(90.0), 415.0, 0.85, 0.95);
//! assert!(matches!(load, Some(LoadSpec::ActivePower { .. })));
//! ```

use serde::{Deserialize, Serialize};

use crate::units::{KiloVoltAmperes, Kilowatts, VoltAmperes, Watts, SQRT_3};

/// Denominator terms must be finite and strictly positive to give a current
fn usable(term: f64) -> bool {
    term.is_finite() && term > 0.0
}

/// Full-load current from active power.
///
/// Returns 0 when `voltage_ll_v`, `pf` or `efficiency` is zero, negative or
/// not finite.
pub fn from_power(load_kw: f64, voltage_ll_v: f64, pf: f64, efficiency: f64) -> f64 {
    if !(usable(voltage_ll_v) && usable(pf) && usable(efficiency)) {
        return 0.0;
    }
    let watts: Watts = Kilowatts(load_kw).into();
    watts.0 / (SQRT_3 * voltage_ll_v * pf * efficiency)
}

/// Full-load current from apparent power. Returns 0 unless `voltage_ll_v`
/// is finite and positive.
pub fn from_apparent_power(load_kva: f64, voltage_ll_v: f64) -> f64 {
    if !usable(voltage_ll_v) {
        return 0.0;
    }
    let va: VoltAmperes = KiloVoltAmperes(load_kva).into();
    va.0 / (SQRT_3 * voltage_ll_v)
}

/// The authoritative load representation for one sizing request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadSpec {
    /// Current given directly in amperes
    Current { current_a: f64 },
    /// Active power with line voltage, power factor and efficiency
    ActivePower {
        load_kw: f64,
        voltage_v: f64,
        pf: f64,
        efficiency: f64,
    },
    /// Apparent power with line voltage
    ApparentPower { load_kva: f64, voltage_v: f64 },
}

impl LoadSpec {
    /// Pick the authoritative representation from optional record fields.
    ///
    /// Precedence is explicit current, then kW, then kVA; the first strictly
    /// positive value wins. Returns `None` when none of the three is positive.
    pub fn from_fields(
        current_a: Option<f64>,
        load_kw: Option<f64>,
        load_kva: Option<f64>,
        voltage_v: f64,
        pf: f64,
        efficiency: f64,
    ) -> Option<LoadSpec> {
        let positive = |v: Option<f64>| v.filter(|x| *x > 0.0);

        if let Some(current_a) = positive(current_a) {
            Some(LoadSpec::Current { current_a })
        } else if let Some(load_kw) = positive(load_kw) {
            Some(LoadSpec::ActivePower {
                load_kw,
                voltage_v,
                pf,
                efficiency,
            })
        } else {
            positive(load_kva).map(|load_kva| LoadSpec::ApparentPower {
                load_kva,
                voltage_v,
            })
        }
    }

    /// Full-load current in amperes
    pub fn full_load_current(&self) -> f64 {
        match *self {
            LoadSpec::Current { current_a } => current_a,
            LoadSpec::ActivePower {
                load_kw,
                voltage_v,
                pf,
                efficiency,
            } => from_power(load_kw, voltage_v, pf, efficiency),
            LoadSpec::ApparentPower {
                load_kva,
                voltage_v,
            } => from_apparent_power(load_kva, voltage_v),
        }
    }

    /// Short label for reports
    pub fn kind(&self) -> &'static str {
        match self {
            LoadSpec::Current { .. } => "current",
            LoadSpec::ActivePower { .. } => "kW",
            LoadSpec::ApparentPower { .. } => "kVA",
        }
    }
}
