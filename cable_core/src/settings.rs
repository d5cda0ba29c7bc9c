//! # Sizing Settings
//!
//! Project-wide defaults and limits. A cable record may leave most fields
//! empty; [`crate::sizing::CableInput::resolve`] fills them from here once,
//! before any formula runs.
//!
//! Settings live inside a schedule file (see [`crate::schedule`]) and
//! serialize as plain JSON. Missing keys take the documented defaults, so
//! `{}` is a valid settings object.
//!
//! ```rust
//! use cable_core::settings::SizingSettings;
//!
//! let json = r#"{ "grouping_threshold": 0.7 }"#;
//! let settings: SizingSettings = serde_json::from_str(json).unwrap();
//! assert_eq!(settings.grouping_threshold, 0.7);
//! assert_eq!(settings.default_voltage_v, 415.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::csa::DEFAULT_FEEDER_SIZES;
use crate::errors::{CalcError, CalcResult};
use crate::short_circuit::k_const;

/// Default grouping-factor threshold for the compliance check
pub const DEFAULT_GROUPING_THRESHOLD: f64 = 0.85;

/// Allowable voltage drop limits (%)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoltageDropLimits {
    /// Running drop limit for low-voltage circuits
    pub lv_percent: f64,
    /// Running drop limit for circuits above the LV ceiling
    pub mv_percent: f64,
    /// Running drop limit for control circuits (explicit opt-in only)
    pub control_percent: f64,
    /// Motor starting drop limit, any voltage class
    pub starting_percent: f64,
    /// Highest line voltage still classed as LV (V)
    pub lv_max_voltage_v: f64,
}

impl Default for VoltageDropLimits {
    fn default() -> Self {
        VoltageDropLimits {
            lv_percent: 5.0,
            mv_percent: 10.0,
            control_percent: 15.0,
            starting_percent: 15.0,
            lv_max_voltage_v: 1000.0,
        }
    }
}

/// Defaults and limits applied to every cable in a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingSettings {
    /// Line-to-line voltage when a record omits it (V)
    pub default_voltage_v: f64,
    /// Power factor when a record omits it
    pub default_pf: f64,
    /// Efficiency when a record omits it
    pub default_efficiency: f64,
    /// Adiabatic k constant when a record omits it
    pub default_k_const: f64,
    /// Fault duration when a record omits it (s)
    pub default_sc_time_s: f64,
    /// Empirical drop coefficient when a record has neither mV/A/m nor R/X
    pub default_mv_per_a_m: f64,
    /// Candidate CSA list when a record omits one (mm²)
    pub csa_options_mm2: Vec<f64>,
    /// Minimum acceptable combined derating ("grouping") factor
    pub grouping_threshold: f64,
    /// Voltage drop limits
    pub limits: VoltageDropLimits,
}

impl Default for SizingSettings {
    fn default() -> Self {
        SizingSettings {
            default_voltage_v: 415.0,
            default_pf: 1.0,
            default_efficiency: 1.0,
            default_k_const: k_const::COPPER_PVC,
            default_sc_time_s: 1.0,
            default_mv_per_a_m: 0.44,
            csa_options_mm2: DEFAULT_FEEDER_SIZES.to_vec(),
            grouping_threshold: DEFAULT_GROUPING_THRESHOLD,
            limits: VoltageDropLimits::default(),
        }
    }
}

impl SizingSettings {
    /// Builder: override the grouping threshold
    pub fn with_grouping_threshold(mut self, threshold: f64) -> Self {
        self.grouping_threshold = threshold;
        self
    }

    /// Builder: override the candidate CSA list
    pub fn with_csa_options(mut self, options: Vec<f64>) -> Self {
        self.csa_options_mm2 = options;
        self
    }

    /// Check that the settings themselves are usable.
    pub fn validate(&self) -> CalcResult<()> {
        if self.default_voltage_v.is_nan() || self.default_voltage_v <= 0.0 {
            return Err(CalcError::invalid_input(
                "default_voltage_v",
                self.default_voltage_v.to_string(),
                "Default voltage must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.grouping_threshold) {
            return Err(CalcError::invalid_input(
                "grouping_threshold",
                self.grouping_threshold.to_string(),
                "Grouping threshold must be between 0 and 1",
            ));
        }
        let limits = [
            ("limits.lv_percent", self.limits.lv_percent),
            ("limits.mv_percent", self.limits.mv_percent),
            ("limits.control_percent", self.limits.control_percent),
            ("limits.starting_percent", self.limits.starting_percent),
        ];
        for (field, value) in limits {
            if value.is_nan() || value <= 0.0 {
                return Err(CalcError::invalid_input(
                    field,
                    value.to_string(),
                    "Voltage drop limit must be positive",
                ));
            }
        }
        Ok(())
    }
}
