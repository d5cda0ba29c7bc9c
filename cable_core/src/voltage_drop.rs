//! # Voltage Drop Calculator
//!
//! Steady-state voltage drop as a percentage of the line voltage, by one of
//! two interchangeable methods.
//!
//! ## Empirical (mV/A/m)
//!
//! ```text
//! Vdrop% = √3 × I × L × (mV/A/m / 1000) / V_LL × 100
//! ```
//!
//! ## Impedance (R/X)
//!
//! ```text
//! cosφ = pf,  sinφ = √max(0, 1 − pf²)
//! Vdrop  = k × I × L × (R cosφ + X sinφ)      R, X in Ω/m, k = √3 or 1
//! Vdrop% = Vdrop / V_LL × 100
//! ```
//!
//! The impedance method is used whenever both R and X are known and
//! non-zero. A zero voltage gives 0 % for both methods.
//!
//! ## Example
//!
//! ```rust
//! use cable_core::voltage_drop::VoltageDropMethod;
//!
//! let method = VoltageDropMethod::select(Some(0.44), Some(0.524), Some(0.08));
//! assert!(matches!(method, VoltageDropMethod::Impedance { .. }));
//!
//! let pct = method.percent(100.0, 50.0, 415.0, 0.85, true);
//! assert!(pct > 0.0 && pct < 5.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::units::{MillivoltsPerAmpMetre, OhmPerKm, OhmPerMetre, VoltsPerAmpMetre, SQRT_3};

/// Empirical mV/A/m method. A missing or non-finite coefficient counts as 0.
pub fn percent_empirical(
    current_a: f64,
    length_m: f64,
    mv_per_a_m: Option<f64>,
    voltage_v: f64,
) -> f64 {
    if voltage_v == 0.0 {
        return 0.0;
    }
    let mv = mv_per_a_m.filter(|v| v.is_finite()).unwrap_or(0.0);
    let coeff: VoltsPerAmpMetre = MillivoltsPerAmpMetre(mv).into();
    let vdrop_v = SQRT_3 * current_a * length_m * coeff.0;
    vdrop_v / voltage_v * 100.0
}

/// Impedance (R/X) method with `r`, `x` given in Ω/km.
pub fn percent_impedance(
    current_a: f64,
    length_m: f64,
    r_ohm_per_km: f64,
    x_ohm_per_km: f64,
    voltage_v: f64,
    pf: f64,
    three_phase: bool,
) -> f64 {
    if voltage_v == 0.0 {
        return 0.0;
    }
    let cos_phi = pf;
    let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();
    let r: OhmPerMetre = OhmPerKm(r_ohm_per_km).into();
    let x: OhmPerMetre = OhmPerKm(x_ohm_per_km).into();
    let phase_factor = if three_phase { SQRT_3 } else { 1.0 };
    let vdrop_v = phase_factor * current_a * length_m * (r.0 * cos_phi + x.0 * sin_phi);
    vdrop_v / voltage_v * 100.0
}

/// mV/A/m coefficient equivalent to an R/X pair at the given power factor.
///
/// The empirical formula applies √3 itself, so the coefficient is the
/// per-phase value `R cosφ + X sinφ` (Ω/km and mV/A/m are numerically equal).
pub fn equivalent_mv_per_a_m(r_ohm_per_km: f64, x_ohm_per_km: f64, pf: f64) -> f64 {
    let sin_phi = (1.0 - pf * pf).max(0.0).sqrt();
    r_ohm_per_km * pf + x_ohm_per_km * sin_phi
}

/// Which formula a run uses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum VoltageDropMethod {
    /// Empirical coefficient in mV/A/m
    Empirical { mv_per_a_m: Option<f64> },
    /// Resistance and reactance in Ω/km
    Impedance {
        r_ohm_per_km: f64,
        x_ohm_per_km: f64,
    },
}

impl VoltageDropMethod {
    /// Prefer the impedance model when both R and X are present and non-zero.
    pub fn select(
        mv_per_a_m: Option<f64>,
        r_ohm_per_km: Option<f64>,
        x_ohm_per_km: Option<f64>,
    ) -> Self {
        match (r_ohm_per_km, x_ohm_per_km) {
            (Some(r), Some(x)) if r != 0.0 && x != 0.0 => VoltageDropMethod::Impedance {
                r_ohm_per_km: r,
                x_ohm_per_km: x,
            },
            _ => VoltageDropMethod::Empirical { mv_per_a_m },
        }
    }

    /// Voltage drop percentage at `current_a`.
    ///
    /// `pf` and `three_phase` only affect the impedance method; the empirical
    /// coefficient is always applied as a three-phase line-to-line drop.
    pub fn percent(
        &self,
        current_a: f64,
        length_m: f64,
        voltage_v: f64,
        pf: f64,
        three_phase: bool,
    ) -> f64 {
        match *self {
            VoltageDropMethod::Empirical { mv_per_a_m } => {
                percent_empirical(current_a, length_m, mv_per_a_m, voltage_v)
            }
            VoltageDropMethod::Impedance {
                r_ohm_per_km,
                x_ohm_per_km,
            } => percent_impedance(
                current_a,
                length_m,
                r_ohm_per_km,
                x_ohm_per_km,
                voltage_v,
                pf,
                three_phase,
            ),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            VoltageDropMethod::Empirical { .. } => "mV/A/m",
            VoltageDropMethod::Impedance { .. } => "R/X",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empirical_known_value() {
        // √3 × 100 A × 50 m × 0.00044 V/A/m = 3.81 V → 0.918 % of 415 V
        let pct = percent_empirical(100.0, 50.0, Some(0.44), 415.0);
        assert!((pct - 0.9183).abs() < 0.001);
    }

    #[test]
    fn test_empirical_missing_coefficient() {
        assert_eq!(percent_empirical(100.0, 50.0, None, 415.0), 0.0);
        assert_eq!(percent_empirical(100.0, 50.0, Some(f64::NAN), 415.0), 0.0);
    }

    #[test]
    fn test_zero_voltage() {
        assert_eq!(percent_empirical(100.0, 50.0, Some(0.44), 0.0), 0.0);
        assert_eq!(percent_impedance(100.0, 50.0, 0.5, 0.08, 0.0, 0.85, true), 0.0);
    }

    #[test]
    fn test_impedance_unity_pf() {
        // pf = 1: only R contributes. √3 × 100 × 100 × 0.000524 = 9.076 V → 2.187 %
        let pct = percent_impedance(100.0, 100.0, 0.524, 0.08, 415.0, 1.0, true);
        assert!((pct - 2.187).abs() < 0.01);
    }

    #[test]
    fn test_impedance_single_phase() {
        let three = percent_impedance(50.0, 30.0, 1.15, 0.09, 230.0, 0.9, true);
        let single = percent_impedance(50.0, 30.0, 1.15, 0.09, 230.0, 0.9, false);
        assert!((three / single - SQRT_3).abs() < 1e-9);
    }

    #[test]
    fn test_pf_above_one_is_clamped() {
        // sinφ clamps to 0 instead of producing NaN
        let pct = percent_impedance(10.0, 10.0, 1.0, 1.0, 400.0, 1.000_000_1, true);
        assert!(pct.is_finite());
    }

    #[test]
    fn test_methods_agree_on_equivalent_coefficient() {
        for &(r, x, pf) in &[(0.524, 0.08, 0.85), (1.83, 0.09, 0.8), (0.0754, 0.07, 0.95)] {
            let mv = equivalent_mv_per_a_m(r, x, pf);
            let empirical = percent_empirical(120.0, 80.0, Some(mv), 415.0);
            let impedance = percent_impedance(120.0, 80.0, r, x, 415.0, pf, true);
            assert!((empirical - impedance).abs() < 1e-9, "{} vs {}", empirical, impedance);
        }
    }

    #[test]
    fn test_method_selection() {
        assert!(matches!(
            VoltageDropMethod::select(Some(0.44), Some(0.5), Some(0.0)),
            VoltageDropMethod::Empirical { .. }
        ));
        assert!(matches!(
            VoltageDropMethod::select(None, None, Some(0.08)),
            VoltageDropMethod::Empirical { mv_per_a_m: None }
        ));
        let m = VoltageDropMethod::select(None, Some(0.5), Some(0.08));
        assert_eq!(m.name(), "R/X");
    }
}
