//! # Short-Circuit Withstand
//!
//! Adiabatic check (IEC 60364-5-54 / BS 7671 style):
//!
//! ```text
//! A_required = I_sc × √t / k
//! ```
//!
//! with `I_sc` the prospective fault current (A), `t` the disconnection time
//! (s) and `k` the conductor/insulation constant (115 for PVC-insulated
//! copper, 143 for XLPE copper, 76 for PVC aluminium).
//!
//! Inputs that make the equation meaningless (k ≤ 0, negative time or
//! current, NaN/∞) do not raise. They fail closed with `ok = false`,
//! `required_area_mm2 = 0` and `validated = false`, which keeps "could not be
//! checked" apart from "checked and too small".

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Typical k constants (A·s½/mm²)
pub mod k_const {
    /// Copper, PVC insulation
    pub const COPPER_PVC: f64 = 115.0;
    /// Copper, XLPE/EPR insulation
    pub const COPPER_XLPE: f64 = 143.0;
    /// Aluminium, PVC insulation
    pub const ALUMINIUM_PVC: f64 = 76.0;
    /// Aluminium, XLPE/EPR insulation
    pub const ALUMINIUM_XLPE: f64 = 94.0;
}

/// Outcome of a withstand check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShortCircuitCheck {
    /// Selected CSA is at least the required area
    pub ok: bool,
    /// Minimum CSA to survive the fault (mm²), 0 when not validated
    pub required_area_mm2: f64,
    /// False when the inputs were degenerate and no check was possible
    pub validated: bool,
}

impl ShortCircuitCheck {
    fn unvalidated() -> Self {
        ShortCircuitCheck {
            ok: false,
            required_area_mm2: 0.0,
            validated: false,
        }
    }
}

/// Run the adiabatic withstand check against `csa_mm2`.
pub fn check(sc_current_a: f64, duration_s: f64, k: f64, csa_mm2: f64) -> ShortCircuitCheck {
    let finite = [sc_current_a, duration_s, k, csa_mm2].iter().all(|v| v.is_finite());
    if !finite || k <= 0.0 || duration_s < 0.0 || sc_current_a < 0.0 {
        warn!(
            sc_current_a,
            duration_s, k, "short-circuit withstand could not be validated"
        );
        return ShortCircuitCheck::unvalidated();
    }

    let required_area_mm2 = sc_current_a * duration_s.sqrt() / k;
    ShortCircuitCheck {
        ok: required_area_mm2 <= csa_mm2,
        required_area_mm2,
        validated: true,
    }
}
