//! # Derating Combinator
//!
//! Correction factors (ambient temperature, grouping, soil resistivity,
//! depth of lay, ...) are folded into a single multiplier, and the load
//! current is divided by it to get the current the cable must carry at
//! reference conditions:
//!
//! ```text
//! k_total    = k1 × k2 × ... × kn        (empty list: k_total = 1)
//! I_derated  = I_base / k_total
//! ```
//!
//! A product of exactly zero yields `f64::INFINITY`. No real conductor can
//! satisfy it, so CSA selection falls back to the largest candidate and the
//! compliance checks report the failure.

use tracing::warn;

/// Product of all factors. An empty slice gives 1.0.
pub fn combined_factor(factors: &[f64]) -> f64 {
    factors.iter().product()
}

/// Derated current `i_base / Π factors`, or `+∞` when the product is zero.
pub fn derate(i_base: f64, factors: &[f64]) -> f64 {
    let total = combined_factor(factors);
    if total == 0.0 {
        warn!(i_base, ?factors, "derating product is zero; no cable can satisfy demand");
        return f64::INFINITY;
    }
    i_base / total
}
