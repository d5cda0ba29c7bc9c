//! # CSA Selection
//!
//! Picks the smallest available conductor cross-sectional area (mm²) that
//! meets the derated current. When nothing qualifies, including an infinite
//! derated current, the largest candidate is returned with `fallback` set,
//! and the compliance checks flag the cable.
//!
//! Selection is monotonic: a larger derated current never selects a smaller
//! CSA.
//!
//! ## Example
//!
//! ```rust
//! use cable_core::csa::select_csa;
//!
//! let pick = select_csa(&[50.0, 16.0, 35.0, 25.0], 24.0).unwrap();
//! assert_eq!(pick.csa_mm2, 25.0);
//! assert!(!pick.fallback);
//! ```

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{CalcError, CalcResult};

/// IEC 60228 standard conductor sizes (mm²)
pub const IEC_STANDARD_SIZES: [f64; 22] = [
    1.5, 2.5, 4.0, 6.0, 10.0, 16.0, 25.0, 35.0, 50.0, 70.0, 95.0, 120.0, 150.0, 185.0, 240.0,
    300.0, 400.0, 500.0, 630.0, 800.0, 1000.0, 1200.0,
];

/// Default candidate list for power feeders (mm²)
pub const DEFAULT_FEEDER_SIZES: [f64; 9] =
    [25.0, 35.0, 50.0, 70.0, 95.0, 120.0, 150.0, 185.0, 240.0];

/// Outcome of CSA selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CsaSelection {
    /// Selected cross-sectional area (mm²)
    pub csa_mm2: f64,
    /// True when no candidate met the demand and the largest was used
    pub fallback: bool,
}

/// Select the smallest candidate `>= derated_current_a`.
///
/// Candidates need not be sorted or unique.
///
/// # Errors
///
/// `CalcError::InvalidInput` when `candidates` is empty or holds a value
/// that is not a finite, positive size.
pub fn select_csa(candidates: &[f64], derated_current_a: f64) -> CalcResult<CsaSelection> {
    if candidates.is_empty() {
        return Err(CalcError::invalid_input(
            "csa_options_mm2",
            "[]",
            "At least one candidate CSA is required",
        ));
    }
    if let Some(bad) = candidates.iter().find(|c| !(c.is_finite() && **c > 0.0)) {
        return Err(CalcError::invalid_input(
            "csa_options_mm2",
            bad.to_string(),
            "Candidate CSAs must be finite and positive",
        ));
    }

    let mut sorted = candidates.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    if let Some(&csa) = sorted.iter().find(|&&c| c >= derated_current_a) {
        return Ok(CsaSelection {
            csa_mm2: csa,
            fallback: false,
        });
    }

    // sorted is non-empty here
    let largest = sorted[sorted.len() - 1];
    warn!(
        derated_current_a,
        largest_csa_mm2 = largest,
        "no candidate CSA meets demand; falling back to largest"
    );
    Ok(CsaSelection {
        csa_mm2: largest,
        fallback: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_first_qualifying() {
        let pick = select_csa(&[16.0, 25.0, 35.0, 50.0], 24.0).unwrap();
        assert_eq!(pick.csa_mm2, 25.0);
        assert!(!pick.fallback);
    }

    #[test]
    fn test_exact_match_qualifies() {
        let pick = select_csa(&[16.0, 25.0, 35.0], 25.0).unwrap();
        assert_eq!(pick.csa_mm2, 25.0);
    }

    #[test]
    fn test_fallback_to_largest() {
        let pick = select_csa(&[16.0, 25.0, 35.0, 50.0], 9999.0).unwrap();
        assert_eq!(pick.csa_mm2, 50.0);
        assert!(pick.fallback);
    }

    #[test]
    fn test_infinite_demand_falls_back() {
        let pick = select_csa(&[35.0, 16.0], f64::INFINITY).unwrap();
        assert_eq!(pick.csa_mm2, 35.0);
        assert!(pick.fallback);
    }

    #[test]
    fn test_unsorted_with_duplicates() {
        let pick = select_csa(&[95.0, 35.0, 35.0, 70.0], 40.0).unwrap();
        assert_eq!(pick.csa_mm2, 70.0);
    }

    #[test]
    fn test_nan_candidate_rejected() {
        let err = select_csa(&[25.0, f64::NAN], 9999.0).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_non_positive_candidates_rejected() {
        assert!(select_csa(&[-16.0, 25.0], 10.0).is_err());
        assert!(select_csa(&[0.0, 25.0], 10.0).is_err());
        assert!(select_csa(&[25.0, f64::INFINITY], 10.0).is_err());
    }

    #[test]
    fn test_empty_candidates() {
        let err = select_csa(&[], 10.0).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_monotonic() {
        let mut last = 0.0;
        let mut current = 0.0;
        while current < 400.0 {
            let pick = select_csa(&IEC_STANDARD_SIZES, current).unwrap();
            assert!(pick.csa_mm2 >= last);
            last = pick.csa_mm2;
            current += 3.7;
        }
    }
}
