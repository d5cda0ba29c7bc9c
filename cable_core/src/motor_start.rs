//! # Motor Starting
//!
//! Starting current is the full-load current scaled by a multiplier that
//! depends on the starter type. The voltage drop is then re-evaluated at
//! that current.
//!
//! | Starter | Accepted names (case-insensitive) | Multiplier |
//! |---------|-----------------------------------|------------|
//! | Direct on line | `DOL`, `DIRECT` | 6.0 |
//! | Star-delta | `STAR_DELTA`, `STAR-DELTA` | 3.0 |
//! | Variable frequency drive | `VFD`, `VARIABLE` | 1.2 |
//!
//! ## Unknown starter policy
//!
//! An unrecognised or empty method name is treated as direct on line
//! (6.0 × FLC). DOL gives the highest inrush of the three, so an
//! unidentified starter is checked against the worst case.

use serde::{Deserialize, Serialize};

use crate::voltage_drop::VoltageDropMethod;

/// Motor starter type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StartMethod {
    /// Direct on line: full voltage start
    #[default]
    DirectOnLine,
    /// Star-delta reduced voltage start
    StarDelta,
    /// Variable frequency drive, soft ramp
    VariableFrequency,
}

impl StartMethod {
    /// Starting current as a multiple of FLC
    pub fn multiplier(&self) -> f64 {
        match self {
            StartMethod::DirectOnLine => 6.0,
            StartMethod::StarDelta => 3.0,
            StartMethod::VariableFrequency => 1.2,
        }
    }

    /// Parse a starter name. Returns `None` for names not in the table.
    pub fn parse(name: &str) -> Option<StartMethod> {
        match name.trim().to_ascii_uppercase().as_str() {
            "DOL" | "DIRECT" => Some(StartMethod::DirectOnLine),
            "STAR_DELTA" | "STAR-DELTA" => Some(StartMethod::StarDelta),
            "VFD" | "VARIABLE" => Some(StartMethod::VariableFrequency),
            _ => None,
        }
    }

    /// Resolve an optional starter name, applying the DOL policy for
    /// missing or unknown names.
    pub fn resolve(name: Option<&str>) -> StartMethod {
        name.and_then(StartMethod::parse).unwrap_or_default()
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StartMethod::DirectOnLine => "DOL (6.0x)",
            StartMethod::StarDelta => "Star-Delta (3.0x)",
            StartMethod::VariableFrequency => "VFD (1.2x)",
        }
    }
}

impl std::fmt::Display for StartMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Starting-current multiplier for a starter name (DOL for unknown names).
pub fn start_multiplier(method: &str) -> f64 {
    StartMethod::resolve(Some(method)).multiplier()
}

/// Result of a starting voltage-drop evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StartingDrop {
    /// Voltage drop at starting current (%)
    pub vdrop_percent: f64,
    /// Starting current (A)
    pub starting_current_a: f64,
    /// Starter type used
    pub method: StartMethod,
}

/// Voltage drop during motor start.
///
/// `drop_method` is normally the impedance model; callers without R/X data
/// pass the empirical coefficient instead.
pub fn starting_vdrop(
    flc_a: f64,
    method: StartMethod,
    drop_method: &VoltageDropMethod,
    length_m: f64,
    voltage_v: f64,
    pf: f64,
    three_phase: bool,
) -> StartingDrop {
    let starting_current_a = flc_a * method.multiplier();
    let vdrop_percent =
        drop_method.percent(starting_current_a, length_m, voltage_v, pf, three_phase);
    StartingDrop {
        vdrop_percent,
        starting_current_a,
        method,
    }
}
