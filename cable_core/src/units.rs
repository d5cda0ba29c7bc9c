//! # Unit Types
//!
//! Thin newtype wrappers for the electrical units that cross a scale
//! boundary inside the engine (kW to W, Ω/km to Ω/m, mV to V). Record
//! fields stay plain `f64` with a unit suffix in the name; these wrappers
//! are used where a conversion happens so the factor of 1000 lives in
//! exactly one place.
//!
//! ## Example
//!
//! ```rust
//! use cable_core::units::{Kilowatts, Watts, OhmPerKm, OhmPerMetre};
//!
//! let p: Watts = Kilowatts(7.5).into();
//! assert_eq!(p.0, 7500.0);
//!
//! let r: OhmPerMetre = OhmPerKm(0.727).into();
//! assert!((r.0 - 0.000727).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};

/// √3, the line-to-line factor for balanced three-phase systems
pub const SQRT_3: f64 = 1.732_050_807_568_877_2;

// ============================================================================
// Power Units
// ============================================================================

/// Active power in kilowatts
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilowatts(pub f64);

/// Active power in watts
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Watts(pub f64);

impl From<Kilowatts> for Watts {
    fn from(kw: Kilowatts) -> Self {
        Watts(kw.0 * 1000.0)
    }
}

/// Apparent power in kilovolt-amperes
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KiloVoltAmperes(pub f64);

/// Apparent power in volt-amperes
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoltAmperes(pub f64);

impl From<KiloVoltAmperes> for VoltAmperes {
    fn from(kva: KiloVoltAmperes) -> Self {
        VoltAmperes(kva.0 * 1000.0)
    }
}

// ============================================================================
// Impedance Units
// ============================================================================

/// Per-length impedance in ohm per kilometre (catalog convention)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OhmPerKm(pub f64);

/// Per-length impedance in ohm per metre
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OhmPerMetre(pub f64);

impl From<OhmPerKm> for OhmPerMetre {
    fn from(z: OhmPerKm) -> Self {
        OhmPerMetre(z.0 / 1000.0)
    }
}

// ============================================================================
// Voltage Units
// ============================================================================

/// Empirical drop coefficient in millivolts per ampere per metre
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MillivoltsPerAmpMetre(pub f64);

/// Drop coefficient in volts per ampere per metre (ohm per metre)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoltsPerAmpMetre(pub f64);

impl From<MillivoltsPerAmpMetre> for VoltsPerAmpMetre {
    fn from(mv: MillivoltsPerAmpMetre) -> Self {
        VoltsPerAmpMetre(mv.0 / 1000.0)
    }
}
