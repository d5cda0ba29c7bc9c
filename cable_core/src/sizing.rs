//! # Cable Sizing
//!
//! Full sizing pipeline for one cable record:
//!
//! ```text
//! CableInput ──resolve──▶ ResolvedCable
//!   FLC ─▶ derated current ─▶ running / starting voltage drop
//!       ─▶ CSA selection ─▶ short-circuit check ─▶ compliance (6 items)
//! ```
//!
//! Every optional field of [`CableInput`] has a documented default and is
//! resolved exactly once, against [`SizingSettings`], before any formula
//! runs. The pipeline itself is a pure function of the resolved record, so
//! sizing the same input twice gives identical results, and records can be
//! sized in any order or in parallel.
//!
//! ## Example
//!
//! ```rust
//! use cable_core::sizing::{size_cable, CableInput};
//! use cable_core::settings::SizingSettings;
//!
//! let input = CableInput::new("CBL-001", 60.0)
//!     .with_load_kw(45.0, 0.85, 0.93)
//!     .with_derating(vec![0.94, 0.9])
//!     .with_fault(6000.0, 0.5, 115.0);
//!
//! let result = size_cable(&input, &SizingSettings::default()).unwrap();
//! assert_eq!(result.compliance.len(), 6);
//! println!("{} mm², pass = {}", result.selected_csa_mm2, result.passes());
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::CatalogEntry;
use crate::compliance::{
    self, ComplianceCheck, ComplianceInput, ComplianceItem, RatedCurrents, VoltageClass,
};
use crate::csa::select_csa;
use crate::current::LoadSpec;
use crate::derating::derate;
use crate::errors::{CalcError, CalcResult};
use crate::motor_start::{starting_vdrop, StartMethod};
use crate::settings::SizingSettings;
use crate::short_circuit;
use crate::voltage_drop::VoltageDropMethod;

/// One cable record as supplied by a schedule or an API caller.
///
/// Only `cable_number`, `length_m` and one load representation are needed;
/// everything else falls back to [`SizingSettings`].
///
/// ## JSON Example
///
/// ```json
/// {
///   "cable_number": "CBL-014",
///   "from_equipment": "MCC-1",
///   "to_equipment": "P-101A",
///   "load_kw": 37.0,
///   "pf": 0.85,
///   "efficiency": 0.94,
///   "length_m": 85.0,
///   "r_ohm_per_km": 0.727,
///   "x_ohm_per_km": 0.08,
///   "derating_factors": [0.94, 0.8],
///   "sc_current_a": 8000.0,
///   "start_method": "DOL"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CableInput {
    /// Cable tag (e.g., "CBL-001")
    pub cable_number: String,
    pub from_equipment: Option<String>,
    pub to_equipment: Option<String>,

    /// Load current (A); wins over kW and kVA when positive
    pub current_a: Option<f64>,
    /// Active power (kW); used when no current is given
    pub load_kw: Option<f64>,
    /// Apparent power (kVA); used when neither current nor kW is given
    pub load_kva: Option<f64>,
    /// Line-to-line voltage (V). Default: settings.default_voltage_v
    pub voltage_v: Option<f64>,
    /// Power factor. Default: settings.default_pf
    pub pf: Option<f64>,
    /// Efficiency. Default: settings.default_efficiency
    pub efficiency: Option<f64>,

    /// Route length (m)
    pub length_m: f64,
    /// Empirical drop coefficient (mV/A/m). Default: settings.default_mv_per_a_m
    pub mv_per_a_m: Option<f64>,
    /// Conductor resistance (Ω/km); with `x_ohm_per_km` enables the R/X model
    pub r_ohm_per_km: Option<f64>,
    /// Conductor reactance (Ω/km)
    pub x_ohm_per_km: Option<f64>,
    /// Three-phase circuit. Default: true
    pub three_phase: Option<bool>,
    /// Voltage class override; the only way to apply the control-circuit limit
    pub voltage_class: Option<VoltageClass>,

    /// Correction factors, applied multiplicatively. Empty means none.
    pub derating_factors: Vec<f64>,
    /// Candidate sizes (mm²). Default: settings.csa_options_mm2
    pub csa_options_mm2: Option<Vec<f64>>,

    /// Prospective fault current (A). Default: 0 (no fault duty)
    pub sc_current_a: Option<f64>,
    /// Fault clearing time (s). Default: settings.default_sc_time_s
    pub sc_time_s: Option<f64>,
    /// Adiabatic k constant. Default: settings.default_k_const
    pub k_const: Option<f64>,

    /// Motor starter name ("DOL", "STAR-DELTA", "VFD"). Default and unknown: DOL
    pub start_method: Option<String>,

    /// Catalog rating in air (A)
    pub rated_current_air_a: Option<f64>,
    /// Catalog rating in trench (A)
    pub rated_current_trench_a: Option<f64>,
    /// Catalog rating in duct (A)
    pub rated_current_duct_a: Option<f64>,

    /// Grouping threshold override. Default: settings.grouping_threshold
    pub grouping_threshold: Option<f64>,
}

impl CableInput {
    /// Create a record with a tag and route length; add a load with one of
    /// the `with_*` builders.
    pub fn new(cable_number: impl Into<String>, length_m: f64) -> Self {
        CableInput {
            cable_number: cable_number.into(),
            length_m,
            ..Default::default()
        }
    }

    pub fn with_current(mut self, current_a: f64) -> Self {
        self.current_a = Some(current_a);
        self
    }

    pub fn with_load_kw(mut self, load_kw: f64, pf: f64, efficiency: f64) -> Self {
        self.load_kw = Some(load_kw);
        self.pf = Some(pf);
        self.efficiency = Some(efficiency);
        self
    }

    pub fn with_load_kva(mut self, load_kva: f64) -> Self {
        self.load_kva = Some(load_kva);
        self
    }

    pub fn with_voltage(mut self, voltage_v: f64) -> Self {
        self.voltage_v = Some(voltage_v);
        self
    }

    pub fn with_derating(mut self, factors: Vec<f64>) -> Self {
        self.derating_factors = factors;
        self
    }

    pub fn with_impedance(mut self, r_ohm_per_km: f64, x_ohm_per_km: f64) -> Self {
        self.r_ohm_per_km = Some(r_ohm_per_km);
        self.x_ohm_per_km = Some(x_ohm_per_km);
        self
    }

    pub fn with_fault(mut self, sc_current_a: f64, sc_time_s: f64, k_const: f64) -> Self {
        self.sc_current_a = Some(sc_current_a);
        self.sc_time_s = Some(sc_time_s);
        self.k_const = Some(k_const);
        self
    }

    pub fn with_start_method(mut self, method: impl Into<String>) -> Self {
        self.start_method = Some(method.into());
        self
    }

    pub fn with_csa_options(mut self, options: Vec<f64>) -> Self {
        self.csa_options_mm2 = Some(options);
        self
    }

    /// Copy electrical data from a chosen catalog entry: R, X and the
    /// current ratings. The next sizing pass then uses the R/X model and a
    /// real thermal rating.
    pub fn apply_catalog_entry(&mut self, entry: &CatalogEntry) {
        self.r_ohm_per_km = Some(entry.r_ohm_per_km);
        self.x_ohm_per_km = Some(entry.x_ohm_per_km);
        self.rated_current_air_a = entry.rated_current_air_a;
        self.rated_current_trench_a = entry.rated_current_trench_a;
        self.rated_current_duct_a = entry.rated_current_duct_a;
    }

    /// Fill every optional field from `settings` and validate.
    ///
    /// # Errors
    ///
    /// * `MissingField("load")` - no positive current, kW or kVA
    /// * `InvalidInput` - a negative or non-finite voltage, pf, efficiency,
    ///   length or derating factor; pf or efficiency above 1; an empty CSA
    ///   candidate list
    pub fn resolve(&self, settings: &SizingSettings) -> CalcResult<ResolvedCable> {
        let voltage_v = in_range(
            "voltage_v",
            self.voltage_v.unwrap_or(settings.default_voltage_v),
            None,
        )?;
        let pf = in_range("pf", self.pf.unwrap_or(settings.default_pf), Some(1.0))?;
        let efficiency = in_range(
            "efficiency",
            self.efficiency.unwrap_or(settings.default_efficiency),
            Some(1.0),
        )?;

        let load = LoadSpec::from_fields(
            self.current_a,
            self.load_kw,
            self.load_kva,
            voltage_v,
            pf,
            efficiency,
        )
        .ok_or_else(|| CalcError::missing_field("load"))?;

        let length_m = in_range("length_m", self.length_m, None)?;
        for &factor in &self.derating_factors {
            in_range("derating_factors", factor, None)?;
        }

        let csa_options_mm2 = self
            .csa_options_mm2
            .clone()
            .unwrap_or_else(|| settings.csa_options_mm2.clone());
        if csa_options_mm2.is_empty() {
            return Err(CalcError::invalid_input(
                "csa_options_mm2",
                "[]",
                "At least one candidate CSA is required",
            ));
        }

        let mv_per_a_m = self.mv_per_a_m.or(Some(settings.default_mv_per_a_m));

        Ok(ResolvedCable {
            cable_number: self.cable_number.clone(),
            load,
            voltage_v,
            pf,
            length_m,
            three_phase: self.three_phase.unwrap_or(true),
            voltage_class: self.voltage_class,
            drop_method: VoltageDropMethod::select(
                mv_per_a_m,
                self.r_ohm_per_km,
                self.x_ohm_per_km,
            ),
            derating_factors: self.derating_factors.clone(),
            csa_options_mm2,
            sc_current_a: self.sc_current_a.unwrap_or(0.0),
            sc_time_s: self.sc_time_s.unwrap_or(settings.default_sc_time_s),
            k_const: self.k_const.unwrap_or(settings.default_k_const),
            start_method: StartMethod::resolve(self.start_method.as_deref()),
            rated_currents: RatedCurrents {
                air_a: self.rated_current_air_a,
                trench_a: self.rated_current_trench_a,
                duct_a: self.rated_current_duct_a,
            },
            grouping_threshold: self.grouping_threshold.unwrap_or(settings.grouping_threshold),
        })
    }
}

/// Accept finite values in `0..=max` (no upper bound when `max` is `None`).
/// Zero stays legal: the calculators treat it as missing data.
fn in_range(field: &str, value: f64, max: Option<f64>) -> CalcResult<f64> {
    let ok = value.is_finite() && value >= 0.0 && max.map_or(true, |m| value <= m);
    if ok {
        return Ok(value);
    }
    let reason = match max {
        Some(m) => format!("Must be a number between 0 and {}", m),
        None => "Must be a finite, non-negative number".to_string(),
    };
    Err(CalcError::invalid_input(field, value.to_string(), reason))
}

/// A cable record with every default applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCable {
    pub cable_number: String,
    pub load: LoadSpec,
    pub voltage_v: f64,
    pub pf: f64,
    pub length_m: f64,
    pub three_phase: bool,
    pub voltage_class: Option<VoltageClass>,
    pub drop_method: VoltageDropMethod,
    pub derating_factors: Vec<f64>,
    pub csa_options_mm2: Vec<f64>,
    pub sc_current_a: f64,
    pub sc_time_s: f64,
    pub k_const: f64,
    pub start_method: StartMethod,
    pub rated_currents: RatedCurrents,
    pub grouping_threshold: f64,
}

/// Results of sizing one cable.
///
/// ## JSON Example
///
/// ```json
/// {
///   "cable_number": "CBL-001",
///   "flc_a": 86.4,
///   "derated_current_a": 102.1,
///   "selected_csa_mm2": 120.0,
///   "csa_fallback": false,
///   "vdrop_percent": 1.62,
///   "sc_required_area_mm2": 36.9,
///   "sc_ok": true,
///   "vdrop_ok": true,
///   "compliance": [ { "type": "running_voltage_drop", "ok": true, "...": "..." } ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingResult {
    pub cable_number: String,
    /// Load representation that produced the FLC
    pub load: LoadSpec,
    /// Full-load current (A)
    pub flc_a: f64,
    /// Current after derating (A); infinite when a factor is zero
    pub derated_current_a: f64,
    /// Selected conductor size (mm²)
    pub selected_csa_mm2: f64,
    /// No candidate met demand and the largest was used
    pub csa_fallback: bool,
    /// Running voltage drop at FLC (%)
    pub vdrop_percent: f64,
    /// Formula used for the voltage drop
    pub vdrop_method: VoltageDropMethod,
    /// Starter type used for the starting check
    pub start_method: StartMethod,
    /// Motor starting current (A)
    pub starting_current_a: f64,
    /// Voltage drop at starting current (%)
    pub starting_vdrop_percent: f64,
    /// Minimum CSA for the fault duty (mm²)
    pub sc_required_area_mm2: f64,
    pub sc_ok: bool,
    pub vdrop_ok: bool,
    /// All six compliance checks, in fixed order
    pub compliance: Vec<ComplianceItem>,
}

impl SizingResult {
    /// True when every compliance check passed
    pub fn passes(&self) -> bool {
        compliance::all_ok(&self.compliance)
    }

    /// Checks that failed, in reporting order
    pub fn failing_checks(&self) -> Vec<ComplianceCheck> {
        self.compliance
            .iter()
            .filter(|item| !item.ok)
            .map(|item| item.check)
            .collect()
    }

    /// The check with the smallest margin, i.e. the one that governs.
    /// Failing checks without a margin win over everything else.
    pub fn governing_check(&self) -> Option<ComplianceCheck> {
        if let Some(item) = self
            .compliance
            .iter()
            .find(|item| !item.ok && item.margin_percent.is_none())
        {
            return Some(item.check);
        }
        self.compliance
            .iter()
            .filter_map(|item| item.margin_percent.map(|m| (item.check, m)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(check, _)| check)
    }

    /// Rounded summary row for cable schedules
    pub fn schedule_row(&self) -> ScheduleRow {
        ScheduleRow {
            cable_number: self.cable_number.clone(),
            flc: round_to(self.flc_a, 2),
            derated_current: round_to(self.derated_current_a, 2),
            selected_csa: self.selected_csa_mm2,
            vdrop_percent: round_to(self.vdrop_percent, 3),
            sc_required_area: round_to(self.sc_required_area_mm2, 2),
            sc_ok: self.sc_ok,
            vdrop_ok: self.vdrop_ok,
        }
    }
}

/// Flat, rounded view of a [`SizingResult`] for tabular reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub cable_number: String,
    pub flc: f64,
    pub derated_current: f64,
    pub selected_csa: f64,
    pub vdrop_percent: f64,
    pub sc_required_area: f64,
    pub sc_ok: bool,
    pub vdrop_ok: bool,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Outcome of sizing one record in a batch
pub type BulkOutcome = CalcResult<SizingResult>;

/// Size one cable record.
///
/// # Errors
///
/// Only input errors from [`CableInput::resolve`]. Degenerate arithmetic is
/// reported through the compliance items.
pub fn size_cable(input: &CableInput, settings: &SizingSettings) -> CalcResult<SizingResult> {
    let cable = input.resolve(settings)?;
    size_resolved(&cable, settings)
}

/// Size an already-resolved record.
pub fn size_resolved(cable: &ResolvedCable, settings: &SizingSettings) -> CalcResult<SizingResult> {
    let flc_a = cable.load.full_load_current();
    let derated_current_a = derate(flc_a, &cable.derating_factors);

    let vdrop_percent = cable.drop_method.percent(
        flc_a,
        cable.length_m,
        cable.voltage_v,
        cable.pf,
        cable.three_phase,
    );
    let starting = starting_vdrop(
        flc_a,
        cable.start_method,
        &cable.drop_method,
        cable.length_m,
        cable.voltage_v,
        cable.pf,
        cable.three_phase,
    );

    let selection = select_csa(&cable.csa_options_mm2, derated_current_a)?;
    let sc = short_circuit::check(
        cable.sc_current_a,
        cable.sc_time_s,
        cable.k_const,
        selection.csa_mm2,
    );

    let compliance = compliance::evaluate(
        &ComplianceInput {
            voltage_v: cable.voltage_v,
            voltage_class: cable.voltage_class,
            running_vdrop_percent: vdrop_percent,
            starting_vdrop_percent: starting.vdrop_percent,
            short_circuit: sc,
            selected_csa_mm2: selection.csa_mm2,
            derated_current_a,
            derating_factors: &cable.derating_factors,
            grouping_threshold: cable.grouping_threshold,
            rated_currents: cable.rated_currents,
        },
        &settings.limits,
    );
    let vdrop_ok = compliance
        .iter()
        .find(|item| item.check == ComplianceCheck::RunningVoltageDrop)
        .is_some_and(|item| item.ok);

    debug!(
        cable = %cable.cable_number,
        load = cable.load.kind(),
        flc_a,
        derated_current_a,
        csa_mm2 = selection.csa_mm2,
        vdrop_percent,
        "cable sized"
    );

    Ok(SizingResult {
        cable_number: cable.cable_number.clone(),
        load: cable.load,
        flc_a,
        derated_current_a,
        selected_csa_mm2: selection.csa_mm2,
        csa_fallback: selection.fallback,
        vdrop_percent,
        vdrop_method: cable.drop_method,
        start_method: starting.method,
        starting_current_a: starting.starting_current_a,
        starting_vdrop_percent: starting.vdrop_percent,
        sc_required_area_mm2: sc.required_area_mm2,
        sc_ok: sc.ok,
        vdrop_ok,
        compliance,
    })
}

/// Size many records independently. One bad record yields an `Err` in its
/// own slot and never stops the others.
pub fn bulk_size(inputs: &[CableInput], settings: &SizingSettings) -> Vec<BulkOutcome> {
    inputs
        .iter()
        .map(|input| {
            let outcome = size_cable(input, settings);
            if let Err(err) = &outcome {
                warn!(
                    cable = %input.cable_number,
                    code = err.error_code(),
                    %err,
                    "cable could not be sized"
                );
            }
            outcome
        })
        .collect()
}
