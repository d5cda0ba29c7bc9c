//! # Compliance Evaluator
//!
//! Runs six independent checks against a sized cable and reports every one
//! of them, in a fixed order, whether or not earlier checks failed:
//!
//! | # | Check | Pass when | Margin (%) |
//! |---|-------|-----------|------------|
//! | 1 | Running voltage drop | drop ≤ class limit | (limit − drop) / limit |
//! | 2 | Starting voltage drop | drop ≤ starting limit | (limit − drop) / limit |
//! | 3 | Short-circuit withstand | required area ≤ CSA | (CSA − req) / req, none if req = 0 |
//! | 4 | Derating vs capacity | I_derated ≤ CSA | (CSA − I) / CSA |
//! | 5 | Grouping factor | Π k ≥ threshold | (1 − Π k) |
//! | 6 | Thermal rating | I_derated ≤ rated current | (rated − I) / rated |
//!
//! A margin is positive for spare capacity and negative for a violation. It
//! is `None` when it cannot be computed (zero reference, non-finite value);
//! the item itself is still reported.
//!
//! ## Capacity proxies
//!
//! Checks 4 and 6 compare a current in amperes against the selected CSA in
//! mm² when no catalog rating is available. This keeps results compatible
//! with existing schedules but is only a rough numeric stand-in; a proper
//! ampacity table per conductor and installation method is needed to
//! replace it.

use serde::{Deserialize, Serialize};

use crate::derating::combined_factor;
use crate::settings::VoltageDropLimits;
use crate::short_circuit::ShortCircuitCheck;

/// Kind of compliance check, in reporting order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceCheck {
    RunningVoltageDrop,
    StartingVoltageDrop,
    ShortCircuit,
    Derating,
    Grouping,
    Thermal,
}

impl ComplianceCheck {
    /// All checks in the order they are reported
    pub const ALL: [ComplianceCheck; 6] = [
        ComplianceCheck::RunningVoltageDrop,
        ComplianceCheck::StartingVoltageDrop,
        ComplianceCheck::ShortCircuit,
        ComplianceCheck::Derating,
        ComplianceCheck::Grouping,
        ComplianceCheck::Thermal,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            ComplianceCheck::RunningVoltageDrop => "Running Vdrop",
            ComplianceCheck::StartingVoltageDrop => "Starting Vdrop",
            ComplianceCheck::ShortCircuit => "Short-circuit",
            ComplianceCheck::Derating => "Derating",
            ComplianceCheck::Grouping => "Grouping",
            ComplianceCheck::Thermal => "Thermal",
        }
    }
}

impl std::fmt::Display for ComplianceCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Voltage class used to pick the running voltage-drop limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoltageClass {
    /// Low voltage (≤ LV ceiling, 1000 V by default)
    Lv,
    /// Medium/high voltage (above the LV ceiling)
    Mv,
    /// Control circuit. Never inferred from voltage; only used when a cable
    /// record declares it explicitly.
    Control,
}

impl VoltageClass {
    /// Classify by line voltage. Only ever returns `Lv` or `Mv`.
    pub fn classify(voltage_v: f64, limits: &VoltageDropLimits) -> VoltageClass {
        if voltage_v <= limits.lv_max_voltage_v {
            VoltageClass::Lv
        } else {
            VoltageClass::Mv
        }
    }

    /// Running voltage-drop limit (%) for this class
    pub fn limit_percent(&self, limits: &VoltageDropLimits) -> f64 {
        match self {
            VoltageClass::Lv => limits.lv_percent,
            VoltageClass::Mv => limits.mv_percent,
            VoltageClass::Control => limits.control_percent,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VoltageClass::Lv => "LV",
            VoltageClass::Mv => "MV",
            VoltageClass::Control => "control",
        }
    }
}

/// Catalog current ratings for the installed cable, any of which may be absent
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RatedCurrents {
    pub air_a: Option<f64>,
    pub trench_a: Option<f64>,
    pub duct_a: Option<f64>,
}

impl RatedCurrents {
    /// First positive rating in the order air, trench, duct
    pub fn first_available(&self) -> Option<(f64, &'static str)> {
        [
            (self.air_a, "in air"),
            (self.trench_a, "in trench"),
            (self.duct_a, "in duct"),
        ]
        .into_iter()
        .find_map(|(rating, label)| rating.filter(|r| *r > 0.0).map(|r| (r, label)))
    }
}

/// One check outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceItem {
    /// Which check this is
    #[serde(rename = "type")]
    pub check: ComplianceCheck,
    /// Pass/fail
    pub ok: bool,
    /// Limit or capacity the value was compared against
    pub limit: f64,
    /// Observed value
    pub value: f64,
    /// Signed margin (%): positive = spare, negative = violation
    pub margin_percent: Option<f64>,
    /// Human-readable summary
    pub message: String,
}

/// Everything the evaluator needs about one sized cable
#[derive(Debug, Clone, PartialEq)]
pub struct ComplianceInput<'a> {
    pub voltage_v: f64,
    /// Explicit class; `None` classifies by voltage
    pub voltage_class: Option<VoltageClass>,
    pub running_vdrop_percent: f64,
    pub starting_vdrop_percent: f64,
    pub short_circuit: ShortCircuitCheck,
    pub selected_csa_mm2: f64,
    pub derated_current_a: f64,
    pub derating_factors: &'a [f64],
    pub grouping_threshold: f64,
    pub rated_currents: RatedCurrents,
}

/// `(reference − value) / reference × 100`, or `None` when undefined
fn headroom_percent(reference: f64, value: f64) -> Option<f64> {
    if reference == 0.0 {
        return None;
    }
    let margin = (reference - value) / reference * 100.0;
    margin.is_finite().then_some(margin)
}

/// Run all six checks. Always returns six items in [`ComplianceCheck::ALL`] order.
pub fn evaluate(input: &ComplianceInput<'_>, limits: &VoltageDropLimits) -> Vec<ComplianceItem> {
    vec![
        running_voltage_drop(input, limits),
        starting_voltage_drop(input, limits),
        short_circuit(input),
        derating(input),
        grouping(input),
        thermal(input),
    ]
}

/// True when every item passed
pub fn all_ok(items: &[ComplianceItem]) -> bool {
    items.iter().all(|item| item.ok)
}

fn running_voltage_drop(input: &ComplianceInput<'_>, limits: &VoltageDropLimits) -> ComplianceItem {
    let class = input
        .voltage_class
        .unwrap_or_else(|| VoltageClass::classify(input.voltage_v, limits));
    let limit = class.limit_percent(limits);
    let value = input.running_vdrop_percent;
    let ok = value <= limit;
    ComplianceItem {
        check: ComplianceCheck::RunningVoltageDrop,
        ok,
        limit,
        value,
        margin_percent: headroom_percent(limit, value),
        message: format!(
            "Running drop {:.2}% {} {} limit {:.1}%",
            value,
            if ok { "within" } else { "exceeds" },
            class.label(),
            limit
        ),
    }
}

fn starting_voltage_drop(
    input: &ComplianceInput<'_>,
    limits: &VoltageDropLimits,
) -> ComplianceItem {
    let limit = limits.starting_percent;
    let value = input.starting_vdrop_percent;
    let ok = value <= limit;
    ComplianceItem {
        check: ComplianceCheck::StartingVoltageDrop,
        ok,
        limit,
        value,
        margin_percent: headroom_percent(limit, value),
        message: format!(
            "Starting drop {:.2}% {} limit {:.1}%",
            value,
            if ok { "within" } else { "exceeds" },
            limit
        ),
    }
}

fn short_circuit(input: &ComplianceInput<'_>) -> ComplianceItem {
    let sc = input.short_circuit;
    let csa = input.selected_csa_mm2;

    if !sc.validated {
        return ComplianceItem {
            check: ComplianceCheck::ShortCircuit,
            ok: false,
            limit: csa,
            value: sc.required_area_mm2,
            margin_percent: None,
            message: "Short-circuit withstand could not be validated \
                      (check fault current, duration and k)"
                .to_string(),
        };
    }

    let margin_percent = if sc.required_area_mm2 > 0.0 {
        Some((csa - sc.required_area_mm2) / sc.required_area_mm2 * 100.0)
    } else {
        None
    };
    ComplianceItem {
        check: ComplianceCheck::ShortCircuit,
        ok: sc.ok,
        limit: csa,
        value: sc.required_area_mm2,
        margin_percent,
        message: format!(
            "Required {:.2} mm² vs selected {} mm²",
            sc.required_area_mm2, csa
        ),
    }
}

fn derating(input: &ComplianceInput<'_>) -> ComplianceItem {
    let csa = input.selected_csa_mm2;
    let value = input.derated_current_a;
    let ok = value <= csa;
    ComplianceItem {
        check: ComplianceCheck::Derating,
        ok,
        limit: csa,
        value,
        margin_percent: headroom_percent(csa, value),
        message: if value.is_finite() {
            format!(
                "Derated current {:.2} A vs selected size {} (CSA used as capacity proxy)",
                value, csa
            )
        } else {
            "Derated current is unbounded (zero derating factor)".to_string()
        },
    }
}

fn grouping(input: &ComplianceInput<'_>) -> ComplianceItem {
    let factor = combined_factor(input.derating_factors);
    let threshold = input.grouping_threshold;
    let ok = factor >= threshold;
    let margin = (1.0 - factor) * 100.0;
    ComplianceItem {
        check: ComplianceCheck::Grouping,
        ok,
        limit: threshold,
        value: factor,
        margin_percent: margin.is_finite().then_some(margin),
        message: format!(
            "Grouping factor {:.3} {} threshold {:.2}",
            factor,
            if ok { "meets" } else { "below" },
            threshold
        ),
    }
}

fn thermal(input: &ComplianceInput<'_>) -> ComplianceItem {
    let value = input.derated_current_a;
    let (rated, source) = input
        .rated_currents
        .first_available()
        .unwrap_or((input.selected_csa_mm2, "CSA proxy"));
    let ok = value <= rated;
    ComplianceItem {
        check: ComplianceCheck::Thermal,
        ok,
        limit: rated,
        value,
        margin_percent: headroom_percent(rated, value),
        message: format!(
            "Derated current {:.2} A vs rating {:.1} A ({})",
            value, rated, source
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::short_circuit::check;

    fn passing_input(factors: &[f64]) -> ComplianceInput<'_> {
        ComplianceInput {
            voltage_v: 415.0,
            voltage_class: None,
            running_vdrop_percent: 2.0,
            starting_vdrop_percent: 9.0,
            short_circuit: check(5000.0, 1.0, 115.0, 70.0),
            selected_csa_mm2: 70.0,
            derated_current_a: 56.0,
            derating_factors: factors,
            grouping_threshold: 0.85,
            rated_currents: RatedCurrents {
                air_a: Some(200.0),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_six_items_in_order() {
        let factors = [0.9];
        let items = evaluate(&passing_input(&factors), &VoltageDropLimits::default());
        let kinds: Vec<_> = items.iter().map(|i| i.check).collect();
        assert_eq!(kinds, ComplianceCheck::ALL.to_vec());
        assert!(all_ok(&items));
    }

    #[test]
    fn test_running_margin() {
        let factors = [1.0];
        let items = evaluate(&passing_input(&factors), &VoltageDropLimits::default());
        let running = &items[0];
        assert_eq!(running.limit, 5.0);
        // (5 - 2) / 5 = 60 %
        assert!((running.margin_percent.unwrap() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_mv_limit_above_1000v() {
        let factors = [1.0];
        let mut input = passing_input(&factors);
        input.voltage_v = 11_000.0;
        input.running_vdrop_percent = 7.0;
        let items = evaluate(&input, &VoltageDropLimits::default());
        assert_eq!(items[0].limit, 10.0);
        assert!(items[0].ok);
    }

    #[test]
    fn test_control_class_only_when_declared() {
        let limits = VoltageDropLimits::default();
        assert_eq!(VoltageClass::classify(24.0, &limits), VoltageClass::Lv);

        let factors = [1.0];
        let mut input = passing_input(&factors);
        input.voltage_class = Some(VoltageClass::Control);
        input.running_vdrop_percent = 12.0;
        let items = evaluate(&input, &limits);
        assert_eq!(items[0].limit, 15.0);
        assert!(items[0].ok);
    }

    #[test]
    fn test_short_circuit_margin() {
        let factors = [1.0];
        let mut input = passing_input(&factors);
        input.selected_csa_mm2 = 50.0;
        input.short_circuit = check(10_000.0, 1.0, 115.0, 50.0);
        let item = &evaluate(&input, &VoltageDropLimits::default())[2];
        assert!(!item.ok);
        assert!(item.margin_percent.unwrap() < 0.0);
    }

    #[test]
    fn test_short_circuit_unvalidated_has_no_margin() {
        let factors = [1.0];
        let mut input = passing_input(&factors);
        input.short_circuit = check(10_000.0, 1.0, 0.0, 70.0);
        let item = &evaluate(&input, &VoltageDropLimits::default())[2];
        assert!(!item.ok);
        assert!(item.margin_percent.is_none());
        assert!(item.message.contains("could not be validated"));
    }

    #[test]
    fn test_zero_fault_current_has_no_margin() {
        let factors = [1.0];
        let mut input = passing_input(&factors);
        input.short_circuit = check(0.0, 1.0, 115.0, 70.0);
        let item = &evaluate(&input, &VoltageDropLimits::default())[2];
        assert!(item.ok);
        assert!(item.margin_percent.is_none());
    }

    #[test]
    fn test_grouping_below_threshold() {
        let factors = [0.9, 0.8];
        let items = evaluate(&passing_input(&factors), &VoltageDropLimits::default());
        let grouping = &items[4];
        assert!(!grouping.ok);
        assert!((grouping.value - 0.72).abs() < 1e-12);
        assert!((grouping.margin_percent.unwrap() - 28.0).abs() < 1e-9);
    }

    #[test]
    fn test_thermal_uses_first_rating() {
        let factors = [1.0];
        let mut input = passing_input(&factors);
        input.rated_currents = RatedCurrents {
            air_a: None,
            trench_a: Some(0.0),
            duct_a: Some(50.0),
        };
        let item = &evaluate(&input, &VoltageDropLimits::default())[5];
        assert_eq!(item.limit, 50.0);
        assert!(!item.ok);
        assert!(item.message.contains("in duct"));
    }

    #[test]
    fn test_thermal_falls_back_to_csa() {
        let factors = [1.0];
        let mut input = passing_input(&factors);
        input.rated_currents = RatedCurrents::default();
        let item = &evaluate(&input, &VoltageDropLimits::default())[5];
        assert_eq!(item.limit, 70.0);
        assert!(item.message.contains("CSA proxy"));
    }

    #[test]
    fn test_infinite_current_keeps_all_items() {
        let factors = [0.0];
        let mut input = passing_input(&factors);
        input.derated_current_a = f64::INFINITY;
        let items = evaluate(&input, &VoltageDropLimits::default());
        assert_eq!(items.len(), 6);
        assert!(!items[3].ok);
        assert!(items[3].margin_percent.is_none());
        assert!(!items[5].ok);
        assert!(!all_ok(&items));
    }

    #[test]
    fn test_item_serialization() {
        let factors = [1.0];
        let items = evaluate(&passing_input(&factors), &VoltageDropLimits::default());
        let json = serde_json::to_string(&items[4]).unwrap();
        assert!(json.contains("\"type\":\"grouping\""));
        let roundtrip: ComplianceItem = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, items[4]);
    }
}
