//! End-to-end sizing: schedule → bulk sizing → catalog matching → re-size.

use cable_core::catalog::{match_rows, Catalog, CatalogEntry};
use cable_core::compliance::ComplianceCheck;
use cable_core::schedule::CableSchedule;
use cable_core::settings::SizingSettings;
use cable_core::sizing::{bulk_size, size_cable, CableInput};
use cable_core::CalcError;

fn pump_feeder() -> CableInput {
    CableInput {
        from_equipment: Some("MCC-1".to_string()),
        to_equipment: Some("P-101A".to_string()),
        ..CableInput::new("CBL-101", 85.0)
            .with_load_kw(37.0, 0.85, 0.94)
            .with_derating(vec![0.94, 0.8])
            .with_fault(8000.0, 0.5, 115.0)
            .with_start_method("DOL")
    }
}

fn lighting_feeder() -> CableInput {
    CableInput::new("CBL-102", 40.0)
        .with_load_kva(25.0)
        .with_derating(vec![0.96])
}

fn vendor_catalog() -> Catalog {
    let json = r#"[
        { "csa_mm2": 35,  "conductor": "Cu", "cores": 4, "armour": "SWA",
          "rated_current_air": 126, "r_ohm_per_km": 0.524, "x_ohm_per_km": 0.086,
          "part_no": "CU4-35" },
        { "csa_mm2": 70,  "conductor": "Cu", "cores": 4, "armour": "SWA",
          "rated_current_air": 192, "r_ohm_per_km": 0.268, "x_ohm_per_km": 0.082,
          "part_no": "CU4-70" },
        { "csa_mm2": 95,  "conductor": "Cu", "cores": 4, "armour": "SWA",
          "rated_current_air": 232, "r_ohm_per_km": 0.193, "x_ohm_per_km": 0.080,
          "part_no": "CU4-95" },
        { "csa_mm2": 120, "conductor": "Al", "cores": 4, "armour": "",
          "rated_current_air": 208, "r_ohm_per_km": 0.325, "x_ohm_per_km": 0.080,
          "part_no": "AL4-120" }
    ]"#;
    serde_json::from_str(json).unwrap()
}

#[test]
fn test_full_pipeline_reports_six_checks_in_order() {
    let result = size_cable(&pump_feeder(), &SizingSettings::default()).unwrap();

    let order: Vec<ComplianceCheck> = result.compliance.iter().map(|i| i.check).collect();
    assert_eq!(order, ComplianceCheck::ALL.to_vec());

    // 37 kW / (√3 × 415 × 0.85 × 0.94) ≈ 64.4 A; ÷ 0.752 ≈ 85.7 A → 95 mm²
    assert!((result.flc_a - 64.42).abs() < 0.05);
    assert_eq!(result.selected_csa_mm2, 95.0);
    assert!(!result.csa_fallback);

    // 8000 × √0.5 / 115 ≈ 49.2 mm²
    assert!((result.sc_required_area_mm2 - 49.19).abs() < 0.05);
    assert!(result.sc_ok);

    // Grouping 0.752 < 0.85
    assert!(!result.compliance[4].ok);
    assert!(!result.passes());
}

#[test]
fn test_bulk_sizing_survives_bad_records() {
    let mut no_load = CableInput::new("CBL-BAD-1", 10.0);
    no_load.load_kw = Some(0.0);
    let empty_csa = lighting_feeder().with_csa_options(vec![]);

    let inputs = vec![pump_feeder(), no_load, empty_csa, lighting_feeder()];
    let outcomes = bulk_size(&inputs, &SizingSettings::default());

    assert_eq!(outcomes.len(), 4);
    assert!(outcomes[0].is_ok());
    assert_eq!(
        outcomes[1].as_ref().unwrap_err(),
        &CalcError::missing_field("load")
    );
    assert!(outcomes[2].as_ref().unwrap_err().is_input_error());
    assert!(outcomes[3].is_ok());
}

#[test]
fn test_degenerate_record_still_yields_six_items() {
    let input = CableInput::new("CBL-DEGEN", 30.0)
        .with_current(50.0)
        .with_derating(vec![0.0])
        .with_fault(5000.0, 1.0, 0.0);

    let result = size_cable(&input, &SizingSettings::default()).unwrap();
    assert_eq!(result.compliance.len(), 6);
    assert!(result.derated_current_a.is_infinite());
    assert!(!result.sc_ok);
    assert!(result.compliance[2].margin_percent.is_none());

    // JSON output stays valid with an infinite derated current
    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("\"derated_current_a\":null"));
}

#[test]
fn test_catalog_match_and_apply() {
    let settings = SizingSettings::default();
    let inputs = vec![pump_feeder(), lighting_feeder()];
    let results: Vec<_> = bulk_size(&inputs, &settings)
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    let catalog = vendor_catalog();
    let rows = results
        .iter()
        .map(|r| (r.cable_number.as_str(), r.derated_current_a));
    let matches = match_rows(&catalog, rows, Some("cu"), 3);

    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].cable_number, "CBL-101");
    // 85.7 A → smallest copper ≥ 85.7 is 95
    let best = matches[0].best().unwrap();
    assert_eq!(best.part_no, "CU4-95");
    assert!(matches[0].suggestions.iter().all(|s| s.entry.conductor == "Cu"));

    let mut resized = pump_feeder();
    resized.apply_catalog_entry(best);
    let result = size_cable(&resized, &settings).unwrap();
    assert_eq!(result.vdrop_method.name(), "R/X");
    let thermal = &result.compliance[5];
    assert_eq!(thermal.check, ComplianceCheck::Thermal);
    assert_eq!(thermal.limit, 232.0);
    assert!(thermal.ok);
}

#[test]
fn test_catalog_nearest_fallback() {
    let small = Catalog::new(vec![
        CatalogEntry::new(16.0, "Cu"),
        CatalogEntry::new(25.0, "Cu"),
        CatalogEntry::new(35.0, "Cu"),
    ]);
    let suggestions = small.suggest(50.0, None, 3);
    let sizes: Vec<f64> = suggestions.iter().map(|s| s.entry.csa_mm2).collect();
    assert_eq!(sizes, vec![35.0, 25.0, 16.0]);
    assert_eq!(suggestions[0].score, 15.0);
}

#[test]
fn test_sizing_is_idempotent() {
    let settings = SizingSettings::default();
    for input in [pump_feeder(), lighting_feeder()] {
        let first = size_cable(&input, &settings).unwrap();
        let second = size_cable(&input, &settings).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}

#[test]
fn test_schedule_json_roundtrip_and_size() {
    let mut schedule = CableSchedule::new("Jane Engineer", "25-042", "ACME Corp");
    schedule.add_cable(lighting_feeder());
    schedule.add_cable(pump_feeder());

    let json = serde_json::to_string_pretty(&schedule).unwrap();
    let loaded: CableSchedule = serde_json::from_str(&json).unwrap();

    let outcomes = loaded.size_all();
    let numbers: Vec<String> = outcomes
        .iter()
        .map(|(_, o)| o.as_ref().unwrap().cable_number.clone())
        .collect();
    assert_eq!(numbers, vec!["CBL-101", "CBL-102"]);
}
