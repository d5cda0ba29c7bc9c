//! # Vendor Catalog Matching
//!
//! Vendor catalogs arrive already normalized to the canonical field set
//! (`csa_mm2`, `conductor`, `cores`, `armour`, `rated_current_air`,
//! `r_ohm_per_km`, `x_ohm_per_km`, `od_mm`, `weight_kg_per_km`, `vendor`,
//! `part_no`). Column mapping of raw uploads happens before this module.
//!
//! Matching ranks entries against a required rating:
//!
//! 1. keep entries with `csa_mm2 >= required` whose conductor contains the
//!    filter text (case-insensitive), smallest CSA first;
//! 2. if none qualify, fall back to the entries nearest to the requirement
//!    on either side, `|csa − required|` ascending.
//!
//! A filter that matches no entry is ignored. A non-empty catalog always
//! yields at least one suggestion when `top_n > 0`. Ties keep catalog order.
//!
//! ## Example
//!
//! ```rust
//! use cable_core::catalog::{Catalog, CatalogEntry};
//!
//! let catalog = Catalog::new(vec![
//!     CatalogEntry::new(35.0, "Cu"),
//!     CatalogEntry::new(50.0, "Cu"),
//!     CatalogEntry::new(70.0, "Al"),
//! ]);
//!
//! let best = catalog.match_entries(40.0, None, 1);
//! assert_eq!(best[0].csa_mm2, 50.0);
//! ```

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::compliance::RatedCurrents;

/// One normalized vendor catalog line
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogEntry {
    /// Conductor cross-sectional area (mm²)
    pub csa_mm2: f64,
    /// Conductor material as written by the vendor ("Cu", "Copper", "AL", ...)
    pub conductor: String,
    /// Number of cores
    pub cores: u32,
    /// Armour description, empty for unarmoured
    pub armour: String,
    /// Rated current laid in air (A)
    #[serde(rename = "rated_current_air")]
    pub rated_current_air_a: Option<f64>,
    /// Rated current in trench (A)
    #[serde(rename = "rated_current_trench")]
    pub rated_current_trench_a: Option<f64>,
    /// Rated current in duct (A)
    #[serde(rename = "rated_current_duct")]
    pub rated_current_duct_a: Option<f64>,
    /// AC resistance (Ω/km)
    pub r_ohm_per_km: f64,
    /// Reactance (Ω/km)
    pub x_ohm_per_km: f64,
    /// Overall diameter (mm)
    pub od_mm: f64,
    /// Weight (kg/km)
    pub weight_kg_per_km: f64,
    pub vendor: String,
    pub part_no: String,
}

impl CatalogEntry {
    /// Minimal entry with only size and conductor set
    pub fn new(csa_mm2: f64, conductor: impl Into<String>) -> Self {
        CatalogEntry {
            csa_mm2,
            conductor: conductor.into(),
            ..Default::default()
        }
    }

    pub fn is_armoured(&self) -> bool {
        !self.armour.trim().is_empty()
    }

    /// Case-insensitive substring match on the conductor material
    pub fn conductor_matches(&self, filter: &str) -> bool {
        self.conductor
            .to_lowercase()
            .contains(&filter.trim().to_lowercase())
    }

    pub fn rated_currents(&self) -> RatedCurrents {
        RatedCurrents {
            air_a: self.rated_current_air_a,
            trench_a: self.rated_current_trench_a,
            duct_a: self.rated_current_duct_a,
        }
    }

    /// One-line description, e.g. `95 mm² CU 4C SWA (Acme ACM-95-4)`
    pub fn describe(&self) -> String {
        format!(
            "{} mm² {} {}C {} ({} {})",
            self.csa_mm2,
            self.conductor.to_uppercase(),
            self.cores,
            if self.is_armoured() { self.armour.as_str() } else { "unarmoured" },
            self.vendor,
            self.part_no
        )
    }
}

/// Read-only snapshot of a normalized catalog
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Catalog { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rank entries against `required` (see module docs).
    ///
    /// When a conductor filter excludes every entry, matching runs over the
    /// whole catalog as if no filter had been given.
    pub fn match_entries(
        &self,
        required: f64,
        conductor_filter: Option<&str>,
        top_n: usize,
    ) -> Vec<&CatalogEntry> {
        if top_n == 0 || self.entries.is_empty() {
            return Vec::new();
        }

        let filter = conductor_filter.filter(|f| !f.trim().is_empty());
        let filtered: Vec<&CatalogEntry> = self
            .entries
            .iter()
            .filter(|e| filter.map_or(true, |f| e.conductor_matches(f)))
            .collect();
        let pool = if filtered.is_empty() {
            warn!(?filter, "conductor filter matches no catalog entry; ignoring it");
            self.entries.iter().collect()
        } else {
            filtered
        };

        let mut qualifying: Vec<&CatalogEntry> =
            pool.iter().copied().filter(|e| e.csa_mm2 >= required).collect();
        if !qualifying.is_empty() {
            qualifying.sort_by(|a, b| a.csa_mm2.total_cmp(&b.csa_mm2));
            qualifying.truncate(top_n);
            return qualifying;
        }

        let mut nearest = pool;
        warn!(
            required,
            candidates = nearest.len(),
            "no catalog entry meets requirement; using nearest sizes"
        );
        if required.is_infinite() {
            nearest.sort_by(|a, b| b.csa_mm2.total_cmp(&a.csa_mm2));
        } else {
            nearest.sort_by(|a, b| {
                (a.csa_mm2 - required)
                    .abs()
                    .total_cmp(&(b.csa_mm2 - required).abs())
            });
        }
        nearest.truncate(top_n);
        nearest
    }

    /// Same ranking as [`Catalog::match_entries`], with a closeness score per entry.
    pub fn suggest(
        &self,
        required: f64,
        conductor_filter: Option<&str>,
        top_n: usize,
    ) -> Vec<MatchSuggestion> {
        self.match_entries(required, conductor_filter, top_n)
            .into_iter()
            .map(|entry| MatchSuggestion {
                score: (entry.csa_mm2 - required).abs(),
                entry: entry.clone(),
            })
            .collect()
    }
}

impl From<Vec<CatalogEntry>> for Catalog {
    fn from(entries: Vec<CatalogEntry>) -> Self {
        Catalog::new(entries)
    }
}

/// A ranked catalog suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSuggestion {
    /// `|csa − required|`; lower is closer, 0 is an exact size
    pub score: f64,
    pub entry: CatalogEntry,
}

/// Suggestions for one sized cable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowMatch {
    pub row_index: usize,
    pub cable_number: String,
    pub suggestions: Vec<MatchSuggestion>,
}

impl RowMatch {
    pub fn best(&self) -> Option<&CatalogEntry> {
        self.suggestions.first().map(|s| &s.entry)
    }
}

/// Match every `(cable_number, required)` row against the catalog.
pub fn match_rows<'a, I>(
    catalog: &Catalog,
    rows: I,
    conductor_filter: Option<&str>,
    top_n: usize,
) -> Vec<RowMatch>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    rows.into_iter()
        .enumerate()
        .map(|(row_index, (cable_number, required))| RowMatch {
            row_index,
            cable_number: cable_number.to_string(),
            suggestions: catalog.suggest(required, conductor_filter, top_n),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(csa: f64, conductor: &str, part: &str) -> CatalogEntry {
        CatalogEntry {
            part_no: part.to_string(),
            ..CatalogEntry::new(csa, conductor)
        }
    }

    fn sample() -> Catalog {
        Catalog::new(vec![
            entry(95.0, "Copper", "CU-95"),
            entry(25.0, "Copper", "CU-25"),
            entry(50.0, "Aluminium", "AL-50"),
            entry(35.0, "Copper", "CU-35"),
            entry(50.0, "Copper", "CU-50"),
        ])
    }

    #[test]
    fn test_smallest_qualifying_first() {
        let catalog = sample();
        let hits = catalog.match_entries(40.0, None, 3);
        let parts: Vec<_> = hits.iter().map(|e| e.part_no.as_str()).collect();
        // both 50s qualify; stable sort keeps catalog order between them
        assert_eq!(parts, vec!["AL-50", "CU-50", "CU-95"]);
    }

    #[test]
    fn test_conductor_filter_case_insensitive() {
        let catalog = sample();
        let hits = catalog.match_entries(40.0, Some("cop"), 2);
        let parts: Vec<_> = hits.iter().map(|e| e.part_no.as_str()).collect();
        assert_eq!(parts, vec!["CU-50", "CU-95"]);
    }

    #[test]
    fn test_nearest_fallback_when_undersized() {
        let catalog = Catalog::new(vec![
            entry(16.0, "Cu", "A"),
            entry(35.0, "Cu", "B"),
            entry(25.0, "Cu", "C"),
        ]);
        let hits = catalog.match_entries(50.0, None, 2);
        let sizes: Vec<_> = hits.iter().map(|e| e.csa_mm2).collect();
        assert_eq!(sizes, vec![35.0, 25.0]);
    }

    #[test]
    fn test_fallback_never_empty() {
        let catalog = Catalog::new(vec![entry(10.0, "Cu", "X")]);
        assert_eq!(catalog.match_entries(500.0, None, 3).len(), 1);
        assert_eq!(catalog.match_entries(f64::INFINITY, None, 3).len(), 1);
        assert_eq!(catalog.match_entries(500.0, Some("al"), 3).len(), 1);
    }

    #[test]
    fn test_unmatched_filter_still_prefers_qualifying_size() {
        let catalog = Catalog::new(vec![entry(45.0, "Cu", "CU-45"), entry(100.0, "Cu", "CU-100")]);
        let hits = catalog.match_entries(50.0, Some("al"), 2);
        let parts: Vec<_> = hits.iter().map(|e| e.part_no.as_str()).collect();
        assert_eq!(parts, vec!["CU-100"]);
    }

    #[test]
    fn test_infinite_requirement_prefers_largest() {
        let catalog = sample();
        let hits = catalog.match_entries(f64::INFINITY, None, 1);
        assert_eq!(hits[0].csa_mm2, 95.0);
    }

    #[test]
    fn test_top_n_zero_and_empty_catalog() {
        assert!(sample().match_entries(10.0, None, 0).is_empty());
        assert!(Catalog::default().match_entries(10.0, None, 3).is_empty());
    }

    #[test]
    fn test_suggestion_scores() {
        let suggestions = sample().suggest(40.0, Some("copper"), 2);
        assert_eq!(suggestions[0].score, 10.0);
        assert_eq!(suggestions[1].score, 55.0);
    }

    #[test]
    fn test_match_rows() {
        let catalog = sample();
        let rows = vec![("CBL-1", 30.0), ("CBL-2", 200.0)];
        let matches = match_rows(&catalog, rows, Some("copper"), 1);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].best().unwrap().part_no, "CU-35");
        assert_eq!(matches[1].row_index, 1);
        assert_eq!(matches[1].best().unwrap().part_no, "CU-95");
    }

    #[test]
    fn test_canonical_field_names() {
        let json = r#"[{
            "csa_mm2": 95, "conductor": "Cu", "cores": 4, "armour": "SWA",
            "rated_current_air": 245, "r_ohm_per_km": 0.247, "x_ohm_per_km": 0.072,
            "od_mm": 38.5, "weight_kg_per_km": 4200, "vendor": "Acme", "part_no": "ACM-95-4"
        }]"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        let e = &catalog.entries()[0];
        assert_eq!(e.rated_current_air_a, Some(245.0));
        assert!(e.rated_current_trench_a.is_none());
        assert!(e.is_armoured());
        assert_eq!(e.rated_currents().first_available(), Some((245.0, "in air")));
        assert_eq!(e.describe(), "95 mm² CU 4C SWA (Acme ACM-95-4)");
    }
}
