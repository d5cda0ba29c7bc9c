//! # Cable Schedule
//!
//! The `CableSchedule` is the root container for a job's cable list.
//! Schedules serialize to `.cbs` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! CableSchedule
//! ├── meta: ScheduleMetadata (version, engineer, job info, timestamps)
//! ├── settings: SizingSettings (defaults, limits, CSA candidates)
//! └── cables: HashMap<Uuid, CableInput>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use cable_core::schedule::CableSchedule;
//! use cable_core::sizing::CableInput;
//!
//! let mut schedule = CableSchedule::new("Jane Engineer", "25-042", "ACME Corp");
//! schedule.add_cable(CableInput::new("CBL-001", 40.0).with_current(63.0));
//!
//! for (_id, outcome) in schedule.size_all() {
//!     let result = outcome.unwrap();
//!     println!("{} → {} mm²", result.cable_number, result.selected_csa_mm2);
//! }
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::settings::SizingSettings;
use crate::sizing::{size_cable, BulkOutcome, CableInput};

/// Current schema version for .cbs files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root schedule container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CableSchedule {
    /// Schedule metadata (version, engineer, job info)
    pub meta: ScheduleMetadata,

    /// Defaults and limits shared by every cable
    #[serde(default)]
    pub settings: SizingSettings,

    /// All cable records, keyed by UUID
    #[serde(default)]
    pub cables: HashMap<Uuid, CableInput>,
}

impl CableSchedule {
    /// Create a new empty schedule.
    ///
    /// # Arguments
    ///
    /// * `engineer` - Name of the responsible engineer
    /// * `job_id` - Job/project number (e.g., "25-001")
    /// * `client` - Client name
    pub fn new(
        engineer: impl Into<String>,
        job_id: impl Into<String>,
        client: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        CableSchedule {
            meta: ScheduleMetadata {
                version: SCHEMA_VERSION.to_string(),
                engineer: engineer.into(),
                job_id: job_id.into(),
                client: client.into(),
                created: now,
                modified: now,
            },
            settings: SizingSettings::default(),
            cables: HashMap::new(),
        }
    }

    /// Build a schedule around a bare list of cable records.
    pub fn from_cables(cables: impl IntoIterator<Item = CableInput>) -> Self {
        let mut schedule = CableSchedule::default();
        for cable in cables {
            schedule.cables.insert(Uuid::new_v4(), cable);
        }
        schedule
    }

    /// Add a cable record. Returns the UUID assigned to it.
    pub fn add_cable(&mut self, cable: CableInput) -> Uuid {
        let id = Uuid::new_v4();
        self.cables.insert(id, cable);
        self.touch();
        id
    }

    /// Remove a cable record by UUID.
    pub fn remove_cable(&mut self, id: &Uuid) -> Option<CableInput> {
        let cable = self.cables.remove(id);
        if cable.is_some() {
            self.touch();
        }
        cable
    }

    pub fn get_cable(&self, id: &Uuid) -> Option<&CableInput> {
        self.cables.get(id)
    }

    /// Find a cable by its tag
    pub fn find_by_number(&self, cable_number: &str) -> Option<(Uuid, &CableInput)> {
        self.cables
            .iter()
            .find(|(_, cable)| cable.cable_number == cable_number)
            .map(|(id, cable)| (*id, cable))
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn cable_count(&self) -> usize {
        self.cables.len()
    }

    /// Cable IDs ordered by cable number, then UUID
    pub fn ordered_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<(&str, Uuid)> = self
            .cables
            .iter()
            .map(|(id, cable)| (cable.cable_number.as_str(), *id))
            .collect();
        ids.sort();
        ids.into_iter().map(|(_, id)| id).collect()
    }

    /// Size every cable against the schedule settings.
    ///
    /// Results come back ordered by cable number. A record that fails to
    /// resolve gets its own `Err` and the rest are still sized.
    pub fn size_all(&self) -> Vec<(Uuid, BulkOutcome)> {
        let outcomes: Vec<(Uuid, BulkOutcome)> = self
            .ordered_ids()
            .into_iter()
            .filter_map(|id| {
                self.cables
                    .get(&id)
                    .map(|cable| (id, size_cable(cable, &self.settings)))
            })
            .collect();

        let failed = outcomes.iter().filter(|(_, o)| o.is_err()).count();
        info!(
            job_id = %self.meta.job_id,
            cables = outcomes.len(),
            failed,
            "schedule sized"
        );
        outcomes
    }
}

impl Default for CableSchedule {
    fn default() -> Self {
        CableSchedule::new("", "", "")
    }
}

/// Schedule metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Name of the responsible engineer
    pub engineer: String,

    /// Job/project number
    pub job_id: String,

    /// Client name
    pub client: String,

    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}
