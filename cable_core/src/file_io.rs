//! # File I/O Module
//!
//! Schedule file operations:
//! - **Atomic saves**: write to `.tmp`, sync, rename over the target
//! - **Version validation**: refuse files from an incompatible schema
//!
//! Schedules are saved as `.cbs` files containing pretty-printed JSON.
//!
//! ## Example
//!
//! ```rust,no_run
//! use cable_core::file_io::{load_schedule, save_schedule};
//! use cable_core::schedule::CableSchedule;
//! use std::path::Path;
//!
//! let schedule = CableSchedule::new("Engineer", "25-001", "Client");
//! save_schedule(&schedule, Path::new("plant.cbs"))?;
//! let loaded = load_schedule(Path::new("plant.cbs"))?;
//! # Ok::<(), cable_core::errors::CalcError>(())
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::errors::{CalcError, CalcResult};
use crate::schedule::{CableSchedule, SCHEMA_VERSION};

/// Save a schedule with atomic write semantics.
///
/// 1. Serialize to JSON
/// 2. Write to `<path>.tmp`
/// 3. fsync
/// 4. Rename over `path`
pub fn save_schedule(schedule: &CableSchedule, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(schedule)?;

    let tmp_path = path.with_extension(tmp_extension(path));

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    debug!(path = %path.display(), cables = schedule.cable_count(), "schedule saved");
    Ok(())
}

fn tmp_extension(path: &Path) -> String {
    path.extension()
        .map(|e| format!("{}.tmp", e.to_string_lossy()))
        .unwrap_or_else(|| "tmp".to_string())
}

/// Load a schedule from a file.
///
/// # Errors
///
/// * `FileError` - I/O error
/// * `SerializationError` - invalid JSON
/// * `VersionMismatch` - file written by an incompatible schema
pub fn load_schedule(path: &Path) -> CalcResult<CableSchedule> {
    let contents = fs::read_to_string(path)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;

    let schedule: CableSchedule =
        serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path.display(), e),
        })?;

    validate_version(&schedule.meta.version)?;

    debug!(path = %path.display(), cables = schedule.cable_count(), "schedule loaded");
    Ok(schedule)
}

/// Check a file's schema version against [`SCHEMA_VERSION`].
///
/// Major versions must match. While the schema is 0.x, a file with a newer
/// minor version is rejected too.
pub fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let parse = |v: &str| -> Option<Vec<u32>> { v.split('.').map(|p| p.parse().ok()).collect() };
    let file_parts = parse(file_version).ok_or_else(mismatch)?;
    let current_parts = parse(SCHEMA_VERSION).ok_or_else(mismatch)?;

    match (file_parts.as_slice(), current_parts.as_slice()) {
        ([file_major, ..], [current_major, ..]) if file_major != current_major => Err(mismatch()),
        ([0, file_minor, ..], [0, current_minor, ..]) if file_minor > current_minor => {
            Err(mismatch())
        }
        ([_, ..], [_, ..]) => Ok(()),
        _ => Err(mismatch()),
    }
}
