//! # cable_core - Cable Sizing and Compliance Engine
//!
//! `cable_core` sizes power cables for industrial and building electrical
//! systems. Given a load, a route and installation conditions, it works out
//! the full-load current, applies derating, checks running and motor
//! starting voltage drop, picks the smallest adequate conductor size,
//! verifies short-circuit withstand and reports six compliance checks. A
//! catalog matcher then suggests real vendor cables for each sized row.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: pure functions that take input and return results
//! - **JSON-First**: all records implement Serialize/Deserialize
//! - **Fail closed**: degenerate arithmetic yields sentinels that the
//!   compliance checks flag, never a panic
//!
//! ## Quick Start
//!
//! ```rust
//! use cable_core::{size_cable, CableInput, SizingSettings};
//!
//! let input = CableInput::new("CBL-101", 120.0)
//!     .with_current(150.0)
//!     .with_derating(vec![0.91, 0.82]);
//!
//! let result = size_cable(&input, &SizingSettings::default()).unwrap();
//! for item in &result.compliance {
//!     println!("{:<24} {}", item.check, if item.ok { "OK" } else { "FAIL" });
//! }
//! ```
//!
//! ## Modules
//!
//! - [`current`] - Full-load current from A, kW or kVA
//! - [`derating`] - Multiplicative derating
//! - [`voltage_drop`] - Empirical (mV/A/m) and impedance (R/X) drop
//! - [`motor_start`] - Starting current and starting drop
//! - [`csa`] - Conductor size selection
//! - [`short_circuit`] - Adiabatic withstand check
//! - [`compliance`] - The six compliance checks
//! - [`catalog`] - Vendor catalog matching
//! - [`sizing`] - Cable records and the full pipeline
//! - [`schedule`] - Schedule container and settings
//! - [`file_io`] - Atomic schedule saves
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod catalog;
pub mod compliance;
pub mod csa;
pub mod current;
pub mod derating;
pub mod errors;
pub mod file_io;
pub mod motor_start;
pub mod schedule;
pub mod settings;
pub mod short_circuit;
pub mod sizing;
pub mod units;
pub mod voltage_drop;

// Re-export commonly used types at crate root for convenience
pub use catalog::{match_rows, Catalog, CatalogEntry, MatchSuggestion, RowMatch};
pub use compliance::{ComplianceCheck, ComplianceItem};
pub use errors::{CalcError, CalcResult};
pub use file_io::{load_schedule, save_schedule};
pub use schedule::{CableSchedule, ScheduleMetadata};
pub use settings::SizingSettings;
pub use sizing::{bulk_size, size_cable, BulkOutcome, CableInput, ScheduleRow, SizingResult};
