//! Persistence boundaries.
//!
//! # Responsibility
//! - Define storage contracts for the checklist artifact and batch snapshots.
//! - Keep file and SQL details out of hierarchy and service code.
//!
//! # Invariants
//! - Absent artifacts are reported as values (`None`, `NotFound`), not I/O errors.

pub mod checklist_store;
pub mod snapshot_repo;
