//! Domain model for migrated notes.
//!
//! # Responsibility
//! - Define canonical data structures consumed by hierarchy resolution.
//! - Keep hierarchy state in typed fields; unknown source fields pass through.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Notes are never deleted by this crate.

pub mod note;
