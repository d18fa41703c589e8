//! Note hierarchy resolution engine.
//!
//! # Responsibility
//! - Turn a flat, tagged batch into a parent graph with one primary parent
//!   per note and a folder path for every note.
//!
//! # Invariants
//! - Stages run strictly in order: graph, reclassify, resolve, paths, layout.
//! - Structural anomalies (cycles, dangling parents) never fail a stage.

pub mod checklist;
pub mod graph;
pub mod layout;
pub mod path;
pub mod prune;
pub mod reclassify;
pub mod resolver;
