//! Container/leaf classification.
//!
//! # Responsibility
//! - Split the resolved batch into container notes (someone's primary parent)
//!   and leaves, and derive the file location each kind gets.
//!
//! # Invariants
//! - Every title lands in exactly one of `containers` and `leaves`.
//! - A note naming itself as primary parent does not make it a container.
//! - Must be recomputed whenever parents change.

use crate::hierarchy::path::{join_segment, sanitize_name, ROOT_PATH};
use crate::model::note::{Note, ParentKind};
use std::collections::BTreeSet;

/// Extension of files produced by the downstream writer.
pub const NOTE_FILE_EXTENSION: &str = "md";

/// Container/leaf split of one batch, keyed by title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePartition {
    pub containers: BTreeSet<String>,
    pub leaves: BTreeSet<String>,
}

impl NotePartition {
    pub fn is_container(&self, title: &str) -> bool {
        self.containers.contains(title)
    }

    /// Relative markdown path the writer should use for `note`.
    ///
    /// Leaves sit inside their `output_path`; containers get a folder named
    /// after themselves so their children can live next to them.
    pub fn file_path(&self, note: &Note) -> String {
        let base = note.output_path.as_deref().unwrap_or(ROOT_PATH);
        let name = sanitize_name(&note.title);
        let file = format!("{name}.{NOTE_FILE_EXTENSION}");
        if self.is_container(&note.title) {
            join_segment(&join_segment(base, &name), &file)
        } else {
            join_segment(base, &file)
        }
    }

    pub fn len(&self) -> usize {
        self.containers.len() + self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty() && self.leaves.is_empty()
    }
}

/// Titles referenced as another note's primary `note` parent.
pub fn container_titles(notes: &[Note]) -> BTreeSet<String> {
    let known: BTreeSet<&str> = notes.iter().map(|note| note.title.as_str()).collect();
    notes
        .iter()
        .filter_map(|note| {
            note.primary_parent()
                .filter(|parent| parent.kind == ParentKind::Note && parent.title != note.title)
                .map(|parent| parent.title.as_str())
        })
        .filter(|title| known.contains(title))
        .map(str::to_string)
        .collect()
}

/// Classifies every note of the batch.
pub fn classify_notes(notes: &[Note]) -> NotePartition {
    let containers = container_titles(notes);
    let leaves = notes
        .iter()
        .map(|note| note.title.as_str())
        .filter(|title| !containers.contains(*title))
        .map(str::to_string)
        .collect();
    NotePartition { containers, leaves }
}
