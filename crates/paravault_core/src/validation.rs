//! Batch validation.
//!
//! # Responsibility
//! - Report structural problems of a batch before it is persisted.
//!
//! # Invariants
//! - Validation only reports; it never corrects a note.
//! - Warnings are listed in batch order.

use crate::model::note::Note;
use log::warn;
use std::collections::HashSet;
use std::fmt::{Display, Formatter};

/// One validation finding. `index` is the note's batch position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    MissingId { index: usize },
    DuplicateId { index: usize, id: String },
    MissingTitle { index: usize, id: String },
    DuplicateTitle { index: usize, title: String },
    TaskMissingId { index: usize, id: String, task: usize },
    TaskMissingContent { index: usize, id: String, task: usize },
}

impl Display for ValidationWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingId { index } => write!(f, "Note[{index}]: missing id"),
            Self::DuplicateId { index, id } => write!(f, "Note[{index}]: duplicate id `{id}`"),
            Self::MissingTitle { index, id } => write!(f, "Note[{index}] ({id}): missing title"),
            Self::DuplicateTitle { index, title } => {
                write!(f, "Note[{index}]: duplicate title `{title}`")
            }
            Self::TaskMissingId { index, id, task } => {
                write!(f, "Note[{index}] ({id}): Task[{task}] missing id")
            }
            Self::TaskMissingContent { index, id, task } => {
                write!(f, "Note[{index}] ({id}): Task[{task}] missing content")
            }
        }
    }
}

/// Validates ids, titles and inline tasks of a batch.
pub fn validate_notes(notes: &[Note]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let mut seen_ids: HashSet<&str> = HashSet::new();
    let mut seen_titles: HashSet<&str> = HashSet::new();

    for (index, note) in notes.iter().enumerate() {
        if note.id.trim().is_empty() {
            warnings.push(ValidationWarning::MissingId { index });
        } else if !seen_ids.insert(note.id.as_str()) {
            warnings.push(ValidationWarning::DuplicateId {
                index,
                id: note.id.clone(),
            });
        }

        if note.title.trim().is_empty() {
            warnings.push(ValidationWarning::MissingTitle {
                index,
                id: note.id.clone(),
            });
        } else if !seen_titles.insert(note.title.as_str()) {
            warnings.push(ValidationWarning::DuplicateTitle {
                index,
                title: note.title.clone(),
            });
        }

        for (task, item) in note.tasks.iter().enumerate() {
            if item.id.trim().is_empty() {
                warnings.push(ValidationWarning::TaskMissingId {
                    index,
                    id: note.id.clone(),
                    task,
                });
            }
            if item.content.trim().is_empty() {
                warnings.push(ValidationWarning::TaskMissingContent {
                    index,
                    id: note.id.clone(),
                    task,
                });
            }
        }
    }

    if !warnings.is_empty() {
        warn!(
            "event=batch_validate module=validation status=warning notes={} warnings={}",
            notes.len(),
            warnings.len()
        );
    }
    warnings
}
