//! Human-in-the-loop multi-parent resolution.
//!
//! # Responsibility
//! - Decide, from the batch and the current checklist, whether to generate,
//!   rewrite or apply the checklist.
//! - Persist the decision through a `ChecklistStore`.
//!
//! # Invariants
//! - Malformed or stale human input degrades to "ask again", never to an error.
//! - Selections are applied only when every ambiguous note has exactly one
//!   valid selection.
//! - Running never deletes the checklist. The caller discards it with
//!   `discard_checklist` once the resolved batch is stored, so a rerun before
//!   that point applies the same selections again.
//! - Planning is pure: equal inputs produce equal steps and equal text.
//! - Only storage failures surface as `ResolverError`.

use crate::hierarchy::checklist::{
    parse_checklist, ChecklistDocument, ChecklistOption, ChecklistSection, CompletedSelection,
    ParsedChecklist,
};
use crate::model::note::Note;
use crate::repo::checklist_store::ChecklistStore;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;

/// Observable state of the checklist artifact relative to a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecklistState {
    /// No checklist document exists.
    NoArtifact,
    /// At least one ambiguous note lacks exactly one valid selection.
    Incomplete,
    /// Every ambiguous note has exactly one valid selection.
    Complete,
}

/// Why a note is still waiting for the human.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionIssue {
    /// Nothing checked, or the note has no section yet.
    NoSelection,
    /// More than one box checked.
    MultipleSelections(usize),
    /// The checked title is not among the note's current parents.
    UnknownParent(String),
}

impl Display for SelectionIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSelection => write!(f, "no parent selected"),
            Self::MultipleSelections(count) => write!(f, "{count} parents selected"),
            Self::UnknownParent(title) => {
                write!(f, "selected `{title}` is not a current parent")
            }
        }
    }
}

/// One ambiguous note still awaiting a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingNote {
    pub note_title: String,
    pub candidates: Vec<String>,
    pub issue: SelectionIssue,
}

/// What remains after a suspended run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionSummary {
    pub pending: Vec<PendingNote>,
    pub completed: usize,
    /// `true` when the checklist was generated from scratch this run.
    pub generated: bool,
}

impl ResolutionSummary {
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

/// Pure result of planning one resolution run.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionStep {
    /// No ambiguity and no checklist: batch unchanged.
    NothingToResolve,
    /// Write `checklist` and halt.
    Suspend {
        checklist: String,
        summary: ResolutionSummary,
    },
    /// Replace the batch with `notes`.
    Apply { notes: Vec<Note>, applied: usize },
}

/// Result of one resolver run after storage effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    NothingToResolve,
    Suspended(ResolutionSummary),
    Resolved { applied: usize },
}

/// Storage failure while handling the checklist.
#[derive(Debug)]
pub enum ResolverError {
    Read { location: String, source: io::Error },
    Write { location: String, source: io::Error },
    Remove { location: String, source: io::Error },
}

impl Display for ResolverError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { location, source } => {
                write!(f, "failed to read checklist `{location}`: {source}")
            }
            Self::Write { location, source } => {
                write!(f, "failed to write checklist `{location}`: {source}")
            }
            Self::Remove { location, source } => {
                write!(f, "failed to remove checklist `{location}`: {source}")
            }
        }
    }
}

impl Error for ResolverError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } | Self::Write { source, .. } | Self::Remove { source, .. } => {
                Some(source)
            }
        }
    }
}

/// Classifies the checklist against the batch without side effects.
pub fn checklist_state(notes: &[Note], checklist: Option<&str>) -> ChecklistState {
    let Some(text) = checklist else {
        return ChecklistState::NoArtifact;
    };
    let parsed = parse_checklist(text);
    let all_valid = notes
        .iter()
        .filter(|note| note.is_ambiguous())
        .all(|note| evaluate(note, &parsed).is_ok());
    if all_valid {
        ChecklistState::Complete
    } else {
        ChecklistState::Incomplete
    }
}

/// Plans one resolution run from the batch and the checklist snapshot.
pub fn plan_resolution(notes: &[Note], checklist: Option<&str>, rerun_hint: &str) -> ResolutionStep {
    let ambiguous: Vec<&Note> = notes.iter().filter(|note| note.is_ambiguous()).collect();

    let Some(text) = checklist else {
        if ambiguous.is_empty() {
            return ResolutionStep::NothingToResolve;
        }
        let pending = ambiguous
            .iter()
            .map(|note| pending_note(note, SelectionIssue::NoSelection))
            .collect();
        let document = ChecklistDocument {
            pending: ambiguous
                .iter()
                .map(|note| section_for(note, &[]))
                .collect(),
            completed: Vec::new(),
            rerun_hint: rerun_hint.to_string(),
        };
        return ResolutionStep::Suspend {
            checklist: document.render(),
            summary: ResolutionSummary {
                pending,
                completed: 0,
                generated: true,
            },
        };
    };

    let parsed = parse_checklist(text);
    let mut completed = Vec::new();
    let mut pending = Vec::new();
    let mut sections = Vec::new();
    for note in &ambiguous {
        match evaluate(note, &parsed) {
            Ok(parent_title) => completed.push(CompletedSelection {
                note_title: note.title.clone(),
                parent_title: parent_title.to_string(),
            }),
            Err(issue) => {
                let checked = parsed.selections_for(&note.title).unwrap_or(&[]);
                sections.push(section_for(note, checked));
                pending.push(pending_note(note, issue));
            }
        }
    }

    if pending.is_empty() {
        let mut resolved = notes.to_vec();
        let applied = apply_selections(&mut resolved, &completed);
        return ResolutionStep::Apply {
            notes: resolved,
            applied,
        };
    }

    let summary = ResolutionSummary {
        pending,
        completed: completed.len(),
        generated: false,
    };
    let document = ChecklistDocument {
        pending: sections,
        completed,
        rerun_hint: rerun_hint.to_string(),
    };
    ResolutionStep::Suspend {
        checklist: document.render(),
        summary,
    }
}

/// Drives planning plus checklist persistence.
pub struct MultiParentResolver<S: ChecklistStore> {
    store: S,
    rerun_hint: String,
}

impl<S: ChecklistStore> MultiParentResolver<S> {
    /// Creates a resolver; `rerun_hint` is printed in the checklist instructions.
    pub fn new(store: S, rerun_hint: impl Into<String>) -> Self {
        Self {
            store,
            rerun_hint: rerun_hint.into(),
        }
    }

    /// Current checklist state for `notes`.
    pub fn state(&self, notes: &[Note]) -> Result<ChecklistState, ResolverError> {
        let current = self.read()?;
        Ok(checklist_state(notes, current.as_deref()))
    }

    /// Runs one resolution pass.
    ///
    /// On `Resolved`, `notes` holds the filtered parents and the checklist is
    /// left in place. On `Suspended`, `notes` is untouched and the checklist
    /// rewritten.
    pub fn run(&self, notes: &mut Vec<Note>) -> Result<ResolutionOutcome, ResolverError> {
        let current = self.read()?;
        match plan_resolution(notes, current.as_deref(), &self.rerun_hint) {
            ResolutionStep::NothingToResolve => {
                info!("event=multi_parent_resolve module=hierarchy status=ok outcome=nothing_to_resolve");
                Ok(ResolutionOutcome::NothingToResolve)
            }
            ResolutionStep::Suspend { checklist, summary } => {
                self.store
                    .write(&checklist)
                    .map_err(|source| ResolverError::Write {
                        location: self.store.location(),
                        source,
                    })?;
                info!(
                    "event=multi_parent_resolve module=hierarchy status=suspended generated={} remaining={} completed={}",
                    summary.generated,
                    summary.remaining(),
                    summary.completed
                );
                Ok(ResolutionOutcome::Suspended(summary))
            }
            ResolutionStep::Apply {
                notes: resolved,
                applied,
            } => {
                *notes = resolved;
                info!(
                    "event=multi_parent_resolve module=hierarchy status=ok outcome=resolved applied={}",
                    applied
                );
                Ok(ResolutionOutcome::Resolved { applied })
            }
        }
    }

    /// Deletes the checklist after the resolved batch was stored.
    ///
    /// An absent checklist is not an error.
    pub fn discard_checklist(&self) -> Result<(), ResolverError> {
        self.store.remove().map_err(|source| {
            error!(
                "event=checklist_discard module=hierarchy status=error location={}",
                self.store.location()
            );
            ResolverError::Remove {
                location: self.store.location(),
                source,
            }
        })?;
        info!(
            "event=checklist_discard module=hierarchy status=ok location={}",
            self.store.location()
        );
        Ok(())
    }

    fn read(&self) -> Result<Option<String>, ResolverError> {
        self.store.read().map_err(|source| {
            error!(
                "event=multi_parent_resolve module=hierarchy status=error error_code=checklist_read_failed location={}",
                self.store.location()
            );
            ResolverError::Read {
                location: self.store.location(),
                source,
            }
        })
    }
}

/// Filters each selected note's parents down to the chosen one.
///
/// Returns the number of notes whose parent list changed.
pub fn apply_selections(notes: &mut [Note], selections: &[CompletedSelection]) -> usize {
    let mut applied = 0;
    for note in notes.iter_mut() {
        let Some(selection) = selections
            .iter()
            .find(|selection| selection.note_title == note.title)
        else {
            continue;
        };
        let before = note.parents.len();
        note.parents
            .retain(|parent| parent.title == selection.parent_title);
        note.parents.truncate(1);
        if note.parents.len() != before {
            applied += 1;
        }
    }
    applied
}

fn evaluate<'a>(note: &Note, parsed: &'a ParsedChecklist) -> Result<&'a str, SelectionIssue> {
    let selected = parsed.selections_for(&note.title).unwrap_or(&[]);
    match selected {
        [] => Err(SelectionIssue::NoSelection),
        [only] => {
            if note.parents.iter().any(|parent| &parent.title == only) {
                Ok(only.as_str())
            } else {
                Err(SelectionIssue::UnknownParent(only.clone()))
            }
        }
        many => Err(SelectionIssue::MultipleSelections(many.len())),
    }
}

fn section_for(note: &Note, checked: &[String]) -> ChecklistSection {
    ChecklistSection {
        note_title: note.title.clone(),
        options: note
            .parents
            .iter()
            .map(|parent| ChecklistOption {
                title: parent.title.clone(),
                checked: checked.contains(&parent.title),
            })
            .collect(),
    }
}

fn pending_note(note: &Note, issue: SelectionIssue) -> PendingNote {
    PendingNote {
        note_title: note.title.clone(),
        candidates: note.parents.iter().map(|parent| parent.title.clone()).collect(),
        issue,
    }
}
