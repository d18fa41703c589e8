//! Checklist artifact grammar.
//!
//! # Responsibility
//! - Render the human-editable multi-parent checklist.
//! - Parse it back into per-note selections.
//!
//! # Invariants
//! - Parsing never fails; unknown lines are ignored.
//! - Note sections are `### <title>`; `## ` lines are structural.
//! - Checkbox markers are case-insensitive (`[x]` and `[X]`).
//! - Completed summary lines (`- **note** → parent`) count as one selection.
//! - Everything after the instructions heading is informational.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// First line of every rendered checklist.
pub const FORMAT_MARKER: &str = "<!-- paravault-checklist v1 -->";
/// Default file name of the checklist artifact.
pub const DEFAULT_CHECKLIST_FILE: &str = "resolve_multi_parents.md";

const TITLE: &str = "# Resolve Multi-Parent Notes";
const INCOMPLETE_HEADING: &str = "## Incomplete - Needs Work";
const COMPLETE_HEADING: &str = "## Complete - Already Selected";
const INSTRUCTIONS_HEADING: &str = "## Instructions";
const DIVIDER: &str = "---";

static NOTE_HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^###\s+(.+?)\s*$").expect("valid note header regex"));
static OPTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[-*]\s+\[([ xX])\]\s+(.+?)\s*$").expect("valid option regex"));
static SUMMARY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[-*]\s+\*\*(.+?)\*\*\s+(?:→|->)\s+(.+?)\s*$").expect("valid summary regex")
});

/// One candidate parent line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistOption {
    pub title: String,
    pub checked: bool,
}

/// One note awaiting a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistSection {
    pub note_title: String,
    pub options: Vec<ChecklistOption>,
}

/// A note whose single selection is already known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedSelection {
    pub note_title: String,
    pub parent_title: String,
}

/// Renderable checklist content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChecklistDocument {
    pub pending: Vec<ChecklistSection>,
    pub completed: Vec<CompletedSelection>,
    /// Command the human runs after editing; shown in the instructions.
    pub rerun_hint: String,
}

impl ChecklistDocument {
    /// Renders the document. Output is deterministic for equal input.
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = vec![FORMAT_MARKER.to_string(), TITLE.to_string(), String::new()];

        if self.completed.is_empty() {
            lines.push(format!(
                "**{} notes have multiple parents.**",
                self.pending.len()
            ));
        } else {
            lines.push(format!(
                "**{} notes still need a parent selected.**",
                self.pending.len()
            ));
            lines.push(format!("**{} notes are complete.**", self.completed.len()));
        }
        lines.extend([
            String::new(),
            "For each note below, select **EXACTLY ONE** parent by checking its checkbox."
                .to_string(),
            "All unselected parents will be removed.".to_string(),
            String::new(),
            DIVIDER.to_string(),
            String::new(),
            INCOMPLETE_HEADING.to_string(),
            String::new(),
        ]);

        for section in &self.pending {
            lines.push(format!("### {}", section.note_title));
            lines.push(String::new());
            lines.push("Select ONE parent:".to_string());
            lines.push(String::new());
            for option in &section.options {
                let mark = if option.checked { 'x' } else { ' ' };
                lines.push(format!("- [{mark}] {}", option.title));
            }
            lines.push(String::new());
        }

        if !self.completed.is_empty() {
            lines.extend([
                DIVIDER.to_string(),
                String::new(),
                COMPLETE_HEADING.to_string(),
                String::new(),
                "These notes already have exactly one parent selected:".to_string(),
                String::new(),
            ]);
            for done in &self.completed {
                lines.push(format!("- **{}** → {}", done.note_title, done.parent_title));
            }
            lines.push(String::new());
        }

        lines.extend([
            DIVIDER.to_string(),
            String::new(),
            INSTRUCTIONS_HEADING.to_string(),
            String::new(),
            "1. Check exactly ONE checkbox for each note under Incomplete".to_string(),
            "2. Save this file".to_string(),
            format!("3. Run: {}", self.rerun_hint),
            String::new(),
            "Repeat until all notes are resolved.".to_string(),
        ]);

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }
}

/// Selections read back from a checklist.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedChecklist {
    selections: BTreeMap<String, Vec<String>>,
}

impl ParsedChecklist {
    /// Checked parent titles for a note, in file order.
    ///
    /// `None` means the note has no section in the checklist.
    pub fn selections_for(&self, note_title: &str) -> Option<&[String]> {
        self.selections.get(note_title).map(Vec::as_slice)
    }

    /// Titles of every note mentioned by a section or summary line.
    pub fn note_titles(&self) -> impl Iterator<Item = &str> {
        self.selections.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}

/// Parses checklist text. Never fails; malformed lines are skipped.
pub fn parse_checklist(text: &str) -> ParsedChecklist {
    let mut selections: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut current: Option<String> = None;

    for raw in text.lines() {
        let line = raw.trim_end();
        if line.trim() == INSTRUCTIONS_HEADING {
            break;
        }
        if let Some(caps) = NOTE_HEADER_RE.captures(line) {
            let title = caps[1].to_string();
            selections.entry(title.clone()).or_default();
            current = Some(title);
            continue;
        }
        if line.starts_with("## ") || line.starts_with("# ") {
            current = None;
            continue;
        }
        if let Some(caps) = SUMMARY_RE.captures(line) {
            selections
                .entry(caps[1].to_string())
                .or_default()
                .push(caps[2].to_string());
            continue;
        }
        if let (Some(note), Some(caps)) = (current.as_ref(), OPTION_RE.captures(line)) {
            if caps[1].eq_ignore_ascii_case("x") {
                selections
                    .entry(note.clone())
                    .or_default()
                    .push(caps[2].to_string());
            }
        }
    }

    ParsedChecklist { selections }
}
