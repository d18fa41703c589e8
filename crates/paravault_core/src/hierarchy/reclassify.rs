//! Status-driven category overrides.
//!
//! # Responsibility
//! - Move notes out of their category root according to status tags
//!   (e.g. parked or finished projects).
//!
//! # Invariants
//! - Rules run in declaration order; the first matching rule wins per note.
//! - Only bare category members (no `note` parent) are eligible.
//! - Applying a rule to an already reclassified note changes nothing.

use crate::model::note::{Category, Note, ParentRef};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One ordered override rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReclassificationRule {
    /// Stable name used in reports and logs.
    pub name: String,
    /// Every tag listed here must be present on the note.
    pub required_tags: Vec<String>,
    /// Category the note must currently be in.
    pub from: Category,
    /// Category assigned when the rule fires.
    pub to: Category,
    /// Optional bucket inside the target category root.
    #[serde(default)]
    pub subfolder: Option<String>,
}

impl ReclassificationRule {
    /// Predicate over tags, current category and current placement.
    pub fn matches(&self, note: &Note) -> bool {
        note.category == Some(self.from)
            && is_bare_category_member(note)
            && self.required_tags.iter().all(|tag| note.has_tag(tag))
    }

    /// Reassigns category, parent and bucket. Returns whether anything changed.
    pub fn apply(&self, note: &mut Note) -> bool {
        let parents = vec![ParentRef::category(self.to)];
        let changed = note.category != Some(self.to)
            || note.parents != parents
            || note.category_subfolder != self.subfolder;
        note.category = Some(self.to);
        note.parents = parents;
        note.category_subfolder = self.subfolder.clone();
        changed
    }
}

/// Default rule set: parked projects first, then finished projects.
pub fn default_rules() -> Vec<ReclassificationRule> {
    vec![
        ReclassificationRule {
            name: "parked".to_string(),
            required_tags: vec!["Parked".to_string(), "Project".to_string()],
            from: Category::Project,
            to: Category::Project,
            subfolder: Some("z_Parked".to_string()),
        },
        ReclassificationRule {
            name: "done".to_string(),
            required_tags: vec!["Done".to_string(), "Project".to_string()],
            from: Category::Project,
            to: Category::Archive,
            subfolder: None,
        },
    ]
}

/// Whether the note hangs directly under a category root.
pub fn is_bare_category_member(note: &Note) -> bool {
    !note.has_note_parent()
}

/// Outcome of one reclassification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReclassifyReport {
    /// Notes changed per rule name.
    pub changed: BTreeMap<String, usize>,
    /// Notes that matched a rule but were already in the target state.
    pub unchanged: usize,
    /// Notes carrying a rule's tags but nested under another note.
    pub nested_skipped: usize,
}

impl ReclassifyReport {
    pub fn total_changed(&self) -> usize {
        self.changed.values().sum()
    }
}

/// Applies `rules` to every note.
pub fn reclassify(notes: &mut [Note], rules: &[ReclassificationRule]) -> ReclassifyReport {
    let mut report = ReclassifyReport::default();
    for note in notes.iter_mut() {
        match rules.iter().find(|rule| rule.matches(&*note)) {
            Some(rule) => {
                if rule.apply(note) {
                    debug!(
                        "event=reclassify_note module=hierarchy rule={} note_id={}",
                        rule.name, note.id
                    );
                    *report.changed.entry(rule.name.clone()).or_default() += 1;
                } else {
                    report.unchanged += 1;
                }
            }
            None => {
                let tagged_for_rule = rules.iter().any(|rule| {
                    note.category == Some(rule.from)
                        && rule.required_tags.iter().all(|tag| note.has_tag(tag))
                });
                if tagged_for_rule && !is_bare_category_member(note) {
                    report.nested_skipped += 1;
                }
            }
        }
    }

    info!(
        "event=reclassify module=hierarchy status=ok changed={} unchanged={} nested_skipped={}",
        report.total_changed(),
        report.unchanged,
        report.nested_skipped
    );
    report
}
