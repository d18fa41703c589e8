//! Parent graph construction from tag/title matches.
//!
//! # Responsibility
//! - Bootstrap each note's category from its category tags.
//! - Derive `parents` from the category root and from tags naming other notes.
//!
//! # Invariants
//! - Title lookups go through one index built per pass; first title wins.
//! - A note is never its own parent.
//! - Parent titles are unique within one note's list.
//! - Tags matching no title are ignored (closed world over the batch).

use crate::model::note::{Category, Note, ParentKind, ParentRef};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Tag names that place a note into a category root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryTags {
    pub project: String,
    pub area: String,
    pub resource: String,
}

impl Default for CategoryTags {
    fn default() -> Self {
        Self {
            project: "Project".to_string(),
            area: "Area".to_string(),
            resource: "ResourceTopic".to_string(),
        }
    }
}

impl CategoryTags {
    /// Resolves a note's category; Project > Area > Resource > fallback.
    pub fn category_for(&self, note: &Note) -> Category {
        [
            (self.project.as_str(), Category::Project),
            (self.area.as_str(), Category::Area),
            (self.resource.as_str(), Category::Resource),
        ]
        .into_iter()
        .find(|(tag, _)| note.has_tag(tag))
        .map_or(Category::FALLBACK, |(_, category)| category)
    }
}

/// Counters reported by one graph build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub notes: usize,
    pub with_note_parent: usize,
    pub category_superseded: usize,
    pub multi_parent: usize,
    pub max_parents: usize,
    pub self_references: usize,
}

/// Exact-match title lookup over one batch.
///
/// Duplicate titles keep the first note encountered.
pub struct TitleIndex<'a> {
    by_title: HashMap<&'a str, usize>,
}

impl<'a> TitleIndex<'a> {
    pub fn new(notes: &'a [Note]) -> Self {
        let mut by_title = HashMap::with_capacity(notes.len());
        for (position, note) in notes.iter().enumerate() {
            by_title.entry(note.title.as_str()).or_insert(position);
        }
        Self { by_title }
    }

    /// Returns the batch position of the note with this exact title.
    pub fn position(&self, title: &str) -> Option<usize> {
        self.by_title.get(title).copied()
    }

    pub fn len(&self) -> usize {
        self.by_title.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_title.is_empty()
    }
}

/// Assigns `category` to every note from its tags.
///
/// Overwrites any earlier value; this is the once-per-pass bootstrap.
pub fn assign_categories(notes: &mut [Note], tags: &CategoryTags) {
    let mut counts: HashMap<Category, usize> = HashMap::new();
    for note in notes.iter_mut() {
        let category = tags.category_for(note);
        note.category = Some(category);
        *counts.entry(category).or_default() += 1;
    }
    info!(
        "event=category_assign module=hierarchy status=ok projects={} areas={} resources={} archive={}",
        counts.get(&Category::Project).copied().unwrap_or(0),
        counts.get(&Category::Area).copied().unwrap_or(0),
        counts.get(&Category::Resource).copied().unwrap_or(0),
        counts.get(&Category::Archive).copied().unwrap_or(0),
    );
}

/// Rebuilds `parents` for every note.
///
/// The category parent comes first unless the note sits in the fallback
/// category and at least one note parent was found, in which case the note
/// parents supersede it. `category` itself is read, never written.
pub fn build_parent_graph(notes: &mut [Note]) -> GraphStats {
    let computed: Vec<(Vec<ParentRef>, bool, bool)> = {
        let index = TitleIndex::new(notes);
        notes
            .iter()
            .enumerate()
            .map(|(position, note)| parents_for(notes, &index, position, note))
            .collect()
    };

    let mut stats = GraphStats {
        notes: notes.len(),
        ..GraphStats::default()
    };
    for (note, (parents, superseded, self_referenced)) in notes.iter_mut().zip(computed) {
        if parents.iter().any(|parent| parent.kind == ParentKind::Note) {
            stats.with_note_parent += 1;
        }
        if superseded {
            stats.category_superseded += 1;
        }
        if self_referenced {
            stats.self_references += 1;
        }
        if parents.len() > 1 {
            stats.multi_parent += 1;
        }
        stats.max_parents = stats.max_parents.max(parents.len());
        note.parents = parents;
    }

    info!(
        "event=graph_build module=hierarchy status=ok notes={} with_note_parent={} category_superseded={} multi_parent={} max_parents={} self_references={}",
        stats.notes,
        stats.with_note_parent,
        stats.category_superseded,
        stats.multi_parent,
        stats.max_parents,
        stats.self_references
    );
    stats
}

fn parents_for(
    notes: &[Note],
    index: &TitleIndex<'_>,
    position: usize,
    note: &Note,
) -> (Vec<ParentRef>, bool, bool) {
    let mut parents = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut self_referenced = false;

    let category_parent = note.category.map(ParentRef::category);
    if let Some(parent) = &category_parent {
        seen.insert(parent.title.as_str());
    }

    for tag in &note.tags {
        let Some(parent_position) = index.position(tag) else {
            continue;
        };
        if parent_position == position || tag == &note.title {
            self_referenced = true;
            continue;
        }
        let parent = &notes[parent_position];
        if seen.insert(parent.title.as_str()) {
            parents.push(ParentRef::note(parent));
        }
    }

    let superseded = note.category == Some(Category::FALLBACK) && !parents.is_empty();
    if let Some(category_parent) = category_parent {
        if !superseded {
            parents.insert(0, category_parent);
        }
    }
    (parents, superseded, self_referenced)
}

#[cfg(test)]
mod tests {
    use super::{CategoryTags, TitleIndex};
    use crate::model::note::{Category, Note};

    #[test]
    fn category_priority_prefers_project_over_area() {
        let note = Note::with_id("1", "x").tagged(["Area", "Project"]);
        assert_eq!(CategoryTags::default().category_for(&note), Category::Project);
    }

    #[test]
    fn plain_resource_tag_is_not_a_category_tag_by_default() {
        let note = Note::with_id("1", "x").tagged(["Resource"]);
        assert_eq!(CategoryTags::default().category_for(&note), Category::Archive);
    }

    #[test]
    fn title_index_keeps_first_duplicate() {
        let notes = vec![Note::with_id("a", "Dup"), Note::with_id("b", "Dup")];
        let index = TitleIndex::new(&notes);
        assert_eq!(index.position("Dup"), Some(0));
        assert_eq!(index.len(), 1);
        assert_eq!(index.position("Missing"), None);
    }
}
