//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical record migrated from the flat source collection.
//! - Give hierarchy state (`category`, `parents`, `output_path`) typed fields
//!   instead of an untyped metadata bag.
//!
//! # Invariants
//! - `title` is the join key for parent matching and is unique per batch.
//! - `parents` never contains the note itself.
//! - `parents[0]` is the primary parent used for path computation.
//! - Fields unknown to this crate survive a load/save cycle through `extra`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Stable identifier carried over from the source collection.
///
/// Opaque to this crate; only equality is relied upon.
pub type NoteId = String;

/// Top-level organizational bucket every note belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Active, time-bound work.
    Project,
    /// Ongoing responsibility.
    Area,
    /// Reference topic.
    Resource,
    /// Everything inactive; also the fallback bucket.
    Archive,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 4] = [
        Category::Project,
        Category::Area,
        Category::Resource,
        Category::Archive,
    ];

    /// Fallback category for notes without a category tag.
    pub const FALLBACK: Category = Category::Archive;

    /// Folder name of this category root.
    pub fn root_name(self) -> &'static str {
        match self {
            Self::Project => "Projects",
            Self::Area => "Areas",
            Self::Resource => "Resources",
            Self::Archive => "Archive",
        }
    }

    /// Stable ordering number used for top-level folder prefixes.
    pub fn ordinal(self) -> u8 {
        match self {
            Self::Project => 1,
            Self::Area => 2,
            Self::Resource => 3,
            Self::Archive => 4,
        }
    }

    /// Resolves a category from its root folder name.
    pub fn from_root_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.root_name() == name)
    }
}

/// What a parent entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentKind {
    /// Another note of the same batch.
    Note,
    /// A synthetic category root.
    Category,
}

/// One entry of a note's ordered parent list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParentRef {
    pub id: String,
    pub title: String,
    pub kind: ParentKind,
}

impl ParentRef {
    /// Builds a parent entry pointing at another note.
    pub fn note(parent: &Note) -> Self {
        Self {
            id: parent.id.clone(),
            title: parent.title.clone(),
            kind: ParentKind::Note,
        }
    }

    /// Builds a synthetic parent entry for a category root.
    ///
    /// The root folder name doubles as id and title.
    pub fn category(category: Category) -> Self {
        Self {
            id: category.root_name().to_string(),
            title: category.root_name().to_string(),
            kind: ParentKind::Category,
        }
    }

    /// Returns the category this entry denotes, if it is a known category root.
    pub fn as_category(&self) -> Option<Category> {
        match self.kind {
            ParentKind::Category => Category::from_root_name(&self.title),
            ParentKind::Note => None,
        }
    }
}

/// Inline task carried through untouched except for validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteTask {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Canonical document record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Stable id from the source collection.
    pub id: NoteId,
    /// Unique title; tags equal to a title denote a parent.
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Markdown body, never inspected by hierarchy code.
    #[serde(default)]
    pub content: String,
    /// `None` until category bootstrap ran.
    #[serde(default)]
    pub category: Option<Category>,
    /// Ordered parent list; first entry is the primary parent.
    #[serde(default)]
    pub parents: Vec<ParentRef>,
    /// Sub-folder inside the category root set by reclassification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_subfolder: Option<String>,
    /// Slash-joined folder path; `"."` is the vault root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(default)]
    pub tasks: Vec<NoteTask>,
    /// Passthrough for fields this crate does not interpret.
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Note {
    /// Creates a note with a generated stable id.
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), title)
    }

    /// Creates a note with a caller-provided id.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(id: impl Into<NoteId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            tags: Vec::new(),
            content: String::new(),
            category: None,
            parents: Vec::new(),
            category_subfolder: None,
            output_path: None,
            tasks: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Builder-style tag setter.
    pub fn tagged<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|value| value == tag)
    }

    /// First parent entry, if any.
    pub fn primary_parent(&self) -> Option<&ParentRef> {
        self.parents.first()
    }

    /// Whether this note still needs a human parent selection.
    pub fn is_ambiguous(&self) -> bool {
        self.parents.len() > 1
    }

    /// Whether any parent points at another note rather than a category root.
    pub fn has_note_parent(&self) -> bool {
        self.parents
            .iter()
            .any(|parent| parent.kind == ParentKind::Note)
    }
}

#[cfg(test)]
mod tests {
    use super::{Category, Note, ParentKind, ParentRef};

    #[test]
    fn category_root_names_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_root_name(category.root_name()), Some(category));
        }
        assert_eq!(Category::from_root_name("Project"), None);
    }

    #[test]
    fn category_parent_uses_root_name_for_id_and_title() {
        let parent = ParentRef::category(Category::Area);
        assert_eq!(parent.id, "Areas");
        assert_eq!(parent.title, "Areas");
        assert_eq!(parent.kind, ParentKind::Category);
        assert_eq!(parent.as_category(), Some(Category::Area));
    }

    #[test]
    fn note_parent_is_never_a_category() {
        let home = Note::with_id("n-1", "Archive");
        assert_eq!(ParentRef::note(&home).as_category(), None);
    }

    #[test]
    fn new_note_generates_distinct_ids() {
        let first = Note::new("a");
        let second = Note::new("a");
        assert_ne!(first.id, second.id);
        assert!(first.parents.is_empty());
        assert_eq!(first.category, None);
    }
}
