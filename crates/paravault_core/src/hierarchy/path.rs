//! Output path assignment.
//!
//! # Responsibility
//! - Compute each note's folder path by walking its primary parent chain.
//! - Sanitize folder names and optionally prefix category roots with ordinals.
//!
//! # Invariants
//! - Resolution is a pure function of `parents`, `category` and
//!   `category_subfolder`; repeated runs yield identical paths.
//! - Every walk visits each title at most once, so it ends within
//!   `notes.len()` steps even on cyclic input.
//! - A primary parent missing from the batch counts as no parent.
//! - Ordinal prefixes only ever touch the first segment, and only when that
//!   segment came from a category root, never from a note title.

use crate::hierarchy::graph::TitleIndex;
use crate::model::note::{Category, Note, ParentKind};
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};

/// Path of the vault root.
pub const ROOT_PATH: &str = ".";
/// Replacement for names that sanitize to nothing.
pub const EMPTY_NAME_PLACEHOLDER: &str = "untitled";

static ILLEGAL_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("valid illegal char regex"));
static CONTROL_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x1f]").expect("valid control char regex"));

/// Makes `name` safe as a single folder or file name.
pub fn sanitize_name(name: &str) -> String {
    let replaced = ILLEGAL_CHARS_RE.replace_all(name, "_");
    let cleaned = CONTROL_CHARS_RE.replace_all(&replaced, "");
    let trimmed = cleaned.trim_end_matches(['.', ' ']);
    if trimmed.is_empty() {
        EMPTY_NAME_PLACEHOLDER.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Joins a parent path and one more segment, treating `"."` as empty.
pub fn join_segment(base: &str, segment: &str) -> String {
    if base == ROOT_PATH || base.is_empty() {
        segment.to_string()
    } else {
        format!("{base}/{segment}")
    }
}

/// Prefixes the first segment with its category ordinal (`2 Areas`).
///
/// Leaves `"."`, already prefixed paths and non-category roots untouched.
pub fn apply_ordinal_prefix(path: &str) -> String {
    if path == ROOT_PATH {
        return path.to_string();
    }
    let (first, rest) = match path.split_once('/') {
        Some((first, rest)) => (first, Some(rest)),
        None => (path, None),
    };
    let Some(category) = Category::from_root_name(first) else {
        return path.to_string();
    };
    let prefixed = format!("{} {}", category.ordinal(), category.root_name());
    match rest {
        Some(rest) => format!("{prefixed}/{rest}"),
        None => prefixed,
    }
}

enum Placement<'a> {
    /// Chain ends at a category root (or the vault root).
    Root { base: String, from_category: bool },
    /// Chain continues with another note.
    Under(&'a Note),
}

/// Resolves output paths over one immutable batch snapshot.
pub struct PathResolver<'a> {
    notes: &'a [Note],
    index: TitleIndex<'a>,
    ordinal_prefixes: bool,
}

impl<'a> PathResolver<'a> {
    pub fn new(notes: &'a [Note]) -> Self {
        Self {
            notes,
            index: TitleIndex::new(notes),
            ordinal_prefixes: false,
        }
    }

    /// Enables `1 Projects`-style prefixes on category root segments.
    pub fn with_ordinal_prefixes(mut self, enabled: bool) -> Self {
        self.ordinal_prefixes = enabled;
        self
    }

    /// Computes the output path of one note.
    pub fn resolve(&self, note: &'a Note) -> String {
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(note.title.as_str());

        let mut segments: Vec<String> = Vec::new();
        let mut current = note;
        let (base, from_category) = loop {
            match self.placement(current) {
                Placement::Root {
                    base,
                    from_category,
                } => break (base, from_category),
                Placement::Under(parent) => {
                    let segment = sanitize_name(&parent.title);
                    if !visited.insert(parent.title.as_str()) {
                        // Revisited title: it is both the base and the next segment.
                        segments.push(segment.clone());
                        break (segment, false);
                    }
                    segments.push(segment);
                    current = parent;
                }
            }
        };

        let path = segments
            .iter()
            .rev()
            .fold(base, |acc, segment| join_segment(&acc, segment));
        if self.ordinal_prefixes && from_category {
            apply_ordinal_prefix(&path)
        } else {
            path
        }
    }

    /// Computes paths for the whole batch, in batch order.
    pub fn resolve_all(&self) -> Vec<String> {
        self.notes.iter().map(|note| self.resolve(note)).collect()
    }

    fn placement(&self, note: &'a Note) -> Placement<'a> {
        match note.primary_parent() {
            Some(parent) if parent.kind == ParentKind::Note => {
                match self.index.position(&parent.title) {
                    Some(position) => Placement::Under(&self.notes[position]),
                    None => category_placement(note, note.category),
                }
            }
            Some(parent) => match parent.as_category() {
                Some(category) => category_placement(note, Some(category)),
                None => Placement::Root {
                    base: sanitize_name(&parent.title),
                    from_category: false,
                },
            },
            None => category_placement(note, note.category),
        }
    }
}

fn category_placement<'a>(note: &Note, category: Option<Category>) -> Placement<'a> {
    Placement::Root {
        base: category_base(note, category),
        from_category: category.is_some(),
    }
}

fn category_base(note: &Note, category: Option<Category>) -> String {
    let Some(category) = category else {
        return ROOT_PATH.to_string();
    };
    let root = sanitize_name(category.root_name());
    match note.category_subfolder.as_deref() {
        Some(subfolder) => join_segment(&root, &sanitize_name(subfolder)),
        None => root,
    }
}

/// Writes `output_path` on every note and returns a depth histogram.
pub fn assign_output_paths(notes: &mut [Note], ordinal_prefixes: bool) -> BTreeMap<usize, usize> {
    let paths = PathResolver::new(notes)
        .with_ordinal_prefixes(ordinal_prefixes)
        .resolve_all();

    let mut depths: BTreeMap<usize, usize> = BTreeMap::new();
    for (note, path) in notes.iter_mut().zip(paths) {
        *depths.entry(path_depth(&path)).or_default() += 1;
        note.output_path = Some(path);
    }

    info!(
        "event=path_assign module=hierarchy status=ok notes={} ordinal_prefixes={} max_depth={}",
        notes.len(),
        ordinal_prefixes,
        depths.keys().next_back().copied().unwrap_or(0)
    );
    depths
}

/// Number of folder segments in a path; the root has depth zero.
pub fn path_depth(path: &str) -> usize {
    if path == ROOT_PATH || path.is_empty() {
        0
    } else {
        path.split('/').count()
    }
}

#[cfg(test)]
mod tests {
    use super::{apply_ordinal_prefix, join_segment, path_depth, sanitize_name};

    #[test]
    fn sanitize_replaces_illegal_and_trims_trailing_dots() {
        assert_eq!(sanitize_name("a/b:c?"), "a_b_c_");
        assert_eq!(sanitize_name("Notes... "), "Notes");
        assert_eq!(sanitize_name("tab\there"), "tabhere");
        assert_eq!(sanitize_name(" . "), "untitled");
        assert_eq!(sanitize_name(""), "untitled");
    }

    #[test]
    fn join_treats_root_as_empty() {
        assert_eq!(join_segment(".", "Home"), "Home");
        assert_eq!(join_segment("Areas", "Home"), "Areas/Home");
    }

    #[test]
    fn ordinal_prefix_touches_only_category_first_segment() {
        assert_eq!(apply_ordinal_prefix("Areas/Home"), "2 Areas/Home");
        assert_eq!(apply_ordinal_prefix("Archive"), "4 Archive");
        assert_eq!(apply_ordinal_prefix("Home/Areas"), "Home/Areas");
        assert_eq!(apply_ordinal_prefix("2 Areas/Home"), "2 Areas/Home");
        assert_eq!(apply_ordinal_prefix("."), ".");
    }

    #[test]
    fn depth_counts_segments() {
        assert_eq!(path_depth("."), 0);
        assert_eq!(path_depth("Areas"), 1);
        assert_eq!(path_depth("Areas/Home/Kitchen"), 3);
    }
}
