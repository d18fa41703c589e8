//! Parent pruning for task-like notes.
//!
//! # Responsibility
//! - Drop organisational parents (`Today`, `Parked`...) from tasks.
//! - Collapse a task's parents onto the one its title is derived from.
//!
//! # Invariants
//! - Only notes carrying the task tag are touched.
//! - Category parents are never stripped, even when their root name is
//!   listed as a system parent.
//! - Both passes are idempotent.

use crate::model::note::{Note, ParentKind};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Pruning knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PruneConfig {
    /// Tag marking task-like notes.
    pub task_tag: String,
    /// Parent titles that carry no structural meaning for tasks.
    pub system_parents: BTreeSet<String>,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            task_tag: "Task".to_string(),
            system_parents: ["Parked", "Today", "TodayCandidate", "Archive", "Task", "WhileOut"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Counters reported by pruning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneStats {
    pub tasks_stripped: usize,
    pub parents_stripped: usize,
    pub tasks_collapsed: usize,
}

/// Runs both pruning passes in order.
pub fn prune_task_parents(notes: &mut [Note], config: &PruneConfig) -> PruneStats {
    let mut stats = PruneStats::default();
    let (tasks, parents) = strip_system_parents(notes, config);
    stats.tasks_stripped = tasks;
    stats.parents_stripped = parents;
    stats.tasks_collapsed = prefer_contained_parent(notes, &config.task_tag);

    info!(
        "event=task_prune module=hierarchy status=ok tasks_stripped={} parents_stripped={} tasks_collapsed={}",
        stats.tasks_stripped, stats.parents_stripped, stats.tasks_collapsed
    );
    stats
}

/// Removes note-kind system parents from task notes.
///
/// Returns `(tasks_modified, parents_removed)`.
pub fn strip_system_parents(notes: &mut [Note], config: &PruneConfig) -> (usize, usize) {
    let mut tasks_modified = 0;
    let mut parents_removed = 0;
    for note in notes.iter_mut() {
        if !note.has_tag(&config.task_tag) || note.parents.is_empty() {
            continue;
        }
        let before = note.parents.len();
        note.parents.retain(|parent| {
            parent.kind != ParentKind::Note || !config.system_parents.contains(&parent.title)
        });
        let removed = before - note.parents.len();
        if removed > 0 {
            tasks_modified += 1;
            parents_removed += removed;
        }
    }
    (tasks_modified, parents_removed)
}

/// Keeps only the parent whose title is a proper substring of the task title.
///
/// Handles tasks like `Arlo: charge battery 2025-12-14` filed under both
/// `Arlo: charge battery` and `Home`. Returns the number of tasks collapsed.
pub fn prefer_contained_parent(notes: &mut [Note], task_tag: &str) -> usize {
    let mut collapsed = 0;
    for note in notes.iter_mut() {
        if !note.has_tag(task_tag) || note.parents.len() <= 1 {
            continue;
        }
        let contained = note.parents.iter().position(|parent| {
            !parent.title.is_empty()
                && parent.title != note.title
                && note.title.contains(parent.title.as_str())
        });
        if let Some(position) = contained {
            let keep = note.parents.swap_remove(position);
            note.parents = vec![keep];
            collapsed += 1;
        }
    }
    collapsed
}
