//! Note hierarchy resolution for PARA vault migration.
//! This crate owns every rule that decides where a migrated note lives.

pub mod config;
pub mod db;
pub mod hierarchy;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validation;

pub use config::{ConfigError, MigratorConfig, StoreKind};
pub use hierarchy::graph::{assign_categories, build_parent_graph, CategoryTags, GraphStats};
pub use hierarchy::layout::{classify_notes, NotePartition};
pub use hierarchy::path::{assign_output_paths, sanitize_name, PathResolver};
pub use hierarchy::reclassify::{default_rules, reclassify, ReclassificationRule, ReclassifyReport};
pub use hierarchy::resolver::{
    plan_resolution, ChecklistState, MultiParentResolver, ResolutionOutcome, ResolutionStep,
    ResolutionSummary, ResolverError,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{Category, Note, NoteId, ParentKind, ParentRef};
pub use repo::checklist_store::{ChecklistStore, FileChecklistStore, MemoryChecklistStore};
pub use repo::snapshot_repo::{
    JsonSnapshotRepository, SnapshotError, SnapshotRepository, SqliteSnapshotRepository,
};
pub use service::pipeline::{Pipeline, PipelineError, Stage, StageOutcome};
pub use validation::{validate_notes, ValidationWarning};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
