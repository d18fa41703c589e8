//! Stage pipeline over note batches.
//!
//! # Responsibility
//! - Run one hierarchy stage over a batch with the configured knobs.
//! - Load stage input from and store stage output to a `SnapshotRepository`.
//!
//! # Invariants
//! - Stages never drop or reorder notes.
//! - A suspended resolve stage produces no output snapshot.
//! - The checklist outlives a completed resolve run until its output is
//!   committed.
//! - Output snapshot name is the input name followed by the stage id.

use crate::config::MigratorConfig;
use crate::hierarchy::graph::{assign_categories, build_parent_graph};
use crate::hierarchy::path::assign_output_paths;
use crate::hierarchy::prune::prune_task_parents;
use crate::hierarchy::reclassify::reclassify;
use crate::hierarchy::resolver::{
    MultiParentResolver, ResolutionOutcome, ResolutionSummary, ResolverError,
};
use crate::model::note::Note;
use crate::repo::checklist_store::ChecklistStore;
use crate::repo::snapshot_repo::{SnapshotError, SnapshotRepository};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Pipeline stage; the id is appended to the snapshot name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Graph,
    Reclassify,
    Resolve,
    Paths,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Graph, Stage::Reclassify, Stage::Resolve, Stage::Paths];

    pub fn id(self) -> &'static str {
        match self {
            Self::Graph => "G",
            Self::Reclassify => "R",
            Self::Resolve => "I",
            Self::Paths => "P",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Graph => "graph",
            Self::Reclassify => "reclassify",
            Self::Resolve => "resolve",
            Self::Paths => "paths",
        }
    }

    /// Snapshot name written by this stage for `input`.
    pub fn output_name(self, input: &str) -> String {
        format!("{input}{}", self.id())
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    Completed(Vec<Note>),
    /// Resolve stage is waiting for the human to edit the checklist.
    Suspended(ResolutionSummary),
}

#[derive(Debug)]
pub enum PipelineError {
    Resolver(ResolverError),
    Snapshot(SnapshotError),
}

impl Display for PipelineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolver(err) => write!(f, "{err}"),
            Self::Snapshot(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Resolver(err) => Some(err),
            Self::Snapshot(err) => Some(err),
        }
    }
}

impl From<ResolverError> for PipelineError {
    fn from(value: ResolverError) -> Self {
        Self::Resolver(value)
    }
}

impl From<SnapshotError> for PipelineError {
    fn from(value: SnapshotError) -> Self {
        Self::Snapshot(value)
    }
}

/// Runs stages with one configuration and one checklist store.
pub struct Pipeline<C: ChecklistStore> {
    config: MigratorConfig,
    resolver: MultiParentResolver<C>,
}

impl<C: ChecklistStore> Pipeline<C> {
    /// `rerun_hint` is the command printed in the checklist instructions.
    pub fn new(config: MigratorConfig, checklist: C, rerun_hint: impl Into<String>) -> Self {
        Self {
            config,
            resolver: MultiParentResolver::new(checklist, rerun_hint),
        }
    }

    /// Runs `stage` over an in-memory batch.
    pub fn run_stage(&self, stage: Stage, mut notes: Vec<Note>) -> Result<StageOutcome, PipelineError> {
        let started_at = Instant::now();
        let count = notes.len();
        match stage {
            Stage::Graph => {
                assign_categories(&mut notes, &self.config.category_tags);
                build_parent_graph(&mut notes);
                prune_task_parents(&mut notes, &self.config.prune);
            }
            Stage::Reclassify => {
                reclassify(&mut notes, &self.config.reclassify_rules);
            }
            Stage::Resolve => match self.resolver.run(&mut notes) {
                Ok(ResolutionOutcome::Suspended(summary)) => {
                    info!(
                        "event=stage_run module=service status=suspended stage={} notes={} duration_ms={}",
                        stage.id(),
                        count,
                        started_at.elapsed().as_millis()
                    );
                    return Ok(StageOutcome::Suspended(summary));
                }
                Ok(ResolutionOutcome::NothingToResolve | ResolutionOutcome::Resolved { .. }) => {}
                Err(err) => {
                    error!(
                        "event=stage_run module=service status=error stage={} error={}",
                        stage.id(),
                        err
                    );
                    return Err(err.into());
                }
            },
            Stage::Paths => {
                assign_output_paths(&mut notes, self.config.ordinal_prefixes);
            }
        }

        info!(
            "event=stage_run module=service status=ok stage={} notes={} duration_ms={}",
            stage.id(),
            count,
            started_at.elapsed().as_millis()
        );
        Ok(StageOutcome::Completed(notes))
    }

    /// Loads `input` from `repo` and runs `stage` over it.
    pub fn run_snapshot<R: SnapshotRepository + ?Sized>(
        &self,
        repo: &R,
        stage: Stage,
        input: &str,
    ) -> Result<StageOutcome, PipelineError> {
        let notes = repo.load(input)?;
        self.run_stage(stage, notes)
    }

    /// Stores a completed stage batch and returns the output snapshot name.
    ///
    /// After a resolve batch is stored the checklist is discarded. A failed
    /// save leaves it in place for the next run.
    pub fn commit_stage<R: SnapshotRepository + ?Sized>(
        &self,
        repo: &R,
        stage: Stage,
        input: &str,
        notes: &[Note],
    ) -> Result<String, PipelineError> {
        let output = stage.output_name(input);
        repo.save(&output, notes)?;
        if stage == Stage::Resolve {
            self.resolver.discard_checklist()?;
        }
        Ok(output)
    }
}
