//! `paravault` command line entry point.
//!
//! # Responsibility
//! - Run one hierarchy stage per invocation over a named snapshot.
//! - Report checklist suspension and validation warnings to the operator.
//!
//! # Invariants
//! - A suspended resolve run exits successfully and writes no snapshot.
//! - A declined validation prompt exits with failure and writes no snapshot.
//!   The resolve checklist survives both, so selections are never lost.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use paravault_core::db::open_db;
use paravault_core::hierarchy::layout::classify_notes;
use paravault_core::{
    default_log_level, init_logging, validate_notes, FileChecklistStore,
    JsonSnapshotRepository, MigratorConfig, Pipeline, ResolutionSummary, SnapshotRepository,
    SqliteSnapshotRepository, Stage, StageOutcome, StoreKind,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "paravault",
    version,
    about = "Resolve note hierarchy for a PARA vault migration"
)]
struct Cli {
    #[arg(long, global = true, help = "Config file (defaults to ./paravault.toml when present)")]
    config: Option<PathBuf>,

    #[arg(long, global = true, env = "PARAVAULT_LOG_LEVEL", help = "trace|debug|info|warn|error")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Assign categories and build the parent graph")]
    Graph(StageArgs),

    #[command(about = "Apply reclassification rules")]
    Reclassify(StageArgs),

    #[command(about = "Resolve notes with several parents via the checklist")]
    Resolve(StageArgs),

    #[command(about = "Assign output folder paths")]
    Paths(StageArgs),

    #[command(about = "Print planned file placement without writing")]
    Layout(StageArgs),
}

#[derive(Args)]
struct StageArgs {
    #[arg(help = "Input snapshot name")]
    input: String,
}

impl Command {
    fn input(&self) -> &str {
        match self {
            Self::Graph(args)
            | Self::Reclassify(args)
            | Self::Resolve(args)
            | Self::Paths(args)
            | Self::Layout(args) => &args.input,
        }
    }

    fn stage(&self) -> Option<Stage> {
        match self {
            Self::Graph(_) => Some(Stage::Graph),
            Self::Reclassify(_) => Some(Stage::Reclassify),
            Self::Resolve(_) => Some(Stage::Resolve),
            Self::Paths(_) => Some(Stage::Paths),
            Self::Layout(_) => None,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = MigratorConfig::load(cli.config.as_deref()).context("failed to load config")?;

    let level = cli
        .log_level
        .clone()
        .or_else(|| config.log_level.clone())
        .unwrap_or_else(|| default_log_level().to_string());
    if let Err(err) = init_logging(&level, &config.resolved_log_dir()) {
        eprintln!("warning: logging disabled: {err}");
    }

    let input = cli.command.input().to_string();
    match cli.command.stage() {
        Some(stage) => with_repository(&config, |repo| run_stage(&config, repo, stage, &input)),
        None => with_repository(&config, |repo| print_layout(repo, &input)),
    }
}

fn with_repository<T>(
    config: &MigratorConfig,
    body: impl FnOnce(&dyn SnapshotRepository) -> Result<T>,
) -> Result<T> {
    match config.store {
        StoreKind::Json => body(&JsonSnapshotRepository::new(&config.output_root)),
        StoreKind::Sqlite => {
            let path = config.sqlite_location();
            if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create `{}`", parent.display()))?;
            }
            let conn = open_db(&path)
                .with_context(|| format!("failed to open database `{}`", path.display()))?;
            body(&SqliteSnapshotRepository::new(&conn))
        }
    }
}

fn run_stage(
    config: &MigratorConfig,
    repo: &dyn SnapshotRepository,
    stage: Stage,
    input: &str,
) -> Result<ExitCode> {
    let checklist = FileChecklistStore::new(config.checklist_location());
    let pipeline = Pipeline::new(config.clone(), checklist, format!("paravault resolve {input}"));

    let outcome = pipeline
        .run_snapshot(repo, stage, input)
        .with_context(|| format!("{stage} stage failed for `{input}`"))?;

    let notes = match outcome {
        StageOutcome::Suspended(summary) => {
            print_suspension(&summary, &config.checklist_location(), input);
            return Ok(ExitCode::SUCCESS);
        }
        StageOutcome::Completed(notes) => notes,
    };

    let warnings = validate_notes(&notes);
    if !warnings.is_empty() {
        println!("Validation found {} problem(s):", warnings.len());
        for warning in &warnings {
            println!("  - {warning}");
        }
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        if !confirm_continue(&mut stdin.lock(), &mut stdout)? {
            warn!(
                "event=stage_abort module=cli status=declined stage={} warnings={}",
                stage.id(),
                warnings.len()
            );
            println!("Aborted; nothing written.");
            return Ok(ExitCode::FAILURE);
        }
    }

    let output = pipeline
        .commit_stage(repo, stage, input, &notes)
        .with_context(|| format!("failed to save output of {stage} stage"))?;
    info!(
        "event=stage_output module=cli status=ok stage={} input={} output={} notes={}",
        stage.id(),
        input,
        output,
        notes.len()
    );
    println!("{stage}: wrote `{output}` ({} notes)", notes.len());
    Ok(ExitCode::SUCCESS)
}

fn print_suspension(summary: &ResolutionSummary, checklist: &Path, input: &str) {
    let verb = if summary.generated { "Created" } else { "Updated" };
    println!("{verb} checklist `{}`.", checklist.display());
    println!(
        "{} note(s) still need a parent ({} already chosen):",
        summary.remaining(),
        summary.completed
    );
    for pending in &summary.pending {
        println!("  - {}: {}", pending.note_title, pending.issue);
    }
    println!("Tick one parent per note, then run `paravault resolve {input}` again.");
}

fn print_layout(repo: &dyn SnapshotRepository, input: &str) -> Result<ExitCode> {
    let notes = repo
        .load(input)
        .with_context(|| format!("failed to load snapshot `{input}`"))?;
    let partition = classify_notes(&notes);
    for note in &notes {
        let kind = if partition.is_container(&note.title) {
            "container"
        } else {
            "leaf"
        };
        println!("{kind}\t{}", partition.file_path(note));
    }
    println!(
        "{} container(s), {} leaf note(s)",
        partition.containers.len(),
        partition.leaves.len()
    );
    Ok(ExitCode::SUCCESS)
}

/// Asks `Continue anyway? (y/n)` until answered; end of input means no.
fn confirm_continue<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<bool> {
    loop {
        write!(output, "Continue anyway? (y/n) ")?;
        output.flush()?;
        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            return Ok(false);
        }
        match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => continue,
        }
    }
}
