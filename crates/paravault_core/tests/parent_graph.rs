use paravault_core::hierarchy::graph::{assign_categories, build_parent_graph, CategoryTags};
use paravault_core::hierarchy::path::assign_output_paths;
use paravault_core::hierarchy::prune::{prune_task_parents, PruneConfig};
use paravault_core::{
    Category, MemoryChecklistStore, MigratorConfig, Note, ParentKind, ParentRef, Pipeline, Stage,
    StageOutcome,
};

fn bootstrap(notes: &mut [Note]) {
    assign_categories(notes, &CategoryTags::default());
    build_parent_graph(notes);
}

fn titles(note: &Note) -> Vec<&str> {
    note.parents.iter().map(|parent| parent.title.as_str()).collect()
}

#[test]
fn note_parent_supersedes_fallback_category() {
    let mut notes = vec![
        Note::with_id("1", "Home").tagged(["Area"]),
        Note::with_id("2", "Groceries").tagged(["Home"]),
    ];
    bootstrap(&mut notes);
    assign_output_paths(&mut notes, false);

    let groceries = &notes[1];
    assert_eq!(groceries.category, Some(Category::Archive));
    assert_eq!(groceries.parents.len(), 1);
    assert_eq!(groceries.parents[0].title, "Home");
    assert_eq!(groceries.parents[0].kind, ParentKind::Note);
    assert_eq!(groceries.parents[0].id, "1");
    assert_eq!(groceries.output_path.as_deref(), Some("Areas/Home"));
}

#[test]
fn untagged_note_falls_back_to_archive_root() {
    let mut notes = vec![Note::with_id("1", "Orphan Task")];
    bootstrap(&mut notes);
    assign_output_paths(&mut notes, false);

    let orphan = &notes[0];
    assert_eq!(orphan.category, Some(Category::Archive));
    assert_eq!(orphan.parents, vec![ParentRef::category(Category::Archive)]);
    assert_eq!(orphan.parents[0].kind, ParentKind::Category);
    assert_eq!(orphan.output_path.as_deref(), Some("Archive"));
}

#[test]
fn categorized_note_keeps_category_first_and_becomes_ambiguous() {
    let mut notes = vec![
        Note::with_id("1", "Kitchen").tagged(["Area"]),
        Note::with_id("2", "Renovation").tagged(["Project", "Kitchen"]),
    ];
    bootstrap(&mut notes);

    assert_eq!(titles(&notes[1]), vec!["Projects", "Kitchen"]);
    assert!(notes[1].is_ambiguous());
}

#[test]
fn unknown_tags_and_self_references_are_ignored() {
    let mut notes = vec![
        Note::with_id("1", "Loop").tagged(["Loop", "Nowhere"]),
        Note::with_id("2", "Work").tagged(["Area"]),
    ];
    let stats = {
        assign_categories(&mut notes, &CategoryTags::default());
        build_parent_graph(&mut notes)
    };

    assert_eq!(titles(&notes[0]), vec!["Archive"]);
    assert_eq!(stats.self_references, 1);
    assert_eq!(stats.with_note_parent, 0);
}

#[test]
fn duplicate_tags_and_titles_keep_first_match() {
    let mut notes = vec![
        Note::with_id("a", "Shared"),
        Note::with_id("b", "Shared"),
        Note::with_id("c", "Child").tagged(["Shared", "Shared"]),
    ];
    bootstrap(&mut notes);

    let child = &notes[2];
    assert_eq!(child.parents.len(), 1);
    assert_eq!(child.parents[0].id, "a");
}

#[test]
fn rebuilding_the_graph_is_stable() {
    let mut notes = vec![
        Note::with_id("1", "Home").tagged(["Area"]),
        Note::with_id("2", "Garden").tagged(["Home", "Project"]),
    ];
    bootstrap(&mut notes);
    let first = notes.clone();
    bootstrap(&mut notes);
    assert_eq!(notes, first);
}

#[test]
fn task_pruning_drops_system_parents_and_prefers_contained_title() {
    let mut notes = vec![
        Note::with_id("1", "Today"),
        Note::with_id("2", "Taxes"),
        Note::with_id("3", "Garage"),
        Note::with_id("4", "Taxes: file return").tagged(["Task", "Today", "Taxes", "Garage"]),
    ];
    bootstrap(&mut notes);
    assert_eq!(titles(&notes[3]), vec!["Today", "Taxes", "Garage"]);

    let stats = prune_task_parents(&mut notes, &PruneConfig::default());

    assert_eq!(titles(&notes[3]), vec!["Taxes"]);
    assert_eq!(stats.tasks_stripped, 1);
    assert_eq!(stats.parents_stripped, 1);
    assert_eq!(stats.tasks_collapsed, 1);

    let again = prune_task_parents(&mut notes, &PruneConfig::default());
    assert_eq!(again.parents_stripped, 0);
    assert_eq!(again.tasks_collapsed, 0);
}

#[test]
fn graph_stage_keeps_archive_root_on_orphan_task() {
    let pipeline = Pipeline::new(MigratorConfig::default(), MemoryChecklistStore::new(), "rerun");

    let outcome = pipeline
        .run_stage(
            Stage::Graph,
            vec![Note::with_id("1", "Orphan Task").tagged(["Task"])],
        )
        .unwrap();

    let StageOutcome::Completed(notes) = outcome else {
        panic!("graph stage never suspends");
    };
    assert_eq!(notes[0].category, Some(Category::Archive));
    assert_eq!(notes[0].parents, vec![ParentRef::category(Category::Archive)]);
}
