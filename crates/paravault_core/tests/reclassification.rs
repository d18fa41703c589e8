use paravault_core::hierarchy::graph::{assign_categories, build_parent_graph, CategoryTags};
use paravault_core::hierarchy::path::assign_output_paths;
use paravault_core::hierarchy::reclassify::{default_rules, reclassify, ReclassificationRule};
use paravault_core::{Category, Note, ParentRef};

fn graph(notes: Vec<Note>) -> Vec<Note> {
    let mut notes = notes;
    assign_categories(&mut notes, &CategoryTags::default());
    build_parent_graph(&mut notes);
    notes
}

#[test]
fn done_project_moves_to_archive() {
    let mut notes = graph(vec![Note::with_id("1", "Launch site").tagged(["Project", "Done"])]);

    let report = reclassify(&mut notes, &default_rules());

    assert_eq!(notes[0].category, Some(Category::Archive));
    assert_eq!(notes[0].parents, vec![ParentRef::category(Category::Archive)]);
    assert_eq!(report.changed.get("done"), Some(&1));
    assert_eq!(report.total_changed(), 1);
}

#[test]
fn parked_wins_over_done_and_lands_in_subfolder() {
    let mut notes = graph(vec![
        Note::with_id("1", "Boat").tagged(["Project", "Parked", "Done"]),
    ]);

    let report = reclassify(&mut notes, &default_rules());
    assign_output_paths(&mut notes, true);

    assert_eq!(notes[0].category, Some(Category::Project));
    assert_eq!(notes[0].category_subfolder.as_deref(), Some("z_Parked"));
    assert_eq!(notes[0].output_path.as_deref(), Some("1 Projects/z_Parked"));
    assert_eq!(report.changed.get("parked"), Some(&1));
    assert_eq!(report.changed.get("done"), None);
}

#[test]
fn nested_note_is_left_alone() {
    let mut notes = graph(vec![
        Note::with_id("1", "Home").tagged(["Area"]),
        Note::with_id("2", "Old fence").tagged(["Project", "Done", "Home"]),
    ]);
    let before = notes[1].clone();

    let report = reclassify(&mut notes, &default_rules());

    assert_eq!(notes[1], before);
    assert_eq!(report.total_changed(), 0);
    assert_eq!(report.nested_skipped, 1);
}

#[test]
fn rerunning_rules_is_a_no_op() {
    let mut notes = graph(vec![
        Note::with_id("1", "Boat").tagged(["Project", "Parked"]),
        Note::with_id("2", "Launch").tagged(["Project", "Done"]),
    ]);
    reclassify(&mut notes, &default_rules());
    let once = notes.clone();

    let report = reclassify(&mut notes, &default_rules());

    assert_eq!(notes, once);
    assert_eq!(report.total_changed(), 0);
    // Parked still matches (Project -> Project) but changes nothing.
    assert_eq!(report.unchanged, 1);
}

#[test]
fn custom_rules_apply_in_given_order() {
    let rules = vec![
        ReclassificationRule {
            name: "someday".to_string(),
            required_tags: vec!["Someday".to_string()],
            from: Category::Project,
            to: Category::Resource,
            subfolder: Some("Ideas".to_string()),
        },
        ReclassificationRule {
            name: "catch_all".to_string(),
            required_tags: Vec::new(),
            from: Category::Project,
            to: Category::Archive,
            subfolder: None,
        },
    ];
    let mut notes = graph(vec![
        Note::with_id("1", "Sailing").tagged(["Project", "Someday"]),
        Note::with_id("2", "Taxes").tagged(["Project"]),
        Note::with_id("3", "Kitchen").tagged(["Area"]),
    ]);

    let report = reclassify(&mut notes, &rules);

    assert_eq!(notes[0].category, Some(Category::Resource));
    assert_eq!(notes[0].category_subfolder.as_deref(), Some("Ideas"));
    assert_eq!(notes[1].category, Some(Category::Archive));
    assert_eq!(notes[2].category, Some(Category::Area));
    assert_eq!(report.changed.get("someday"), Some(&1));
    assert_eq!(report.changed.get("catch_all"), Some(&1));
}
