use paravault_core::hierarchy::layout::{classify_notes, container_titles};
use paravault_core::hierarchy::path::assign_output_paths;
use paravault_core::{Category, Note, ParentRef};
use std::collections::BTreeSet;

fn batch() -> Vec<Note> {
    let mut home = Note::with_id("1", "Home");
    home.category = Some(Category::Area);
    home.parents = vec![ParentRef::category(Category::Area)];

    let mut kitchen = Note::with_id("2", "Kitchen");
    kitchen.parents = vec![ParentRef::note(&home)];

    let mut fridge = Note::with_id("3", "Fridge");
    fridge.parents = vec![ParentRef::note(&kitchen)];

    let mut stray = Note::with_id("4", "Stray");
    stray.category = Some(Category::Archive);
    stray.parents = vec![ParentRef::category(Category::Archive)];

    vec![home, kitchen, fridge, stray]
}

#[test]
fn partition_is_total_and_disjoint() {
    let notes = batch();
    let partition = classify_notes(&notes);

    let all: BTreeSet<String> = notes.iter().map(|note| note.title.clone()).collect();
    let union: BTreeSet<String> = partition
        .containers
        .union(&partition.leaves)
        .cloned()
        .collect();
    assert_eq!(union, all);
    assert!(partition.containers.is_disjoint(&partition.leaves));
    assert_eq!(partition.len(), notes.len());
    assert_eq!(
        partition.containers,
        BTreeSet::from(["Home".to_string(), "Kitchen".to_string()])
    );
}

#[test]
fn self_parent_and_dangling_parent_do_not_make_containers() {
    let mut echo = Note::with_id("1", "Echo");
    echo.parents = vec![ParentRef::note(&echo)];
    let ghost = Note::with_id("g", "Ghost");
    let mut child = Note::with_id("2", "Child");
    child.parents = vec![ParentRef::note(&ghost)];

    let containers = container_titles(&[echo, child]);

    assert!(containers.is_empty());
}

#[test]
fn secondary_parents_are_not_containers() {
    let mut notes = batch();
    let stray = notes[3].clone();
    notes[2].parents.push(ParentRef::note(&stray));

    let partition = classify_notes(&notes);

    assert!(!partition.is_container("Stray"));
}

#[test]
fn containers_get_their_own_folder() {
    let mut notes = batch();
    assign_output_paths(&mut notes, false);
    let partition = classify_notes(&notes);

    assert_eq!(partition.file_path(&notes[0]), "Areas/Home/Home.md");
    assert_eq!(partition.file_path(&notes[1]), "Areas/Home/Kitchen/Kitchen.md");
    assert_eq!(partition.file_path(&notes[2]), "Areas/Home/Kitchen/Fridge.md");
    assert_eq!(partition.file_path(&notes[3]), "Archive/Stray.md");
}

#[test]
fn classification_follows_parent_changes() {
    let mut notes = batch();
    assert!(classify_notes(&notes).is_container("Kitchen"));

    notes[2].parents = vec![ParentRef::category(Category::Area)];

    let partition = classify_notes(&notes);
    assert!(!partition.is_container("Kitchen"));
    assert!(partition.leaves.contains("Kitchen"));
}
