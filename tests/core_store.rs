use std::collections::BTreeSet;

use contactbook::{
    contact::{Contact, ContactPatch},
    core::store::{ContactStore, StoreError},
};

fn contact(first: &str, last: &str) -> Contact {
    Contact::new(first, last, "", "")
}

fn names(store: &ContactStore) -> Vec<String> {
    store.iter().map(Contact::full_name).collect()
}

fn store_of(contacts: Vec<Contact>) -> ContactStore {
    ContactStore::from_contacts(contacts).expect("store")
}

#[test]
fn insert_lands_in_sorted_position() {
    let mut store = store_of(vec![contact("Jane", "Smith"), contact("George", "Jones")]);
    assert_eq!(names(&store), ["George Jones", "Jane Smith"]);

    let index = store.insert(contact("Kim", "Wilson")).expect("insert");
    assert_eq!(index, 2);
    assert_eq!(names(&store), ["George Jones", "Jane Smith", "Kim Wilson"]);

    let index = store.insert(contact("Ann", "Adams")).expect("insert");
    assert_eq!(index, 0);
    let index = store.insert(contact("Adam", "Smith")).expect("insert");
    assert_eq!(index, 2);
    assert_eq!(
        names(&store),
        ["Ann Adams", "George Jones", "Adam Smith", "Jane Smith", "Kim Wilson"]
    );
}

#[test]
fn equal_names_insert_after_existing() {
    let first = contact("Jane", "Smith");
    let second = contact("Jane", "Smith");
    let mut store = store_of(vec![first.clone()]);
    let index = store.insert(second.clone()).expect("insert");
    assert_eq!(index, 1);
    assert_eq!(store.contacts()[0].id(), first.id());
    assert_eq!(store.contacts()[1].id(), second.id());
}

#[test]
fn duplicate_insert_is_rejected_without_change() {
    let jane = contact("Jane", "Smith");
    let mut store = store_of(vec![jane.clone()]);
    let err = store.insert(jane.clone()).unwrap_err();
    assert_eq!(err, StoreError::AlreadyExists(jane.id()));
    assert_eq!(store.len(), 1);
}

#[test]
fn update_resorts_and_keeps_identity() {
    let jane = contact("Jane", "Smith");
    let mut store = store_of(vec![jane.clone()]);

    let mut edited = jane.clone();
    edited.set_last_name("Adams");
    let index = store.update(edited).expect("update");

    assert_eq!(index, 0);
    assert_eq!(store.len(), 1);
    assert_eq!(names(&store), ["Jane Adams"]);
    assert_eq!(store.contacts()[0].id(), jane.id());
    assert_eq!(store.get(jane.id()).expect("get").last_name(), "Adams");
}

#[test]
fn update_moves_contact_across_neighbours() {
    let george = contact("George", "Jones");
    let jane = contact("Jane", "Smith");
    let kim = contact("Kim", "Wilson");
    let mut store = store_of(vec![george.clone(), jane, kim]);

    let mut moved = george.clone();
    moved.set_last_name("Young");
    let index = store.update(moved).expect("update");
    assert_eq!(index, 2);
    assert_eq!(names(&store), ["Jane Smith", "Kim Wilson", "George Young"]);
    assert_eq!(store.position(george.id()), Some(2));
}

#[test]
fn update_unknown_id_fails_without_change() {
    let mut store = store_of(vec![contact("Jane", "Smith")]);
    let stranger = contact("Kim", "Wilson");
    let err = store.update(stranger.clone()).unwrap_err();
    assert_eq!(err, StoreError::MissingContact(stranger.id()));
    assert_eq!(names(&store), ["Jane Smith"]);
}

#[test]
fn patch_changes_fields_and_order() {
    let george = contact("George", "Jones");
    let jane = contact("Jane", "Smith");
    let mut store = store_of(vec![george, jane.clone()]);

    let index = store
        .patch(
            jane.id(),
            &ContactPatch {
                last_name: Some(" Brown ".to_string()),
                phone: Some("614-555-0000".to_string()),
                ..ContactPatch::default()
            },
        )
        .expect("patch");
    assert_eq!(index, 0);
    let stored = store.get(jane.id()).expect("get");
    assert_eq!(stored.last_name(), "Brown");
    assert_eq!(stored.phone(), "614-555-0000");
}

#[test]
fn remove_at_uses_pre_removal_positions() {
    let mut store = store_of(vec![contact("George", "Jones"), contact("Jane", "Smith")]);
    let removed = store.remove_at(&BTreeSet::from([0])).expect("remove");
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].full_name(), "George Jones");
    assert_eq!(names(&store), ["Jane Smith"]);

    let mut store = store_of(vec![
        contact("Ann", "Adams"),
        contact("George", "Jones"),
        contact("Jane", "Smith"),
        contact("Kim", "Wilson"),
    ]);
    let removed = store.remove_at(&BTreeSet::from([0, 2, 3])).expect("remove");
    assert_eq!(removed.iter().map(Contact::full_name).collect::<Vec<_>>(), ["Ann Adams", "Jane Smith", "Kim Wilson"]);
    assert_eq!(names(&store), ["George Jones"]);
    for c in &removed {
        assert!(store.get(c.id()).is_none());
    }
    assert_eq!(store.position(store.contacts()[0].id()), Some(0));
}

#[test]
fn remove_at_out_of_range_changes_nothing() {
    let mut store = store_of(vec![contact("George", "Jones"), contact("Jane", "Smith")]);
    let err = store.remove_at(&BTreeSet::from([0, 2])).unwrap_err();
    assert_eq!(err, StoreError::IndexOutOfRange { index: 2, len: 2 });
    assert_eq!(store.len(), 2);

    let removed = store.remove_at(&BTreeSet::new()).expect("empty remove");
    assert!(removed.is_empty());
    assert_eq!(store.len(), 2);
}

#[test]
fn remove_by_id_reindexes() {
    let george = contact("George", "Jones");
    let jane = contact("Jane", "Smith");
    let kim = contact("Kim", "Wilson");
    let mut store = store_of(vec![george.clone(), jane, kim.clone()]);

    let removed = store.remove(george.id()).expect("remove");
    assert_eq!(removed.id(), george.id());
    assert_eq!(store.position(kim.id()), Some(1));
    assert_eq!(store.remove(george.id()).unwrap_err(), StoreError::MissingContact(george.id()));
}

#[test]
fn sort_is_idempotent() {
    let mut store = store_of(vec![
        contact("Kim", "Wilson"),
        contact("Jane", "Smith"),
        contact("George", "Jones"),
    ]);
    let before = store.export();
    store.sort();
    store.sort();
    assert_eq!(store.export(), before);
}

#[test]
fn from_contacts_rejects_duplicate_ids() {
    let jane = contact("Jane", "Smith");
    let err = ContactStore::from_contacts(vec![jane.clone(), contact("Kim", "Wilson"), jane.clone()]).unwrap_err();
    assert_eq!(err, StoreError::DuplicateIds(jane.id()));
}

#[test]
fn dirty_flag_tracks_mutations() {
    let mut store = ContactStore::new();
    assert!(!store.is_dirty());

    let jane = contact("Jane", "Smith");
    store.insert(jane.clone()).expect("insert");
    assert!(store.is_dirty());

    store.finish_save(Ok(0)).expect("clean");
    assert!(!store.is_dirty());

    store.sort();
    assert!(!store.is_dirty());

    let _ = store.update(contact("Nobody", "Here"));
    assert!(!store.is_dirty());

    store.remove(jane.id()).expect("remove");
    assert!(store.is_dirty());
}
