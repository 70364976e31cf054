mod common;

use common::*;
use entity_patch::memory::MemoryStore;
use entity_patch::{ApplyOptions, Error, Node, PatchError, PointerError, Store};
use serde_json::json;

fn seeded() -> MemoryStore {
    let mut store = MemoryStore::new();
    seed_authors(&mut store, &["Jeff", "Mary"]);
    store
}

#[test]
fn root_pointers_resolve_to_the_root() {
    let mut store = seeded();
    let everyone = json!([{"id": 1, "name": "Jeff"}, {"id": 2, "name": "Mary"}]);
    for path in ["", "/", "/ "] {
        let mut root = authors();
        run(
            &mut root,
            &mut store,
            json!([{"op": "test", "path": path, "value": everyone}]),
        )
        .unwrap_or_else(|err| panic!("{path:?}: {err}"));
    }
}

#[test]
fn non_integer_index() {
    let mut store = seeded();
    for mut root in [authors(), author_list(&store)] {
        let err = run(
            &mut root,
            &mut store,
            json!([{"op": "test", "path": "/abc/name", "value": "Jeff"}]),
        )
        .unwrap_err();
        assert_eq!(err, Error::Pointer(PointerError::IndexNotInt("abc".into())));
    }

    let mut root = authors();
    let err = run(&mut root, &mut store, json!([{"op": "remove", "path": "/abc"}])).unwrap_err();
    assert_eq!(err, Error::Patch(PatchError::IndexNotInt("abc".into())));
}

#[test]
fn out_of_range_index() {
    let mut store = seeded();
    for mut root in [authors(), author_list(&store)] {
        let err = run(
            &mut root,
            &mut store,
            json!([{"op": "test", "path": "/5/name", "value": "Jeff"}]),
        )
        .unwrap_err();
        assert_eq!(err, Error::Pointer(PointerError::IndexOutOfRange("5".into())));
    }

    let mut root = authors();
    let err = run(&mut root, &mut store, json!([{"op": "remove", "path": "/5"}])).unwrap_err();
    assert_eq!(err, Error::Patch(PatchError::IndexOutOfRange("5".into())));
}

#[test]
fn test_on_empty_collection_is_a_pointer_error() {
    let mut store = MemoryStore::new();
    let mut root = authors();
    let err = run(
        &mut root,
        &mut store,
        json!([{"op": "test", "path": "/0", "value": {}}]),
    )
    .unwrap_err();
    assert_eq!(err, Error::Pointer(PointerError::IndexOutOfRange("0".into())));
}

#[test]
fn test_leaves_everything_unchanged() {
    let mut store = seeded();
    let mut root = author_list(&store);
    let before = root.clone();

    run(
        &mut root,
        &mut store,
        json!([{"op": "test", "path": "/0/name", "value": "Jeff"}]),
    )
    .unwrap();
    assert_eq!(root, before);

    let err = run(
        &mut root,
        &mut store,
        json!([{"op": "test", "path": "/0/name", "value": "Bob"}]),
    )
    .unwrap_err();
    assert_eq!(
        err,
        Error::Patch(PatchError::ValueMismatch {
            expected: json!("Bob"),
            actual: json!("Jeff"),
        })
    );
    assert_eq!(root, before);
    assert_eq!(names(&store), vec![json!("Jeff"), json!("Mary")]);
}

#[test]
fn add_at_occupied_index() {
    let mut store = seeded();
    let mut root = authors();
    let err = run(
        &mut root,
        &mut store,
        json!([{"op": "add", "path": "/1", "value": {"name": "Ann"}}]),
    )
    .unwrap_err();
    assert_eq!(err, Error::Patch(PatchError::EntryExists("1".into())));
    assert_eq!(store.len("author"), 2);
}

#[test]
fn add_needs_an_object_value() {
    let mut store = MemoryStore::new();
    let mut root = authors();
    let err = run(
        &mut root,
        &mut store,
        json!([{"op": "add", "path": "/0", "value": "Ann"}]),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Patch(PatchError::InvalidValue(_))));
}

#[test]
fn unsupported_verb_fails_before_anything_runs() {
    let mut store = MemoryStore::new();
    let mut root = authors();
    let err = run(
        &mut root,
        &mut store,
        json!([
            {"op": "add", "path": "/0", "value": {"name": "Ann"}},
            {"op": "xyz", "path": "/0"}
        ]),
    )
    .unwrap_err();
    assert_eq!(err, Error::Patch(PatchError::Unsupported("xyz".into())));
    assert!(store.is_empty());
}

#[test]
fn malformed_descriptors() {
    let mut store = MemoryStore::new();
    let cases = [
        (json!([{"path": "/0"}]), PatchError::MissingOp),
        (json!([{"op": "remove"}]), PatchError::MissingPath),
        (
            json!([{"op": "add", "path": "/0"}]),
            PatchError::InvalidOp("add requires 'value'".into()),
        ),
        (
            json!({"op": "remove", "path": "/0"}),
            PatchError::InvalidOp("patch must be an array".into()),
        ),
    ];
    for (patch, expected) in cases {
        let mut root = authors();
        assert_eq!(run(&mut root, &mut store, patch).unwrap_err(), Error::Patch(expected));
    }
}

#[test]
fn move_and_copy_are_not_implemented() {
    let mut store = seeded();
    for (verb, name) in [("move", "move"), ("copy", "copy")] {
        let mut root = authors();
        let err = run(
            &mut root,
            &mut store,
            json!([{"op": verb, "path": "/1", "from": "/0"}]),
        )
        .unwrap_err();
        assert_eq!(err, Error::NotImplemented(name));
    }
    assert_eq!(store.len("author"), 2);
}

#[test]
fn replace_rejects_unknown_and_collection_fields() {
    let mut store = seeded();
    let mut root = authors();

    let err = run(
        &mut root,
        &mut store,
        json!([{"op": "replace", "path": "/0/nope", "value": 1}]),
    )
    .unwrap_err();
    assert_eq!(
        err,
        Error::Pointer(PointerError::UnknownField {
            kind: "author".into(),
            field: "nope".into(),
        })
    );

    let err = run(
        &mut root,
        &mut store,
        json!([{"op": "replace", "path": "/0/books", "value": []}]),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Patch(PatchError::InvalidTarget(_))));
}

#[test]
fn replace_runs_validation() {
    let mut store = seeded();
    let mut root = authors();
    let long = "x".repeat(256);
    let err = run(
        &mut root,
        &mut store,
        json!([{"op": "replace", "path": "/0/name", "value": long}]),
    )
    .unwrap_err();
    let Error::Patch(PatchError::FailedValidation(errors)) = &err else {
        panic!("expected a validation failure, got {err:?}");
    };
    assert_eq!(
        errors.get("name"),
        Some(&["Ensure this value has at most 255 characters (it has 256).".to_string()][..])
    );
    assert_eq!(names(&store), vec![json!("Jeff"), json!("Mary")]);
}

#[test]
fn add_reports_missing_required_fields() {
    let mut store = MemoryStore::new();
    let mut root = authors();
    let err = run(
        &mut root,
        &mut store,
        json!([{"op": "add", "path": "/0", "value": {"nickname": "J"}}]),
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "failed validation: name: This field is required."
    );
}

#[test]
fn remove_needs_an_entity() {
    let mut store = seeded();
    let mut root = authors();

    let err = run(&mut root, &mut store, json!([{"op": "remove", "path": "/0/name"}])).unwrap_err();
    assert!(matches!(err, Error::Patch(PatchError::InvalidTarget(_))));

    let err = run(&mut root, &mut store, json!([{"op": "remove", "path": "/"}])).unwrap_err();
    assert!(matches!(err, Error::Patch(PatchError::InvalidTarget(_))));
    assert_eq!(store.len("author"), 2);
}

#[test]
fn remove_entity_root() {
    let mut store = seeded();
    let mut root = Node::Entity(store.find("author", 2).unwrap().unwrap());
    run(&mut root, &mut store, json!([{"op": "remove", "path": ""}])).unwrap();
    assert_eq!(names(&store), vec![json!("Jeff")]);
}

#[test]
fn save_false_writes_nothing() {
    let mut store = seeded();
    let mut root = author_list(&store);
    let before = root.clone();
    let options = ApplyOptions {
        save: false,
        ..ApplyOptions::default()
    };

    let result = run_with(
        &mut root,
        &mut store,
        json!([
            {"op": "add", "path": "/-", "value": {"name": "Ann"}},
            {"op": "replace", "path": "/0/name", "value": "Jeffrey"},
            {"op": "remove", "path": "/1"}
        ]),
        &options,
    )
    .unwrap();

    let added = result.res[0].entity.clone().unwrap();
    assert_eq!((added.id, added.get("name")), (None, json!("Ann")));
    let replaced = result.res[1].entity.clone().unwrap();
    assert_eq!(replaced.get("name"), json!("Jeffrey"));
    assert_eq!(root, before);
    assert_eq!(names(&store), vec![json!("Jeff"), json!("Mary")]);
}

#[test]
fn failure_keeps_earlier_operations_without_atomic() {
    let mut store = seeded();
    let mut root = authors();
    let err = run(
        &mut root,
        &mut store,
        json!([
            {"op": "remove", "path": "/0"},
            {"op": "test", "path": "/0/name", "value": "Jeff"}
        ]),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Patch(PatchError::ValueMismatch { .. })));
    assert_eq!(names(&store), vec![json!("Mary")]);
}
