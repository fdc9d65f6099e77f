//! Tests for comparing captured revisions.

use std::fs;
use std::path::PathBuf;

use filemon::diff::{ChangeRecord, DiffEngine, DiffStrategy};
use filemon::snapshot::SnapshotStore;
use tempfile::TempDir;

struct Setup {
    _temp: TempDir,
    store: SnapshotStore,
    file: PathBuf,
}

fn setup(name: &str) -> Setup {
    let temp = TempDir::new().unwrap();
    let store = SnapshotStore::new(Some(temp.path())).unwrap();
    let file = temp.path().join(name);
    Setup {
        _temp: temp,
        store,
        file,
    }
}

fn capture(setup: &Setup, content: &str) {
    fs::write(&setup.file, content).unwrap();
    setup.store.capture(&setup.file).unwrap();
}

fn none() -> Vec<String> {
    Vec::new()
}

#[test]
fn test_identical_revisions_yield_no_changes() {
    let s = setup("same.txt");
    capture(&s, "alpha\nbeta\n");
    capture(&s, "alpha\nbeta\n");

    assert_eq!(s.store.list_revisions(&s.file).unwrap().len(), 2);
    assert!(DiffEngine::default().compare(&s.store, &s.file).is_empty());
}

#[test]
fn test_trailing_newline_difference_yields_no_changes() {
    let s = setup("newline.txt");
    capture(&s, "alpha\nbeta");
    capture(&s, "alpha\nbeta\n\n");

    assert!(DiffEngine::default().compare(&s.store, &s.file).is_empty());
}

#[test]
fn test_fewer_than_two_revisions_yield_no_changes() {
    let s = setup("single.txt");
    let engine = DiffEngine::default();
    assert!(engine.compare(&s.store, &s.file).is_empty());

    capture(&s, "only\n");
    assert!(engine.compare(&s.store, &s.file).is_empty());
}

#[test]
fn test_reordering_reports_replacements_around_unchanged_line() {
    let s = setup("order.txt");
    capture(&s, "line1\nline2\nline3\n");
    capture(&s, "line3\nline2\nline1\n");

    assert_eq!(
        DiffEngine::default().compare(&s.store, &s.file),
        vec![
            ChangeRecord::new(["line1"], ["line3"]),
            ChangeRecord::new(["line3"], ["line1"]),
        ]
    );
}

#[test]
fn test_compare_twice_is_identical() {
    let s = setup("twice.txt");
    capture(&s, "a\nb\nc\n");
    capture(&s, "a\nB\nc\nd\n");

    let engine = DiffEngine::default();
    let first = engine.compare(&s.store, &s.file);
    assert_eq!(first, engine.compare(&s.store, &s.file));
    assert_eq!(
        first,
        vec![
            ChangeRecord::new(["b"], ["B"]),
            ChangeRecord::new(none(), ["d"]),
        ]
    );
}

#[test]
fn test_hello_scenario_append() {
    let s = setup("a.txt");
    capture(&s, "hello");
    capture(&s, "hello\nhello world");

    assert_eq!(
        DiffEngine::default().compare(&s.store, &s.file),
        vec![ChangeRecord::new(none(), ["hello world"])]
    );
}

#[test]
fn test_two_line_to_three_line_edit() {
    let s = setup("edit.txt");
    capture(&s, "hello\nworld\n");
    capture(&s, "hello\nthere\nworld\n");

    for strategy in [
        DiffStrategy::EditDistance,
        DiffStrategy::Myers,
        DiffStrategy::Patience,
    ] {
        assert_eq!(
            DiffEngine::new(strategy).compare(&s.store, &s.file),
            vec![ChangeRecord::new(none(), ["there"])],
            "strategy {strategy:?}"
        );
    }
}

#[test]
fn test_unequal_hunk_sides_preserved() {
    let s = setup("shrink.txt");
    capture(&s, "head\none\ntwo\nthree\ntail\n");
    capture(&s, "head\nmerged\ntail\n");

    let records = DiffEngine::default().compare(&s.store, &s.file);
    assert_eq!(
        records,
        vec![ChangeRecord::new(["one", "two", "three"], ["merged"])]
    );
}

#[test]
fn test_only_latest_two_revisions_compared() {
    let s = setup("history.txt");
    capture(&s, "v1\n");
    capture(&s, "v2\n");
    capture(&s, "v3\n");

    assert_eq!(
        DiffEngine::default().compare(&s.store, &s.file),
        vec![ChangeRecord::new(["v2"], ["v3"])]
    );
}
