//! Tests for scratch entry naming.

use std::path::{Path, PathBuf};

use filemon::snapshot::{
    decode_path, encode_path, list_revisions_in, parse_storage_name, SnapshotStore,
};
use tempfile::TempDir;

#[test]
fn test_naming_round_trip() {
    for path in [
        "/a",
        "/tmp/a.txt",
        "/etc/nginx/sites-enabled/default",
        "/home/user/My Documents/report.final.txt",
    ] {
        let token = encode_path(Path::new(path));
        assert!(!token.contains('/'));
        assert_eq!(decode_path(&token), PathBuf::from(path));
    }
}

#[test]
fn test_captured_entry_decodes_to_source() {
    let temp = TempDir::new().unwrap();
    let store = SnapshotStore::new(Some(temp.path())).unwrap();
    let file = temp.path().join("config.ini");
    std::fs::write(&file, "[core]\n").unwrap();

    let revision = store.capture(&file).unwrap();
    let name = revision.storage_name();
    let (timestamp, token) = parse_storage_name(&name).unwrap();

    assert_eq!(timestamp, revision.timestamp());
    assert_eq!(token, encode_path(&file));
    assert_eq!(decode_path(token), file);
}

#[test]
fn test_scratch_dir_is_flat_and_shared() {
    let temp = TempDir::new().unwrap();
    let store = SnapshotStore::new(Some(temp.path())).unwrap();
    let first = temp.path().join("one.txt");
    let second = temp.path().join("two.txt");
    std::fs::write(&first, "1").unwrap();
    std::fs::write(&second, "2").unwrap();

    store.capture(&first).unwrap();
    store.capture(&second).unwrap();

    let entries: Vec<_> = std::fs::read_dir(store.dir())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|p| p.is_file()));

    assert_eq!(list_revisions_in(store.dir(), &first).unwrap().len(), 1);
    assert_eq!(list_revisions_in(store.dir(), &second).unwrap().len(), 1);
}
