//! Tests for change notification.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use filemon::config::SnapshotConfig;
use filemon::diff::ChangeRecord;
use filemon::monitor::{
    Attribution, ChangeNotifier, MonitoredFile, NotifierState, OwnerResolver, Reaction,
};
use tempfile::TempDir;

struct StaticOwner(&'static str, &'static str);

impl OwnerResolver for StaticOwner {
    fn resolve_owner(&self, _path: &Path) -> std::io::Result<Attribution> {
        Ok(Attribution::new(self.0, self.1))
    }
}

struct Fixture {
    temp: TempDir,
    file: PathBuf,
    config_path: PathBuf,
    notifier: ChangeNotifier,
}

fn fixture(resolver: Arc<dyn OwnerResolver>) -> Fixture {
    let temp = TempDir::new().unwrap();
    let root = fs::canonicalize(temp.path()).unwrap();
    let file = root.join("watched.txt");
    let config_path = root.join("filemon.toml");
    fs::write(&file, "hello").unwrap();
    fs::write(&config_path, "files = []\n").unwrap();

    let files = MonitoredFile::from_paths(&[file.clone()]);
    let snapshots = SnapshotConfig {
        scratch_root: Some(root),
        ..SnapshotConfig::default()
    };
    let notifier = ChangeNotifier::new(&files, config_path.clone(), &snapshots, resolver);
    Fixture {
        temp,
        file,
        config_path,
        notifier,
    }
}

fn report(reaction: Reaction) -> filemon::monitor::Report {
    match reaction {
        Reaction::Reported(report) => report,
        other => panic!("Expected a report, got {other:?}"),
    }
}

#[test]
fn test_hello_world_scenario() {
    let f = fixture(Arc::new(StaticOwner("root", "root")));

    let first = report(f.notifier.on_modified(&f.file));
    assert!(first.captured);
    assert!(first.changes.is_empty());
    assert_eq!(first.attribution.to_string(), "user root of group root");

    fs::write(&f.file, "hello\nhello world").unwrap();
    let second = report(f.notifier.on_modified(&f.file));
    assert_eq!(
        second.changes,
        vec![ChangeRecord::new(Vec::<String>::new(), ["hello world"])]
    );
}

#[test]
fn test_config_change_restarts_without_diffing() {
    let f = fixture(Arc::new(StaticOwner("root", "root")));
    let token = f.notifier.restart_token();

    assert!(matches!(
        f.notifier.on_modified(&f.config_path),
        Reaction::Restart
    ));
    assert!(token.is_cancelled());
    assert_eq!(f.notifier.state(), NotifierState::Restarting);

    assert!(matches!(
        f.notifier.on_modified(&f.config_path),
        Reaction::Ignored
    ));
    assert!(matches!(f.notifier.on_modified(&f.file), Reaction::Ignored));

    let store = f.notifier.store().unwrap();
    assert!(store.list_revisions(&f.config_path).unwrap().is_empty());
    assert!(store.list_revisions(&f.file).unwrap().is_empty());
}

#[test]
fn test_unrelated_file_in_watched_dir_ignored() {
    let f = fixture(Arc::new(StaticOwner("root", "root")));
    let neighbour = f.temp.path().join("neighbour.txt");
    fs::write(&neighbour, "x").unwrap();

    let neighbour = fs::canonicalize(neighbour).unwrap();
    assert!(!f.notifier.is_monitored(&neighbour));
    assert!(matches!(
        f.notifier.on_modified(&neighbour),
        Reaction::Ignored
    ));
}

#[test]
fn test_unresolvable_owner_reported_as_unknown() {
    struct Failing;

    impl OwnerResolver for Failing {
        fn resolve_owner(&self, _path: &Path) -> std::io::Result<Attribution> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no such user"))
        }
    }

    let f = fixture(Arc::new(Failing));
    let report = report(f.notifier.on_modified(&f.file));
    assert_eq!(report.attribution, Attribution::unknown());
}

#[test]
fn test_system_owner_resolves_on_real_file() {
    use filemon::monitor::SystemOwnerResolver;

    let f = fixture(Arc::new(SystemOwnerResolver));
    let report = report(f.notifier.on_modified(&f.file));
    assert!(!report.attribution.owner.is_empty());
    assert!(!report.attribution.group.is_empty());
}

#[test]
fn test_repeated_modifications_keep_scratch_bounded() {
    let f = fixture(Arc::new(StaticOwner("root", "root")));
    let payload = "x".repeat(10_000);

    for i in 0..50 {
        fs::write(&f.file, format!("{payload}\n{i}\n")).unwrap();
        let report = report(f.notifier.on_modified(&f.file));
        assert!(report.captured);
    }

    let store = f.notifier.store().unwrap();
    let entries = fs::read_dir(store.dir()).unwrap().count();
    assert!(entries <= 2, "scratch holds {entries} revisions");
    assert_eq!(
        store.latest(&f.file).unwrap().unwrap().read_text().unwrap(),
        format!("{payload}\n49\n")
    );
}
