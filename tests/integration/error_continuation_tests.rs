//! A file that cannot be read must not abort the rest of the walk.

#![cfg(unix)]

use super::common::Fixture;
use fintc::error::ExitCode;
use fintc::ops::{Operation, Outcome};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

fn make_unreadable(path: &Path) -> bool {
    fs::set_permissions(path, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read_dir(path).is_ok() || fs::read(path).is_ok() {
        // Running as root, permissions are not enforced
        restore(path);
        return false;
    }
    true
}

fn restore(path: &Path) {
    let mode = if path.is_dir() { 0o755 } else { 0o644 };
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
}

#[test]
fn test_unreadable_file_does_not_abort_init() {
    let fx = Fixture::new();
    let a = fx.write("a.txt", b"a");
    let locked = fx.write("b.txt", b"b");
    let c = fx.write("c.txt", b"c");
    if !make_unreadable(&locked) {
        return;
    }

    let report = fx.run(Operation::Init, &fx.files());

    assert!(matches!(
        report.outcome_for(&locked),
        Some(Outcome::Failed { .. })
    ));
    assert_eq!(report.counts().initialized, 2);
    assert_eq!(report.exit_code(), ExitCode::PartialSuccess);

    let store = fx.store();
    assert!(store.contains(&a));
    assert!(store.contains(&c));
    assert!(!store.contains(&locked));
    restore(&locked);
}

#[test]
fn test_unreadable_file_during_verify() {
    let fx = Fixture::new();
    let a = fx.write("a.txt", b"a");
    let locked = fx.write("b.txt", b"b");
    fx.run(Operation::Init, &fx.files());
    if !make_unreadable(&locked) {
        return;
    }

    let report = fx.run(Operation::Verify, &fx.files());
    assert_eq!(report.outcome_for(&a), Some(&Outcome::Match));
    assert!(matches!(
        report.outcome_for(&locked),
        Some(Outcome::Failed { .. })
    ));
    assert_eq!(report.exit_code(), ExitCode::PartialSuccess);

    fs::write(&a, b"tampered").unwrap();
    let report = fx.run(Operation::Verify, &fx.files());
    assert_eq!(report.exit_code(), ExitCode::IntegrityFailure);
    restore(&locked);
}

#[test]
fn test_unreadable_file_keeps_record_on_update() {
    let fx = Fixture::new();
    let locked = fx.write("b.txt", b"b");
    fx.run(Operation::Init, &locked);
    let before = fx.store();
    if !make_unreadable(&locked) {
        return;
    }

    let report = fx.run(Operation::Update, &locked);

    assert!(matches!(
        report.outcome_for(&locked),
        Some(Outcome::Failed { .. })
    ));
    assert_eq!(fx.store(), before);
    restore(&locked);
}

#[test]
fn test_unreadable_directory_does_not_abort_walk() {
    let fx = Fixture::new();
    let a = fx.write("a.txt", b"a");
    fx.write("locked/inner.txt", b"inner");
    let z = fx.write("z.txt", b"z");
    let locked = fx.files().join("locked");
    if !make_unreadable(&locked) {
        return;
    }

    let report = fx.run(Operation::Init, &fx.files());

    assert_eq!(report.counts().initialized, 2);
    assert_eq!(report.counts().failed, 1);
    let store = fx.store();
    assert!(store.contains(&a));
    assert!(store.contains(&z));
    restore(&locked);
}

#[test]
fn test_unreadable_directory_records_are_not_missing() {
    let fx = Fixture::new();
    let a = fx.write("a.txt", b"a");
    let inner = fx.write("locked/inner.txt", b"inner");
    fx.run(Operation::Init, &fx.files());
    let locked = fx.files().join("locked");
    if !make_unreadable(&locked) {
        return;
    }

    let report = fx.run(Operation::Verify, &fx.files());

    assert_eq!(report.outcome_for(&a), Some(&Outcome::Match));
    assert!(report.outcome_for(&inner).is_none());
    assert_eq!(report.counts().missing, 0);
    assert_eq!(report.counts().failed, 1);
    assert_eq!(report.exit_code(), ExitCode::PartialSuccess);
    restore(&locked);
}
