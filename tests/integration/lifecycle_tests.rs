use super::common::Fixture;
use fintc::error::ExitCode;
use fintc::ops::{run_operation, OpError, Operation, Outcome};
use fintc::scanner::{digest_bytes, ScanError};
use std::fs;

#[test]
fn test_init_then_verify_matches() {
    let fx = Fixture::new();
    let content = b"root:x:0:0:root:/root:/bin/sh\n";
    let file = fx.write("passwd", content);

    let report = fx.run(Operation::Init, &file);
    match report.outcome_for(&file) {
        Some(Outcome::Initialized { digest }) => {
            assert_eq!(digest, &digest_bytes(content));
        }
        other => panic!("Expected Initialized, got {:?}", other),
    }

    let report = fx.run(Operation::Verify, &file);
    assert_eq!(report.outcome_for(&file), Some(&Outcome::Match));
    assert_eq!(report.exit_code(), ExitCode::Success);
}

#[test]
fn test_change_detection_cycle() {
    let fx = Fixture::new();
    let file = fx.write("app.conf", b"debug = false\n");
    fx.run(Operation::Init, &file);

    fs::write(&file, b"debug = true\n").unwrap();

    let report = fx.run(Operation::Verify, &file);
    assert!(matches!(
        report.outcome_for(&file),
        Some(Outcome::Mismatch { .. })
    ));
    assert_eq!(report.exit_code(), ExitCode::IntegrityFailure);

    let report = fx.run(Operation::Update, &file);
    assert!(matches!(
        report.outcome_for(&file),
        Some(Outcome::Updated { .. })
    ));

    let report = fx.run(Operation::Verify, &file);
    assert_eq!(report.outcome_for(&file), Some(&Outcome::Match));

    let report = fx.run(Operation::Update, &file);
    assert_eq!(report.outcome_for(&file), Some(&Outcome::Unchanged));
}

#[test]
fn test_init_twice_keeps_one_record() {
    let fx = Fixture::new();
    let file = fx.write("hosts", b"127.0.0.1 localhost\n");

    fx.run(Operation::Init, &file);
    let report = fx.run(Operation::Init, &file);

    assert_eq!(report.outcome_for(&file), Some(&Outcome::AlreadyTracked));
    assert_eq!(report.exit_code(), ExitCode::Success);
    let store = fx.store();
    assert_eq!(store.len(), 1);
    assert_eq!(store.iter().filter(|r| r.path == file).count(), 1);
}

#[test]
fn test_verify_is_idempotent_and_read_only() {
    let fx = Fixture::new();
    let file = fx.write("bin/tool", b"\x7fELF....");
    fx.run(Operation::Init, &file);
    let before = fs::read(fx.store_path()).unwrap();

    let first = fx.run(Operation::Verify, &file);
    let second = fx.run(Operation::Verify, &file);

    assert_eq!(first, second);
    assert_eq!(first.outcome_for(&file), Some(&Outcome::Match));
    assert_eq!(fs::read(fx.store_path()).unwrap(), before);
}

#[test]
fn test_verify_does_not_create_store() {
    let fx = Fixture::new();
    let file = fx.write("untracked", b"data");

    let report = fx.run(Operation::Verify, &file);

    assert_eq!(report.outcome_for(&file), Some(&Outcome::NotTracked));
    assert_eq!(report.exit_code(), ExitCode::IntegrityFailure);
    assert!(!fx.store_path().exists());
}

#[test]
fn test_update_never_creates_records() {
    let fx = Fixture::new();
    let file = fx.write("new", b"data");

    let report = fx.run(Operation::Update, &file);

    assert_eq!(report.outcome_for(&file), Some(&Outcome::NotTracked));
    assert!(!fx.store_path().exists());
}

#[test]
fn test_delete_then_verify_not_tracked() {
    let fx = Fixture::new();
    let file = fx.write("motd", b"welcome\n");
    fx.run(Operation::Init, &file);

    let report = fx.run(Operation::Delete, &file);
    assert_eq!(report.outcome_for(&file), Some(&Outcome::Deleted));
    assert!(fx.store().is_empty());

    let report = fx.run(Operation::Verify, &file);
    assert_eq!(report.outcome_for(&file), Some(&Outcome::NotTracked));
}

#[test]
fn test_unknown_target_leaves_store_unchanged() {
    let fx = Fixture::new();
    let file = fx.write("kept", b"keep me");
    fx.run(Operation::Init, &file);
    let before = fs::read(fx.store_path()).unwrap();

    let missing = fx.files().join("does-not-exist");
    for operation in [Operation::Init, Operation::Update, Operation::Delete] {
        match run_operation(&fx.config, operation, &missing) {
            Err(OpError::Scan(ScanError::NotFoundOrUnsupported(path))) => {
                assert_eq!(path, missing);
            }
            other => panic!("Expected NotFoundOrUnsupported, got {:?}", other),
        }
    }

    assert_eq!(fs::read(fx.store_path()).unwrap(), before);
}

#[test]
fn test_unknown_target_does_not_create_store() {
    let fx = Fixture::new();
    let result = run_operation(&fx.config, Operation::Init, &fx.files().join("nope"));

    assert!(result.is_err());
    assert!(!fx.store_path().exists());
}
