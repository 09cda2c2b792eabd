use super::common::Fixture;
use fintc::config::Config;
use fintc::ops::{run_operation, OpError, Operation, Outcome};
use fintc::store::StoreError;
use std::fs;

fn write_store(fx: &Fixture, content: &str) {
    let path = fx.store_path();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_corrupt_store_is_fatal_and_untouched() {
    let fx = Fixture::new();
    let file = fx.write("a.txt", b"a");
    let content = format!(
        "{}\t/valid/path\nthis line has no separator\n",
        "0".repeat(64)
    );
    write_store(&fx, &content);

    for operation in [
        Operation::Init,
        Operation::Verify,
        Operation::Update,
        Operation::Delete,
    ] {
        match run_operation(&fx.config, operation, &file) {
            Err(OpError::Store(StoreError::Corrupt { line, .. })) => assert_eq!(line, 2),
            other => panic!("Expected Corrupt, got {:?}", other),
        }
    }

    assert_eq!(fs::read_to_string(fx.store_path()).unwrap(), content);
}

#[test]
fn test_uppercase_digest_is_corrupt() {
    let fx = Fixture::new();
    let file = fx.write("a.txt", b"a");
    write_store(&fx, &format!("{}\t{}\n", "AB".repeat(32), file.display()));

    let result = run_operation(&fx.config, Operation::Verify, &file);
    assert!(matches!(
        result,
        Err(OpError::Store(StoreError::Corrupt { line: 1, .. }))
    ));
}

#[test]
fn test_duplicate_record_is_corrupt() {
    let fx = Fixture::new();
    let file = fx.write("a.txt", b"a");
    let line = format!("{}\t{}\n", "1".repeat(64), file.display());
    write_store(&fx, &format!("{line}\n{line}"));

    let result = run_operation(&fx.config, Operation::Init, &file);
    assert!(matches!(
        result,
        Err(OpError::Store(StoreError::Corrupt { line: 3, .. }))
    ));
}

#[test]
fn test_blank_lines_are_ignored() {
    let fx = Fixture::new();
    let file = fx.write("a.txt", b"a");
    fx.run(Operation::Init, &file);
    let content = fs::read_to_string(fx.store_path()).unwrap();
    write_store(&fx, &format!("\n{content}\n\n"));

    let report = fx.run(Operation::Verify, &file);
    assert_eq!(report.outcome_for(&file), Some(&Outcome::Match));
}

#[test]
fn test_record_order_survives_rewrites() {
    let fx = Fixture::new();
    let b = fx.write("b.txt", b"b");
    let a = fx.write("a.txt", b"a");
    let c = fx.write("c.txt", b"c");
    for file in [&b, &a, &c] {
        fx.run(Operation::Init, file);
    }

    fs::write(&a, b"changed").unwrap();
    fx.run(Operation::Update, &a);
    let paths: Vec<_> = fx.store().iter().map(|r| r.path.clone()).collect();
    assert_eq!(paths, vec![b.clone(), a.clone(), c.clone()]);

    fx.run(Operation::Delete, &b);
    let paths: Vec<_> = fx.store().iter().map(|r| r.path.clone()).collect();
    assert_eq!(paths, vec![a, c]);
}

#[test]
fn test_store_file_format() {
    let fx = Fixture::new();
    let file = fx.write("a.txt", b"hello");
    fx.run(Operation::Init, &file);

    let content = fs::read_to_string(fx.store_path()).unwrap();
    let expected = format!(
        "{}\t{}\n",
        fintc::scanner::digest_bytes(b"hello"),
        file.display()
    );
    assert_eq!(content, expected);
}

#[test]
fn test_missing_store_directory_is_created() {
    let fx = Fixture::new();
    let file = fx.write("a.txt", b"a");
    let store = fx.dir.path().join("deep").join("er").join("hashes");
    let config = Config::default().with_store_path(&store);

    run_operation(&config, Operation::Init, &file).unwrap();

    assert!(store.is_file());
    assert!(fs::read_to_string(&store).unwrap().contains("a.txt"));
}

#[test]
fn test_home_directory_layout() {
    let fx = Fixture::new();
    let file = fx.write("a.txt", b"a");
    let home = fx.dir.path().join("home");
    let config = Config::with_home(&home);

    run_operation(&config, Operation::Init, &file).unwrap();

    assert!(home.join("hashes").is_file());
}

#[cfg(unix)]
#[test]
fn test_unreadable_store_is_fatal() {
    use std::os::unix::fs::PermissionsExt;

    let fx = Fixture::new();
    let file = fx.write("a.txt", b"a");
    fx.run(Operation::Init, &file);
    let store = fx.store_path();
    fs::set_permissions(&store, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read(&store).is_ok() {
        // Running as root, permissions are not enforced
        fs::set_permissions(&store, fs::Permissions::from_mode(0o644)).unwrap();
        return;
    }

    let result = run_operation(&fx.config, Operation::Init, &fx.write("b.txt", b"b"));
    assert!(matches!(result, Err(OpError::Store(StoreError::Read { .. }))));

    fs::set_permissions(&store, fs::Permissions::from_mode(0o644)).unwrap();
    assert_eq!(fx.store().len(), 1);
}

#[cfg(unix)]
#[test]
fn test_store_mode_survives_init() {
    use std::os::unix::fs::PermissionsExt;

    let fx = Fixture::new();
    fx.run(Operation::Init, &fx.write("a.txt", b"a"));
    fs::set_permissions(fx.store_path(), fs::Permissions::from_mode(0o644)).unwrap();

    fx.run(Operation::Init, &fx.write("b.txt", b"b"));

    let mode = fs::metadata(fx.store_path()).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o644);
    assert_eq!(fx.store().len(), 2);
}
