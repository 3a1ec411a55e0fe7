use picpac::linker::{FailureKind, LinkConfig, LinkEngine, LinkError};
use picpac::scanner::{Candidate, ExtensionSet, FileEntry, FingerprintError, HashError};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn missing_candidate(name: &str) -> Candidate {
    let entry = FileEntry::new(PathBuf::from(format!("/nonexistent/{name}")), 100);
    Candidate::from_entry(entry, &ExtensionSet::default()).unwrap()
}

#[test]
fn test_link_candidates_continues_on_error() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let readable = src.path().join("ok.jpg");
    fs::write(&readable, b"fine").unwrap();
    let good = Candidate::from_entry(FileEntry::new(readable, 4), &ExtensionSet::default()).unwrap();

    let result = LinkEngine::with_defaults()
        .link_candidates(
            vec![missing_candidate("a.jpg"), good, missing_candidate("b.jpg")],
            dest.path(),
        )
        .unwrap();

    assert_eq!(result.created, 1);
    assert_eq!(result.failures.len(), 2);
    for failure in &result.failures {
        assert_eq!(failure.kind(), FailureKind::UnreadableFile);
        match &failure.error {
            LinkError::Fingerprint {
                source: FingerprintError::UnreadableFile(HashError::NotFound(_)),
                ..
            } => {}
            other => panic!("Expected NotFound fingerprint error, got: {:?}", other),
        }
    }
}

#[test]
fn test_link_candidates_strict_fails() {
    let dest = TempDir::new().unwrap();
    let engine = LinkEngine::new(LinkConfig::default().with_strict(true));

    let result = engine.link_candidates(vec![missing_candidate("a.jpg")], dest.path());

    match result.unwrap_err() {
        LinkError::Fingerprint {
            source: FingerprintError::UnreadableFile(HashError::NotFound(_)),
            ..
        } => {}
        other => panic!("Expected NotFound fingerprint error, got: {:?}", other),
    }
}

#[test]
fn test_file_removed_between_walk_and_hash() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let vanishing = src.path().join("gone.jpg");
    fs::write(&vanishing, b"soon gone").unwrap();
    let candidate =
        Candidate::from_entry(FileEntry::new(vanishing.clone(), 9), &ExtensionSet::default())
            .unwrap();
    fs::remove_file(&vanishing).unwrap();

    let result = LinkEngine::with_defaults()
        .link_candidates(vec![candidate], dest.path())
        .unwrap();

    assert_eq!(result.created, 0);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].path, vanishing);
}

#[test]
fn test_link_name_too_long_is_link_failure() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    // 201-byte extension: the source name fits, digest + extension does not.
    let long_ext = format!(".{}", "x".repeat(200));
    fs::write(src.path().join(format!("a{long_ext}")), b"long").unwrap();
    fs::write(src.path().join("b.jpg"), b"short").unwrap();
    fs::write(src.path().join("c.jpg"), b"other").unwrap();

    let extensions = ExtensionSet::new([".jpg".to_string(), long_ext]).unwrap();
    let result = LinkEngine::with_defaults()
        .run(src.path(), dest.path(), &extensions)
        .unwrap();

    assert_eq!(result.candidates, 3);
    assert_eq!(result.created, 2);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].kind(), FailureKind::LinkCreateFailed);
    assert!(matches!(
        result.failures[0].error,
        LinkError::LinkCreateFailed { .. }
    ));
    assert_eq!(fs::read_dir(dest.path()).unwrap().count(), 2);
}

#[test]
fn test_link_name_too_long_strict_fails() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let long_ext = format!(".{}", "y".repeat(200));
    fs::write(src.path().join(format!("a{long_ext}")), b"long").unwrap();

    let extensions = ExtensionSet::new([long_ext]).unwrap();
    let result = LinkEngine::new(LinkConfig::default().with_strict(true)).run(
        src.path(),
        dest.path(),
        &extensions,
    );

    assert!(matches!(result, Err(LinkError::LinkCreateFailed { .. })));
}

#[test]
fn test_empty_candidate_path_is_reported_not_linked() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let readable = src.path().join("ok.jpg");
    fs::write(&readable, b"fine").unwrap();
    let good = Candidate::from_entry(FileEntry::new(readable, 4), &ExtensionSet::default()).unwrap();
    let unresolvable = Candidate {
        path: PathBuf::new(),
        extension: ".jpg".to_string(),
        size: 0,
    };

    let result = LinkEngine::with_defaults()
        .link_candidates(vec![unresolvable, good], dest.path())
        .unwrap();

    assert_eq!(result.created, 1);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].kind(), FailureKind::LinkCreateFailed);
    assert!(matches!(
        result.failures[0].error,
        LinkError::TargetUnresolved { .. }
    ));
    for link in &result.created_links {
        assert!(fs::read_link(link).unwrap().is_absolute());
    }
}

#[cfg(unix)]
#[test]
fn test_readonly_destination_reports_link_failures() {
    use std::os::unix::fs::PermissionsExt;

    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    fs::write(src.path().join("a.jpg"), b"a").unwrap();
    fs::set_permissions(dest.path(), fs::Permissions::from_mode(0o555)).unwrap();

    // Privileged users ignore directory permissions.
    let probe = dest.path().join("probe");
    if fs::write(&probe, b"").is_ok() {
        fs::remove_file(&probe).unwrap();
        fs::set_permissions(dest.path(), fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = LinkEngine::with_defaults()
        .run(src.path(), dest.path(), &ExtensionSet::default())
        .unwrap();
    fs::set_permissions(dest.path(), fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(result.created, 0);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].kind(), FailureKind::LinkCreateFailed);
}

#[cfg(unix)]
#[test]
fn test_unreadable_subdirectory_is_scan_error() {
    use std::os::unix::fs::PermissionsExt;

    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let locked = src.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("inside.jpg"), b"inside").unwrap();
    fs::write(src.path().join("outside.jpg"), b"outside").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = LinkEngine::with_defaults()
        .run(src.path(), dest.path(), &ExtensionSet::default());
    let strict = LinkEngine::new(LinkConfig::default().with_strict(true)).run(
        src.path(),
        dest.path(),
        &ExtensionSet::default(),
    );
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let result = result.unwrap();
    assert_eq!(result.created, 1);
    assert_eq!(result.scan_errors.len(), 1);
    assert!(result.is_partial());
    assert!(matches!(strict, Err(LinkError::Scan(_))));
}
