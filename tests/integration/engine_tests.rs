use picpac::linker::{prepare_destination, LinkConfig, LinkEngine, LinkError};
use picpac::progress::ProgressCallback;
use picpac::scanner::ExtensionSet;
use std::fs;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[derive(Default)]
struct RecordingProgress {
    events: Mutex<Vec<String>>,
}

impl ProgressCallback for RecordingProgress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("start:{phase}:{total}"));
    }

    fn on_progress(&self, _current: usize, _path: &str) {}

    fn on_phase_end(&self, phase: &str) {
        self.events.lock().unwrap().push(format!("end:{phase}"));
    }
}

#[test]
fn test_links_point_at_candidates() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    fs::create_dir_all(src.path().join("2019/summer")).unwrap();
    let picture = src.path().join("2019/summer/beach.jpg");
    fs::write(&picture, b"waves").unwrap();

    let result = LinkEngine::with_defaults()
        .run(src.path(), dest.path(), &ExtensionSet::default())
        .unwrap();

    assert_eq!(result.created_links.len(), 1);
    let link = &result.created_links[0];
    assert_eq!(link.parent().unwrap(), dest.path());

    let target = fs::read_link(link).unwrap();
    assert!(target.is_absolute());
    assert_eq!(
        fs::canonicalize(&target).unwrap(),
        fs::canonicalize(&picture).unwrap()
    );
    assert_eq!(fs::read(link).unwrap(), b"waves");
}

#[test]
fn test_default_extensions_cover_common_images() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    for (i, ext) in ["jpg", "jpeg", "bmp", "gif", "tiff", "exif", "rif", "png"]
        .iter()
        .enumerate()
    {
        fs::write(src.path().join(format!("p{i}.{ext}")), format!("image {i}")).unwrap();
    }

    let result = LinkEngine::with_defaults()
        .run(src.path(), dest.path(), &ExtensionSet::default())
        .unwrap();

    assert_eq!(result.examined, 8);
    assert_eq!(result.candidates, 7);
    assert_eq!(result.created, 7);
}

#[test]
fn test_single_thread_matches_parallel_outcome() {
    let src = TempDir::new().unwrap();
    for i in 0..20 {
        fs::write(src.path().join(format!("f{i}.jpg")), format!("content {}", i % 5)).unwrap();
    }

    let serial_dest = TempDir::new().unwrap();
    let parallel_dest = TempDir::new().unwrap();
    let serial = LinkEngine::new(LinkConfig::default().with_io_threads(1))
        .run(src.path(), serial_dest.path(), &ExtensionSet::default())
        .unwrap();
    let parallel = LinkEngine::new(LinkConfig::default().with_io_threads(8))
        .run(src.path(), parallel_dest.path(), &ExtensionSet::default())
        .unwrap();

    assert_eq!(serial.created, 5);
    assert_eq!(parallel.created, 5);
    assert_eq!(serial.duplicates, parallel.duplicates);

    let names = |dir: &std::path::Path| {
        let mut v: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        v.sort();
        v
    };
    assert_eq!(names(serial_dest.path()), names(parallel_dest.path()));
}

#[test]
fn test_progress_phases_reported() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    fs::write(src.path().join("a.jpg"), b"a").unwrap();
    fs::write(src.path().join("b.jpg"), b"b").unwrap();

    let progress = Arc::new(RecordingProgress::default());
    let engine = LinkEngine::new(LinkConfig::default().with_progress_callback(progress.clone()));
    engine
        .run(src.path(), dest.path(), &ExtensionSet::default())
        .unwrap();

    let events = progress.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            "start:walking:0",
            "end:walking",
            "start:linking:2",
            "end:linking"
        ]
    );
}

#[test]
fn test_shutdown_before_run_marks_interrupted() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    fs::write(src.path().join("a.jpg"), b"a").unwrap();

    let flag = Arc::new(AtomicBool::new(true));
    let engine = LinkEngine::new(LinkConfig::default().with_shutdown_flag(flag));
    let result = engine
        .run(src.path(), dest.path(), &ExtensionSet::default())
        .unwrap();

    assert!(result.interrupted);
    assert_eq!(result.created, 0);
    assert_eq!(fs::read_dir(dest.path()).unwrap().count(), 0);
}

#[test]
fn test_prepared_destination_is_created() {
    let src = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    fs::write(src.path().join("a.jpg"), b"a").unwrap();

    let dest = prepare_destination(&root.path().join("nested/links")).unwrap();
    assert!(dest.is_dir());

    let result = LinkEngine::with_defaults()
        .run(src.path(), &dest, &ExtensionSet::default())
        .unwrap();
    assert_eq!(result.created, 1);
}

#[test]
fn test_destination_inside_source() {
    let src = TempDir::new().unwrap();
    fs::write(src.path().join("a.jpg"), b"a").unwrap();
    let dest = src.path().join("links");
    fs::create_dir(&dest).unwrap();

    let engine = LinkEngine::with_defaults();
    let first = engine
        .run(src.path(), &dest, &ExtensionSet::default())
        .unwrap();
    let second = engine
        .run(src.path(), &dest, &ExtensionSet::default())
        .unwrap();

    // Packed links are candidates on the next run, but each hashes to its
    // own name and is skipped.
    assert_eq!(first.created, 1);
    assert_eq!(second.created, 0);
    assert_eq!(second.candidates, 2);
    assert_eq!(second.duplicates, 2);
    assert!(second.failures.is_empty());
}

#[test]
fn test_file_as_destination_is_rejected() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let file = dest.path().join("not_a_dir");
    fs::write(&file, b"x").unwrap();

    let err = LinkEngine::with_defaults()
        .run(src.path(), &file, &ExtensionSet::default())
        .unwrap_err();
    assert!(matches!(err, LinkError::DestinationNotADirectory(_)));
}
