use clap::Parser;
use picpac::cli::Cli;
use picpac::error::ExitCode;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cli_for(src: &Path, dest: &Path, config_dir: &Path, extra: &[&str]) -> Cli {
    let config = config_dir.join("none.toml");
    let mut args = vec![
        "picpac".to_string(),
        "-s".to_string(),
        src.display().to_string(),
        "-d".to_string(),
        dest.display().to_string(),
        "--config".to_string(),
        config.display().to_string(),
        "--no-progress".to_string(),
        "--no-color".to_string(),
        "-o".to_string(),
        "json".to_string(),
    ];
    args.extend(extra.iter().map(|s| (*s).to_string()));
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn test_run_app_success() {
    let src = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    fs::write(src.path().join("a.jpg"), b"a").unwrap();
    fs::write(src.path().join("b.jpg"), b"a").unwrap();
    let dest = root.path().join("links");

    let code = picpac::run_app(cli_for(src.path(), &dest, root.path(), &[])).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert_eq!(fs::read_dir(&dest).unwrap().count(), 1);
}

#[test]
fn test_run_app_custom_extensions() {
    let src = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    fs::write(src.path().join("a.jpg"), b"a").unwrap();
    fs::write(src.path().join("b.png"), b"b").unwrap();
    let dest = root.path().join("links");

    let code =
        picpac::run_app(cli_for(src.path(), &dest, root.path(), &["-e", ".png"])).unwrap();

    assert_eq!(code, ExitCode::Success);
    let names: Vec<_> = fs::read_dir(&dest)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].ends_with(".png"));
}

#[test]
fn test_run_app_missing_source_is_invalid_input() {
    let root = TempDir::new().unwrap();
    let src = root.path().join("missing");
    let dest = root.path().join("links");

    let err = picpac::run_app(cli_for(&src, &dest, root.path(), &[])).unwrap_err();
    assert_eq!(ExitCode::for_error(&err), ExitCode::InvalidInput);
}

#[test]
fn test_run_app_destination_is_file() {
    let src = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let dest = root.path().join("file");
    fs::write(&dest, b"x").unwrap();

    let err = picpac::run_app(cli_for(src.path(), &dest, root.path(), &[])).unwrap_err();
    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
}

#[test]
fn test_run_app_invalid_config_extension() {
    let src = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let config = root.path().join("config.toml");
    fs::write(&config, "extensions = [\"jpg\"]\n").unwrap();

    let cli = Cli::try_parse_from([
        "picpac",
        "-s",
        &src.path().display().to_string(),
        "-d",
        &root.path().join("links").display().to_string(),
        "--config",
        &config.display().to_string(),
        "--no-progress",
        "-o",
        "json",
    ])
    .unwrap();

    let err = picpac::run_app(cli).unwrap_err();
    assert_eq!(ExitCode::for_error(&err), ExitCode::InvalidInput);
}

#[cfg(unix)]
#[test]
fn test_run_app_partial_success() {
    let src = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    fs::write(src.path().join("ok.jpg"), b"ok").unwrap();
    fs::create_dir(src.path().join("sub")).unwrap();
    fs::write(src.path().join("sub/a.jpg"), b"a").unwrap();
    std::os::unix::fs::symlink(src.path(), src.path().join("sub/loop")).unwrap();
    let dest = root.path().join("links");

    let code = picpac::run_app(cli_for(
        src.path(),
        &dest,
        root.path(),
        &["--follow-symlinks"],
    ))
    .unwrap();

    assert_eq!(code, ExitCode::PartialSuccess);
}
