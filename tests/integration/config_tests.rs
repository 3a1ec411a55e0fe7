use clap::Parser;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use picpac::cli::Cli;
use picpac::config::{Config, ENV_PREFIX};
use picpac::scanner::{ExtensionSet, DEFAULT_EXTENSIONS};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert_eq!(config.io_threads, 4);
    assert_eq!(config.extensions, DEFAULT_EXTENSIONS);
    assert!(!config.strict);
}

#[test]
fn test_config_load_from_env() {
    std::env::set_var("PICPAC_IO_THREADS", "16");
    std::env::set_var("PICPAC_FOLLOW_SYMLINKS", "true");

    let figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed(ENV_PREFIX).only(&["io_threads", "follow_symlinks"]));
    let config: Config = figment.extract().unwrap();

    assert_eq!(config.io_threads, 16);
    assert!(config.follow_symlinks);

    // Clean up
    std::env::remove_var("PICPAC_IO_THREADS");
    std::env::remove_var("PICPAC_FOLLOW_SYMLINKS");
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
destination = "/srv/slideshow"
extensions = [".png", ".webp"]
io_threads = 8
skip_hidden = true
"#;
    fs::write(&config_path, toml_content).unwrap();

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&config_path));
    let config: Config = figment.extract().unwrap();

    assert_eq!(config.destination, Some(PathBuf::from("/srv/slideshow")));
    assert_eq!(config.extensions, vec![".png", ".webp"]);
    assert_eq!(config.io_threads, 8);
    assert!(config.skip_hidden);
    assert!(!config.follow_symlinks);
}

#[test]
fn test_config_load_with_explicit_path() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("picpac.toml");
    fs::write(&config_path, "strict = true\nextensions = [\".gif\"]\n").unwrap();

    let config = Config::load(Some(config_path.as_path())).unwrap();
    assert!(config.strict);
    assert_eq!(config.extensions, vec![".gif"]);
}

#[test]
fn test_config_missing_file_uses_defaults() {
    let temp_dir = tempdir().unwrap();
    let absent = temp_dir.path().join("absent.toml");
    let config = Config::load(Some(absent.as_path())).unwrap();
    assert_eq!(config.extensions.len(), DEFAULT_EXTENSIONS.len());
}

#[test]
fn test_config_malformed_toml_is_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("bad.toml");
    fs::write(&config_path, "io_threads = \"many\"\n").unwrap();

    assert!(Config::load(Some(config_path.as_path())).is_err());
}

#[test]
fn test_cli_overrides_config_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "extensions = [\".png\"]\nio_threads = 2\n").unwrap();

    let mut config = Config::load(Some(config_path.as_path())).unwrap();
    let cli = Cli::try_parse_from(["picpac", "-e", ".jpg", "--io-threads", "6"]).unwrap();
    config.apply_cli(&cli);

    assert_eq!(config.extensions, vec![".jpg"]);
    assert_eq!(config.io_threads, 6);
}

#[test]
fn test_invalid_extension_in_config_rejected_by_set() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "extensions = [\"jpg\"]\n").unwrap();

    let config = Config::load(Some(config_path.as_path())).unwrap();
    assert!(ExtensionSet::new(&config.extensions).is_err());
}
