use dupsift::config::{Config, ConfigError, OutputFormat};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.io_threads, 4);
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
skip_partial_fingerprinting = true
ignore_empty_files = true
io_threads = 8
follow_symlinks = true
output = "json"
summary_only = true
progress = false
"#;
    fs::write(&config_path, toml_content).unwrap();

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&config_path));
    let config: Config = figment.extract().unwrap();

    assert!(config.skip_partial_fingerprinting);
    assert!(config.ignore_empty_files);
    assert_eq!(config.io_threads, 8);
    assert!(config.follow_symlinks);
    assert_eq!(config.output, OutputFormat::Json);
    assert!(config.summary_only);
    assert!(!config.progress);
}

#[test]
fn test_config_partial_file_keeps_defaults() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "ignore_empty_files = true\n").unwrap();

    let config = Config::load(Some(&config_path)).unwrap();
    assert!(config.ignore_empty_files);
    assert!(!config.skip_partial_fingerprinting);
}

#[test]
fn test_config_env_over_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "io_threads = 8\n").unwrap();

    std::env::set_var("DUPSIFT_IT_ENV_IO_THREADS", "16");
    let figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .merge(Env::prefixed("DUPSIFT_IT_ENV_"));
    let config: Result<Config, _> = figment.extract();
    std::env::remove_var("DUPSIFT_IT_ENV_IO_THREADS");

    assert_eq!(config.unwrap().io_threads, 16);
}

#[test]
fn test_config_unknown_output_rejected() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "output = \"yaml\"\n").unwrap();

    let err = Config::load(Some(&config_path)).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_config_explicit_missing_file() {
    let temp_dir = tempdir().unwrap();
    let err = Config::load(Some(&temp_dir.path().join("nope.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)));
}

#[test]
fn test_default_path_file_name() {
    if let Some(path) = Config::default_path() {
        assert_eq!(path.file_name().unwrap(), "config.toml");
    }
}
