use std::error::Error;
use std::fs;
use std::path::PathBuf;

use siteloop::config::{load_from_path, load_or_default, validate_config, ConfigFile};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn defaults_reproduce_the_jekyll_loop() -> TestResult {
    let cfg = ConfigFile::default();

    assert_eq!(cfg.build.generator, "jekyll");
    assert_eq!(cfg.build.args, vec!["build".to_string()]);
    assert!(cfg.build.watch);
    assert!(cfg.build.force_polling);
    assert_eq!(
        cfg.build.config_files,
        vec![
            PathBuf::from("_config.yml"),
            PathBuf::from("_app/localhost_config.yml"),
        ]
    );
    assert_eq!(cfg.build.output_dir, PathBuf::from("_site"));

    assert_eq!(cfg.serve.host, "127.0.0.1");
    assert_eq!(cfg.serve.port, 4000);
    assert_eq!(cfg.serve.watch, vec!["**/*".to_string()]);
    assert!(cfg.serve.exclude.is_empty());
    assert_eq!(cfg.serve.debounce_ms, 0);

    validate_config(&cfg)?;
    Ok(())
}

#[test]
fn partial_config_keeps_defaults_for_the_rest() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Siteloop.toml");
    fs::write(
        &path,
        r#"
[build]
output_dir = "public"

[serve]
port = 5000
"#,
    )?;

    let cfg = load_from_path(&path)?;

    assert_eq!(cfg.build.output_dir, PathBuf::from("public"));
    assert_eq!(cfg.serve.port, 5000);

    // Everything else falls back to defaults.
    assert_eq!(cfg.build.generator, "jekyll");
    assert!(cfg.build.force_polling);
    assert_eq!(cfg.build.config_files.len(), 2);
    assert_eq!(cfg.serve.host, "127.0.0.1");

    validate_config(&cfg)?;
    Ok(())
}

#[test]
fn missing_config_file_falls_back_to_defaults() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("does-not-exist.toml");

    let cfg = load_or_default(&path)?;
    assert_eq!(cfg.build.generator, "jekyll");
    Ok(())
}

#[test]
fn empty_config_file_list_is_rejected() -> TestResult {
    let mut cfg = ConfigFile::default();
    cfg.build.config_files.clear();

    let err = validate_config(&cfg).unwrap_err();
    assert!(err.to_string().contains("config_files"));
    Ok(())
}

#[test]
fn unparseable_bind_address_is_rejected() -> TestResult {
    let mut cfg = ConfigFile::default();
    cfg.serve.host = "not a host".to_string();

    assert!(validate_config(&cfg).is_err());
    Ok(())
}

#[test]
fn empty_serve_watch_list_is_rejected() -> TestResult {
    let mut cfg = ConfigFile::default();
    cfg.serve.watch.clear();

    let err = validate_config(&cfg).unwrap_err();
    assert!(err.to_string().contains("watch"));
    Ok(())
}
