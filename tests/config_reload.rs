//! Hot reload of the perception config file.

use std::fs::File;
use std::io::Write;
use std::time::{Duration, SystemTime};

use lurk::config::{ConfigError, ConfigFile, ConfigSource, PerceptionConfig};
use rstest::{fixture, rstest};
use tempfile::NamedTempFile;

fn rewrite(file: &NamedTempFile, contents: &str, age_offset: Duration) {
    let mut handle = File::create(file.path()).expect("reopen config file");
    handle
        .write_all(contents.as_bytes())
        .expect("write config file");
    // Push the mtime forward so filesystems with coarse timestamps still see a change.
    handle
        .set_modified(SystemTime::now() + age_offset)
        .expect("set mtime");
}

#[fixture]
fn config_file() -> NamedTempFile {
    let file = NamedTempFile::new().expect("create temp file");
    rewrite(&file, r#"{ "detection_radius": 25, "debug": true }"#, Duration::ZERO);
    file
}

#[rstest]
fn initial_load_is_sanitised(config_file: NamedTempFile) {
    let mut source = ConfigFile::open(config_file.path()).expect("open config");
    let config = source.current();
    assert_eq!(config.detection_radius, 25.0);
    assert!(config.debug);
    assert_eq!(config.poll_interval, PerceptionConfig::default().poll_interval);
}

#[rstest]
fn edits_are_picked_up_without_restart(config_file: NamedTempFile) {
    let mut source = ConfigFile::open(config_file.path()).expect("open config");
    rewrite(
        &config_file,
        r#"{ "detection_radius": 90, "poll_interval": 0.5 }"#,
        Duration::from_secs(5),
    );
    let config = source.current();
    assert_eq!(config.detection_radius, 60.0);
    assert_eq!(config.poll_interval, 0.5);
    assert!(!config.debug);
}

#[rstest]
fn broken_edit_keeps_the_last_good_config(config_file: NamedTempFile) {
    let mut source = ConfigFile::open(config_file.path()).expect("open config");
    rewrite(&config_file, "{ \"detection_radius\": ", Duration::from_secs(5));
    assert_eq!(source.current().detection_radius, 25.0);

    rewrite(&config_file, r#"{ "detection_radius": 12 }"#, Duration::from_secs(10));
    assert_eq!(source.current().detection_radius, 12.0);
}

#[rstest]
fn broken_initial_file_is_rejected() {
    let file = NamedTempFile::new().expect("create temp file");
    rewrite(&file, "not json", Duration::ZERO);
    let err = ConfigFile::open(file.path()).expect_err("parse failure");
    assert!(matches!(err, ConfigError::Parse(_)));
}
