//! Settings file loading, saving and repository naming integration tests.

use assert_fs::prelude::*;
use predicates::prelude::predicate;
use rstest::rstest;
use std::fs;
use std::path::Path;
use wipctl_core::{
    config::{self, GeneratorSettings, Settings},
    types::display_name,
    ConfigError, Repository, WorkspaceConfig,
};

// ---------------------------------------------------------------------------
// 1. Settings file
// ---------------------------------------------------------------------------

#[test]
fn missing_settings_file_yields_defaults() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let settings = config::load_settings_at(dir.path()).expect("load");
    assert_eq!(settings, Settings::default());
}

#[test]
fn corrupt_settings_returns_parse_error_with_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    dir.child("config.yaml")
        .write_str("concurrency: [not, a, number\n")
        .expect("write");

    let err = config::load_settings_at(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("config.yaml"));
}

#[test]
fn save_then_load_preserves_generator_block() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let settings = Settings {
        concurrency: Some(3),
        host: Some("studio".into()),
        junk_patterns: vec!["target".into()],
        generator: GeneratorSettings {
            provider: Some("exec".into()),
            exec: Some("/usr/bin/true".into()),
            timeout_secs: Some(5),
        },
    };
    config::save_settings_at(dir.path(), &settings).expect("save");

    dir.child("config.yaml").assert(predicate::path::exists());
    dir.child("config.yaml.tmp").assert(predicate::path::missing());
    assert_eq!(config::load_settings_at(dir.path()).expect("load"), settings);
}

#[test]
fn settings_host_applies_when_flag_absent() {
    let ws = assert_fs::TempDir::new().expect("tempdir");
    let report_dir = ws.path().join(".wipctl");
    fs::create_dir_all(&report_dir).expect("mkdir");
    fs::write(report_dir.join("config.yaml"), "host: from-file\n").expect("write");

    let cfg = WorkspaceConfig::resolve(ws.path(), None, false, None).expect("resolve");
    assert_eq!(cfg.host, "from-file");

    let cfg = WorkspaceConfig::resolve(ws.path(), Some("flag".into()), true, None).expect("resolve");
    assert_eq!(cfg.host, "flag");
    assert!(cfg.dry_run);
}

#[test]
fn explicit_report_dir_is_used_for_settings() {
    let ws = assert_fs::TempDir::new().expect("tempdir");
    let reports = assert_fs::TempDir::new().expect("tempdir");
    reports.child("config.yaml").write_str("concurrency: 2\n").expect("write");

    let cfg = WorkspaceConfig::resolve(ws.path(), Some("h".into()), false, Some(reports.path().to_path_buf()))
        .expect("resolve");
    assert_eq!(cfg.report_dir, reports.path());
    assert_eq!(cfg.concurrency(None, 8), 2);
}

// ---------------------------------------------------------------------------
// 2. Repository naming
// ---------------------------------------------------------------------------

#[rstest]
#[case("/home/dev/src/api", "api")]
#[case("services/billing", "billing")]
#[case("/", "root")]
#[case("/tmp/   ", "unknown")]
fn display_name_rules(#[case] path: &str, #[case] expected: &str) {
    assert_eq!(display_name(Path::new(path)), expected);
}

#[test]
fn dot_resolves_to_current_directory_name() {
    let cwd = std::env::current_dir().expect("cwd");
    let expected = cwd
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_string());
    assert_eq!(Repository::new(".").name.0, expected);
}
