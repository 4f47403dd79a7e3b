//! Workspace configuration.
//!
//! Resolution order for every setting: CLI flag (or its environment variable)
//! > settings file > built-in default. The settings file is optional and lives
//! at `<report-dir>/config.yaml`:
//!
//! ```yaml
//! concurrency: 4
//! host: studio
//! junk_patterns: ["target", "*.log"]
//! generator:
//!   provider: exec
//!   exec: /usr/local/bin/wip-writer
//!   timeout_secs: 20
//! ```
//!
//! As with every path-taking function in this crate, `_at` variants take an
//! explicit directory so tests can point them at a `TempDir`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};

/// Directory (relative to the workspace) holding reports and settings.
pub const REPORT_DIR_NAME: &str = ".wipctl";
/// File name of the optional settings file inside the report directory.
pub const SETTINGS_FILE: &str = "config.yaml";
/// Default parallelism for push and pull.
pub const DEFAULT_SYNC_CONCURRENCY: usize = 6;
/// Default parallelism for status and checkpoint.
pub const DEFAULT_SCAN_CONCURRENCY: usize = 8;

// ---------------------------------------------------------------------------
// Settings file
// ---------------------------------------------------------------------------

/// Contents of `config.yaml`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub concurrency: Option<usize>,
    pub host: Option<String>,
    /// Extra untracked-path patterns that block auto-staging.
    pub junk_patterns: Vec<String>,
    pub generator: GeneratorSettings,
}

/// Generation collaborator settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// `none` or `exec`.
    pub provider: Option<String>,
    /// Program run by the `exec` provider.
    pub exec: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// `<report_dir>/config.yaml`, pure, no I/O.
pub fn settings_path_at(report_dir: &Path) -> PathBuf {
    report_dir.join(SETTINGS_FILE)
}

/// Load settings from `<report_dir>/config.yaml`; a missing file yields defaults.
///
/// Returns `ConfigError::Parse` (with path) if the YAML is malformed.
pub fn load_settings_at(report_dir: &Path) -> Result<Settings, ConfigError> {
    let path = settings_path_at(report_dir);
    if !path.exists() {
        return Ok(Settings::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

/// Atomically write settings (`.tmp` + rename).
pub fn save_settings_at(report_dir: &Path, settings: &Settings) -> Result<(), ConfigError> {
    std::fs::create_dir_all(report_dir).map_err(|e| io_err(report_dir, e))?;
    let path = settings_path_at(report_dir);
    let tmp = path.with_extension("yaml.tmp");
    let yaml = serde_yaml::to_string(settings)?;
    std::fs::write(&tmp, yaml).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, &path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(&path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// WorkspaceConfig
// ---------------------------------------------------------------------------

/// Everything a run needs to know about where and as whom it operates.
///
/// Built once by the CLI and passed down explicitly; there is no global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceConfig {
    /// Discovery root.
    pub root: PathBuf,
    /// Host segment used in WIP branch names.
    pub host: String,
    pub dry_run: bool,
    pub report_dir: PathBuf,
    pub settings: Settings,
}

impl WorkspaceConfig {
    /// Resolve configuration from CLI values and the settings file.
    ///
    /// `host` and `report_dir` are the CLI values (already merged with their
    /// environment variables); `None` falls through to the settings file and
    /// then to the machine hostname / `<root>/.wipctl`.
    pub fn resolve(
        root: impl Into<PathBuf>,
        host: Option<String>,
        dry_run: bool,
        report_dir: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ConfigError::WorkspaceNotFound { path: root });
        }
        let report_dir = report_dir.unwrap_or_else(|| root.join(REPORT_DIR_NAME));
        let settings = load_settings_at(&report_dir)?;
        let host = host
            .filter(|h| !h.trim().is_empty())
            .or_else(|| settings.host.clone())
            .unwrap_or_else(machine_hostname);
        Ok(Self {
            root,
            host,
            dry_run,
            report_dir,
            settings,
        })
    }

    /// CLI value, then settings file, then `default`; never below 1.
    pub fn concurrency(&self, cli: Option<usize>, default: usize) -> usize {
        cli.or(self.settings.concurrency).unwrap_or(default).max(1)
    }
}

/// Hostname of this machine, or `unknown` when it cannot be read.
pub fn machine_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn report_dir_defaults_under_workspace() {
        let ws = TempDir::new().unwrap();
        let cfg = WorkspaceConfig::resolve(ws.path(), Some("h".into()), false, None).unwrap();
        assert_eq!(cfg.report_dir, ws.path().join(".wipctl"));
        assert_eq!(cfg.host, "h");
    }

    #[test]
    fn concurrency_precedence() {
        let ws = TempDir::new().unwrap();
        let mut cfg = WorkspaceConfig::resolve(ws.path(), Some("h".into()), false, None).unwrap();
        assert_eq!(cfg.concurrency(None, 6), 6);
        cfg.settings.concurrency = Some(3);
        assert_eq!(cfg.concurrency(None, 6), 3);
        assert_eq!(cfg.concurrency(Some(2), 6), 2);
        assert_eq!(cfg.concurrency(Some(0), 6), 1);
    }

    #[test]
    fn missing_workspace_is_an_error() {
        let ws = TempDir::new().unwrap();
        let err = WorkspaceConfig::resolve(ws.path().join("nope"), None, false, None).unwrap_err();
        assert!(matches!(err, ConfigError::WorkspaceNotFound { .. }));
    }
}
