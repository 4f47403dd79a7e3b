//! Tera rendering engine for persisted reports.
//!
//! | Operation    | Template                 |
//! |--------------|--------------------------|
//! | push, pull   | `report/report.md.tera`  |
//! | checkpoint   | `report/checkpoint.md.tera` |
//!
//! A template directory may override any embedded template by name, e.g.
//! `<dir>/report/report.md.tera` or `<dir>/shared/_header.tera`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tera::Tera;

use wipctl_core::report::{Operation, Report};

use crate::context::ReportContext;
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Embedded templates
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    ("shared/_header.tera", include_str!("templates/_partials/header.tera")),
    ("shared/_notes.tera", include_str!("templates/_partials/notes.tera")),
    ("report/report.md.tera", include_str!("templates/report.md.tera")),
    (
        "report/checkpoint.md.tera",
        include_str!("templates/checkpoint.md.tera"),
    ),
];

/// Template used for `operation`.
pub fn template_name(operation: Operation) -> &'static str {
    match operation {
        Operation::Checkpoint => "report/checkpoint.md.tera",
        Operation::Push | Operation::Pull => "report/report.md.tera",
    }
}

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").to_lowercase()
}

fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    for entry in std::fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        let path = entry.map_err(|e| io_err(dir, e))?.path();
        if path.is_dir() {
            collect_template_files(&path, out)?;
        } else if path.extension().and_then(|s| s.to_str()) == Some("tera") {
            out.push(path);
        }
    }
    Ok(())
}

fn build_tera(override_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: HashMap<String, String> = TPLS
        .iter()
        .map(|(name, body)| (name.to_string(), body.to_string()))
        .collect();

    if let Some(dir) = override_dir.filter(|d| d.is_dir()) {
        let mut files = Vec::new();
        collect_template_files(dir, &mut files)?;
        for path in files {
            let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
            let body = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
            templates.insert(normalize_template_name(rel), body);
        }
    }

    let mut tera = Tera::default();
    tera.add_raw_templates(templates.into_iter().collect::<Vec<_>>())?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// ReportRenderer
// ---------------------------------------------------------------------------

/// Renders a [`Report`] to Markdown.
pub struct ReportRenderer {
    tera: Tera,
}

impl ReportRenderer {
    /// Renderer with the embedded templates only.
    pub fn new() -> Result<Self, RenderError> {
        Self::with_overrides(None)
    }

    /// Renderer whose templates may be overridden from `override_dir`.
    /// A missing directory is the same as no overrides.
    pub fn with_overrides(override_dir: Option<&Path>) -> Result<Self, RenderError> {
        Ok(Self {
            tera: build_tera(override_dir)?,
        })
    }

    pub fn render(&self, report: &Report) -> Result<String, RenderError> {
        let ctx = ReportContext::from_report(report).to_tera_context()?;
        Ok(self.tera.render(template_name(report.operation), &ctx)?)
    }
}
