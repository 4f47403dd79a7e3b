//! Junk-file guard.
//!
//! Untracked paths are checked component by component. A path is junk when
//! any component (case-insensitive, whole component) matches the built-in
//! denylist or one of the configured extra patterns. Extra patterns are
//! regular expressions anchored to a whole component.

use regex::{Regex, RegexBuilder};

use crate::error::GitError;

/// Build artifacts, dependency trees, caches and OS metadata.
pub const BUILTIN_JUNK: &[&str] = &[
    "node_modules",
    ".venv",
    "venv",
    "dist",
    "build",
    ".tox",
    ".ruff_cache",
    ".mypy_cache",
    ".pytest_cache",
    ".DS_Store",
    "coverage",
    ".cache",
    "__pycache__",
];

/// Compiled denylist.
#[derive(Debug, Clone)]
pub struct JunkGuard {
    re: Regex,
}

impl JunkGuard {
    /// Built-in denylist plus `extra` patterns.
    pub fn new(extra: &[String]) -> Result<Self, GitError> {
        let mut alternatives: Vec<String> = BUILTIN_JUNK.iter().map(|s| regex::escape(s)).collect();
        for pattern in extra.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
            // Validate on its own so the error names the offending pattern.
            Regex::new(pattern)?;
            alternatives.push(format!("(?:{pattern})"));
        }
        let re = RegexBuilder::new(&format!("^(?:{})$", alternatives.join("|")))
            .case_insensitive(true)
            .build()?;
        Ok(Self { re })
    }

    pub fn is_junk(&self, path: &str) -> bool {
        path.split(['/', '\\'])
            .filter(|c| !c.is_empty())
            .any(|component| self.re.is_match(component))
    }

    /// The junk subset of `paths`, in input order.
    pub fn find<'a>(&self, paths: &'a [String]) -> Vec<&'a str> {
        paths
            .iter()
            .map(String::as_str)
            .filter(|p| self.is_junk(p))
            .collect()
    }
}
