//! Parsers for git plumbing output.
//!
//! Stat collection is best-effort: anything that does not parse counts as
//! zero instead of failing the caller.

use chrono::{DateTime, FixedOffset};

/// Subjects longer than this are truncated for display.
pub const SUBJECT_MAX: usize = 50;

/// `git rev-list --count` style output; garbage is 0.
pub fn parse_count(raw: &str) -> usize {
    raw.trim().parse().unwrap_or(0)
}

/// `git rev-list --left-right --count @{u}...HEAD` → `(ahead, behind)`.
///
/// The left column counts upstream-only commits (behind), the right column
/// local-only commits (ahead).
pub fn parse_ahead_behind(raw: &str) -> (usize, usize) {
    let mut cols = raw.split_whitespace();
    let behind = cols.next().map(parse_count).unwrap_or(0);
    let ahead = cols.next().map(parse_count).unwrap_or(0);
    (ahead, behind)
}

/// Totals from `git diff --numstat`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineStats {
    pub added: usize,
    pub removed: usize,
    pub files: usize,
}

/// Sum `git diff --numstat` output. Binary entries (`-`) count as a file
/// but contribute no lines.
pub fn parse_numstat(raw: &str) -> LineStats {
    let mut stats = LineStats::default();
    for line in raw.lines().filter(|l| !l.trim().is_empty()) {
        let mut cols = line.split('\t');
        let added = cols.next().unwrap_or("-");
        let removed = cols.next().unwrap_or("-");
        stats.files += 1;
        if added != "-" {
            stats.added += parse_count(added);
        }
        if removed != "-" {
            stats.removed += parse_count(removed);
        }
    }
    stats
}

/// Truncate a subject to [`SUBJECT_MAX`] characters (47 + `...`).
pub fn truncate_subject(subject: &str) -> String {
    let subject = subject.trim();
    if subject.chars().count() <= SUBJECT_MAX {
        return subject.to_string();
    }
    let head: String = subject.chars().take(SUBJECT_MAX - 3).collect();
    format!("{head}...")
}

/// One line of `git status --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PorcelainEntry {
    /// Two-letter XY code, e.g. ` M`, `??`, `A `.
    pub code: String,
    /// Path (destination side for renames).
    pub path: String,
}

impl PorcelainEntry {
    pub fn is_untracked(&self) -> bool {
        self.code == "??"
    }
}

pub fn parse_porcelain(raw: &str) -> Vec<PorcelainEntry> {
    raw.lines()
        .filter(|l| l.len() > 3)
        .map(|line| {
            let code: String = line.chars().take(2).collect();
            let rest = line.get(3..).unwrap_or_default();
            let path = match rest.split_once(" -> ") {
                Some((_, to)) => to,
                None => rest,
            };
            PorcelainEntry {
                code,
                path: path.trim_matches('"').to_string(),
            }
        })
        .collect()
}

/// Non-empty trimmed lines.
pub fn parse_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pick the newest ref from `for-each-ref --format='%(committerdate:iso-strict) %(refname)'`.
///
/// Compares parsed instants, never strings; a tie goes to the larger name.
/// Lines with an unparseable date are ignored. Returns the ref with
/// `strip_prefix` removed.
pub fn latest_ref(raw: &str, strip_prefix: &str) -> Option<String> {
    raw.lines()
        .filter_map(|line| {
            let (date, refname) = line.trim().split_once(' ')?;
            let at: DateTime<FixedOffset> = DateTime::parse_from_rfc3339(date.trim()).ok()?;
            let name = refname.trim();
            let name = name.strip_prefix(strip_prefix).unwrap_or(name);
            Some((at, name.to_string()))
        })
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
        .map(|(_, name)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ahead_behind_reads_columns_in_order() {
        assert_eq!(parse_ahead_behind("3\t5\n"), (5, 3));
        assert_eq!(parse_ahead_behind(""), (0, 0));
        assert_eq!(parse_ahead_behind("x y"), (0, 0));
    }

    #[test]
    fn numstat_skips_binary_lines_and_garbage() {
        let raw = "10\t2\tsrc/a.rs\n-\t-\tlogo.png\nzz\t1\tweird\n";
        assert_eq!(
            parse_numstat(raw),
            LineStats {
                added: 10,
                removed: 3,
                files: 3
            }
        );
    }

    #[test]
    fn subject_truncation() {
        let long = "a".repeat(60);
        let t = truncate_subject(&long);
        assert_eq!(t.chars().count(), 50);
        assert!(t.ends_with("..."));
        assert_eq!(truncate_subject("fix: typo"), "fix: typo");
    }

    #[test]
    fn porcelain_handles_renames_and_untracked() {
        let raw = " M src/lib.rs\nR  old.txt -> new.txt\n?? notes/todo.md\n";
        let entries = parse_porcelain(raw);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].path, "new.txt");
        assert!(entries[2].is_untracked());
        assert!(!entries[0].is_untracked());
    }

    #[test]
    fn latest_ref_compares_instants_not_names() {
        let raw = "\
2024-05-01T10:00:00+02:00 refs/remotes/origin/wip/h/20240601-000000
2024-05-01T09:30:00+00:00 refs/remotes/origin/wip/h/20240101-000000
not-a-date refs/remotes/origin/wip/h/zzz
";
        // 09:30Z is later than 10:00+02:00 (08:00Z).
        assert_eq!(
            latest_ref(raw, "refs/remotes/origin/").as_deref(),
            Some("wip/h/20240101-000000")
        );
    }

    #[test]
    fn latest_ref_on_empty_output_is_none() {
        assert_eq!(latest_ref("", "refs/remotes/origin/"), None);
    }
}
