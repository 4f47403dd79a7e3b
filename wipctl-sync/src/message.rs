//! Commit and stash messages used when no generated text is available.

use chrono::{DateTime, Local};

/// `chore(wip): checkpoint <host> (<branch>) — <n> files @ <YYYY-MM-DD HH:MM:SS>`
pub fn push_fallback(host: &str, branch: &str, files: usize, at: &DateTime<Local>) -> String {
    format!(
        "chore(wip): checkpoint {host} ({branch}) — {files} files @ {}",
        at.format("%Y-%m-%d %H:%M:%S")
    )
}

/// `[<prefix>] checkpoint(<HH:MM>): rapid development sync - <n> files modified, <m> files added`
///
/// Zero counts are left out; with no changes at all the ` - …` tail is omitted.
pub fn checkpoint_fallback(
    prefix: Option<&str>,
    modified: usize,
    added: usize,
    at: &DateTime<Local>,
) -> String {
    let mut message = with_prefix(
        prefix,
        format!("checkpoint({}): rapid development sync", at.format("%H:%M")),
    );
    let mut details = Vec::new();
    if modified > 0 {
        details.push(format!("{modified} files modified"));
    }
    if added > 0 {
        details.push(format!("{added} files added"));
    }
    if !details.is_empty() {
        message.push_str(" - ");
        message.push_str(&details.join(", "));
    }
    message
}

/// Wrap generated text: `feat(<feature>): ` first, then `[<prefix>] `.
pub fn decorate_checkpoint(generated: &str, feature: Option<&str>, prefix: Option<&str>) -> String {
    let message = match feature {
        Some(feature) => format!("feat({feature}): {generated}"),
        None => generated.to_string(),
    };
    with_prefix(prefix, message)
}

/// Message of the stash created before a pull switches branches.
pub fn stash_message(wip: &str) -> String {
    format!("wipctl auto-stash before pull - {wip}")
}

fn with_prefix(prefix: Option<&str>, message: String) -> String {
    match prefix.map(str::trim).filter(|p| !p.is_empty()) {
        Some(prefix) => format!("[{prefix}] {message}"),
        None => message,
    }
}
