//! Filename heuristics for spotting an installed game directory.
//!
//! Best effort only: a directory counts as a game when any file in it looks
//! like a launcher or like a manifest/config file.

use std::{path::Path, sync::OnceLock};

use regex::{Regex, RegexSet};

fn launcher_patterns() -> &'static RegexSet {
    static PATTERNS: OnceLock<RegexSet> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        RegexSet::new([
            r"(?i)\.exe$",
            r"(?i)\.sh$",
            r"(?i)\.x86_64$",
            r"(?i)\.x86$",
            r"(?i)^start",
            r"(?i)^launch",
            r"(?i)^run",
        ])
        .expect("launcher patterns are valid")
    })
}

fn manifest_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)manifest|config|\.acf$").expect("manifest pattern is valid")
    })
}

pub fn is_launcher_name(file_name: &str) -> bool {
    launcher_patterns().is_match(file_name)
}

pub fn is_manifest_name(file_name: &str) -> bool {
    manifest_pattern().is_match(file_name)
}

/// True when any entry name in `dir` matches a launcher or manifest pattern.
/// Unreadable directories are not games.
pub fn looks_like_game_dir(dir: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };

    entries.flatten().any(|entry| {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        is_launcher_name(&name) || is_manifest_name(&name)
    })
}
