//! Exclusion rules for manifest entries.
//!
//! An entry is left out of the manifest when any of these hold:
//!
//! 1. its name starts with `.` (dotfiles and dot-directories)
//! 2. any segment of its virtual path is an excluded directory name
//! 3. its virtual path matches an exclude glob; directories are tested with
//!    a trailing `/` so `*/drafts/` targets the directory but not a file
//!    called `drafts`
//!
//! Globs are shell-style (`fnmatch`), not path globs: `*` and `?` also match
//! `/`, `**` means the same as `*`, and `[...]` / `[!...]` are character
//! classes. So `*.tmp` excludes temporary files at any depth, while
//! `**/node_modules/**` needs at least one directory in front of
//! `node_modules`. Every string is a valid pattern; a `[` without a closing
//! `]` is a literal bracket. Globs always run against the virtual path,
//! which means a pattern written once applies to overlaid content too.

use crate::vpath::VirtualPath;
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Compiled exclusion rules.
#[derive(Debug, Clone, Default)]
pub struct IgnoreFilter {
    exclude_dirs: HashSet<String>,
    patterns: Vec<Regex>,
}

impl IgnoreFilter {
    pub fn new(exclude_dirs: &[String], exclude_globs: &[String]) -> Self {
        let patterns = exclude_globs.iter().filter_map(|g| compile_glob(g)).collect();
        Self {
            exclude_dirs: exclude_dirs.iter().cloned().collect(),
            patterns,
        }
    }

    /// Number of compiled glob patterns. Patterns that can never match are
    /// not kept.
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_ignored(&self, path: &VirtualPath, name: &str, is_dir: bool) -> bool {
        if name.starts_with('.') {
            return true;
        }
        if path
            .segments()
            .iter()
            .any(|s| self.exclude_dirs.contains(s))
        {
            return true;
        }
        let mut candidate = path.as_string();
        if is_dir {
            candidate.push('/');
        }
        self.patterns.iter().any(|p| p.is_match(&candidate))
    }
}

/// Compile a shell-style glob into an anchored regex.
///
/// Returns `None` for a pattern that can never match, which happens when a
/// character class is left empty once its reversed ranges are removed.
fn compile_glob(glob: &str) -> Option<Regex> {
    let Some(body) = glob_to_regex(glob) else {
        debug!(pattern = %glob, "exclude glob can never match");
        return None;
    };
    match Regex::new(&format!("^(?s:{body})$")) {
        Ok(rx) => Some(rx),
        Err(e) => {
            warn!(pattern = %glob, error = %e, "skipping exclude glob");
            None
        }
    }
}

fn glob_to_regex(glob: &str) -> Option<String> {
    let chars: Vec<char> = glob.chars().collect();
    let mut out = String::new();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                while chars.get(i + 1) == Some(&'*') {
                    i += 1;
                }
                out.push_str(".*");
            }
            '?' => out.push('.'),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.push_str(&class_to_regex(&chars[i + 1..end])?);
                    i = end;
                }
                None => out.push_str(r"\["),
            },
            c => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
        i += 1;
    }
    Some(out)
}

/// Index of the `]` closing the class opened at `open`. A `]` right after
/// `[` or `[!` is a member, not the end.
fn class_end(chars: &[char], open: usize) -> Option<usize> {
    let mut j = open + 1;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    while j < chars.len() && chars[j] != ']' {
        j += 1;
    }
    (j < chars.len()).then_some(j)
}

/// Translate the inside of `[...]`. Reversed ranges such as `z-a` match
/// nothing and are left out.
fn class_to_regex(body: &[char]) -> Option<String> {
    let (negated, body) = match body.split_first() {
        Some(('!', rest)) => (true, rest),
        _ => (false, body),
    };
    let mut ranges = Vec::new();
    let mut i = 0;
    while i < body.len() {
        if i + 2 < body.len() && body[i + 1] == '-' {
            ranges.push((body[i], body[i + 2]));
            i += 3;
        } else {
            ranges.push((body[i], body[i]));
            i += 1;
        }
    }
    ranges.retain(|(lo, hi)| lo <= hi);

    if ranges.is_empty() {
        return negated.then(|| ".".to_string());
    }
    let mut class = String::from(if negated { "[^" } else { "[" });
    for (lo, hi) in ranges {
        push_class_char(&mut class, lo);
        if lo != hi {
            class.push('-');
            push_class_char(&mut class, hi);
        }
    }
    class.push(']');
    Some(class)
}

fn push_class_char(class: &mut String, c: char) {
    if matches!(c, '\\' | '[' | ']' | '^' | '-' | '&' | '~') {
        class.push('\\');
    }
    class.push(c);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(dirs: &[&str], globs: &[&str]) -> IgnoreFilter {
        let dirs: Vec<String> = dirs.iter().map(|s| s.to_string()).collect();
        let globs: Vec<String> = globs.iter().map(|s| s.to_string()).collect();
        IgnoreFilter::new(&dirs, &globs)
    }

    fn ignored(f: &IgnoreFilter, path: &str, is_dir: bool) -> bool {
        let p = VirtualPath::parse(path);
        let name = p.name().unwrap_or_default().to_string();
        f.is_ignored(&p, &name, is_dir)
    }

    #[test]
    fn dotfiles_are_ignored() {
        let f = filter(&[], &[]);
        assert!(ignored(&f, "docs/.hidden", false));
        assert!(ignored(&f, ".cache", true));
        assert!(!ignored(&f, "docs/visible", false));
    }

    #[test]
    fn excluded_dir_anywhere_in_path() {
        let f = filter(&["api", "node_modules"], &[]);
        assert!(ignored(&f, "api", true));
        assert!(ignored(&f, "site/node_modules/pkg/index.js", false));
        assert!(!ignored(&f, "site/apis/index.js", false));
    }

    #[test]
    fn excluded_dir_is_case_sensitive() {
        let f = filter(&["api"], &[]);
        assert!(!ignored(&f, "API/x", false));
    }

    #[test]
    fn star_crosses_separators() {
        let f = filter(&[], &["*.tmp"]);
        assert!(ignored(&f, "a/b/c/scratch.tmp", false));
        assert!(!ignored(&f, "a/b/c/scratch.txt", false));
    }

    #[test]
    fn directory_form_gets_trailing_slash() {
        let f = filter(&[], &["*/drafts/"]);
        assert!(ignored(&f, "docs/drafts", true));
        assert!(!ignored(&f, "docs/drafts", false));
    }

    #[test]
    fn glob_matching_is_case_sensitive() {
        let f = filter(&[], &["*.TMP"]);
        assert!(!ignored(&f, "a/x.tmp", false));
        assert!(ignored(&f, "a/x.TMP", false));
    }

    #[test]
    fn character_classes_supported() {
        let f = filter(&[], &["logs/[0-9]*"]);
        assert!(ignored(&f, "logs/2024.txt", false));
        assert!(!ignored(&f, "logs/readme.txt", false));
    }

    #[test]
    fn doubled_star_is_a_plain_star() {
        let f = filter(&[], &["docs/draft**"]);
        assert!(ignored(&f, "docs/drafts.md", false));
        assert!(ignored(&f, "docs/draft/one.md", false));
        assert!(!ignored(&f, "notes/drafts.md", false));

        let all = filter(&[], &["***"]);
        assert!(ignored(&all, "a.md", false));
    }

    #[test]
    fn leading_double_star_needs_a_directory() {
        let f = filter(&[], &["**/node_modules/**"]);
        assert!(!ignored(&f, "node_modules/x.js", false));
        assert!(ignored(&f, "site/node_modules/x.js", false));
        assert!(ignored(&f, "site/node_modules", true));
    }

    #[test]
    fn unclosed_bracket_is_literal() {
        let f = filter(&[], &["a[b"]);
        assert_eq!(f.pattern_count(), 1);
        assert!(ignored(&f, "a[b", false));
        assert!(!ignored(&f, "ab", false));
    }

    #[test]
    fn negated_and_bracket_member_classes() {
        let f = filter(&[], &["v[!0-9]*", "x[]]"]);
        assert!(ignored(&f, "vx.md", false));
        assert!(!ignored(&f, "v1.md", false));
        assert!(ignored(&f, "x]", false));
    }

    #[test]
    fn question_mark_matches_one_char() {
        let f = filter(&[], &["log?.txt", "a?b"]);
        assert!(ignored(&f, "log1.txt", false));
        assert!(!ignored(&f, "log12.txt", false));
        assert!(ignored(&f, "a/b", false));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let f = filter(&[], &["notes (old).md", "a+b|c"]);
        assert!(ignored(&f, "notes (old).md", false));
        assert!(!ignored(&f, "notes old.md", false));
        assert!(ignored(&f, "a+b|c", false));
        assert!(!ignored(&f, "aab", false));
    }

    #[test]
    fn reversed_range_matches_nothing() {
        let f = filter(&[], &["[z-a]", "*.bak"]);
        assert_eq!(f.pattern_count(), 1);
        assert!(!ignored(&f, "m", false));
        assert!(ignored(&f, "x.bak", false));
    }
}
