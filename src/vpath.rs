//! Paths in the projected (virtual) namespace.

use std::fmt;

/// A location in the virtual namespace, as a list of non-empty segments.
///
/// The empty path is the virtual root. Parsing is forgiving: surrounding
/// whitespace, leading/trailing slashes and empty segments (`a//b`) are
/// dropped, so `"/docs/lib/"` and `"docs/lib"` are the same path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VirtualPath {
    segments: Vec<String>,
}

impl VirtualPath {
    /// The virtual root.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(raw: &str) -> Self {
        Self {
            segments: split_segments(raw),
        }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment, or `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// This path extended by one child segment.
    pub fn join(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(split_segments(name));
        Self { segments }
    }

    /// `true` if `prefix` matches the start of this path, comparing segments
    /// case-insensitively.
    pub fn starts_with_ignore_case(&self, prefix: &[String]) -> bool {
        prefix.len() <= self.segments.len()
            && segments_eq_ignore_case(prefix, &self.segments[..prefix.len()])
    }

    /// Slash-joined form, empty for the root.
    pub fn as_string(&self) -> String {
        self.segments.join("/")
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

/// Split a slash-separated string into trimmed, non-empty segments.
pub(crate) fn split_segments(raw: &str) -> Vec<String> {
    raw.trim()
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Element-wise case-insensitive equality of two equally long segment lists.
pub(crate) fn segments_eq_ignore_case(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| eq_ignore_case(x, y))
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}
