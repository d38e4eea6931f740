//! Shared test utilities for the site-manifest test suite.
//!
//! Provides fixture builders and tree lookups that panic with a readable
//! message on a miss, so assertions stay one line long.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_files(tmp.path(), &["site/docs/readme.md", "vendor/lib/core.js"]);
//!
//! let tree = builder.build(&VirtualPath::root());
//! assert_eq!(dir_at(&tree, "docs").names(), vec!["lib", "readme.md"]);
//! assert_eq!(file_at(&tree, "docs/lib/core.js").origin, "engine");
//! ```

use std::fs;
use std::path::Path;

use crate::overlay::RawRule;
use crate::types::{Directory, FileEntry, TreeNode};

// =========================================================================
// Fixture setup
// =========================================================================

/// Create files (and their parent directories) under `root`.
///
/// Entries ending in `/` create an empty directory instead. Files get their
/// own relative path as content.
pub fn write_files(root: &Path, entries: &[&str]) {
    for entry in entries {
        let path = root.join(entry.trim_end_matches('/'));
        if entry.ends_with('/') {
            fs::create_dir_all(&path).unwrap();
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, entry).unwrap();
        }
    }
}

/// A fully specified raw overlay rule.
pub fn rule(virtual_prefix: &str, source_prefix: &str, carry: bool, origin: &str) -> RawRule {
    RawRule {
        virtual_prefix: Some(virtual_prefix.to_string()),
        source_prefix: Some(source_prefix.to_string()),
        carry_suffix: Some(carry),
        origin_label: Some(origin.to_string()),
    }
}

// =========================================================================
// Tree lookups — panics with a clear message on miss
// =========================================================================

fn node_at<'a>(tree: &'a Directory, path: &str) -> &'a TreeNode {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let first = segments.next().expect("empty lookup path");
    let mut node = lookup(tree, first, path);
    for segment in segments {
        let dir = node
            .as_directory()
            .unwrap_or_else(|| panic!("'{path}': a file sits above '{segment}'"));
        node = lookup(dir, segment, path);
    }
    node
}

fn lookup<'a>(dir: &'a Directory, name: &str, full: &str) -> &'a TreeNode {
    dir.get(name).unwrap_or_else(|| {
        panic!(
            "'{name}' not found while looking up '{full}'. Available: {:?}",
            dir.names()
        )
    })
}

/// Directory node at a slash-separated path. Panics if missing or a file.
pub fn dir_at<'a>(tree: &'a Directory, path: &str) -> &'a Directory {
    node_at(tree, path)
        .as_directory()
        .unwrap_or_else(|| panic!("'{path}' is a file, expected a directory"))
}

/// File node at a slash-separated path. Panics if missing or a directory.
pub fn file_at<'a>(tree: &'a Directory, path: &str) -> &'a FileEntry {
    node_at(tree, path)
        .as_file()
        .unwrap_or_else(|| panic!("'{path}' is a directory, expected a file"))
}
