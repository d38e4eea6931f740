//! Builds the manifest tree by walking the virtual namespace.
//!
//! Each directory level is produced the same way:
//!
//! ```text
//! resolve(dir)                 which physical directory backs this level?
//!   list entries               missing directory ⇒ no entries
//!   ∪ synthetic_children(dir)  names that only exist because a rule points deeper
//!   sort naturally
//!   for each name:
//!     resolve(child)           a child may be backed by a different source
//!     directory? → ignore check (with trailing /) → recurse
//!     otherwise  → ignore check                    → file leaf
//! ```
//!
//! Synthetic children are what make deep overlay targets reachable: with a
//! rule for `x/y/z` and no physical `x/`, the root level still lists `x`,
//! `x` lists `y`, and `x/y` lists `z`, at which point the rule takes over and
//! `z` is listed from its mapped source.
//!
//! A synthetic name is always treated as a directory unless a rule maps it
//! onto a real file, so an overlay whose source was deleted shows up as an
//! empty folder. Nothing here is fatal: unreadable or vanished directories
//! simply contribute no entries.

use crate::config::ManifestConfig;
use crate::ignore::IgnoreFilter;
use crate::naming::sort_natural;
use crate::overlay::{ResolvedLocation, RuleTable};
use crate::types::{Directory, FileEntry, TreeNode};
use crate::urls::UrlBuilder;
use crate::vpath::VirtualPath;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Walks the virtual namespace for one run.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    root: PathBuf,
    virtual_root: PathBuf,
    rules: RuleTable,
    filter: IgnoreFilter,
    urls: UrlBuilder,
}

impl TreeBuilder {
    /// Set up a builder for the process root `root`.
    ///
    /// Relative paths in `config` (the virtual root, rule source prefixes)
    /// are taken relative to `root`.
    pub fn new(root: &Path, config: &ManifestConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            virtual_root: config.virtual_root_path(root),
            rules: RuleTable::new(&config.overlay_rules),
            filter: IgnoreFilter::new(&config.exclude_dirs, &config.exclude_globs),
            urls: UrlBuilder::new(config),
        }
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn virtual_root(&self) -> &Path {
        &self.virtual_root
    }

    /// Resolve a virtual path to its physical location on disk.
    pub fn physical_path(&self, path: &VirtualPath) -> (PathBuf, ResolvedLocation) {
        let resolved = self.rules.resolve(path);
        let physical = match &resolved {
            ResolvedLocation::Unmapped => resolved.effective_path(&self.virtual_root, path),
            ResolvedLocation::Mapped { physical_path, .. } => self.root.join(physical_path),
        };
        (physical, resolved)
    }

    /// Every name under a virtual directory: physical entries plus synthetic
    /// children, in natural order.
    pub fn child_names(&self, path: &VirtualPath) -> Vec<String> {
        self.children(path).0
    }

    fn children(&self, path: &VirtualPath) -> (Vec<String>, BTreeSet<String>) {
        let (dir, _) = self.physical_path(path);
        let synthetic = self.rules.synthetic_children(path);
        let mut names: BTreeSet<String> = list_dir(&dir).into_iter().collect();
        names.extend(synthetic.iter().cloned());
        let mut names: Vec<String> = names.into_iter().collect();
        sort_natural(&mut names);
        (names, synthetic)
    }

    /// Build the directory node for a virtual directory.
    pub fn build(&self, path: &VirtualPath) -> Directory {
        let (names, synthetic) = self.children(path);
        debug!(virtual_path = %path, entries = names.len(), "listing directory");

        let mut dir = Directory::new();
        for name in names {
            let child = path.join(&name);
            let (physical, resolved) = self.physical_path(&child);
            // A synthetic name is a directory unless its rule maps it onto a file.
            let is_dir = physical.is_dir() || (synthetic.contains(&name) && !physical.is_file());
            if self.filter.is_ignored(&child, &name, is_dir) {
                continue;
            }
            let node = if is_dir {
                TreeNode::Directory(self.build(&child))
            } else {
                TreeNode::File(self.file_entry(&child, &physical, resolved.origin()))
            };
            dir.push(name, node);
        }
        dir
    }

    fn file_entry(&self, path: &VirtualPath, physical: &Path, origin: &str) -> FileEntry {
        let virtual_path = path.as_string();
        let source_path = match physical.strip_prefix(&self.root) {
            Ok(rel) => slash_path(rel),
            Err(_) => physical.to_string_lossy().into_owned(),
        };
        let url = self.urls.file_url(origin, &virtual_path, &source_path);
        FileEntry {
            origin: origin.to_string(),
            virtual_path,
            source_path,
            url,
        }
    }
}

/// Names of the immediate entries of `dir`. Missing or unreadable
/// directories have no entries.
fn list_dir(dir: &Path) -> Vec<String> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect()
}

/// Render a relative path with `/` separators, dropping `.` components.
fn slash_path(path: &Path) -> String {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
