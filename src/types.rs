//! The manifest tree and its JSON shape.
//!
//! In memory a node is an enum. On the wire directories are plain JSON
//! objects (name → node, in natural order) and files are objects tagged with
//! `"__type": "file"`, which is the shape the site's front end reads:
//!
//! ```json
//! {
//!   "generated": 1760000000,
//!   "tree": {
//!     "docs": {
//!       "lib": {
//!         "core.js": {
//!           "__type": "file",
//!           "origin": "engine",
//!           "virt": "docs/lib/core.js",
//!           "src": "vendor/lib/core.js",
//!           "url": "https://cdn.example.org/vendor/lib/core.js"
//!         }
//!       },
//!       "readme.md": { "__type": "file", "origin": "repo", "...": "..." }
//!     }
//!   }
//! }
//! ```

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// A file leaf in the manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    /// Origin label of the source that backs this file.
    pub origin: String,
    /// Slash-separated virtual path.
    pub virtual_path: String,
    /// Slash-separated physical path, relative to the process root.
    pub source_path: String,
    pub url: String,
}

/// Directory children in display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Directory {
    entries: Vec<(String, TreeNode)>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a child. Callers insert in sorted order.
    pub fn push(&mut self, name: String, node: TreeNode) {
        self.entries.push((name, node));
    }

    pub fn get(&self, name: &str) -> Option<&TreeNode> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TreeNode)> {
        self.entries.iter().map(|(n, node)| (n.as_str(), node))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    Directory(Directory),
    File(FileEntry),
}

impl TreeNode {
    pub fn as_directory(&self) -> Option<&Directory> {
        match self {
            TreeNode::Directory(d) => Some(d),
            TreeNode::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileEntry> {
        match self {
            TreeNode::File(f) => Some(f),
            TreeNode::Directory(_) => None,
        }
    }
}

/// Totals over a tree, for summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub directories: usize,
    pub files: usize,
}

impl Directory {
    /// Count directories and files below this directory (not counting itself).
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        for (_, node) in self.iter() {
            match node {
                TreeNode::Directory(d) => {
                    let sub = d.stats();
                    stats.directories += 1 + sub.directories;
                    stats.files += sub.files;
                }
                TreeNode::File(_) => stats.files += 1,
            }
        }
        stats
    }
}

/// The complete output document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manifest {
    /// Unix timestamp (seconds) of the run.
    pub generated: i64,
    pub tree: Directory,
}

impl Serialize for FileEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        map.serialize_entry("__type", "file")?;
        map.serialize_entry("origin", &self.origin)?;
        map.serialize_entry("virt", &self.virtual_path)?;
        map.serialize_entry("src", &self.source_path)?;
        map.serialize_entry("url", &self.url)?;
        map.end()
    }
}

impl Serialize for Directory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, node) in &self.entries {
            map.serialize_entry(name, node)?;
        }
        map.end()
    }
}

impl Serialize for TreeNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TreeNode::Directory(d) => d.serialize(serializer),
            TreeNode::File(f) => f.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(virt: &str) -> TreeNode {
        TreeNode::File(FileEntry {
            origin: "repo".into(),
            virtual_path: virt.into(),
            source_path: format!("site/{virt}"),
            url: format!("https://example.org/{virt}"),
        })
    }

    #[test]
    fn file_serializes_with_type_tag() {
        let json = serde_json::to_value(file("docs/a.md")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "__type": "file",
                "origin": "repo",
                "virt": "docs/a.md",
                "src": "site/docs/a.md",
                "url": "https://example.org/docs/a.md",
            })
        );
    }

    #[test]
    fn directory_serializes_as_plain_object() {
        let mut inner = Directory::new();
        inner.push("a.md".into(), file("docs/a.md"));
        let mut root = Directory::new();
        root.push("docs".into(), TreeNode::Directory(inner));
        root.push("empty".into(), TreeNode::Directory(Directory::new()));

        let json = serde_json::to_value(&root).unwrap();
        assert_eq!(json["docs"]["a.md"]["__type"], "file");
        assert_eq!(json["empty"], serde_json::json!({}));
    }

    #[test]
    fn directory_preserves_insertion_order_in_json_text() {
        let mut dir = Directory::new();
        dir.push("item-2".into(), file("item-2"));
        dir.push("item-10".into(), file("item-10"));
        let text = serde_json::to_string(&dir).unwrap();
        let first = text.find("item-2").unwrap();
        let second = text.find("item-10").unwrap();
        assert!(first < second);
    }

    #[test]
    fn manifest_has_generated_and_tree() {
        let manifest = Manifest {
            generated: 42,
            tree: Directory::new(),
        };
        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json, serde_json::json!({"generated": 42, "tree": {}}));
    }

    #[test]
    fn stats_count_nested_entries() {
        let mut inner = Directory::new();
        inner.push("a".into(), file("d/a"));
        inner.push("b".into(), file("d/b"));
        let mut root = Directory::new();
        root.push("d".into(), TreeNode::Directory(inner));
        root.push("c".into(), file("c"));
        assert_eq!(
            root.stats(),
            TreeStats {
                directories: 1,
                files: 3
            }
        );
        assert_eq!(root.names(), vec!["d", "c"]);
        assert!(root.get("d").unwrap().as_directory().is_some());
        assert!(root.get("c").unwrap().as_file().is_some());
    }
}
