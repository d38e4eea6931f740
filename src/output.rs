//! CLI output formatting.
//!
//! Output is **virtual-first**: every line leads with the entry's name in the
//! projected namespace, and the physical source is shown only where it
//! differs from what a reader would assume, i.e. for overlaid files:
//!
//! ```text
//! 1_architecture/
//!     1-2 UID-E (Minilab Explore)/
//!         index.html  ← engine: sd_engine/index.html
//!     readme.md
//!
//! 2 directories, 2 files (1 overlaid)
//! ```
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::overlay::{DEFAULT_ORIGIN, ResolvedLocation};
use crate::types::{Directory, Manifest, TreeNode};
use crate::vpath::VirtualPath;
use std::collections::BTreeSet;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn count_overlaid(dir: &Directory) -> usize {
    dir.iter()
        .map(|(_, node)| match node {
            TreeNode::Directory(d) => count_overlaid(d),
            TreeNode::File(f) if f.origin != DEFAULT_ORIGIN => 1,
            TreeNode::File(_) => 0,
        })
        .sum()
}

fn walk_tree(dir: &Directory, depth: usize, lines: &mut Vec<String>) {
    for (name, node) in dir.iter() {
        match node {
            TreeNode::Directory(d) => {
                lines.push(format!("{}{}/", indent(depth), name));
                walk_tree(d, depth + 1, lines);
            }
            TreeNode::File(f) if f.origin != DEFAULT_ORIGIN => {
                lines.push(format!(
                    "{}{}  ← {}: {}",
                    indent(depth),
                    name,
                    f.origin,
                    f.source_path
                ));
            }
            TreeNode::File(_) => lines.push(format!("{}{}", indent(depth), name)),
        }
    }
}

/// One-line totals for a tree.
pub fn format_summary(tree: &Directory) -> String {
    let stats = tree.stats();
    let overlaid = count_overlaid(tree);
    let mut line = format!(
        "{} {}, {} {}",
        stats.directories,
        plural(stats.directories, "directory", "directories"),
        stats.files,
        plural(stats.files, "file", "files"),
    );
    if overlaid > 0 {
        line.push_str(&format!(" ({overlaid} overlaid)"));
    }
    line
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}

/// Indented listing of the tree followed by a summary line.
pub fn format_tree(tree: &Directory) -> Vec<String> {
    let mut lines = Vec::new();
    walk_tree(tree, 0, &mut lines);
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format_summary(tree));
    lines
}

/// Result lines for `generate`.
pub fn format_generate_output(manifest: &Manifest, output: &Path) -> Vec<String> {
    let top: Vec<&str> = manifest.tree.names();
    vec![
        format!("Wrote {}", output.display()),
        format!(
            "    Top level: {}",
            if top.is_empty() {
                "(none)".to_string()
            } else {
                top.join(", ")
            }
        ),
        format!("    {}", format_summary(&manifest.tree)),
    ]
}

/// Result lines for `resolve`.
pub fn format_resolution(
    path: &VirtualPath,
    resolved: &ResolvedLocation,
    physical: &Path,
    synthetic: &BTreeSet<String>,
) -> Vec<String> {
    let shown = if path.is_root() {
        "/".to_string()
    } else {
        path.to_string()
    };
    let mut lines = vec![shown];
    match resolved {
        ResolvedLocation::Unmapped => lines.push("    Rule: none (virtual root)".to_string()),
        ResolvedLocation::Mapped { origin, .. } => {
            lines.push(format!("    Rule: overlay ({origin})"))
        }
    }
    lines.push(format!("    Origin: {}", resolved.origin()));
    let state = if physical.is_dir() {
        "directory"
    } else if physical.exists() {
        "file"
    } else {
        "missing"
    };
    lines.push(format!("    Physical: {} ({state})", physical.display()));
    if !synthetic.is_empty() {
        let names: Vec<&str> = synthetic.iter().map(String::as_str).collect();
        lines.push(format!("    Synthetic children: {}", names.join(", ")));
    }
    lines
}

pub fn print_tree(tree: &Directory) {
    for line in format_tree(tree) {
        println!("{}", line);
    }
}

pub fn print_generate_output(manifest: &Manifest, output: &Path) {
    for line in format_generate_output(manifest, output) {
        println!("{}", line);
    }
}

pub fn print_resolution(
    path: &VirtualPath,
    resolved: &ResolvedLocation,
    physical: &Path,
    synthetic: &BTreeSet<String>,
) {
    for line in format_resolution(path, resolved, physical, synthetic) {
        println!("{}", line);
    }
}
