//! Manifest assembly: top-level selection, tree building and output.
//!
//! ## Top-Level Selection
//!
//! The manifest does not expose the whole virtual root. Its top level is
//! either the explicit `include_top` list, or, when that is empty, every
//! directory under the virtual root whose name matches `auto_top_regex`:
//!
//! ```text
//! repo/                            auto_top_regex = '^\d+[_ -].*$'
//! ├── 1_architecture/       ✓
//! ├── 12-3 Presentation layer/ ✓
//! ├── scripts/              ✗  (no number prefix)
//! └── api/                  ✗
//! ```
//!
//! Names synthesized at the root by overlay rules take part in auto-detection
//! too, so a top-level overlay target appears even when nothing exists at
//! that location physically.
//!
//! ## Output
//!
//! The manifest is written to a temporary file next to the destination and
//! renamed into place, so readers never observe a half-written file.

use crate::config::{ConfigError, ManifestConfig};
use crate::naming::sort_natural;
use crate::tree::TreeBuilder;
use crate::types::{Directory, Manifest, TreeNode};
use crate::vpath::VirtualPath;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Virtual root not found: {0}")]
    MissingVirtualRoot(PathBuf),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Top-level names of the manifest, in natural order.
pub fn top_level_names(
    builder: &TreeBuilder,
    config: &ManifestConfig,
) -> Result<Vec<String>, ConfigError> {
    if !config.include_top.is_empty() {
        let mut names = config.include_top.clone();
        sort_natural(&mut names);
        names.dedup();
        return Ok(names);
    }

    let rx = config.top_regex()?;
    let root = VirtualPath::root();
    let synthetic = builder.rules().synthetic_children(&root);
    let names = builder
        .child_names(&root)
        .into_iter()
        .filter(|name| {
            synthetic.contains(name) || builder.virtual_root().join(name).is_dir()
        })
        .filter(|name| rx.find(name).is_some_and(|m| m.start() == 0))
        .collect();
    Ok(names)
}

/// Build the manifest tree for the process root `root`.
///
/// Fails only when the virtual root does not exist or the config's
/// `auto_top_regex` does not compile.
pub fn build_tree(root: &Path, config: &ManifestConfig) -> Result<Directory, ManifestError> {
    let builder = TreeBuilder::new(root, config);
    if !builder.virtual_root().exists() {
        return Err(ManifestError::MissingVirtualRoot(
            builder.virtual_root().to_path_buf(),
        ));
    }

    let mut tree = Directory::new();
    for top in top_level_names(&builder, config)? {
        let node = builder.build(&VirtualPath::parse(&top));
        tree.push(top, TreeNode::Directory(node));
    }
    Ok(tree)
}

/// Build the complete manifest, stamped with the current time.
pub fn build_manifest(root: &Path, config: &ManifestConfig) -> Result<Manifest, ManifestError> {
    Ok(Manifest {
        generated: chrono::Utc::now().timestamp(),
        tree: build_tree(root, config)?,
    })
}

/// Serialize a manifest to JSON.
pub fn to_json(manifest: &Manifest, pretty: bool) -> Result<String, ManifestError> {
    let json = if pretty {
        serde_json::to_string_pretty(manifest)?
    } else {
        serde_json::to_string(manifest)?
    };
    Ok(json)
}

/// Write the manifest to `path`, replacing any previous file atomically.
///
/// Parent directories are created as needed.
pub fn write_manifest(manifest: &Manifest, path: &Path, pretty: bool) -> Result<(), ManifestError> {
    let json = to_json(manifest, pretty)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = temp_path_for(path);
    fs::write(&tmp, json)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    let stats = manifest.tree.stats();
    info!(
        path = %path.display(),
        directories = stats.directories,
        files = stats.files,
        "wrote manifest"
    );
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "manifest.json".to_string());
    path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}
