//! Manifest configuration.
//!
//! Configuration is assembled once per run from four layers, later layers
//! taking precedence:
//!
//! ```text
//! 1. stock defaults           (ManifestConfig::default)
//! 2. api/manifest.toml        (deep-merged over the defaults)
//! 3. INCLUDED_ROOTS env var   (replaces include_top when non-empty)
//! 4. .manifestignore          (appends exclude_globs, deduplicated)
//! ```
//!
//! [`build_config`] folds all four into one [`ManifestConfig`] value; nothing
//! mutates it afterwards.
//!
//! ## Config File
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! virtual_root = "."
//! include_top = []                      # empty = auto-detect
//! auto_top_regex = '^\d+[_ -].*$'
//! exclude_dirs = [".git", ".github", "api"]
//! exclude_globs = ["**/node_modules/**", "**/.git/**", "**/.DS_Store"]
//!
//! [[overlay_rules]]
//! virtual_prefix = "1_architecture/1-2 UID-E (Minilab Explore)"
//! source_prefix = "sd_engine"
//! carry_suffix = true
//! origin_label = "engine"
//! ```
//!
//! The file never stops a run. Unknown keys and values of the wrong type are
//! dropped with a warning, and a file that cannot be read or parsed at all is
//! replaced by the stock defaults.
//!
//! ## Ignore File
//!
//! One glob per line. Blank lines and lines starting with `#` are skipped:
//!
//! ```text
//! # build output
//! **/dist/**
//! *.log
//! ```

use crate::overlay::RawRule;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Environment variable that overrides `include_top`.
pub const INCLUDED_ROOTS_ENV: &str = "INCLUDED_ROOTS";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Manifest configuration loaded from `manifest.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestConfig {
    /// Directory backing every virtual path no overlay rule claims,
    /// relative to the process root.
    pub virtual_root: String,
    /// Top-level entries to include. Empty means auto-detect.
    pub include_top: Vec<String>,
    /// Pattern top-level directory names must match when auto-detecting.
    pub auto_top_regex: String,
    /// Overlay rules projecting other directories into the virtual tree.
    pub overlay_rules: Vec<RawRule>,
    /// Directory names excluded wherever they appear in a virtual path.
    pub exclude_dirs: Vec<String>,
    /// Glob patterns matched against virtual paths.
    pub exclude_globs: Vec<String>,
    /// Base URL for files served from the default virtual root.
    pub repo_base_url: String,
    /// Base URL for files whose origin is `cdn_origin`.
    pub engine_cdn_base: String,
    /// Origin label whose files are served from `engine_cdn_base`.
    pub cdn_origin: String,
    /// Leading source directory stripped before building CDN URLs.
    pub cdn_source_root: String,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            virtual_root: ".".to_string(),
            include_top: Vec::new(),
            auto_top_regex: r"^\d+[_ -].*$".to_string(),
            overlay_rules: Vec::new(),
            exclude_dirs: vec![".git".into(), ".github".into(), "api".into()],
            exclude_globs: vec![
                "**/node_modules/**".into(),
                "**/.git/**".into(),
                "**/.DS_Store".into(),
            ],
            repo_base_url: "https://repository.infektionsdynamiken.de".to_string(),
            engine_cdn_base:
                "https://cdn.jsdelivr.net/gh/infektionsdynamiken/infektionsdynamiken-engine@main"
                    .to_string(),
            cdn_origin: "engine".to_string(),
            cdn_source_root: "sd_engine".to_string(),
        }
    }
}

impl ManifestConfig {
    /// Validate values that would otherwise fail late in the run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.virtual_root.trim().is_empty() {
            return Err(ConfigError::Validation(
                "virtual_root must not be empty".into(),
            ));
        }
        self.top_regex()?;
        Ok(())
    }

    /// Compiled `auto_top_regex`.
    pub fn top_regex(&self) -> Result<Regex, ConfigError> {
        Regex::new(&self.auto_top_regex).map_err(|e| {
            ConfigError::Validation(format!("auto_top_regex is not a valid regex: {e}"))
        })
    }

    /// The virtual root as a path under `root`.
    pub fn virtual_root_path(&self, root: &Path) -> PathBuf {
        root.join(self.virtual_root.trim())
    }

    /// Replace `include_top` with a comma-separated override.
    ///
    /// Entries are trimmed and empty entries dropped. An override with no
    /// entries left leaves the config untouched.
    pub fn with_included_roots(mut self, raw: Option<&str>) -> Self {
        let roots: Vec<String> = raw
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if !roots.is_empty() {
            self.include_top = roots;
        }
        self
    }

    /// Append ignore-file patterns to `exclude_globs`, keeping first
    /// occurrences and their order.
    pub fn with_extra_globs(mut self, extra: Vec<String>) -> Self {
        if extra.is_empty() {
            return self;
        }
        let mut merged: Vec<String> = Vec::with_capacity(self.exclude_globs.len() + extra.len());
        for glob in self.exclude_globs.drain(..).chain(extra) {
            if !merged.contains(&glob) {
                merged.push(glob);
            }
        }
        self.exclude_globs = merged;
        self
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// User overrides are merged on top of this value before deserializing.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ManifestConfig::default()).expect("default config must serialize")
}

/// Lay user settings over the stock defaults, key by key.
///
/// Each user key replaces the stock value whole, so a user `exclude_globs`
/// list replaces the stock list rather than extending it. Keys the stock
/// config does not have, and values whose TOML type differs from the stock
/// value, are dropped with a warning. A user document that is not a table
/// leaves the defaults untouched.
pub fn merge_user_config(defaults: toml::Value, user: toml::Value) -> toml::Value {
    let mut merged = match defaults {
        toml::Value::Table(table) => table,
        other => return other,
    };
    let toml::Value::Table(user) = user else {
        warn!("config file is not a table, ignoring it");
        return toml::Value::Table(merged);
    };
    for (key, value) in user {
        match merged.get(&key) {
            None => warn!(key = %key, "ignoring unknown config key"),
            Some(stock) if stock.type_str() != value.type_str() => warn!(
                key = %key,
                expected = stock.type_str(),
                found = value.type_str(),
                "ignoring config value of the wrong type"
            ),
            Some(_) => {
                merged.insert(key, value);
            }
        }
    }
    toml::Value::Table(merged)
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional user document onto the stock defaults, deserialize and
/// validate.
pub fn resolve_config(user: Option<toml::Value>) -> Result<ManifestConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match user {
        Some(user) => merge_user_config(base, user),
        None => base,
    };
    let config: ManifestConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Parse ignore-file content into glob patterns.
pub fn parse_ignore_file(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Read an ignore file. A missing file yields no patterns.
pub fn load_ignore_file(path: &Path) -> Result<Vec<String>, ConfigError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    Ok(parse_ignore_file(&fs::read_to_string(path)?))
}

/// Fold every configuration source into one immutable config.
///
/// `included_roots` is the raw value of [`INCLUDED_ROOTS_ENV`], passed in by
/// the caller so this function does not read the process environment.
///
/// Nothing here is fatal: a config file that cannot be used falls back to
/// the stock defaults and an unreadable ignore file contributes no patterns,
/// both with a warning.
pub fn build_config(
    config_file: &Path,
    included_roots: Option<&str>,
    ignore_file: &Path,
) -> ManifestConfig {
    let config = load_raw_config(config_file)
        .and_then(resolve_config)
        .unwrap_or_else(|e| {
            warn!(
                path = %config_file.display(),
                error = %e,
                "config file unusable, using stock defaults"
            );
            ManifestConfig::default()
        });
    let extra_globs = load_ignore_file(ignore_file).unwrap_or_else(|e| {
        warn!(path = %ignore_file.display(), error = %e, "ignore file unreadable, skipping it");
        Vec::new()
    });
    config
        .with_included_roots(included_roots)
        .with_extra_globs(extra_globs)
}

/// Returns a fully-commented stock `manifest.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Site Manifest Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys are ignored with a warning.
#
# Paths are relative to the process root (--root).

# Directory backing every virtual path that no overlay rule claims.
virtual_root = "."

# Top-level entries to include in the manifest, e.g. ["1_architecture"].
# Empty = auto-detect directories whose name matches auto_top_regex.
# The INCLUDED_ROOTS environment variable (comma-separated) replaces this list.
include_top = []

# Pattern top-level directory names must match when auto-detecting.
auto_top_regex = '^\d+[_ -].*$'

# Directory names excluded wherever they appear in a virtual path.
exclude_dirs = [".git", ".github", "api"]

# Shell-style globs (fnmatch) matched against virtual paths. "*" and "?"
# also match "/", and "**" is the same as "*".
# Directories are matched with a trailing "/". Patterns from .manifestignore
# are appended to this list.
exclude_globs = ["**/node_modules/**", "**/.git/**", "**/.DS_Store"]

# ---------------------------------------------------------------------------
# Download URLs
# ---------------------------------------------------------------------------
# Files from the virtual root link to <repo_base_url>/<virtual path>.
repo_base_url = "https://repository.infektionsdynamiken.de"

# Files whose origin is cdn_origin link to <engine_cdn_base>/<source path>,
# with a leading cdn_source_root directory removed from the source path.
engine_cdn_base = "https://cdn.jsdelivr.net/gh/infektionsdynamiken/infektionsdynamiken-engine@main"
cdn_origin = "engine"
cdn_source_root = "sd_engine"

# ---------------------------------------------------------------------------
# Overlay rules
# ---------------------------------------------------------------------------
# Each rule projects a physical directory onto a virtual prefix. The most
# specific prefix (most segments) wins; ties go to the rule listed first.
# Rules with an empty virtual_prefix or source_prefix are ignored.
#
# [[overlay_rules]]
# virtual_prefix = "1_architecture/1-2 UID-E (Minilab Explore)"
# source_prefix = "sd_engine"
# carry_suffix = true       # false = every path under the prefix maps to source_prefix
# origin_label = "engine"
"##
}
