//! Overlay rules: projecting physical subtrees into the virtual namespace.
//!
//! A rule says "the virtual prefix `a/b` is backed by the physical directory
//! `vendor/x`". The [`RuleTable`] holds every rule from the configuration,
//! normalized and sorted so that the most specific rule comes first:
//!
//! ```text
//! virtual prefix                      physical prefix        carry
//! 1_architecture/1-2 UID-E/engine  →  sd_engine/src          yes   (3 segments)
//! 1_architecture/1-2 UID-E         →  sd_engine              yes   (2 segments)
//! docs                             →  vendor/docs/index.md   no    (1 segment)
//! ```
//!
//! Resolution scans the table top to bottom and takes the first rule whose
//! virtual prefix matches the start of the path (case-insensitively). Rules
//! with the same number of segments keep their configuration order, so the
//! rule listed first wins a tie.
//!
//! With `carry_suffix` the rest of the virtual path is appended to the
//! physical prefix; without it every path under the prefix collapses onto
//! the physical prefix itself, which is how single-file fallback rules work.
//!
//! The table also answers the inverse question for tree building: which
//! child names must exist under a virtual directory because some rule points
//! deeper into it ([`RuleTable::synthetic_children`]).

use crate::vpath::{VirtualPath, segments_eq_ignore_case, split_segments};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Origin label for files served from the default virtual root.
pub const DEFAULT_ORIGIN: &str = "repo";

/// Origin label for rules that do not name one.
pub const DEFAULT_RULE_ORIGIN: &str = "engine";

/// An overlay rule as written in the config file.
///
/// Reading a rule never fails. Unknown keys are ignored, prefixes and labels
/// that are not strings read as absent, and `carry_suffix` accepts any value
/// by truthiness (`0`, `""` and `[]` are false). A record that ends up
/// without both prefixes is dropped when the table is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carry_suffix: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_label: Option<String>,
}

impl RawRule {
    /// Read a rule record from an arbitrary TOML value.
    pub fn from_value(value: &toml::Value) -> Self {
        let Some(table) = value.as_table() else {
            debug!(record = %value, "overlay rule is not a table");
            return Self::default();
        };
        let string = |key: &str| {
            table
                .get(key)
                .and_then(toml::Value::as_str)
                .map(str::to_string)
        };
        Self {
            virtual_prefix: string("virtual_prefix"),
            source_prefix: string("source_prefix"),
            carry_suffix: table.get("carry_suffix").map(truthy),
            origin_label: string("origin_label"),
        }
    }
}

impl<'de> Deserialize<'de> for RawRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = toml::Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

fn truthy(value: &toml::Value) -> bool {
    match value {
        toml::Value::Boolean(b) => *b,
        toml::Value::Integer(i) => *i != 0,
        toml::Value::Float(f) => *f != 0.0,
        toml::Value::String(s) => !s.is_empty(),
        toml::Value::Array(a) => !a.is_empty(),
        toml::Value::Table(t) => !t.is_empty(),
        toml::Value::Datetime(_) => true,
    }
}

/// A normalized overlay rule.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayRule {
    virtual_prefix: Vec<String>,
    physical_prefix: PathBuf,
    carry_suffix: bool,
    origin: String,
}

impl OverlayRule {
    /// Normalize a raw rule. Returns `None` when either prefix is empty.
    pub fn from_raw(raw: &RawRule) -> Option<Self> {
        let virtual_prefix = split_segments(raw.virtual_prefix.as_deref().unwrap_or_default());
        let physical_segments = split_segments(raw.source_prefix.as_deref().unwrap_or_default());
        if virtual_prefix.is_empty() || physical_segments.is_empty() {
            return None;
        }
        let origin = raw
            .origin_label
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_RULE_ORIGIN)
            .to_string();
        Some(Self {
            virtual_prefix,
            physical_prefix: physical_segments.iter().collect(),
            carry_suffix: raw.carry_suffix.unwrap_or(true),
            origin,
        })
    }

    pub fn virtual_prefix(&self) -> &[String] {
        &self.virtual_prefix
    }

    pub fn physical_prefix(&self) -> &Path {
        &self.physical_prefix
    }

    pub fn carry_suffix(&self) -> bool {
        self.carry_suffix
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Physical location this rule assigns to `path`. The caller has already
    /// checked that the rule's prefix matches.
    fn physical_for(&self, path: &VirtualPath) -> PathBuf {
        let mut physical = self.physical_prefix.clone();
        if self.carry_suffix {
            physical.extend(&path.segments()[self.virtual_prefix.len()..]);
        }
        physical
    }
}

/// Where a virtual path lives on disk.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedLocation {
    /// No rule applies; the path lives under the default virtual root.
    Unmapped,
    /// A rule applies. `physical_path` is relative to the process root.
    Mapped {
        physical_path: PathBuf,
        origin: String,
    },
}

impl ResolvedLocation {
    pub fn origin(&self) -> &str {
        match self {
            ResolvedLocation::Unmapped => DEFAULT_ORIGIN,
            ResolvedLocation::Mapped { origin, .. } => origin,
        }
    }

    /// The physical path this resolution denotes, given the default virtual
    /// root and the virtual path that was resolved.
    pub fn effective_path(&self, virtual_root: &Path, path: &VirtualPath) -> PathBuf {
        match self {
            ResolvedLocation::Unmapped => {
                let mut p = virtual_root.to_path_buf();
                p.extend(path.segments());
                p
            }
            ResolvedLocation::Mapped { physical_path, .. } => physical_path.clone(),
        }
    }
}

/// Normalized overlay rules, most specific first.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<OverlayRule>,
}

impl RuleTable {
    /// Build a table from raw config records.
    ///
    /// Records with an empty virtual or source prefix are skipped. Survivors
    /// are stable-sorted by descending virtual segment count.
    pub fn new(raw: &[RawRule]) -> Self {
        let mut rules: Vec<OverlayRule> = raw
            .iter()
            .filter_map(|r| {
                let rule = OverlayRule::from_raw(r);
                if rule.is_none() {
                    debug!(
                        virtual_prefix = ?r.virtual_prefix,
                        source_prefix = ?r.source_prefix,
                        "dropping overlay rule with empty prefix"
                    );
                }
                rule
            })
            .collect();
        rules.sort_by(|a, b| b.virtual_prefix.len().cmp(&a.virtual_prefix.len()));
        Self { rules }
    }

    pub fn rules(&self) -> &[OverlayRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule (in table order) whose prefix matches `path`.
    pub fn matching_rule(&self, path: &VirtualPath) -> Option<&OverlayRule> {
        self.rules
            .iter()
            .find(|rule| path.starts_with_ignore_case(&rule.virtual_prefix))
    }

    pub fn resolve(&self, path: &VirtualPath) -> ResolvedLocation {
        match self.matching_rule(path) {
            Some(rule) => ResolvedLocation::Mapped {
                physical_path: rule.physical_for(path),
                origin: rule.origin.clone(),
            },
            None => ResolvedLocation::Unmapped,
        }
    }

    /// Child names that must appear under `parent` because a rule's virtual
    /// prefix continues below it.
    ///
    /// Names keep the spelling of the rule that introduced them. Two rules
    /// that differ only in case at this level both contribute.
    pub fn synthetic_children(&self, parent: &VirtualPath) -> BTreeSet<String> {
        let depth = parent.len();
        self.rules
            .iter()
            .filter(|rule| rule.virtual_prefix.len() > depth)
            .filter(|rule| {
                segments_eq_ignore_case(&rule.virtual_prefix[..depth], parent.segments())
            })
            .map(|rule| rule.virtual_prefix[depth].clone())
            .collect()
    }
}
