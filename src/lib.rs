//! # Site Manifest
//!
//! Builds a static JSON manifest of a website's downloadable files by walking
//! one or more directory trees and projecting them into a single virtual
//! namespace. The site's front end reads the manifest to render a file
//! browser; it never sees where files physically live.
//!
//! # Overlays
//!
//! Most of the virtual namespace mirrors one directory, the *virtual root*.
//! Overlay rules graft other directories onto it:
//!
//! ```text
//! physical                         virtual
//! site/                            /
//! ├── docs/                        ├── docs/
//! │   └── readme.md                │   ├── lib/          ← synthesized
//! vendor/                          │   │   └── core.js   ← vendor/lib/core.js
//! └── lib/                         │   └── readme.md
//!     └── core.js
//!
//! rule: docs/lib → vendor/lib
//! ```
//!
//! Three questions drive every run:
//!
//! - **Which source backs a path?** The most specific matching rule, or the
//!   virtual root when none matches ([`overlay::RuleTable::resolve`]).
//! - **Which names exist in a directory?** Its physical entries plus any names
//!   a deeper rule needs to be reachable ([`overlay::RuleTable::synthetic_children`]).
//! - **Which entries are hidden?** Dotfiles, excluded directory names and
//!   exclude globs, all judged on the virtual path ([`ignore::IgnoreFilter`]).
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`overlay`] | Rule table: normalization, longest-prefix resolution, synthetic children |
//! | [`vpath`] | Virtual path type with case-insensitive prefix matching |
//! | [`ignore`] | Dotfile, excluded-directory and glob exclusion |
//! | [`naming`] | Natural (digit-aware, case-insensitive) name ordering |
//! | [`tree`] | Recursive tree builder combining the above |
//! | [`manifest`] | Top-level selection, timestamping, atomic JSON output |
//! | [`config`] | Layered config: stock defaults, `manifest.toml`, environment, ignore file |
//! | [`urls`] | Download URL for each file, keyed on its origin |
//! | [`types`] | The manifest tree and its JSON shape |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## One Run, One Snapshot
//!
//! There is no watching, caching or incremental rebuild. A run loads the
//! config, walks the tree depth-first and writes the manifest; the tree is
//! small enough that a full rebuild is cheaper than tracking changes.
//!
//! ## Degrade, Don't Abort
//!
//! The only fatal input error is a missing virtual root. A rule with an empty
//! prefix is dropped, a directory that vanished lists as empty, an overlay
//! whose source was deleted shows up as an empty folder. A manifest with a
//! hole in it is more useful to the site than no manifest at all.
//!
//! ## Config Is a Value
//!
//! All configuration sources are folded into one [`config::ManifestConfig`]
//! by [`config::build_config`] before anything else runs. The environment is
//! read by the binary and passed in, so the library never consults global
//! state.

pub mod config;
pub mod ignore;
pub mod manifest;
pub mod naming;
pub mod output;
pub mod overlay;
pub mod tree;
pub mod types;
pub mod urls;
pub mod vpath;

#[cfg(test)]
pub(crate) mod test_helpers;
