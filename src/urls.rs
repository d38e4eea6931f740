//! Download URLs for file entries.
//!
//! Files from the default virtual root are linked through the site's own
//! host by virtual path. Files from the CDN origin are linked through the
//! CDN by source path, since the CDN mirrors the overlaid repository rather
//! than the virtual layout:
//!
//! ```text
//! repo:    docs/readme.md             → <repo_base_url>/docs/readme.md
//! engine:  sd_engine/src/core.js      → <engine_cdn_base>/src/core.js
//! ```

use crate::config::ManifestConfig;

/// Builds download URLs from the URL settings of a [`ManifestConfig`].
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    repo_base: String,
    cdn_base: String,
    cdn_origin: String,
    cdn_source_root: String,
}

impl UrlBuilder {
    pub fn new(config: &ManifestConfig) -> Self {
        Self {
            repo_base: config.repo_base_url.trim_end_matches('/').to_string(),
            cdn_base: config.engine_cdn_base.trim_end_matches('/').to_string(),
            cdn_origin: config.cdn_origin.clone(),
            cdn_source_root: config.cdn_source_root.trim_matches('/').to_string(),
        }
    }

    /// URL for a file with the given origin, virtual path and source path
    /// (both slash-separated, relative).
    pub fn file_url(&self, origin: &str, virtual_path: &str, source_path: &str) -> String {
        if origin == self.cdn_origin {
            format!("{}/{}", self.cdn_base, self.strip_cdn_root(source_path))
        } else {
            format!("{}/{}", self.repo_base, virtual_path)
        }
    }

    fn strip_cdn_root<'a>(&self, source_path: &'a str) -> &'a str {
        if self.cdn_source_root.is_empty() {
            return source_path;
        }
        match source_path.strip_prefix(self.cdn_source_root.as_str()) {
            Some("") => "",
            Some(rest) if rest.starts_with('/') => &rest[1..],
            _ => source_path,
        }
    }
}
