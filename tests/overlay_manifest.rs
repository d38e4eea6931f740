//! End-to-end runs of the library API against throwaway directory trees.

use serde_json::{Value, json};
use site_manifest::config::{self, ManifestConfig};
use site_manifest::manifest::{self, ManifestError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Run the full pipeline from an on-disk config, the way the binary does.
fn run(root: &Path, included_roots: Option<&str>) -> Value {
    let config = config::build_config(
        &root.join("api/manifest.toml"),
        included_roots,
        &root.join(".manifestignore"),
    );
    let manifest = manifest::build_manifest(root, &config).unwrap();
    let out = root.join("api/manifest.json");
    manifest::write_manifest(&manifest, &out, false).unwrap();
    serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap()
}

#[test]
fn overlay_scenario_from_config_file() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(root, "site/docs/readme.md", "# Docs");
    write(root, "vendor/lib/core.js", "export {}");
    write(
        root,
        "api/manifest.toml",
        r#"
virtual_root = "site"
include_top = ["docs"]
repo_base_url = "https://repo.test"
engine_cdn_base = "https://cdn.test"

[[overlay_rules]]
virtual_prefix = "docs/lib"
source_prefix = "vendor/lib"
carry_suffix = true
origin_label = "engine"
"#,
    );

    let doc = run(root, None);
    assert!(doc["generated"].as_i64().unwrap() > 0);
    assert_eq!(
        doc["tree"],
        json!({
            "docs": {
                "lib": {
                    "core.js": {
                        "__type": "file",
                        "origin": "engine",
                        "virt": "docs/lib/core.js",
                        "src": "vendor/lib/core.js",
                        "url": "https://cdn.test/vendor/lib/core.js"
                    }
                },
                "readme.md": {
                    "__type": "file",
                    "origin": "repo",
                    "virt": "docs/readme.md",
                    "src": "site/docs/readme.md",
                    "url": "https://repo.test/docs/readme.md"
                }
            }
        })
    );
}

#[test]
fn malformed_rule_does_not_stop_the_run() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(root, "1_site/index.md", "i");
    write(root, "vendor/lib/core.js", "c");
    write(
        root,
        "api/manifest.toml",
        r#"
unknown_setting = true

[[overlay_rules]]
virtual_prefix = "1_site/broken"
source_prefix = ["not", "a", "string"]

[[overlay_rules]]
virtual_prefix = "1_site/lib"
source_prefix = "vendor/lib"
note = "unknown keys in a rule are ignored"
"#,
    );

    let doc = run(root, None);
    let site = &doc["tree"]["1_site"];
    assert!(site.get("broken").is_none());
    assert_eq!(site["lib"]["core.js"]["src"], "vendor/lib/core.js");
    assert_eq!(site["index.md"]["origin"], "repo");
}

#[test]
fn env_and_ignore_file_layer_over_config() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(root, "1_alpha/a.md", "a");
    write(root, "1_alpha/a.log", "a");
    write(root, "2_beta/b.md", "b");
    write(root, "2_beta/node_modules/pkg/index.js", "x");
    write(root, ".manifestignore", "# logs\n*.log\n\n");

    let all = run(root, None);
    let tops: Vec<&String> = all["tree"].as_object().unwrap().keys().collect();
    assert_eq!(tops.len(), 2);
    assert!(all["tree"]["1_alpha"].get("a.log").is_none());
    assert!(all["tree"]["1_alpha"].get("a.md").is_some());
    assert_eq!(all["tree"]["2_beta"], json!({"b.md": all["tree"]["2_beta"]["b.md"].clone()}));

    let only_beta = run(root, Some("2_beta"));
    let tops: Vec<&String> = only_beta["tree"].as_object().unwrap().keys().collect();
    assert_eq!(tops, vec!["2_beta"]);
}

#[test]
fn three_level_overlay_reached_from_root() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(root, "1_repo/index.md", "i");
    write(root, "sd_engine/js/main.js", "m");
    let config = ManifestConfig {
        overlay_rules: vec![toml::from_str(
            r#"
virtual_prefix = "1_repo/explore/engine"
source_prefix = "sd_engine"
"#,
        )
        .unwrap()],
        ..Default::default()
    };

    let tree = manifest::build_tree(root, &config).unwrap();
    let json = serde_json::to_value(&tree).unwrap();
    let main = &json["1_repo"]["explore"]["engine"]["js"]["main.js"];
    assert_eq!(main["origin"], "engine");
    assert_eq!(main["src"], "sd_engine/js/main.js");
    assert_eq!(
        main["url"],
        "https://cdn.jsdelivr.net/gh/infektionsdynamiken/infektionsdynamiken-engine@main/js/main.js"
    );
}

#[test]
fn missing_virtual_root_aborts_run() {
    let tmp = TempDir::new().unwrap();
    let config = ManifestConfig {
        virtual_root: "absent".into(),
        ..Default::default()
    };
    let err = manifest::build_manifest(tmp.path(), &config).unwrap_err();
    assert!(matches!(err, ManifestError::MissingVirtualRoot(_)));
    assert!(err.to_string().contains("absent"));
}

#[test]
fn stock_config_parses_back() {
    let parsed: ManifestConfig = toml::from_str(config::stock_config_toml()).unwrap();
    assert_eq!(parsed, ManifestConfig::default());
}
