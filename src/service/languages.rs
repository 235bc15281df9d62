//! Languages ast-grep can parse.
//!
//! The built-in list is merged with any `customLanguages` declared in the
//! resolved sgconfig.yaml. Reading the config never fails the caller: a
//! missing or malformed file just yields the built-in list.

use serde::Deserialize;
use serde_yaml::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::warn;

/// Languages ast-grep supports out of the box.
pub const BUILTIN_LANGUAGES: &[&str] = &[
    "bash",
    "c",
    "cpp",
    "csharp",
    "css",
    "elixir",
    "go",
    "haskell",
    "html",
    "java",
    "javascript",
    "json",
    "kotlin",
    "lua",
    "nix",
    "php",
    "python",
    "ruby",
    "rust",
    "scala",
    "solidity",
    "swift",
    "tsx",
    "typescript",
    "yaml",
];

/// The part of sgconfig.yaml this module reads.
#[derive(Debug, Default, Deserialize)]
struct SgConfig {
    #[serde(rename = "customLanguages", default)]
    custom_languages: Option<BTreeMap<String, Value>>,
}

/// Sorted, de-duplicated language names.
pub fn supported_languages(config_path: Option<&Path>) -> Vec<String> {
    let mut languages: BTreeSet<String> =
        BUILTIN_LANGUAGES.iter().map(|s| s.to_string()).collect();

    if let Some(path) = config_path {
        languages.extend(custom_languages(path));
    }

    languages.into_iter().collect()
}

fn custom_languages(path: &Path) -> Vec<String> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Could not read {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    match serde_yaml::from_str::<Option<SgConfig>>(&content) {
        Ok(config) => config
            .and_then(|c| c.custom_languages)
            .map(|langs| langs.into_keys().collect())
            .unwrap_or_default(),
        Err(e) => {
            warn!("Ignoring unparsable config {}: {}", path.display(), e);
            Vec::new()
        }
    }
}
