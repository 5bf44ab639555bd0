//! @ai:module:intent Configuration for an audit run: CLI values plus optional TOML settings
//! @ai:module:layer infrastructure
//! @ai:module:public_api AuditConfig, Checks, Settings, DocsSettings, RuleSettings, ClassifierSettings, KeywordRuleSettings, is_source_file, walk_files
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::model::EntityKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

/// @ai:intent Which halves of the audit to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checks {
    pub rules: bool,
    pub docs: bool,
}

impl Default for Checks {
    fn default() -> Self {
        Self {
            rules: true,
            docs: true,
        }
    }
}

/// @ai:intent Everything one run needs; threaded explicitly through every component
#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub provider_prefix: String,
    pub provider_path: PathBuf,
    pub docs_path: PathBuf,
    pub verbose: bool,
    pub checks: Checks,
    pub settings: Settings,
}

impl AuditConfig {
    /// @ai:intent Create a config with the conventional `<provider>/../website` docs root
    pub fn new(provider_prefix: impl Into<String>, provider_path: impl Into<PathBuf>) -> Self {
        let provider_path = provider_path.into();
        let docs_path = provider_path.join("..").join("website");
        Self {
            provider_prefix: provider_prefix.into(),
            provider_path,
            docs_path,
            verbose: false,
            checks: Checks::default(),
            settings: Settings::default(),
        }
    }

    pub fn with_docs_path(mut self, docs_path: impl Into<PathBuf>) -> Self {
        self.docs_path = docs_path.into();
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_checks(mut self, checks: Checks) -> Self {
        self.checks = checks;
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }
}

/// @ai:intent Tunables read from an optional TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub docs: DocsSettings,
    #[serde(default)]
    pub rules: RuleSettings,
    #[serde(default)]
    pub classifier: ClassifierSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocsSettings {
    #[serde(default = "default_doc_extensions")]
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleSettings {
    #[serde(default = "default_reserved_names")]
    pub reserved_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifierSettings {
    #[serde(default = "default_marker")]
    pub marker: String,
    /// Appended after the built-in datasource and resource rules.
    #[serde(default)]
    pub rules: Vec<KeywordRuleSettings>,
}

/// @ai:intent A keyword classification rule declared in configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordRuleSettings {
    pub kind: EntityKind,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub path_hints: Vec<String>,
    #[serde(default)]
    pub infixes: Vec<String>,
}

impl Default for DocsSettings {
    fn default() -> Self {
        Self {
            extensions: default_doc_extensions(),
        }
    }
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            reserved_names: default_reserved_names(),
        }
    }
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            rules: Vec::new(),
        }
    }
}

fn default_doc_extensions() -> Vec<String> {
    ["md", "markdown", "html.md", "html.markdown"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_reserved_names() -> Vec<String> {
    vec!["id".to_string()]
}

fn default_marker() -> String {
    "sidebar_current".to_string()
}

impl Settings {
    /// @ai:intent Load settings from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content).map_err(|message| Error::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    /// @ai:effects pure
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// @ai:intent Check whether a path ends with one of the documentation extensions
    /// @ai:example ("index.html.markdown") -> true
    /// @ai:effects pure
    pub fn is_doc_file(&self, path: &Path) -> bool {
        let name = path.to_string_lossy();
        self.docs
            .extensions
            .iter()
            .any(|ext| name.ends_with(&format!(".{}", ext)))
    }
}

/// @ai:intent Check whether a path is Go source that belongs to the provider (not a test)
/// @ai:effects pure
pub fn is_source_file(path: &Path) -> bool {
    let name = path.to_string_lossy();
    name.ends_with(".go") && !name.ends_with("_test.go")
}

/// @ai:intent Regular files under root in traversal order
/// @ai:post unreadable entries are skipped with a warning, the walk continues
/// @ai:effects fs:read
pub fn walk_files(root: &Path) -> impl Iterator<Item = DirEntry> + '_ {
    WalkDir::new(root)
        .into_iter()
        .filter_map(move |entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("skipping unreadable entry under {}: {}", root.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
}
