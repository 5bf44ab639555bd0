//! @ai:module:intent Classify documentation fragments and index them by canonical name
//! @ai:module:layer application
//! @ai:module:public_api ClassificationRule, KeywordRule, Classifier, Unclassified, DocFragment, ClassifiedDoc, DocIndex, collect_fragments
//! @ai:module:depends_on config, model, output
//! @ai:module:stateless true
//!
//! A fragment is named by its `sidebar_current` front matter, e.g.
//! `docs-acme-datasource-region` becomes the datasource `acme_region`.

use crate::config::{walk_files, ClassifierSettings, KeywordRuleSettings, Settings};
use crate::model::EntityKind;
use crate::output::Reporter;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

const LEADING_SEGMENT: &str = "docs-";

/// @ai:intent One (predicate, strip rule) pair deciding a fragment's kind
pub trait ClassificationRule {
    fn kind(&self) -> EntityKind;

    /// Whether the marker value or the fragment path selects this rule.
    fn matches(&self, value: &str, path: &Path) -> bool;

    /// Remove the kind-specific part of the marker value, leaving the entity suffix.
    fn strip<'v>(&self, value: &'v str) -> &'v str;
}

/// @ai:intent Keyword, path hint and infix driven rule; the built-in rules are KeywordRules
#[derive(Debug, Clone)]
pub struct KeywordRule {
    pub kind: EntityKind,
    pub keywords: Vec<String>,
    pub path_hints: Vec<String>,
    pub infixes: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl KeywordRule {
    pub fn datasource() -> Self {
        Self {
            kind: EntityKind::Datasource,
            keywords: owned(&["datasource", "data-source"]),
            path_hints: owned(&["/d/", "data_source"]),
            infixes: owned(&["datasource-", "data-source-"]),
        }
    }

    pub fn resource() -> Self {
        Self {
            kind: EntityKind::Resource,
            keywords: owned(&["resource"]),
            path_hints: owned(&["/r/"]),
            infixes: owned(&["resource-"]),
        }
    }
}

impl From<&KeywordRuleSettings> for KeywordRule {
    fn from(settings: &KeywordRuleSettings) -> Self {
        Self {
            kind: settings.kind,
            keywords: settings.keywords.clone(),
            path_hints: settings.path_hints.clone(),
            infixes: settings.infixes.clone(),
        }
    }
}

impl ClassificationRule for KeywordRule {
    fn kind(&self) -> EntityKind {
        self.kind
    }

    fn matches(&self, value: &str, path: &Path) -> bool {
        let path = path.to_string_lossy();
        self.keywords.iter().any(|k| value.contains(k.as_str()))
            || self.path_hints.iter().any(|h| path.contains(h.as_str()))
    }

    /// Everything up to and including the last infix occurrence is dropped.
    fn strip<'v>(&self, value: &'v str) -> &'v str {
        let cut = self
            .infixes
            .iter()
            .filter_map(|infix| value.rfind(infix.as_str()).map(|idx| idx + infix.len()))
            .max();
        match cut {
            Some(idx) => &value[idx..],
            None => value,
        }
    }
}

/// @ai:intent Why a fragment could not be classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unclassified {
    NoMarker,
    NoMatchingRule { values: Vec<String> },
}

impl fmt::Display for Unclassified {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unclassified::NoMarker => f.write_str("no front-matter marker"),
            Unclassified::NoMatchingRule { values } => {
                write!(f, "no rule matches marker {}", values.join(", "))
            }
        }
    }
}

/// @ai:intent Derives (canonical name, kind) from a fragment's front matter
pub struct Classifier {
    provider_prefix: String,
    marker: Regex,
    rules: Vec<Box<dyn ClassificationRule>>,
}

impl Classifier {
    /// @ai:intent Classifier with the built-in datasource then resource rules
    pub fn new(provider_prefix: impl Into<String>) -> Self {
        Self::from_settings(provider_prefix, &ClassifierSettings::default())
    }

    /// @ai:intent Classifier with a configured marker and extra keyword rules
    pub fn from_settings(provider_prefix: impl Into<String>, settings: &ClassifierSettings) -> Self {
        let pattern = format!(
            r#"{}\s*:\s*(?:"([^"]*)"|'([^']*)'|(\S+))"#,
            regex::escape(&settings.marker)
        );
        let marker = Regex::new(&pattern).expect("Invalid regex");

        let mut rules: Vec<Box<dyn ClassificationRule>> = vec![
            Box::new(KeywordRule::datasource()),
            Box::new(KeywordRule::resource()),
        ];
        for rule in &settings.rules {
            rules.push(Box::new(KeywordRule::from(rule)));
        }

        Self {
            provider_prefix: provider_prefix.into(),
            marker,
            rules,
        }
    }

    /// @ai:intent Append a rule; it runs after every existing rule
    pub fn with_rule(mut self, rule: impl ClassificationRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// @ai:intent Classify a fragment from its marker lines
    /// @ai:post the first marker line that some rule matches decides the result
    /// @ai:example (docs/d/region.html.md, "sidebar_current: \"docs-acme-datasource-region\"") -> ("acme_region", Datasource)
    /// @ai:effects pure
    pub fn classify(
        &self,
        path: &Path,
        content: &[u8],
    ) -> std::result::Result<(String, EntityKind), Unclassified> {
        let text = String::from_utf8_lossy(content);
        let mut values = Vec::new();

        for line in text.lines() {
            let Some(captures) = self.marker.captures(line) else {
                continue;
            };
            let value = (1..=3)
                .find_map(|group| captures.get(group))
                .map(|m| m.as_str().trim())
                .unwrap_or_default();
            values.push(value.to_string());

            let value = self.strip_leading(value);
            for rule in &self.rules {
                if !rule.matches(value, path) {
                    continue;
                }
                let suffix = rule.strip(value);
                if suffix.is_empty() {
                    break;
                }
                return Ok((self.canonical_name(suffix), rule.kind()));
            }
        }

        if values.is_empty() {
            Err(Unclassified::NoMarker)
        } else {
            Err(Unclassified::NoMatchingRule { values })
        }
    }

    fn strip_leading<'v>(&self, value: &'v str) -> &'v str {
        let value = value.strip_prefix(LEADING_SEGMENT).unwrap_or(value);
        value
            .strip_prefix(self.provider_prefix.as_str())
            .and_then(|rest| rest.strip_prefix('-'))
            .unwrap_or(value)
    }

    /// @ai:intent Build `{prefix}_{suffix}` with spaces and hyphens as underscores
    /// @ai:effects pure
    pub fn canonical_name(&self, suffix: &str) -> String {
        format!("{}_{}", self.provider_prefix, suffix.replace([' ', '-'], "_"))
    }

    /// @ai:intent Recover the suffix from a canonical name built by this classifier
    /// @ai:effects pure
    pub fn split<'n>(&self, canonical: &'n str) -> Option<&'n str> {
        canonical
            .strip_prefix(self.provider_prefix.as_str())
            .and_then(|rest| rest.strip_prefix('_'))
    }
}

/// @ai:intent Raw documentation file as read from disk
#[derive(Debug, Clone)]
pub struct DocFragment {
    pub path: PathBuf,
    pub content: Vec<u8>,
}

/// @ai:intent A fragment bound to the entity it documents
#[derive(Debug, Clone)]
pub struct ClassifiedDoc {
    pub canonical_name: String,
    pub kind: EntityKind,
    pub content: Vec<u8>,
    pub path: PathBuf,
}

impl ClassifiedDoc {
    /// @ai:intent Exact, whitespace-sensitive byte substring search
    /// @ai:effects pure
    pub fn contains(&self, needle: &str) -> bool {
        let needle = needle.as_bytes();
        !needle.is_empty()
            && self
                .content
                .windows(needle.len())
                .any(|window| window == needle)
    }
}

/// @ai:intent Classified fragments keyed by canonical name, one map per kind
#[derive(Debug, Default)]
pub struct DocIndex {
    resources: HashMap<String, ClassifiedDoc>,
    datasources: HashMap<String, ClassifiedDoc>,
}

impl DocIndex {
    /// @ai:intent Classify every fragment; unclassifiable ones become debug notes
    /// @ai:post a later fragment with the same name replaces an earlier one
    /// @ai:effects pure
    pub fn build(
        classifier: &Classifier,
        fragments: impl IntoIterator<Item = DocFragment>,
        reporter: &mut Reporter<'_>,
    ) -> Self {
        let mut index = Self::default();

        for fragment in fragments {
            let (canonical_name, kind) = match classifier.classify(&fragment.path, &fragment.content)
            {
                Ok(classified) => classified,
                Err(reason) => {
                    reporter.note(format_args!(
                        "ignoring {} due to {}",
                        fragment.path.display(),
                        reason
                    ));
                    continue;
                }
            };

            let doc = ClassifiedDoc {
                canonical_name: canonical_name.clone(),
                kind,
                content: fragment.content,
                path: fragment.path,
            };
            if let Some(previous) = index.map_mut(kind).insert(canonical_name, doc) {
                reporter.note(format_args!(
                    "{} {} documented again, replacing {}",
                    kind,
                    previous.canonical_name,
                    previous.path.display()
                ));
            }
        }

        index
    }

    /// @ai:intent Walk the docs root and index every documentation file
    /// @ai:post a missing docs root yields an empty index and a warning
    /// @ai:post unreadable entries and files are skipped with a warning
    /// @ai:effects fs:read
    pub fn load(
        classifier: &Classifier,
        root: &Path,
        settings: &Settings,
        reporter: &mut Reporter<'_>,
    ) -> Self {
        if !root.is_dir() {
            warn!("documentation root {} does not exist", root.display());
            return Self::default();
        }
        Self::build(classifier, collect_fragments(root, settings), reporter)
    }

    fn map(&self, kind: EntityKind) -> &HashMap<String, ClassifiedDoc> {
        match kind {
            EntityKind::Resource => &self.resources,
            EntityKind::Datasource => &self.datasources,
        }
    }

    fn map_mut(&mut self, kind: EntityKind) -> &mut HashMap<String, ClassifiedDoc> {
        match kind {
            EntityKind::Resource => &mut self.resources,
            EntityKind::Datasource => &mut self.datasources,
        }
    }

    pub fn get(&self, kind: EntityKind, canonical_name: &str) -> Option<&ClassifiedDoc> {
        self.map(kind).get(canonical_name)
    }

    /// @ai:intent Re-split an indexed canonical name into the kind it was filed under and its suffix
    /// @ai:post the kind comes from the map holding the name; datasources are consulted first
    /// @ai:effects pure
    pub fn split<'n>(
        &self,
        classifier: &Classifier,
        canonical: &'n str,
    ) -> Option<(EntityKind, &'n str)> {
        let suffix = classifier.split(canonical)?;
        [EntityKind::Datasource, EntityKind::Resource]
            .into_iter()
            .find(|kind| self.map(*kind).contains_key(canonical))
            .map(|kind| (kind, suffix))
    }

    /// @ai:intent Canonical names of one kind, sorted, for debug output
    pub fn names(&self, kind: EntityKind) -> Vec<&str> {
        let mut names: Vec<_> = self.map(kind).keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.resources.len() + self.datasources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// @ai:intent Read every documentation file under root in traversal order
/// @ai:effects fs:read
pub fn collect_fragments(root: &Path, settings: &Settings) -> Vec<DocFragment> {
    let mut fragments = Vec::new();

    for entry in walk_files(root) {
        if !settings.is_doc_file(entry.path()) {
            continue;
        }
        match std::fs::read(entry.path()) {
            Ok(content) => fragments.push(DocFragment {
                path: entry.path().to_path_buf(),
                content,
            }),
            Err(e) => warn!("skipping {}: {}", entry.path().display(), e),
        }
    }

    fragments
}
