//! @ai:module:intent Orchestrate a full provider audit: catalog, docs index, per-file checks
//! @ai:module:layer application
//! @ai:module:public_api run, Auditor, AuditSummary
//! @ai:module:depends_on catalog, docs, parser, schema, symbols, rules, crossref, output, config
//! @ai:module:stateless false

use crate::catalog::{load_catalog, Catalog, REGISTRATION_FILE};
use crate::config::{is_source_file, walk_files, AuditConfig};
use crate::crossref::{check_entry, check_unbound_entry};
use crate::docs::{Classifier, DocIndex};
use crate::error::{Error, Result};
use crate::model::{EntityKind, Violation};
use crate::output::Reporter;
use crate::parser::GoParser;
use crate::rules::RuleSet;
use crate::schema::extract_constructors;
use crate::symbols::SymbolTable;
use crate::syntax::SourceUnit;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// @ai:intent Counters for the end-of-run summary
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct AuditSummary {
    pub files_checked: usize,
    pub schemas_checked: usize,
    pub catalog_entries: usize,
    pub documented_entries: usize,
    pub violations: usize,
}

/// @ai:intent Per-file audit over a catalog and docs index that are already built
pub struct Auditor<'c> {
    config: &'c AuditConfig,
    catalog: Catalog,
    docs: DocIndex,
    rules: RuleSet,
    bound: HashSet<String>,
    summary: AuditSummary,
}

impl<'c> Auditor<'c> {
    pub fn new(config: &'c AuditConfig, catalog: Catalog, docs: DocIndex) -> Self {
        let summary = AuditSummary {
            catalog_entries: catalog.len(),
            ..Default::default()
        };
        Self {
            config,
            catalog,
            docs,
            rules: RuleSet::from_settings(&config.settings.rules),
            bound: HashSet::new(),
            summary,
        }
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    fn display_path<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.config.provider_path).unwrap_or(path)
    }

    /// @ai:intent Parse and audit one file from disk
    /// @ai:post an unreadable file is skipped with a warning and not counted
    /// @ai:effects fs:read, io
    pub fn audit_file(
        &mut self,
        parser: &mut GoParser,
        path: &Path,
        reporter: &mut Reporter<'_>,
    ) -> Result<()> {
        let unit = match parser.parse_file(path) {
            Ok(unit) => unit,
            Err(Error::FileRead { path, source }) => {
                warn!("skipping {}: {}", path.display(), source);
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        self.audit_unit(&unit, reporter)
    }

    /// @ai:intent Run rules and documentation checks over one parsed file
    /// @ai:post violations are emitted as they are found
    /// @ai:effects io
    pub fn audit_unit(&mut self, unit: &SourceUnit, reporter: &mut Reporter<'_>) -> Result<()> {
        self.summary.files_checked += 1;
        if unit.has_syntax_errors {
            reporter.note(format_args!("{} has syntax errors", unit.path.display()));
        }

        let file = self.display_path(&unit.path).to_path_buf();
        let symbols = SymbolTable::build(unit);
        let constructors = extract_constructors(unit, &symbols, reporter);

        for constructor in &constructors {
            self.summary.schemas_checked += 1;
            let mut violations: Vec<Violation> = Vec::new();

            if self.config.checks.rules {
                violations.extend(self.rules.check_schema(&constructor.schema, &file));
            }

            if self.config.checks.docs {
                let entries = self.catalog.by_constructor(&constructor.name);
                if entries.is_empty() {
                    reporter.note(format_args!(
                        "could not find matching datasource or resource for {}",
                        constructor.name
                    ));
                } else if !self.bound.insert(constructor.name.clone()) {
                    reporter.note(format_args!(
                        "{}: {} already matched in an earlier file",
                        file.display(),
                        constructor.name
                    ));
                } else {
                    for entry in entries {
                        let found = check_entry(entry, constructor, &self.docs, &file);
                        if !found.iter().any(|v| v.code == "D002") {
                            self.summary.documented_entries += 1;
                        }
                        violations.extend(found);
                    }
                }
            }

            for violation in violations {
                self.summary.violations += 1;
                reporter.report(violation)?;
            }
        }

        Ok(())
    }

    /// @ai:intent Close the run; entries never bound to a constructor still get the docs check
    /// @ai:post an unbound, undocumented entry yields one D002 at its registration line
    pub fn finish(mut self, reporter: &mut Reporter<'_>) -> Result<AuditSummary> {
        if !self.config.checks.docs {
            return Ok(self.summary);
        }

        let registration = Path::new(REGISTRATION_FILE);
        for entry in self.catalog.entries() {
            if self.bound.contains(&entry.constructor_name) {
                continue;
            }
            reporter.note(format_args!(
                "constructor {} of {} {} was not found",
                entry.constructor_name, entry.kind, entry.declared_name
            ));
            if let Some(violation) = check_unbound_entry(entry, &self.docs, registration) {
                self.summary.violations += 1;
                reporter.report(violation)?;
            }
        }
        Ok(self.summary)
    }
}

/// @ai:intent Collect provider source files in traversal order; unreadable entries are skipped
/// @ai:effects fs:read
pub fn source_files(root: &Path) -> Vec<PathBuf> {
    walk_files(root)
        .filter(|entry| is_source_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

/// @ai:intent Run a complete audit as described by the config
/// @ai:post Err only for fatal errors; violations are reported, not returned
/// @ai:effects fs:read, io
pub fn run(config: &AuditConfig, reporter: &mut Reporter<'_>) -> Result<AuditSummary> {
    let mut parser = GoParser::new()?;
    info!("checking provider {}", config.provider_path.display());

    let (catalog, docs) = if config.checks.docs {
        let catalog = load_catalog(&mut parser, &config.provider_path, reporter)?;
        if reporter.verbose() {
            reporter.note(format_args!(
                "catalog: {}",
                serde_json::to_string(&catalog).unwrap_or_default()
            ));
        }

        let classifier =
            Classifier::from_settings(&config.provider_prefix, &config.settings.classifier);
        let docs = DocIndex::load(&classifier, &config.docs_path, &config.settings, reporter);
        for kind in [EntityKind::Datasource, EntityKind::Resource] {
            reporter.note(format_args!("{} docs: {:?}", kind, docs.names(kind)));
        }
        (catalog, docs)
    } else {
        (Catalog::default(), DocIndex::default())
    };

    let mut auditor = Auditor::new(config, catalog, docs);
    for path in source_files(&config.provider_path) {
        auditor.audit_file(&mut parser, &path, reporter)?;
    }

    auditor.finish(reporter)
}
