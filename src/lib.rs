//! @ai:module:intent Provider audit library: schemas vs. documentation and design rules
//! @ai:module:layer infrastructure
//! @ai:module:public_api audit, catalog, config, crossref, docs, error, model, output, parser, rules, schema, symbols, syntax
//! @ai:module:stateless true
//!
//! # provaudit
//!
//! Audits a Terraform provider written in Go. The registration function's
//! `ResourcesMap`/`DataSourcesMap` give the catalog, each constructor's
//! `Schema` map gives the attributes, and the `website/` Markdown tree gives
//! the documentation the attributes are checked against.
//!
//! ## Example
//!
//! ```rust,no_run
//! use provaudit::{audit, AuditConfig, Reporter, WriterSink};
//!
//! let config = AuditConfig::new("acme", "acme").with_verbose(true);
//! let mut sink = WriterSink::new(std::io::stdout());
//! let mut reporter = Reporter::new(&mut sink, config.verbose);
//! let summary = audit::run(&config, &mut reporter).unwrap();
//! println!("{} violations", summary.violations);
//! ```

pub mod audit;
pub mod catalog;
pub mod config;
pub mod crossref;
pub mod docs;
pub mod error;
pub mod model;
pub mod output;
pub mod parser;
pub mod rules;
pub mod schema;
pub mod symbols;
pub mod syntax;

pub use audit::{run, AuditSummary, Auditor};
pub use catalog::{extract_catalog, load_catalog, Catalog, CatalogEntry};
pub use config::{AuditConfig, Checks, Settings};
pub use docs::{ClassificationRule, Classifier, ClassifiedDoc, DocFragment, DocIndex, KeywordRule};
pub use error::{Error, Result};
pub use model::{AttributeRecord, EntityKind, Location, Schema, Violation};
pub use output::{format_summary, format_violation, DiagnosticSink, MemorySink, Reporter, WriterSink};
pub use parser::GoParser;
pub use rules::{DanglingConflict, MissingDescription, ReservedName, Rule, RuleSet};
pub use schema::{extract_constructors, extract_schema, Constructor};
pub use symbols::SymbolTable;
pub use syntax::{ShapeMismatch, SourceUnit};
