//! @ai:module:intent Collect violations and emit them to a diagnostic sink
//! @ai:module:layer infrastructure
//! @ai:module:public_api Reporter, DiagnosticSink, WriterSink, MemorySink, format_violation, format_summary
//! @ai:module:depends_on model, audit
//! @ai:module:stateless false

use crate::audit::AuditSummary;
use crate::error::Result;
use crate::model::Violation;
use colored::Colorize;
use std::fmt;
use std::io::Write;
use tracing::debug;

/// @ai:intent Append-only destination for violations
pub trait DiagnosticSink {
    fn emit(&mut self, violation: &Violation) -> std::io::Result<()>;
}

/// @ai:intent Writes `path:line message` lines to any writer
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> DiagnosticSink for WriterSink<W> {
    fn emit(&mut self, violation: &Violation) -> std::io::Result<()> {
        writeln!(self.writer, "{}", format_violation(violation))?;
        self.writer.flush()
    }
}

/// @ai:intent Keeps violations in memory, for library callers and tests
#[derive(Debug, Default)]
pub struct MemorySink {
    pub violations: Vec<Violation>,
}

impl DiagnosticSink for MemorySink {
    fn emit(&mut self, violation: &Violation) -> std::io::Result<()> {
        self.violations.push(violation.clone());
        Ok(())
    }
}

/// @ai:intent Forwards violations to a sink and records skipped shapes as debug notes
pub struct Reporter<'a> {
    sink: &'a mut dyn DiagnosticSink,
    verbose: bool,
    violations: usize,
    notes: usize,
}

impl<'a> Reporter<'a> {
    pub fn new(sink: &'a mut dyn DiagnosticSink, verbose: bool) -> Self {
        Self {
            sink,
            verbose,
            violations: 0,
            notes: 0,
        }
    }

    /// @ai:intent Emit a violation immediately
    /// @ai:post earlier output stands even if the run aborts later
    /// @ai:effects io
    pub fn report(&mut self, violation: Violation) -> Result<()> {
        self.violations += 1;
        self.sink.emit(&violation)?;
        Ok(())
    }

    /// @ai:intent Record a skippable shape mismatch; only visible in verbose mode
    /// @ai:effects log
    pub fn note(&mut self, message: impl fmt::Display) {
        self.notes += 1;
        if self.verbose {
            debug!("{}", message);
        }
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn violations(&self) -> usize {
        self.violations
    }

    pub fn notes(&self) -> usize {
        self.notes
    }
}

/// @ai:intent Format one violation as `path:line message`
/// @ai:example (acme/resource_widget.go, 12, "id: attribute name is reserved") -> "acme/resource_widget.go:12 id: attribute name is reserved"
/// @ai:effects pure
pub fn format_violation(violation: &Violation) -> String {
    format!(
        "{}:{} {}",
        violation.location.file.display(),
        violation.location.line,
        violation.message
    )
}

/// @ai:intent Format the end-of-run summary as human-readable text
/// @ai:effects pure
pub fn format_summary(summary: &AuditSummary) -> String {
    let checked = format!(
        "Checked {} files, {} schemas",
        summary.files_checked, summary.schemas_checked
    );

    if summary.violations == 0 {
        format!("{} {}", "OK".green().bold(), checked)
    } else {
        format!(
            "{} {} violations",
            checked,
            summary.violations.to_string().yellow().bold()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Location;
    use std::path::PathBuf;

    fn violation() -> Violation {
        Violation::new(
            "S002",
            "id: attribute name is reserved",
            Location::new(PathBuf::from("acme/resource_widget.go"), 12),
        )
    }

    #[test]
    fn test_format_violation() {
        assert_eq!(
            format_violation(&violation()),
            "acme/resource_widget.go:12 id: attribute name is reserved"
        );
    }

    #[test]
    fn test_writer_sink_appends_lines() {
        let mut buffer = Vec::new();
        {
            let mut sink = WriterSink::new(&mut buffer);
            let mut reporter = Reporter::new(&mut sink, false);
            reporter.report(violation()).unwrap();
            reporter.report(violation()).unwrap();
            assert_eq!(reporter.violations(), 2);
        }
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_notes_are_counted_not_emitted() {
        let mut sink = MemorySink::default();
        {
            let mut reporter = Reporter::new(&mut sink, true);
            reporter.note("skipping helper");
            assert_eq!(reporter.notes(), 1);
        }
        assert!(sink.violations.is_empty());
    }

    #[test]
    fn test_format_summary_mentions_counts() {
        colored::control::set_override(false);
        let summary = AuditSummary {
            files_checked: 3,
            schemas_checked: 2,
            violations: 4,
            ..Default::default()
        };
        assert_eq!(format_summary(&summary), "Checked 3 files, 2 schemas 4 violations");
    }
}
