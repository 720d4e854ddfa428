//! `marksmith process` command: replay line-completed events over a file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use marksmith_core::buffer::{Document, TextBuffer};
use marksmith_core::engine::{LineOutcome, LineProcessor};
use marksmith_core::marker::DocumentKind;

use crate::config::ProviderFlags;
use crate::document::{build_processor, project_root, read_document};

/// Options for the process command.
#[derive(Debug)]
pub struct ProcessOptions {
    pub file: PathBuf,
    pub kind: Option<DocumentKind>,
    /// 1-based line to process; all lines when absent.
    pub line: Option<usize>,
    pub in_place: bool,
    pub project_root: Option<PathBuf>,
}

/// Totals over one run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    pub lines_with_markers: usize,
    pub lines_changed: usize,
    pub replaced: usize,
    pub failed_units: usize,
}

/// Run the process command.
pub async fn run_process(options: &ProcessOptions, flags: &ProviderFlags) -> Result<()> {
    let mut doc = read_document(&options.file, options.kind)?;
    let root = project_root(options.project_root.as_deref())?;
    let processor = build_processor(flags, &root)?;

    let summary = process_document(&processor, &mut doc, options.line).await?;

    if options.in_place {
        write_back(&options.file, &doc)?;
    } else {
        print!("{}", doc.to_text());
    }

    eprintln!(
        "{} marker line(s), {} changed, {} marker(s) replaced, {} failed call(s).",
        summary.lines_with_markers, summary.lines_changed, summary.replaced, summary.failed_units
    );
    Ok(())
}

/// Feed every line (or just `only_line`, 1-based) through `processor`.
///
/// Lines written by an edit are skipped so generated text is never
/// reprocessed.
pub async fn process_document(
    processor: &LineProcessor,
    doc: &mut Document,
    only_line: Option<usize>,
) -> Result<ProcessSummary> {
    let mut summary = ProcessSummary::default();

    if let Some(line) = only_line {
        let count = doc.line_count();
        if line == 0 || line > count {
            bail!("line {line} is out of range (the file has {count} lines)");
        }
        let outcome = processor
            .on_line_completed(doc, line - 1)
            .await
            .with_context(|| format!("failed to process line {line}"))?;
        record(&mut summary, line, &outcome);
        return Ok(summary);
    }

    let mut index = 0;
    while index < doc.line_count() {
        let outcome = processor
            .on_line_completed(doc, index)
            .await
            .with_context(|| format!("failed to process line {}", index + 1))?;
        record(&mut summary, index + 1, &outcome);
        index += outcome.lines_written();
    }
    Ok(summary)
}

fn record(summary: &mut ProcessSummary, line: usize, outcome: &LineOutcome) {
    let Some(report) = outcome.report() else {
        return;
    };
    summary.lines_with_markers += 1;
    summary.replaced += report.replaced;
    summary.failed_units += report.failures.len();
    if matches!(outcome, LineOutcome::Applied { .. }) {
        summary.lines_changed += 1;
    }
    for failure in &report.failures {
        eprintln!("warning: line {line}: {}", failure.error.user_message());
    }
}

fn write_back(path: &Path, doc: &Document) -> Result<()> {
    std::fs::write(path, doc.to_text())
        .with_context(|| format!("failed to write {}", path.display()))
}
