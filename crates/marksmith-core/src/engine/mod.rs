//! Line processor: drives one line-completed event from scan to edit.
//!
//! ```text
//! on_line_completed(line)
//!   guard held? ---------------------------------> Suppressed
//!   scan(line) -> markers (none -> NoMarkers)
//!   math markers     -> one BatchExpressions call -> demultiplex
//!   free-form markers -> one FreeformInsertion call each, in order
//!   plan_entries -> apply -> LineEdit
//!   hold guard, buffer.apply_edit, release ------> Applied
//! ```
//!
//! A failed unit of work (the math batch or one free-form marker) leaves its
//! markers untouched; everything that did succeed is applied together.

pub mod guard;
pub mod selection;

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::buffer::{BufferError, TextBuffer, lines_before};
use crate::demux::{clean_expression, demultiplex, strip_response_fence};
use crate::gateway::{GatewayError, Generator};
use crate::marker::{DocumentKind, Marker, MarkerCategory, scan};
use crate::prompt::{InstructionSet, Task, assemble_prompt, join_preceding};
use crate::replace::{self, DelimiterStyle, MarkdownDelimiters, SpanError, plan_entries};

pub use guard::{EditGuard, EditPermit};
pub use selection::convert_selection;

// ---------------------------------------------------------------------------
// Settings and results
// ---------------------------------------------------------------------------

/// Editor-facing settings for the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Preceding lines sent as context. Zero or negative sends none.
    pub context_lines: i64,
    /// Keep a commented copy of each processed line above it.
    pub insert_original: bool,
    /// Math delimiters for Markdown documents.
    pub markdown_delimiters: MarkdownDelimiters,
}

impl EngineSettings {
    pub const DEFAULT_CONTEXT_LINES: i64 = 5;
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            context_lines: Self::DEFAULT_CONTEXT_LINES,
            insert_original: false,
            markdown_delimiters: MarkdownDelimiters::default(),
        }
    }
}

/// Errors that stop a line from being processed at all.
///
/// Generation failures are not errors at this level; they are recorded in
/// the [`LineReport`] and the rest of the line still goes through.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error("replacements do not fit line {line}: {source}")]
    Plan {
        line: usize,
        #[source]
        source: SpanError,
    },

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// A unit of generation work on one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkUnit {
    /// The single batched call for all math markers on the line.
    MathBatch { markers: usize },
    /// The call for the free-form marker at this index among the line's
    /// markers.
    Freeform { marker: usize },
}

/// A unit of work whose generation call failed.
#[derive(Debug)]
pub struct UnitFailure {
    pub unit: WorkUnit,
    pub error: GatewayError,
}

/// What happened on one processed line.
#[derive(Debug, Default)]
pub struct LineReport {
    /// Markers found on the line.
    pub markers: usize,
    /// Markers whose span was replaced.
    pub replaced: usize,
    pub failures: Vec<UnitFailure>,
}

impl LineReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Result of [`LineProcessor::on_line_completed`].
#[derive(Debug)]
pub enum LineOutcome {
    /// An edit was in progress; the event was ignored.
    Suppressed,
    /// The line holds no markers.
    NoMarkers,
    /// Markers were found but none received usable output.
    Unchanged(LineReport),
    /// The line was rewritten. `lines_written` counts the buffer lines that
    /// now stand where the original line was, including an inserted comment.
    Applied {
        report: LineReport,
        lines_written: usize,
    },
}

impl LineOutcome {
    /// Number of buffer lines occupied by the processed line afterwards.
    pub fn lines_written(&self) -> usize {
        match self {
            Self::Applied { lines_written, .. } => *lines_written,
            _ => 1,
        }
    }

    pub fn report(&self) -> Option<&LineReport> {
        match self {
            Self::Unchanged(report) | Self::Applied { report, .. } => Some(report),
            Self::Suppressed | Self::NoMarkers => None,
        }
    }
}

// ---------------------------------------------------------------------------
// LineProcessor
// ---------------------------------------------------------------------------

/// Turns markers on a completed line into generated replacements.
pub struct LineProcessor {
    generator: Arc<dyn Generator>,
    settings: EngineSettings,
    instructions: InstructionSet,
    guard: EditGuard,
}

impl LineProcessor {
    pub fn new(
        generator: Arc<dyn Generator>,
        settings: EngineSettings,
        instructions: InstructionSet,
    ) -> Self {
        Self {
            generator,
            settings,
            instructions,
            guard: EditGuard::new(),
        }
    }

    /// Share `guard` with the host instead of using a private one.
    pub fn with_guard(mut self, guard: EditGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn guard(&self) -> &EditGuard {
        &self.guard
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn generator(&self) -> &Arc<dyn Generator> {
        &self.generator
    }

    pub fn instructions(&self) -> &InstructionSet {
        &self.instructions
    }

    /// Handle a line-completed event for `line_index`.
    #[instrument(skip(self, buffer), fields(provider = self.generator.name()))]
    pub async fn on_line_completed(
        &self,
        buffer: &mut dyn TextBuffer,
        line_index: usize,
    ) -> Result<LineOutcome, EngineError> {
        if self.guard.is_held() {
            debug!("edit in progress, ignoring line event");
            return Ok(LineOutcome::Suppressed);
        }

        let kind = buffer.kind();
        let line = buffer.line(line_index)?;
        let markers = scan(&line, kind);
        if markers.is_empty() {
            return Ok(LineOutcome::NoMarkers);
        }
        debug!(markers = markers.len(), "markers found");

        let preceding = lines_before(&*buffer, line_index, self.settings.context_lines)?;
        let context = join_preceding(&preceding);

        let mut report = LineReport {
            markers: markers.len(),
            ..LineReport::default()
        };
        let outputs = self
            .generate_outputs(kind, &line, &context, &markers, &mut report)
            .await;

        let entries = plan_entries(&markers, &outputs);
        if entries.is_empty() {
            debug!(failures = report.failures.len(), "no usable output, line left as is");
            return Ok(LineOutcome::Unchanged(report));
        }

        // Spans are applied to whatever the line holds now.
        let current = buffer.line(line_index)?;
        let style = DelimiterStyle::for_kind(kind, self.settings.markdown_delimiters);
        let result = replace::apply(&current, &entries, &style, kind, self.settings.insert_original)
            .map_err(|source| EngineError::Plan {
                line: line_index,
                source,
            })?;
        let edit = result.to_line_edit(line_index);

        let Some(_permit) = self.guard.hold() else {
            debug!("edit in progress, dropping generated replacements");
            return Ok(LineOutcome::Suppressed);
        };
        buffer.apply_edit(&edit)?;

        report.replaced = entries.len();
        let lines_written = result.edited_text.split('\n').count()
            + result
                .leading_comment
                .as_deref()
                .map_or(0, |c| c.split('\n').count());
        info!(
            line = line_index,
            replaced = report.replaced,
            failed_units = report.failures.len(),
            lines_written,
            "applied replacements"
        );
        Ok(LineOutcome::Applied {
            report,
            lines_written,
        })
    }

    /// Run every unit of work for the line's markers. The result has one
    /// slot per marker; `None` marks a marker whose unit failed.
    async fn generate_outputs(
        &self,
        kind: DocumentKind,
        line: &str,
        context: &str,
        markers: &[Marker],
        report: &mut LineReport,
    ) -> Vec<Option<String>> {
        let mut outputs: Vec<Option<String>> = vec![None; markers.len()];

        let math: Vec<usize> = markers
            .iter()
            .enumerate()
            .filter(|(_, m)| m.category.is_math())
            .map(|(i, _)| i)
            .collect();
        if !math.is_empty() {
            let payloads: Vec<String> = math.iter().map(|&i| markers[i].payload.clone()).collect();
            let prompt = assemble_prompt(
                Task::BatchExpressions,
                kind,
                &payloads,
                &self.instructions,
                Some(context),
                Some(line),
            );
            match self.generator.generate(&prompt).await {
                Ok(raw) => {
                    let body = strip_response_fence(&raw);
                    for (&i, text) in math.iter().zip(demultiplex(body, math.len())) {
                        outputs[i] = Some(clean_expression(&text));
                    }
                }
                Err(error) => {
                    warn!(
                        markers = math.len(),
                        error = %error,
                        "math batch failed, its markers are left untouched"
                    );
                    report.failures.push(UnitFailure {
                        unit: WorkUnit::MathBatch {
                            markers: math.len(),
                        },
                        error,
                    });
                }
            }
        }

        for (i, marker) in markers.iter().enumerate() {
            if marker.category != MarkerCategory::Freeform {
                continue;
            }
            let prompt = assemble_prompt(
                Task::FreeformInsertion,
                kind,
                std::slice::from_ref(&marker.payload),
                &self.instructions,
                Some(context),
                None,
            );
            match self.generator.generate(&prompt).await {
                Ok(text) => outputs[i] = Some(text.trim().to_string()),
                Err(error) => {
                    warn!(
                        marker = i,
                        error = %error,
                        "free-form generation failed, marker left untouched"
                    );
                    report.failures.push(UnitFailure {
                        unit: WorkUnit::Freeform { marker: i },
                        error,
                    });
                }
            }
        }

        outputs
    }
}
