//! Manual single-shot conversion of an arbitrary selection.

use tracing::{debug, info};

use super::{EngineError, LineProcessor};
use crate::buffer::{LineEdit, TextBuffer, lines_before};
use crate::demux::clean_expression;
use crate::gateway::{GatewayError, Generator};
use crate::marker::{DocumentKind, Span};
use crate::prompt::{InstructionSet, Task, assemble_prompt, join_preceding};
use crate::replace::SpanEdit;

/// Convert `selection` to one math expression.
///
/// Makes exactly one [`Task::SingleExpression`] call. The result is trimmed
/// and stripped of any wrapper the generator added; the caller substitutes
/// it verbatim. An empty result means "leave the selection alone".
pub async fn convert_selection(
    generator: &dyn Generator,
    kind: DocumentKind,
    selection: &str,
    preceding_context: &str,
    instructions: &InstructionSet,
) -> Result<String, GatewayError> {
    let prompt = assemble_prompt(
        Task::SingleExpression,
        kind,
        &[selection.to_string()],
        instructions,
        Some(preceding_context),
        None,
    );
    let raw = generator.generate(&prompt).await?;
    Ok(clean_expression(&raw))
}

impl LineProcessor {
    /// Replace the characters in `span` of line `line_index` with their
    /// conversion.
    ///
    /// Returns `false` without editing when the generator produced nothing.
    pub async fn convert_span(
        &self,
        buffer: &mut dyn TextBuffer,
        line_index: usize,
        span: Span,
    ) -> Result<bool, EngineError> {
        let line = buffer.line(line_index)?;
        let selection: String = line
            .chars()
            .skip(span.start)
            .take(span.len())
            .collect();
        let preceding = lines_before(&*buffer, line_index, self.settings.context_lines)?;
        let context = join_preceding(&preceding);

        let text = convert_selection(
            self.generator.as_ref(),
            buffer.kind(),
            &selection,
            &context,
            &self.instructions,
        )
        .await?;
        if text.is_empty() {
            debug!(line = line_index, "empty conversion, selection left as is");
            return Ok(false);
        }

        let edit = LineEdit {
            line: line_index,
            edits: vec![SpanEdit { span, text }],
            insert_above: None,
        };
        let Some(_permit) = self.guard.hold() else {
            debug!("edit in progress, dropping conversion");
            return Ok(false);
        };
        buffer.apply_edit(&edit)?;
        info!(line = line_index, "converted selection");
        Ok(true)
    }
}
