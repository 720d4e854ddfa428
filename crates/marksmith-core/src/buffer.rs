//! Host text buffer abstraction and an in-memory implementation.
//!
//! The engine never mutates text directly. It reads lines through
//! [`TextBuffer`] and submits every change to a line as one [`LineEdit`],
//! which the buffer applies atomically: either all substitutions and the
//! optional inserted line land, or none do.

use thiserror::Error;

use crate::marker::DocumentKind;
use crate::replace::{SpanEdit, SpanError, splice};

/// Errors raised by a [`TextBuffer`].
#[derive(Debug, Error)]
pub enum BufferError {
    #[error("line {line} is out of range (buffer has {count} lines)")]
    LineOutOfRange { line: usize, count: usize },

    #[error("edit does not fit line {line}: {source}")]
    InvalidSpan {
        line: usize,
        #[source]
        source: SpanError,
    },

    #[error("edit rejected: {0}")]
    Rejected(String),
}

/// One atomic edit of a single line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEdit {
    /// Zero-based line index.
    pub line: usize,
    /// Substitutions within the line.
    pub edits: Vec<SpanEdit>,
    /// A whole line inserted at column 0 above `line`.
    pub insert_above: Option<String>,
}

impl LineEdit {
    /// Compute the replacement lines for `current` without touching any
    /// buffer: the optional inserted line followed by the edited line split
    /// on line breaks.
    pub fn render(&self, current: &str) -> Result<Vec<String>, BufferError> {
        let edited = splice(current, &self.edits).map_err(|source| BufferError::InvalidSpan {
            line: self.line,
            source,
        })?;
        let mut out = Vec::new();
        if let Some(above) = &self.insert_above {
            out.extend(above.split('\n').map(str::to_string));
        }
        out.extend(edited.split('\n').map(str::to_string));
        Ok(out)
    }
}

/// The host editor's view of a document.
pub trait TextBuffer: Send {
    /// The kind of document held by this buffer.
    fn kind(&self) -> DocumentKind;

    fn line_count(&self) -> usize;

    /// Text of line `index`, without its line terminator.
    fn line(&self, index: usize) -> Result<String, BufferError>;

    /// Apply `edit` atomically.
    fn apply_edit(&mut self, edit: &LineEdit) -> Result<(), BufferError>;
}

/// Read up to `count` lines immediately before `index`.
///
/// A `count` of zero or less reads nothing.
pub fn lines_before(
    buffer: &dyn TextBuffer,
    index: usize,
    count: i64,
) -> Result<Vec<String>, BufferError> {
    if count <= 0 {
        return Ok(Vec::new());
    }
    let end = index.min(buffer.line_count());
    let wanted = usize::try_from(count).unwrap_or(usize::MAX);
    (end.saturating_sub(wanted)..end)
        .map(|i| buffer.line(i))
        .collect()
}

// ---------------------------------------------------------------------------
// In-memory document
// ---------------------------------------------------------------------------

/// A document held as a vector of lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    kind: DocumentKind,
    lines: Vec<String>,
    trailing_newline: bool,
    line_ending: &'static str,
}

impl Document {
    /// Split `text` into lines.
    ///
    /// The terminator of the first line (`\n` or `\r\n`) is kept for the
    /// whole document and written back by [`Document::to_text`].
    pub fn from_text(text: &str, kind: DocumentKind) -> Self {
        let trailing_newline = text.ends_with('\n');
        let line_ending = match text.find('\n') {
            Some(pos) if text[..pos].ends_with('\r') => "\r\n",
            _ => "\n",
        };
        let body = text.strip_suffix('\n').unwrap_or(text);
        let lines = if text.is_empty() {
            Vec::new()
        } else {
            body.split('\n')
                .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
                .collect()
        };
        Self {
            kind,
            lines,
            trailing_newline,
            line_ending,
        }
    }

    /// Join the lines back into text with the original line terminator,
    /// keeping the original trailing newline.
    pub fn to_text(&self) -> String {
        let mut text = self.lines.join(self.line_ending);
        if self.trailing_newline {
            text.push_str(self.line_ending);
        }
        text
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl TextBuffer for Document {
    fn kind(&self) -> DocumentKind {
        self.kind
    }

    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line(&self, index: usize) -> Result<String, BufferError> {
        self.lines
            .get(index)
            .cloned()
            .ok_or(BufferError::LineOutOfRange {
                line: index,
                count: self.lines.len(),
            })
    }

    fn apply_edit(&mut self, edit: &LineEdit) -> Result<(), BufferError> {
        let current = self.line(edit.line)?;
        let replacement = edit.render(&current)?;
        self.lines.splice(edit.line..=edit.line, replacement);
        Ok(())
    }
}
