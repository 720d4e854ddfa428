//! Replacement engine: turn generated text into one atomic line edit.
//!
//! Entries are applied right-to-left by start offset so that replacing one
//! span never invalidates the offsets of a span not yet applied.

pub mod delimiters;

use thiserror::Error;

use crate::buffer::LineEdit;
use crate::marker::{DocumentKind, Marker, MarkerCategory, Span};

pub use delimiters::{DelimiterPair, DelimiterStyle, MarkdownDelimiters};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A pending substitution for one marker that received non-empty output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementEntry {
    pub category: MarkerCategory,
    pub span: Span,
    /// Generated text, before any delimiter wrapping.
    pub text: String,
}

/// A rendered substitution: replace the characters in `span` with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanEdit {
    pub span: Span,
    pub text: String,
}

/// Errors from splicing span edits into a line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpanError {
    #[error("span {start}..{end} is outside a line of {len} characters")]
    OutOfRange { start: usize, end: usize, len: usize },

    #[error("span {start}..{end} overlaps another edit on the same line")]
    Overlap { start: usize, end: usize },
}

/// The outcome of applying a replacement plan to a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    /// The line after all substitutions. May contain line breaks.
    pub edited_text: String,
    /// True if `edited_text` spans more than one line.
    pub is_multiline: bool,
    /// Comment-formatted copy of the original line, to insert above it.
    pub leading_comment: Option<String>,
    /// The rendered substitutions, in descending start order.
    pub edits: Vec<SpanEdit>,
}

impl ApplyResult {
    /// Package this result as one atomic edit of line `line`.
    pub fn to_line_edit(&self, line: usize) -> LineEdit {
        LineEdit {
            line,
            edits: self.edits.clone(),
            insert_above: self.leading_comment.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// Pair markers with their generated outputs, 1:1 and in order.
///
/// Markers with no output (`None`) or an output that is empty after
/// trimming contribute no entry, leaving their original text untouched.
pub fn plan_entries(markers: &[Marker], outputs: &[Option<String>]) -> Vec<ReplacementEntry> {
    markers
        .iter()
        .zip(outputs)
        .filter_map(|(marker, output)| {
            let text = output.as_deref()?.trim();
            if text.is_empty() {
                return None;
            }
            Some(ReplacementEntry {
                category: marker.category,
                span: marker.span,
                text: text.to_string(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// Apply `entries` to `original`.
///
/// - Inline math is wrapped in the inline pair.
/// - Block math is wrapped in the block pair on lines of its own, with a
///   line break inserted before it when non-whitespace text precedes the
///   marker.
/// - Free-form text is inserted verbatim.
///
/// With `insert_original`, the result also carries a comment-formatted copy
/// of the original line for insertion above it.
pub fn apply(
    original: &str,
    entries: &[ReplacementEntry],
    style: &DelimiterStyle,
    kind: DocumentKind,
    insert_original: bool,
) -> Result<ApplyResult, SpanError> {
    let edits = render_edits(original, entries, style);
    let edited_text = splice(original, &edits)?;
    Ok(ApplyResult {
        is_multiline: edited_text.contains('\n'),
        edited_text,
        leading_comment: insert_original.then(|| kind.comment_line(original)),
        edits,
    })
}

/// Render each entry's wrapped text, sorted by descending start.
pub fn render_edits(
    original: &str,
    entries: &[ReplacementEntry],
    style: &DelimiterStyle,
) -> Vec<SpanEdit> {
    let chars: Vec<char> = original.chars().collect();
    let mut edits: Vec<SpanEdit> = entries
        .iter()
        .map(|entry| SpanEdit {
            span: entry.span,
            text: render(entry, style, &chars),
        })
        .collect();
    edits.sort_by(|a, b| b.span.start.cmp(&a.span.start));
    edits
}

fn render(entry: &ReplacementEntry, style: &DelimiterStyle, chars: &[char]) -> String {
    match entry.category {
        MarkerCategory::InlineMath => {
            format!("{}{}{}", style.inline.open, entry.text, style.inline.close)
        }
        MarkerCategory::BlockMath => {
            let start = entry.span.start.min(chars.len());
            let has_prose_before = chars[..start].iter().any(|c| !c.is_whitespace());
            let lead = if has_prose_before { "\n" } else { "" };
            format!(
                "{lead}{}\n{}\n{}",
                style.block.open, entry.text, style.block.close
            )
        }
        MarkerCategory::Freeform => entry.text.clone(),
    }
}

/// Splice `edits` into `line`, rightmost first.
///
/// Edits may be given in any order. Each span must lie within the line and
/// no two spans may overlap.
pub fn splice(line: &str, edits: &[SpanEdit]) -> Result<String, SpanError> {
    let mut chars: Vec<char> = line.chars().collect();
    let len = chars.len();

    let mut ordered: Vec<&SpanEdit> = edits.iter().collect();
    ordered.sort_by(|a, b| b.span.start.cmp(&a.span.start));

    let mut floor = len;
    for edit in &ordered {
        let Span { start, end } = edit.span;
        if start > end || end > len {
            return Err(SpanError::OutOfRange { start, end, len });
        }
        if end > floor {
            return Err(SpanError::Overlap { start, end });
        }
        floor = start;
    }

    for edit in ordered {
        chars.splice(edit.span.start..edit.span.end, edit.text.chars());
    }
    Ok(chars.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::scan;

    fn entries_for(line: &str, outputs: &[&str]) -> Vec<ReplacementEntry> {
        let markers = scan(line, DocumentKind::Latex);
        let outputs: Vec<Option<String>> = outputs.iter().map(|s| Some(s.to_string())).collect();
        plan_entries(&markers, &outputs)
    }

    fn apply_latex(line: &str, outputs: &[&str]) -> ApplyResult {
        apply(
            line,
            &entries_for(line, outputs),
            &DelimiterStyle::LATEX,
            DocumentKind::Latex,
            false,
        )
        .unwrap()
    }

    #[test]
    fn inline_round_trip() {
        let result = apply_latex("The pdf is ;;normal(0, 1);;.", &["\\mathcal{N}(0,1)"]);
        assert_eq!(result.edited_text, "The pdf is $\\mathcal{N}(0,1)$.");
        assert!(!result.is_multiline);
        assert!(result.leading_comment.is_none());
    }

    #[test]
    fn two_markers_match_independent_substitution() {
        let line = ";;a;; and ;;;b;;;";
        let result = apply_latex(line, &["A", "B"]);

        // Substitute each span on its own and stitch the pieces together.
        let chars: Vec<char> = line.chars().collect();
        let markers = scan(line, DocumentKind::Latex);
        let between: String = chars[markers[0].span.end..markers[1].span.start]
            .iter()
            .collect();
        let expected = format!("$A${between}\n\\[\nB\n\\]");
        assert_eq!(result.edited_text, expected);
        assert_eq!(result.edited_text, "$A$ and \n\\[\nB\n\\]");
        assert!(result.is_multiline);
    }

    #[test]
    fn edits_are_ordered_right_to_left() {
        let result = apply_latex(";;a;; x ;;b;; y ;;c;;", &["1", "2", "3"]);
        let starts: Vec<usize> = result.edits.iter().map(|e| e.span.start).collect();
        assert_eq!(starts, vec![16, 8, 0]);
        assert_eq!(result.edited_text, "$1$ x $2$ y $3$");
    }

    #[test]
    fn empty_output_leaves_marker_untouched() {
        let line = "keep ;;this;; but ;;that;;";
        let result = apply_latex(line, &["   ", "T"]);
        assert_eq!(result.edited_text, "keep ;;this;; but $T$");
        assert_eq!(result.edits.len(), 1);
    }

    #[test]
    fn missing_output_contributes_no_entry() {
        let markers = scan(";;a;; ;;b;;", DocumentKind::Latex);
        let entries = plan_entries(&markers, &[None, Some("B".into())]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].span, markers[1].span);
    }

    #[test]
    fn block_at_line_start_gets_no_leading_break() {
        let result = apply_latex("  ;;;sum of i;;;", &["\\sum_i i"]);
        assert_eq!(result.edited_text, "  \\[\n\\sum_i i\n\\]");
    }

    #[test]
    fn freeform_is_inserted_verbatim() {
        let result = apply_latex("See: ;;;;list primes;;;; done", &["2, 3, 5"]);
        assert_eq!(result.edited_text, "See: 2, 3, 5 done");
    }

    #[test]
    fn freeform_may_expand_to_several_lines() {
        let result = apply_latex(";;;;itemize a b;;;;", &["\\begin{itemize}\n\\item a\n\\end{itemize}"]);
        assert!(result.is_multiline);
        assert_eq!(result.edited_text.lines().count(), 3);
    }

    #[test]
    fn markdown_delimiters_and_comment() {
        let line = "Area ;;pi r squared;; and ;;;e to the i pi;;;";
        let markers = scan(line, DocumentKind::Markdown);
        let outputs = vec![Some("\\pi r^2".to_string()), Some("e^{i\\pi}".to_string())];
        let style = MarkdownDelimiters::Dollars.style();
        let result = apply(
            line,
            &plan_entries(&markers, &outputs),
            &style,
            DocumentKind::Markdown,
            true,
        )
        .unwrap();
        assert_eq!(result.edited_text, "Area $\\pi r^2$ and \n$$\ne^{i\\pi}\n$$");
        assert_eq!(
            result.leading_comment.as_deref(),
            Some("<!-- Area ;;pi r squared;; and ;;;e to the i pi;;; -->")
        );
    }

    #[test]
    fn latex_leading_comment() {
        let line = "x = ;;a;;";
        let result = apply(
            line,
            &entries_for(line, &["a"]),
            &DelimiterStyle::LATEX,
            DocumentKind::Latex,
            true,
        )
        .unwrap();
        assert_eq!(result.leading_comment.as_deref(), Some("% x = ;;a;;"));
        let edit = result.to_line_edit(7);
        assert_eq!(edit.line, 7);
        assert_eq!(edit.insert_above.as_deref(), Some("% x = ;;a;;"));
        assert_eq!(edit.edits, result.edits);
    }

    #[test]
    fn unicode_offsets_are_respected() {
        let result = apply_latex("α ≤ ;;beta;; ∎", &["\\beta"]);
        assert_eq!(result.edited_text, "α ≤ $\\beta$ ∎");
    }

    #[test]
    fn splice_rejects_out_of_range() {
        let edits = vec![SpanEdit {
            span: Span::new(2, 9),
            text: "x".into(),
        }];
        assert_eq!(
            splice("short", &edits),
            Err(SpanError::OutOfRange { start: 2, end: 9, len: 5 })
        );
    }

    #[test]
    fn splice_rejects_overlap() {
        let edits = vec![
            SpanEdit {
                span: Span::new(0, 3),
                text: "a".into(),
            },
            SpanEdit {
                span: Span::new(2, 4),
                text: "b".into(),
            },
        ];
        assert_eq!(
            splice("abcdef", &edits),
            Err(SpanError::Overlap { start: 0, end: 3 })
        );
    }

    #[test]
    fn splice_accepts_any_order() {
        let edits = vec![
            SpanEdit {
                span: Span::new(0, 1),
                text: "A".into(),
            },
            SpanEdit {
                span: Span::new(4, 5),
                text: "E".into(),
            },
        ];
        assert_eq!(splice("abcde", &edits).unwrap(), "AbcdE");
    }
}
