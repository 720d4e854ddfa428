//! Single-pass marker scanner.

use tracing::trace;

use super::{DocumentKind, Marker, MarkerCategory, Span};

/// The repeatable delimiter character markers are built from.
pub const DELIMITER: char = ';';

const LATEX_COMMENT: &str = "%";
const MARKDOWN_COMMENT_OPEN: &str = "<!--";
const MARKDOWN_COMMENT_CLOSE: &str = "-->";

/// Return `true` if the whole line (ignoring surrounding whitespace) is a
/// comment in the given document kind.
pub fn is_comment_line(line: &str, kind: DocumentKind) -> bool {
    let trimmed = line.trim();
    match kind {
        DocumentKind::Latex => trimmed.starts_with(LATEX_COMMENT),
        DocumentKind::Markdown => {
            trimmed.len() >= MARKDOWN_COMMENT_OPEN.len() + MARKDOWN_COMMENT_CLOSE.len()
                && trimmed.starts_with(MARKDOWN_COMMENT_OPEN)
                && trimmed.ends_with(MARKDOWN_COMMENT_CLOSE)
        }
    }
}

/// Find every marker in `line`, in document order.
///
/// Rules:
/// - Comment-only lines yield nothing.
/// - A delimiter run of length 2, 3 or 4 opens a marker. It is closed by the
///   next run of exactly the same length; runs of other lengths inside the
///   payload are skipped. Without a closer the opener is abandoned and
///   scanning resumes right after it.
/// - Runs of length 1 or 5+ never open a marker, even though they contain
///   shorter sub-runs.
/// - Scanning resumes after each closer, so markers never nest or overlap.
pub fn scan(line: &str, kind: DocumentKind) -> Vec<Marker> {
    if is_comment_line(line, kind) {
        return Vec::new();
    }

    let chars: Vec<char> = line.chars().collect();
    let mut markers = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != DELIMITER {
            i += 1;
            continue;
        }

        let count = run_length(&chars, i);
        let Some(category) = MarkerCategory::from_run_length(count) else {
            i += count;
            continue;
        };

        let opener_end = i + count;
        match find_closer(&chars, opener_end, count) {
            Some(closer_start) => {
                let end = closer_start + count;
                markers.push(Marker {
                    category,
                    payload: chars[opener_end..closer_start].iter().collect(),
                    span: Span::new(i, end),
                });
                i = end;
            }
            None => {
                trace!(offset = i, count, "unterminated delimiter run");
                i = opener_end;
            }
        }
    }

    markers
}

/// Length of the delimiter run starting at `start`.
fn run_length(chars: &[char], start: usize) -> usize {
    chars[start..]
        .iter()
        .take_while(|&&c| c == DELIMITER)
        .count()
}

/// Index of the first run of exactly `count` delimiters at or after `from`.
fn find_closer(chars: &[char], from: usize, count: usize) -> Option<usize> {
    let mut j = from;
    while j < chars.len() {
        if chars[j] != DELIMITER {
            j += 1;
            continue;
        }
        let run = run_length(chars, j);
        if run == count {
            return Some(j);
        }
        j += run;
    }
    None
}
