//! Marker recognition for a single line of text.
//!
//! A marker is a run of 2, 3 or 4 [`DELIMITER`] characters, some payload,
//! and a closing run of the same length:
//!
//! ```text
//! The pdf is ;;normal(0, 1);;.
//!            ^^            ^^
//!            opener        closer   -> InlineMath, payload "normal(0, 1)"
//! ```
//!
//! The run length selects the [`MarkerCategory`]. Runs of length 1 or 5+
//! never open a marker. See [`scan`] for the exact recognition rules.

pub mod scanner;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use scanner::{DELIMITER, is_comment_line, scan};

// ---------------------------------------------------------------------------
// Document kind
// ---------------------------------------------------------------------------

/// The kind of document a line belongs to.
///
/// LaTeX is the "structured" kind with a single-token line comment (`%`);
/// Markdown is the "freeform" kind whose comments are wrapped in
/// `<!--` / `-->`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Latex,
    Markdown,
}

impl DocumentKind {
    /// Guess the document kind from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "tex" | "ltx" | "sty" | "cls" => Some(Self::Latex),
            "md" | "markdown" | "mdx" => Some(Self::Markdown),
            _ => None,
        }
    }

    /// Format `text` as a comment line in this document kind.
    ///
    /// In Markdown every `--` in `text` is broken up with a space so the
    /// copy cannot close the HTML comment early.
    pub fn comment_line(self, text: &str) -> String {
        match self {
            Self::Latex => format!("% {text}"),
            Self::Markdown => {
                let mut escaped = String::with_capacity(text.len());
                let mut after_dash = false;
                for c in text.chars() {
                    if c == '-' && after_dash {
                        escaped.push(' ');
                    }
                    escaped.push(c);
                    after_dash = c == '-';
                }
                format!("<!-- {escaped} -->")
            }
        }
    }

    /// Human-readable name used in prompts.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Latex => "LaTeX",
            Self::Markdown => "Markdown",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latex => f.write_str("latex"),
            Self::Markdown => f.write_str("markdown"),
        }
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "latex" | "tex" => Ok(Self::Latex),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(format!(
                "unknown document kind {other:?} (expected latex or markdown)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Marker types
// ---------------------------------------------------------------------------

/// What a marker asks for, keyed by the length of its delimiter run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerCategory {
    /// `;;...;;` -- an inline math expression.
    InlineMath,
    /// `;;;...;;;` -- a display math block on its own line.
    BlockMath,
    /// `;;;;...;;;;` -- free-form text inserted verbatim.
    Freeform,
}

impl MarkerCategory {
    /// Map a delimiter run length to a category. Only 2, 3 and 4 qualify.
    pub fn from_run_length(count: usize) -> Option<Self> {
        match count {
            2 => Some(Self::InlineMath),
            3 => Some(Self::BlockMath),
            4 => Some(Self::Freeform),
            _ => None,
        }
    }

    /// The delimiter run length for this category.
    pub fn run_length(self) -> usize {
        match self {
            Self::InlineMath => 2,
            Self::BlockMath => 3,
            Self::Freeform => 4,
        }
    }

    /// Math categories are batched into a single generation call per line.
    pub fn is_math(self) -> bool {
        matches!(self, Self::InlineMath | Self::BlockMath)
    }
}

impl fmt::Display for MarkerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InlineMath => f.write_str("inline"),
            Self::BlockMath => f.write_str("block"),
            Self::Freeform => f.write_str("freeform"),
        }
    }
}

/// Half-open character range `[start, end)` within a line.
///
/// Offsets count `char`s, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} after end {end}");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A recognized directive occurrence within one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub category: MarkerCategory,
    /// Raw text strictly between the opening and closing runs.
    pub payload: String,
    /// From the first opener character to just past the closer.
    pub span: Span,
}
