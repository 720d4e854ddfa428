//! Output delimiters that wrap generated math.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::marker::DocumentKind;

/// An opening/closing token pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimiterPair {
    pub open: &'static str,
    pub close: &'static str,
}

impl DelimiterPair {
    pub const fn new(open: &'static str, close: &'static str) -> Self {
        Self { open, close }
    }
}

/// Wrapping pairs for inline and display math.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimiterStyle {
    pub inline: DelimiterPair,
    pub block: DelimiterPair,
}

impl DelimiterStyle {
    /// LaTeX documents always use `$...$` and `\[...\]`.
    pub const LATEX: Self = Self {
        inline: DelimiterPair::new("$", "$"),
        block: DelimiterPair::new("\\[", "\\]"),
    };

    /// Resolve the style for a document. Only Markdown is configurable.
    pub fn for_kind(kind: DocumentKind, markdown: MarkdownDelimiters) -> Self {
        match kind {
            DocumentKind::Latex => Self::LATEX,
            DocumentKind::Markdown => markdown.style(),
        }
    }
}

/// Math delimiter convention for Markdown documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkdownDelimiters {
    /// `$...$` and `$$...$$`.
    #[default]
    Dollars,
    /// `\(...\)` and `\[...\]`.
    Brackets,
}

impl MarkdownDelimiters {
    pub fn style(self) -> DelimiterStyle {
        match self {
            Self::Dollars => DelimiterStyle {
                inline: DelimiterPair::new("$", "$"),
                block: DelimiterPair::new("$$", "$$"),
            },
            Self::Brackets => DelimiterStyle {
                inline: DelimiterPair::new("\\(", "\\)"),
                block: DelimiterPair::new("\\[", "\\]"),
            },
        }
    }
}

impl fmt::Display for MarkdownDelimiters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dollars => f.write_str("dollars"),
            Self::Brackets => f.write_str("brackets"),
        }
    }
}

impl FromStr for MarkdownDelimiters {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dollars" => Ok(Self::Dollars),
            "brackets" => Ok(Self::Brackets),
            other => Err(format!(
                "unknown markdown delimiters {other:?} (expected dollars or brackets)"
            )),
        }
    }
}
