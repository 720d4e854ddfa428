//! `marksmith scan` command: list the markers in a file.

use std::path::Path;

use anyhow::Result;

use marksmith_core::buffer::{Document, TextBuffer};
use marksmith_core::marker::{DocumentKind, is_comment_line, scan};

use crate::document::read_document;

/// Run the scan command.
pub fn run_scan(file: &Path, kind: Option<DocumentKind>) -> Result<()> {
    let doc = read_document(file, kind)?;
    let rows = marker_rows(&doc);
    for row in &rows {
        println!("{row}");
    }

    let comments = comment_lines(&doc);
    eprintln!(
        "{} marker(s) in {}; {comments} comment line(s) skipped.",
        rows.len(),
        file.display()
    );
    Ok(())
}

fn comment_lines(doc: &Document) -> usize {
    let kind = doc.kind();
    doc.lines()
        .iter()
        .filter(|line| is_comment_line(line, kind))
        .count()
}

/// One row per marker: `line:start..end<TAB>category<TAB>payload`, with a
/// 1-based line number and character offsets within the line.
fn marker_rows(doc: &Document) -> Vec<String> {
    let kind = doc.kind();
    doc.lines()
        .iter()
        .enumerate()
        .flat_map(|(i, line)| {
            scan(line, kind).into_iter().map(move |m| {
                format!(
                    "{}:{}..{}\t{}\t{}",
                    i + 1,
                    m.span.start,
                    m.span.end,
                    m.category,
                    m.payload
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_for_mixed_document() {
        let doc = Document::from_text(
            "intro\nThe pdf is ;;normal(0, 1);;.\n% ;;skipped;;\n;;;;add a remark;;;;\n",
            DocumentKind::Latex,
        );
        assert_eq!(
            marker_rows(&doc),
            vec![
                "2:11..27\tinline\tnormal(0, 1)".to_string(),
                "4:0..20\tfreeform\tadd a remark".to_string(),
            ]
        );
    }

    #[test]
    fn markdown_comment_lines_are_skipped() {
        let doc = Document::from_text("<!-- ;;x;; -->\n;;;y;;;", DocumentKind::Markdown);
        assert_eq!(marker_rows(&doc), vec!["2:0..7\tblock\ty".to_string()]);
        assert_eq!(comment_lines(&doc), 1);
    }
}
