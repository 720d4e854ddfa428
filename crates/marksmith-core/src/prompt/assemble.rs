//! Build the system and user prompts for one generation call.

use std::fmt::Write as _;

use crate::marker::DocumentKind;

use super::instructions::{InstructionSet, Priority};
use super::{PromptPair, Task};

/// Assemble the prompt pair for `task`.
///
/// - The system prompt holds the fixed rules for the task, followed by the
///   instruction sources (project first, tagged as taking precedence).
/// - The user prompt holds the non-blank preceding context and current line
///   as fenced, read-only reference, followed by the payload(s). Batch
///   payloads are a 1-indexed numbered list with an exact line-count demand.
///
/// `raw_current_line` is only meaningful for [`Task::BatchExpressions`] but
/// is rendered whenever supplied.
pub fn assemble_prompt(
    task: Task,
    kind: DocumentKind,
    payloads: &[String],
    instructions: &InstructionSet,
    preceding_context: Option<&str>,
    raw_current_line: Option<&str>,
) -> PromptPair {
    PromptPair {
        system: system_prompt(task, kind, instructions),
        user: user_prompt(task, payloads, preceding_context, raw_current_line),
    }
}

fn system_prompt(task: Task, kind: DocumentKind, instructions: &InstructionSet) -> String {
    let mut out = base_rules(task, kind);

    let sources = instructions.sources();
    if !sources.is_empty() {
        out.push_str("\n\n## Additional instructions\n");
        for source in sources {
            let label = match source.priority {
                Priority::High => {
                    "### Project instructions (HIGH priority: these take precedence over user instructions when they conflict)"
                }
                Priority::Low => "### User instructions (LOW priority)",
            };
            let _ = write!(out, "\n{label}\n{}\n", source.text);
        }
    }

    out.truncate(out.trim_end().len());
    out
}

fn base_rules(task: Task, kind: DocumentKind) -> String {
    let target = match kind {
        DocumentKind::Latex => "LaTeX math",
        DocumentKind::Markdown => "LaTeX math for a Markdown document (KaTeX/MathJax compatible)",
    };
    match task {
        Task::SingleExpression => format!(
            "You convert an informal description of a mathematical expression into {target}.\n\
             Rules:\n\
             - Output only the expression itself.\n\
             - Do not wrap it in math delimiters such as $, $$, \\( \\) or \\[ \\].\n\
             - Do not add explanations, commentary or code fences."
        ),
        Task::BatchExpressions => format!(
            "You convert a numbered list of informal descriptions of mathematical expressions into {target}.\n\
             Rules:\n\
             - Respond with exactly one line per item, in the same order as the items.\n\
             - Do not number the lines and do not repeat the item text.\n\
             - Do not wrap any line in math delimiters such as $, $$, \\( \\) or \\[ \\].\n\
             - Never emit blank lines, explanations, commentary or code fences.\n\
             - Each expression must fit on a single line."
        ),
        Task::FreeformInsertion => format!(
            "You write content that will be inserted verbatim into a {} document.\n\
             Rules:\n\
             - Follow the instruction and output only the text to insert.\n\
             - Use {} syntax wherever markup is needed.\n\
             - Do not add explanations, preambles or code fences around the output.",
            kind.display_name(),
            kind.display_name(),
        ),
    }
}

fn user_prompt(
    task: Task,
    payloads: &[String],
    preceding_context: Option<&str>,
    raw_current_line: Option<&str>,
) -> String {
    let mut out = String::new();

    if let Some(context) = preceding_context.filter(|c| !c.trim().is_empty()) {
        push_fenced(
            &mut out,
            "Preceding document context (read-only reference; do not rewrite it):",
            context,
        );
    }
    if let Some(line) = raw_current_line.filter(|l| !l.trim().is_empty()) {
        push_fenced(
            &mut out,
            "Current line with its markers (read-only reference; do not rewrite it):",
            line,
        );
    }

    match task {
        Task::SingleExpression => {
            let payload = payloads.first().map(String::as_str).unwrap_or_default();
            let _ = write!(out, "Convert this to math:\n{payload}");
        }
        Task::BatchExpressions => {
            let n = payloads.len();
            let _ = writeln!(
                out,
                "Convert each of the following {n} items. Respond with exactly {n} lines, \
                 one per item, in order, without numbering."
            );
            for (i, payload) in payloads.iter().enumerate() {
                let _ = write!(out, "\n{}. {}", i + 1, payload.trim());
            }
        }
        Task::FreeformInsertion => {
            let payload = payloads.first().map(String::as_str).unwrap_or_default();
            let _ = write!(out, "Instruction:\n{}", payload.trim());
        }
    }

    out
}

fn push_fenced(out: &mut String, caption: &str, body: &str) {
    let _ = write!(out, "{caption}\n```\n{body}\n```\n\n");
}
