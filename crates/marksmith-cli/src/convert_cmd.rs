//! `marksmith convert` command: convert one piece of text to math.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};

use marksmith_core::buffer::TextBuffer;
use marksmith_core::engine::{LineProcessor, convert_selection};
use marksmith_core::marker::DocumentKind;
use marksmith_core::prompt::preceding_context;

use crate::config::ProviderFlags;
use crate::document::{build_processor, project_root, read_document, resolve_kind};

/// Options for the convert command.
#[derive(Debug)]
pub struct ConvertOptions {
    pub text: String,
    /// File to draw preceding context from.
    pub file: Option<PathBuf>,
    /// 1-based line the text belongs on; context is the lines above it.
    /// Defaults to the end of the file.
    pub line: Option<usize>,
    pub kind: Option<DocumentKind>,
    pub project_root: Option<PathBuf>,
}

/// Run the convert command.
pub async fn run_convert(options: &ConvertOptions, flags: &ProviderFlags) -> Result<()> {
    let root = project_root(options.project_root.as_deref())?;
    let processor = build_processor(flags, &root)?;

    let converted = convert(&processor, options).await?;
    if converted.is_empty() {
        eprintln!("The provider returned nothing; the text was left unchanged.");
        return Ok(());
    }
    println!("{converted}");
    Ok(())
}

async fn convert(processor: &LineProcessor, options: &ConvertOptions) -> Result<String> {
    let (kind, context) = match &options.file {
        Some(path) => {
            let kind = resolve_kind(options.kind, path)?;
            let doc = read_document(path, Some(kind))?;
            let count = doc.line_count();
            let index = match options.line {
                None => count,
                Some(0) => bail!("line numbers start at 1"),
                Some(line) if line > count + 1 => {
                    bail!("line {line} is out of range (the file has {count} lines)")
                }
                Some(line) => line - 1,
            };
            let context = preceding_context(doc.lines(), index, processor.settings().context_lines);
            (kind, context)
        }
        None => (options.kind.unwrap_or(DocumentKind::Latex), String::new()),
    };

    convert_selection(
        processor.generator().as_ref(),
        kind,
        &options.text,
        &context,
        processor.instructions(),
    )
    .await
    .map_err(|e| anyhow!(e.user_message()))
    .context("conversion failed")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use marksmith_core::engine::EngineSettings;
    use marksmith_core::prompt::InstructionSet;
    use marksmith_test_utils::{Reply, ScriptedGenerator};

    use super::*;

    fn options(text: &str) -> ConvertOptions {
        ConvertOptions {
            text: text.to_string(),
            file: None,
            line: None,
            kind: None,
            project_root: None,
        }
    }

    fn processor(reply: Reply, context_lines: i64) -> (Arc<ScriptedGenerator>, LineProcessor) {
        let generator = Arc::new(ScriptedGenerator::new([reply]));
        let settings = EngineSettings {
            context_lines,
            ..EngineSettings::default()
        };
        let processor =
            LineProcessor::new(generator.clone(), settings, InstructionSet::default());
        (generator, processor)
    }

    #[tokio::test]
    async fn converts_without_file() {
        let (generator, processor) = processor(Reply::text("$$\\int_0^1 f$$"), 5);
        let out = convert(&processor, &options("integral of f from 0 to 1"))
            .await
            .unwrap();
        assert_eq!(out, "\\int_0^1 f");
        assert!(generator.prompts()[0].system.contains("LaTeX"));
    }

    #[tokio::test]
    async fn context_comes_from_lines_above() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("notes.md");
        std::fs::write(&path, "first\nsecond\nthird\n").unwrap();

        let (generator, processor) = processor(Reply::text("y"), 1);
        let opts = ConvertOptions {
            file: Some(path),
            line: Some(3),
            ..options("why")
        };
        convert(&processor, &opts).await.unwrap();

        let prompt = &generator.prompts()[0];
        assert!(prompt.user.contains("second"));
        assert!(!prompt.user.contains("first"));
        assert!(!prompt.user.contains("third"));
        assert!(prompt.system.contains("Markdown"));
    }

    #[tokio::test]
    async fn provider_failure_is_reported() {
        let (_, processor) = processor(Reply::Fail(401), 0);
        let err = convert(&processor, &options("x")).await.unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("Authentication failed"), "unexpected: {msg}");
    }

    #[tokio::test]
    async fn line_past_end_is_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("a.tex");
        std::fs::write(&path, "one\n").unwrap();
        let (_, processor) = processor(Reply::text("x"), 5);
        let opts = ConvertOptions {
            file: Some(path),
            line: Some(9),
            ..options("x")
        };
        assert!(convert(&processor, &opts).await.is_err());
    }
}
