//! Loading documents and wiring up a processor for the file commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use marksmith_core::buffer::Document;
use marksmith_core::engine::LineProcessor;
use marksmith_core::gateway::build_generator;
use marksmith_core::marker::DocumentKind;
use marksmith_core::prompt::{InstructionSet, load_project_instructions};

use crate::config::{MarksmithConfig, ProviderFlags};

/// Pick the document kind: `--kind` if given, else the file extension.
pub fn resolve_kind(flag: Option<DocumentKind>, path: &Path) -> Result<DocumentKind> {
    flag.or_else(|| DocumentKind::from_path(path)).with_context(|| {
        format!(
            "cannot tell the document kind of {}; pass --kind latex or --kind markdown",
            path.display()
        )
    })
}

/// Read `path` into an in-memory document.
pub fn read_document(path: &Path, kind: Option<DocumentKind>) -> Result<Document> {
    let kind = resolve_kind(kind, path)?;
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(Document::from_text(&text, kind))
}

/// The directory holding `.marksmith.md`: `--project-root` or the current
/// directory.
pub fn project_root(flag: Option<&Path>) -> Result<PathBuf> {
    match flag {
        Some(root) => Ok(root.to_path_buf()),
        None => std::env::current_dir().context("failed to determine current directory"),
    }
}

/// Resolve configuration and build a processor backed by the configured
/// provider.
pub fn build_processor(flags: &ProviderFlags, project_root: &Path) -> Result<LineProcessor> {
    let config = MarksmithConfig::resolve(flags)?;
    tracing::debug!(gateway = ?config.gateway, "resolved configuration");

    let generator =
        build_generator(&config.gateway).map_err(|e| anyhow::anyhow!(e.user_message()))?;
    let instructions = InstructionSet::new(
        load_project_instructions(project_root),
        config.user_instructions,
    );
    Ok(LineProcessor::new(generator, config.engine, instructions))
}
