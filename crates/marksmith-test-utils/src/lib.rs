//! Shared test doubles for marksmith integration tests.
//!
//! - [`ScriptedGenerator`]: a [`Generator`] that replays canned replies in
//!   order and records every prompt it was sent.
//! - [`RecordingBuffer`]: an in-memory [`TextBuffer`] that records each edit
//!   it receives, whether the engine's edit guard was held at the time, and
//!   can be told to reject the next edit.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use marksmith_core::buffer::{BufferError, Document, LineEdit, TextBuffer};
use marksmith_core::engine::EditGuard;
use marksmith_core::gateway::{GatewayError, Generator};
use marksmith_core::marker::DocumentKind;
use marksmith_core::prompt::PromptPair;

// ---------------------------------------------------------------------------
// ScriptedGenerator
// ---------------------------------------------------------------------------

/// One canned reply.
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    /// Fail with a provider error carrying this status.
    Fail(u16),
}

impl Reply {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }
}

/// Replays [`Reply`] values in order. Once the script runs out every call
/// fails with a 500.
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<PromptPair>>,
}

impl ScriptedGenerator {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A generator that answers every call with the same text.
    pub fn always(text: &str, calls: usize) -> Self {
        Self::new(std::iter::repeat_n(Reply::text(text), calls))
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Every prompt received so far, in call order.
    pub fn prompts(&self) -> Vec<PromptPair> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &PromptPair) -> Result<String, GatewayError> {
        self.prompts.lock().unwrap().push(prompt.clone());
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(status)) => Err(GatewayError::provider_status(
                "scripted",
                status,
                "scripted failure",
            )),
            None => Err(GatewayError::provider_status(
                "scripted",
                500,
                "script exhausted",
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// RecordingBuffer
// ---------------------------------------------------------------------------

/// An in-memory buffer that watches the engine's edit guard.
pub struct RecordingBuffer {
    doc: Document,
    guard: EditGuard,
    edits: Vec<LineEdit>,
    held_during_edit: Vec<bool>,
    reject_next: bool,
}

impl RecordingBuffer {
    /// Wrap `text`. `guard` should be a clone of the processor's guard.
    pub fn new(text: &str, kind: DocumentKind, guard: EditGuard) -> Self {
        Self {
            doc: Document::from_text(text, kind),
            guard,
            edits: Vec::new(),
            held_during_edit: Vec::new(),
            reject_next: false,
        }
    }

    /// Make the next `apply_edit` fail without changing anything.
    pub fn reject_next_edit(&mut self) {
        self.reject_next = true;
    }

    pub fn text(&self) -> String {
        self.doc.to_text()
    }

    /// Edits successfully applied, in order.
    pub fn edits(&self) -> &[LineEdit] {
        &self.edits
    }

    /// For every `apply_edit` call, including rejected ones: whether the
    /// guard was held while it ran.
    pub fn held_during_edit(&self) -> &[bool] {
        &self.held_during_edit
    }
}

impl TextBuffer for RecordingBuffer {
    fn kind(&self) -> DocumentKind {
        self.doc.kind()
    }

    fn line_count(&self) -> usize {
        self.doc.line_count()
    }

    fn line(&self, index: usize) -> Result<String, BufferError> {
        self.doc.line(index)
    }

    fn apply_edit(&mut self, edit: &LineEdit) -> Result<(), BufferError> {
        self.held_during_edit.push(self.guard.is_held());
        if self.reject_next {
            self.reject_next = false;
            return Err(BufferError::Rejected("scripted rejection".into()));
        }
        self.doc.apply_edit(edit)?;
        self.edits.push(edit.clone());
        Ok(())
    }
}
