//! Prompt assembly: base rules per task, prioritized instruction sources,
//! and the bounded preceding-document context.
//!
//! ```text
//! system: <task rules>            user: <preceding context, fenced>
//!         <project instructions>        <current line, fenced>  (batch only)
//!         <user instructions>           <payload(s)>
//! ```

pub mod assemble;
pub mod context;
pub mod instructions;

pub use assemble::assemble_prompt;
pub use context::{join_preceding, preceding_context};
pub use instructions::{
    InstructionSet, InstructionSource, PROJECT_INSTRUCTIONS_FILE, Priority,
    load_project_instructions,
};

/// The kind of generation being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// One informal expression to one math expression (manual selection).
    SingleExpression,
    /// N numbered expressions to exactly N lines of math.
    BatchExpressions,
    /// A free-form instruction whose output is inserted verbatim.
    FreeformInsertion,
}

/// A fully assembled request for the generation gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}
