//! Marker recognition and in-place replacement for LaTeX and Markdown
//! documents.
//!
//! A line containing `;;...;;` (inline math), `;;;...;;;` (block math) or
//! `;;;;...;;;;` (free-form instruction) is scanned, the payloads are sent
//! to a generation backend, and the answers are spliced back into the line
//! as one atomic edit.

pub mod buffer;
pub mod demux;
pub mod engine;
pub mod gateway;
pub mod marker;
pub mod prompt;
pub mod replace;
