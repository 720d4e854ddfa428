//! Project- and user-level instruction sources.

use std::io;
use std::path::Path;

use tracing::{debug, warn};

/// File name of the project instruction file, looked up at the project root.
pub const PROJECT_INSTRUCTIONS_FILE: &str = ".marksmith.md";

/// Which instruction source wins on conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Low,
    High,
}

/// A priority-tagged block of free-text guidance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionSource {
    pub priority: Priority,
    pub text: String,
}

/// The instruction sources in effect for one invocation.
///
/// Both are optional. Blank text is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstructionSet {
    /// Project-level instructions (high priority).
    pub project: Option<String>,
    /// User-level instructions from configuration (low priority).
    pub user: Option<String>,
}

impl InstructionSet {
    pub fn new(project: Option<String>, user: Option<String>) -> Self {
        Self {
            project: non_blank(project),
            user: non_blank(user),
        }
    }

    /// Sources ordered high priority first.
    pub fn sources(&self) -> Vec<InstructionSource> {
        let mut sources = Vec::with_capacity(2);
        if let Some(text) = self.project.as_deref().and_then(trimmed_non_blank) {
            sources.push(InstructionSource {
                priority: Priority::High,
                text: text.to_string(),
            });
        }
        if let Some(text) = self.user.as_deref().and_then(trimmed_non_blank) {
            sources.push(InstructionSource {
                priority: Priority::Low,
                text: text.to_string(),
            });
        }
        sources
    }

    pub fn is_empty(&self) -> bool {
        self.sources().is_empty()
    }
}

/// Read the project instruction file from `root`.
///
/// A missing file is not an error. Any other read failure is logged and
/// treated as absence.
pub fn load_project_instructions(root: &Path) -> Option<String> {
    let path = root.join(PROJECT_INSTRUCTIONS_FILE);
    match std::fs::read_to_string(&path) {
        Ok(text) => {
            debug!(path = %path.display(), bytes = text.len(), "loaded project instructions");
            non_blank(Some(text))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read project instructions");
            None
        }
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

fn trimmed_non_blank(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_are_ordered_high_first() {
        let set = InstructionSet::new(Some("project".into()), Some("user".into()));
        let sources = set.sources();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].priority, Priority::High);
        assert_eq!(sources[0].text, "project");
        assert_eq!(sources[1].priority, Priority::Low);
        assert_eq!(sources[1].text, "user");
    }

    #[test]
    fn blank_sources_are_absent() {
        let set = InstructionSet::new(Some("  \n".into()), None);
        assert!(set.project.is_none());
        assert!(set.is_empty());
    }

    #[test]
    fn only_user_source() {
        let set = InstructionSet::new(None, Some("  use \\mathbb{R}  ".into()));
        let sources = set.sources();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].priority, Priority::Low);
        assert_eq!(sources[0].text, "use \\mathbb{R}");
    }

    #[test]
    fn load_missing_file_is_none() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(load_project_instructions(tmp.path()).is_none());
    }

    #[test]
    fn load_existing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(PROJECT_INSTRUCTIONS_FILE),
            "Use bold vectors.\n",
        )
        .unwrap();
        assert_eq!(
            load_project_instructions(tmp.path()).as_deref(),
            Some("Use bold vectors.\n")
        );
    }

    #[test]
    fn load_blank_file_is_none() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join(PROJECT_INSTRUCTIONS_FILE), "\n\n").unwrap();
        assert!(load_project_instructions(tmp.path()).is_none());
    }

    #[test]
    fn unreadable_path_is_treated_as_absent() {
        let tmp = tempfile::TempDir::new().unwrap();
        // A directory where the file should be fails with something other
        // than NotFound.
        std::fs::create_dir(tmp.path().join(PROJECT_INSTRUCTIONS_FILE)).unwrap();
        assert!(load_project_instructions(tmp.path()).is_none());
    }
}
