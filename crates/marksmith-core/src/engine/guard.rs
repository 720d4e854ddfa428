//! Re-entrancy guard for the engine's own edits.
//!
//! Applying a line edit makes the host report a changed line, which would
//! feed straight back into marker processing. The guard is held for the
//! duration of every edit the engine submits; line events that arrive while
//! it is held are ignored.
//!
//! The guard is explicit state owned by whoever drives the engine. Clones
//! share one flag, so an edit observer can hold a clone and check it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared "edit in progress" flag.
#[derive(Debug, Clone, Default)]
pub struct EditGuard {
    held: Arc<AtomicBool>,
}

impl EditGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `true` while an edit is being applied.
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }

    /// Set the flag, or return `None` if it is already set.
    ///
    /// The flag is cleared when the returned permit is dropped, whether the
    /// edit succeeded, failed, or panicked.
    pub fn hold(&self) -> Option<EditPermit> {
        self.held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| EditPermit {
                held: Arc::clone(&self.held),
            })
    }
}

/// Proof that the guard is held. Clears the flag on drop.
#[derive(Debug)]
#[must_use = "the guard is released as soon as the permit is dropped"]
pub struct EditPermit {
    held: Arc<AtomicBool>,
}

impl Drop for EditPermit {
    fn drop(&mut self) {
        self.held.store(false, Ordering::Release);
    }
}
