//! engine::rollback
//!
//! Removal of unverified state after a rejected verification.
//!
//! # Design
//!
//! The rollback strategy depends on whether this run created the
//! repository from nothing:
//!
//! - **Fresh clone**: the whole working copy is deleted. A
//!   never-before-trusted tree with an unverified head must leave no
//!   trace.
//! - **Pre-existing copy**: only the `FETCH_HEAD` marker is deleted.
//!   Fetched objects may linger in the object store, but nothing
//!   references them, so the reachability invariant holds while the
//!   previously trusted branch state survives untouched.
//!
//! The self-marker working copy is never removed wholesale; it is by
//! definition pre-existing, and transport always runs it in fetch mode.

use std::fs;
use std::path::PathBuf;

use crate::git::Git;

use super::{Located, SyncError, TransportMode, Transported};

/// What rollback removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollbackAction {
    /// The freshly created working copy was deleted.
    RemovedWorkingCopy(PathBuf),
    /// The fetch marker was deleted; trusted state untouched.
    RemovedFetchMarker(PathBuf),
    /// Nothing needed removing.
    NothingToRemove,
}

impl std::fmt::Display for RollbackAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RollbackAction::RemovedWorkingCopy(path) => {
                write!(f, "removed unverified working copy {}", path.display())
            }
            RollbackAction::RemovedFetchMarker(path) => {
                write!(f, "discarded unverified fetch marker {}", path.display())
            }
            RollbackAction::NothingToRemove => write!(f, "no unverified state to remove"),
        }
    }
}

/// Remove exactly the state this run created.
///
/// # Errors
///
/// [`SyncError::Rollback`] if the removal itself fails; the caller still
/// surfaces the original verification failure.
pub fn rollback(located: &Located, transported: &Transported) -> Result<RollbackAction, SyncError> {
    match transported.mode {
        TransportMode::Cloned => {
            if !located.dir.exists() {
                return Ok(RollbackAction::NothingToRemove);
            }
            fs::remove_dir_all(&located.dir).map_err(|e| {
                SyncError::Rollback(format!(
                    "failed to remove '{}': {e}",
                    located.dir.display()
                ))
            })?;
            Ok(RollbackAction::RemovedWorkingCopy(located.dir.clone()))
        }
        TransportMode::Fetched => {
            let git = Git::open(&located.dir)
                .map_err(|e| SyncError::Rollback(e.to_string()))?;
            let marker = git.git_dir().join("FETCH_HEAD");
            if !marker.exists() {
                return Ok(RollbackAction::NothingToRemove);
            }
            fs::remove_file(&marker).map_err(|e| {
                SyncError::Rollback(format!("failed to remove '{}': {e}", marker.display()))
            })?;
            Ok(RollbackAction::RemovedFetchMarker(marker))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod rollback_action {
        use super::*;

        #[test]
        fn display_formatting() {
            let action = RollbackAction::RemovedWorkingCopy(PathBuf::from("/work/comp"));
            assert!(action.to_string().contains("/work/comp"));
            assert!(action.to_string().contains("working copy"));

            let action = RollbackAction::RemovedFetchMarker(PathBuf::from("/x/.git/FETCH_HEAD"));
            assert!(action.to_string().contains("FETCH_HEAD"));

            assert!(RollbackAction::NothingToRemove
                .to_string()
                .contains("no unverified state"));
        }
    }
}
