//! engine::reconcile
//!
//! Making the local branch point at the verified revision.
//!
//! # Steps
//!
//! 1. Read the current branch (may be detached or unborn).
//! 2. If it differs from the target, or the clone is fresh: check out the
//!    verified revision onto the target branch name. When a local or
//!    remote-tracking ref for that name already exists anywhere in the
//!    copy, the branch tip is force-updated (`checkout -B`): a controlled
//!    rewrite, since the branch is expected to track the remote exactly.
//!    Otherwise the branch is created fresh.
//! 3. Fetch-mode runs then fast-forward the branch to the verified
//!    revision. Divergence is detected via an ancestry query first and is
//!    a hard failure; a non-fast-forward merge is never attempted.
//! 4. If a tracking reference for (remote, branch) exists, it is updated
//!    to the verified revision, keeping the local record of "last known
//!    remote state" consistent with what was just verified.

use std::process::Command;

use crate::git::{Git, GitError};
use crate::ui::output::{self, Verbosity};

use super::{Located, SyncError, TransportMode, Transported, VerifiedRevision};

/// Reconcile the working copy's branch with the verified revision.
///
/// # Errors
///
/// - [`SyncError::NonLinearHistory`] when a required fast-forward is
///   impossible
/// - [`SyncError::Git`] for checkout/merge subprocess failures
pub fn reconcile(
    located: &Located,
    transported: &Transported,
    verified: &VerifiedRevision,
    verbosity: Verbosity,
) -> Result<(), SyncError> {
    let git = Git::open(&located.dir)?;
    let fresh = matches!(transported.mode, TransportMode::Cloned);
    let target = &located.branch;

    let current = git.current_branch()?;
    if fresh || current.as_ref() != Some(target) {
        let known = git.branch_exists_anywhere(target)?;
        if known {
            output::print(format!("Switching to branch '{target}'"), verbosity);
            // The branch tracks the remote exactly, so force-updating its
            // tip is a controlled rewrite; -f also populates the worktree
            // of a --no-checkout clone.
            run_git(
                located,
                &[
                    "checkout",
                    "-q",
                    "-f",
                    "-B",
                    target.as_str(),
                    verified.oid.as_str(),
                ],
                "git checkout",
            )?;
        } else {
            output::print(format!("Creating branch '{target}'"), verbosity);
            run_git(
                located,
                &["checkout", "-q", "-b", target.as_str(), verified.oid.as_str()],
                "git checkout",
            )?;
        }
    }

    if !fresh {
        let tip = git.resolve_revision(&format!("refs/heads/{}", target))?;
        if tip != verified.oid {
            if git.is_ancestor(&verified.oid, &tip)? {
                // Local branch is ahead; there is nothing to integrate.
                output::debug(
                    format!("'{}' already contains {}", target, verified.oid.short(12)),
                    verbosity,
                );
            } else if !git.is_ancestor(&tip, &verified.oid)? {
                return Err(SyncError::NonLinearHistory {
                    branch: target.to_string(),
                    revision: verified.oid.to_string(),
                });
            } else {
                output::print(
                    format!("Fast-forwarding '{}' to {}", target, verified.oid.short(12)),
                    verbosity,
                );
                run_git(
                    located,
                    &["merge", "-q", "--ff-only", verified.oid.as_str()],
                    "git merge --ff-only",
                )?;
            }
        }
    }

    let tracking = format!("refs/remotes/{}/{}", located.tracking_remote, target);
    if git.ref_exists(&tracking) {
        git.update_ref(&tracking, &verified.oid, "sourcegate: update tracking ref")?;
        output::debug(format!("updated {tracking}"), verbosity);
    }

    Ok(())
}

/// Run a worktree-touching git subcommand in the working copy.
fn run_git(located: &Located, args: &[&str], what: &str) -> Result<(), SyncError> {
    let output = Command::new("git")
        .current_dir(&located.dir)
        .args(args)
        .output()
        .map_err(|e| {
            SyncError::Git(GitError::Internal {
                message: format!("{what}: failed to run git: {e}"),
            })
        })?;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(SyncError::Git(GitError::Internal {
            message: format!("{what} failed: {}", stderr.trim()),
        }))
    }
}
