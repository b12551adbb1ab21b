//! engine
//!
//! The secure synchronization protocol.
//!
//! # Architecture
//!
//! One invocation handles one component, moving through a strictly linear
//! sequence of stages. Each stage consumes the previous stage's output
//! and produces a typed value for the next, so no step can run before its
//! input exists:
//!
//! ```text
//! Start -> Located -> Transported -> Verifying -> Accepted -> Reconciled -> Done
//!                 \-> Skipped                 \-> Rejected -> RolledBack -> Failed
//! ```
//!
//! - **locate**: resolve remote location and branch, validate every
//!   identifier. Fails before any mutation.
//! - **transport**: clone or fetch; the only stage allowed to touch the
//!   object store. Produces the candidate revision marker.
//! - **verify**: resolve the marker to a concrete revision and consult
//!   the injected verifier under the selected trust policy.
//! - **reconcile** (acceptance): make the local branch point at the
//!   verified revision and update the tracking reference.
//! - **rollback** (rejection): erase exactly the unverified state.
//!
//! # Invariant
//!
//! At no point, including after failure, may a ref reachable from the
//! component's tracked branch point at a revision that failed
//! verification under the active policy.

pub mod locate;
pub mod reconcile;
pub mod rollback;
pub mod transport;
pub mod verify;

use std::path::PathBuf;

use thiserror::Error;

use crate::core::config::{Config, ConfigError};
use crate::core::types::TypeError;
use crate::git::GitError;
use crate::ui::output::{self, Verbosity};
use crate::verifier::{RevisionVerifier, VerifierError};

pub use locate::{Located, RemoteLocation};
pub use transport::{TransportMode, TransportOutcome, Transported};
pub use verify::VerifiedRevision;

/// Errors from a synchronization run.
///
/// Every variant is terminal for the invocation; the only recovery path
/// is the rollback of unverified state performed before
/// [`SyncError::VerificationRejected`] is surfaced.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Malformed branch name, component name, path, or trust-policy list.
    /// Raised before any network or disk mutation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Clone or fetch failed for a reason other than a missing branch.
    #[error("transport from '{remote}' failed: {detail}")]
    Transport {
        /// The remote the transport targeted
        remote: String,
        /// Diagnostic detail (subprocess stderr)
        detail: String,
    },

    /// The remote reports the target branch does not exist.
    #[error("remote branch '{branch}' not found at '{remote}'")]
    BranchAbsent {
        /// The remote the transport targeted
        remote: String,
        /// The missing branch
        branch: String,
    },

    /// The candidate revision marker could not be resolved after
    /// transport. Always fatal; never silently defaulted.
    #[error("cannot resolve '{marker}' after transport: {detail}")]
    Resolution {
        /// The marker that failed to resolve
        marker: String,
        /// Diagnostic detail
        detail: String,
    },

    /// The external verifier rejected the candidate revision. Rollback
    /// has already run when this surfaces.
    #[error("verification rejected revision {revision} of component '{component}'")]
    VerificationRejected {
        /// The component being synchronized
        component: String,
        /// The rejected revision
        revision: String,
    },

    /// A required fast-forward merge would not be a clean fast-forward.
    #[error("branch '{branch}' cannot be fast-forwarded to {revision}: history has diverged")]
    NonLinearHistory {
        /// The branch that diverged
        branch: String,
        /// The verified revision that could not be integrated
        revision: String,
    },

    /// Rollback of unverified state failed.
    #[error("rollback failed: {0}")]
    Rollback(String),

    /// Git operation failed.
    #[error(transparent)]
    Git(#[from] GitError),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The verifier could not be consulted at all (as opposed to
    /// rejecting the revision).
    #[error("verifier could not be consulted: {0}")]
    Verifier(#[from] VerifierError),
}

impl From<TypeError> for SyncError {
    fn from(err: TypeError) -> Self {
        SyncError::InvalidInput(err.to_string())
    }
}

/// Inputs for one synchronization run, as supplied by the caller.
///
/// All strings are raw and unvalidated; [`locate::locate`] is the single
/// validation gate.
#[derive(Debug, Clone)]
pub struct Request {
    /// Component to synchronize.
    pub component: String,
    /// Branch to synchronize (overridable per component in config).
    pub branch: Option<String>,
    /// Working copy path; `.` targets the current directory, `None`
    /// derives the path from the component name.
    pub path: Option<String>,
    /// Base directory for relative paths (defaults to the process cwd).
    pub cwd: Option<PathBuf>,
    /// Discard any existing working copy and clone fresh.
    pub clean: bool,
    /// Prefer shallow history (and keep existing shallow copies shallow).
    pub shallow: bool,
    /// Stop after transport and verification; do not touch the branch.
    pub fetch_only: bool,
    /// Treat a missing remote branch as a successful no-op.
    pub ignore_missing: bool,
}

impl Request {
    /// A request with defaults for everything but component and branch.
    pub fn new(component: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            branch: Some(branch.into()),
            path: None,
            cwd: None,
            clean: false,
            shallow: false,
            fetch_only: false,
            ignore_missing: false,
        }
    }
}

/// Terminal success states of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The branch points at a verified revision (or verification was
    /// intentionally limited to the fetch by `fetch_only`).
    Done,
    /// The remote branch was legitimately absent and the caller opted
    /// into ignoring that; nothing was mutated.
    Skipped,
}

/// Run the synchronization protocol for one component.
///
/// # Errors
///
/// Any [`SyncError`]; on [`SyncError::VerificationRejected`] the
/// unverified state has already been rolled back.
pub fn run(
    req: &Request,
    config: &Config,
    verifier: &dyn RevisionVerifier,
    verbosity: Verbosity,
) -> Result<Outcome, SyncError> {
    let located = locate::locate(req, config)?;
    output::debug(
        format!(
            "component '{}': branch '{}' from {} into {}",
            located.component,
            located.branch,
            located.remote,
            located.dir.display()
        ),
        verbosity,
    );

    let transported = match transport::transport(&located, verbosity)? {
        TransportOutcome::Skipped => {
            output::print(
                format!(
                    "Branch '{}' not available for '{}'; nothing to do",
                    located.branch, located.component
                ),
                verbosity,
            );
            return Ok(Outcome::Skipped);
        }
        TransportOutcome::Completed(t) => t,
    };

    let verified = match verify::verify(&located, &transported, verifier, verbosity) {
        Ok(v) => v,
        Err(err @ SyncError::VerificationRejected { .. }) => {
            match rollback::rollback(&located, &transported) {
                Ok(action) => output::warn(action, verbosity),
                Err(rollback_err) => output::error(&rollback_err),
            }
            return Err(err);
        }
        Err(other) => return Err(other),
    };

    if located.fetch_only {
        output::print(
            format!(
                "Verified {} for '{}' (fetch-only, branch untouched)",
                verified.oid.short(12),
                located.component
            ),
            verbosity,
        );
        return Ok(Outcome::Done);
    }

    reconcile::reconcile(&located, &transported, &verified, verbosity)?;

    output::print(
        format!(
            "Component '{}' synchronized: '{}' at {}",
            located.component,
            located.branch,
            verified.oid.short(12)
        ),
        verbosity,
    );

    Ok(Outcome::Done)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod sync_error {
        use super::*;

        #[test]
        fn display_formatting() {
            let err = SyncError::InvalidInput("bad branch".to_string());
            assert!(err.to_string().contains("invalid input"));

            let err = SyncError::BranchAbsent {
                remote: "https://example.org/x.git".to_string(),
                branch: "main".to_string(),
            };
            assert!(err.to_string().contains("main"));
            assert!(err.to_string().contains("not found"));

            let err = SyncError::NonLinearHistory {
                branch: "main".to_string(),
                revision: "abc123".to_string(),
            };
            assert!(err.to_string().contains("diverged"));
        }

        #[test]
        fn type_error_becomes_invalid_input() {
            let err: SyncError = crate::core::types::TypeError::InvalidBranchName(
                "../etc".to_string(),
            )
            .into();
            assert!(matches!(err, SyncError::InvalidInput(_)));
        }
    }

    mod request {
        use super::*;

        #[test]
        fn new_defaults() {
            let req = Request::new("core-agent", "main");
            assert_eq!(req.component, "core-agent");
            assert_eq!(req.branch.as_deref(), Some("main"));
            assert!(!req.clean);
            assert!(!req.shallow);
            assert!(!req.fetch_only);
            assert!(!req.ignore_missing);
            assert!(req.path.is_none());
        }
    }
}
