//! engine::verify
//!
//! Candidate resolution and the verification gate.
//!
//! # Design
//!
//! The transport stage produced a marker (`HEAD` or `FETCH_HEAD`), not a
//! revision. This stage resolves it to a concrete OID (failing loudly if
//! the marker is missing, never defaulting), selects the trust policy by
//! pure lookup, and delegates to the injected
//! [`RevisionVerifier`](crate::verifier::RevisionVerifier).
//!
//! A skip policy is honored but never silent: the trust banner is printed
//! even in quiet mode. Any non-success from the verifier is an
//! authoritative rejection; there is no partial trust and no retry.

use crate::core::types::{ComponentName, Oid, TrustPolicy};
use crate::git::{Git, GitError};
use crate::ui::output::{self, Verbosity};
use crate::verifier::RevisionVerifier;

use super::{Located, SyncError, Transported};

/// A revision that passed (or legitimately skipped) verification.
#[derive(Debug, Clone)]
pub struct VerifiedRevision {
    /// The concrete, immutable identifier of the accepted revision.
    pub oid: Oid,
}

/// Select the trust policy for a component.
///
/// Pure lookup against the validated allow-lists; no network access.
/// Overlapping membership was rejected during location resolution, so at
/// most one list matches here.
pub fn select_policy(
    component: &ComponentName,
    skip: &[ComponentName],
    commit_sufficient: &[ComponentName],
) -> TrustPolicy {
    if skip.contains(component) {
        TrustPolicy::Skip
    } else if commit_sufficient.contains(component) {
        TrustPolicy::SignedTagOrCommit
    } else {
        TrustPolicy::SignedTag
    }
}

/// Resolve the candidate marker and verify it under the selected policy.
///
/// # Errors
///
/// - [`SyncError::Resolution`] if the marker does not resolve
/// - [`SyncError::VerificationRejected`] on a negative verdict
/// - [`SyncError::Verifier`] if the verifier could not be consulted
pub fn verify(
    located: &Located,
    transported: &Transported,
    verifier: &dyn RevisionVerifier,
    verbosity: Verbosity,
) -> Result<VerifiedRevision, SyncError> {
    let git = Git::open(&located.dir)?;

    let oid = git
        .resolve_revision(transported.marker)
        .map_err(|e| match e {
            GitError::RevisionNotFound { spec } => SyncError::Resolution {
                marker: spec,
                detail: "marker missing after transport".to_string(),
            },
            other => SyncError::Resolution {
                marker: transported.marker.to_string(),
                detail: other.to_string(),
            },
        })?;

    let policy = select_policy(
        &located.component,
        &located.skip_verification,
        &located.commit_signature_sufficient,
    );
    output::debug(
        format!("trust policy for '{}': {}", located.component, policy),
        verbosity,
    );

    let requirement = match policy.requirement() {
        None => {
            output::trust_banner(&located.component);
            return Ok(VerifiedRevision { oid });
        }
        Some(req) => req,
    };

    match verifier.verify(&located.dir, &oid, requirement)? {
        verdict if verdict.is_accepted() => {
            if let Ok(summary) = git.commit_summary(&oid) {
                output::print(
                    format!(
                        "Verified {} \"{}\" ({}, {})",
                        oid.short(12),
                        summary.summary,
                        summary.author,
                        summary.time.format("%Y-%m-%d")
                    ),
                    verbosity,
                );
            }
            Ok(VerifiedRevision { oid })
        }
        _ => Err(SyncError::VerificationRejected {
            component: located.component.to_string(),
            revision: oid.to_string(),
        }),
    }
}
