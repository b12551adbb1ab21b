//! verifier
//!
//! The revision-verification capability.
//!
//! # Design
//!
//! The engine never runs cryptographic checks itself; it delegates to a
//! [`RevisionVerifier`], injected at the CLI boundary. The production
//! implementation ([`ExternalVerifier`]) spawns the configured external
//! command; [`mock::MockVerifier`] provides a deterministic in-process
//! implementation for tests.
//!
//! # Contract
//!
//! The external command is invoked as:
//!
//! ```text
//! <command> <workdir> <commit-oid> <signed-tag|signed-tag-or-commit>
//! ```
//!
//! Exit status 0 accepts the revision. Any other exit is an authoritative
//! rejection: no structured detail is consumed, no retry is attempted,
//! and there is no partial trust. Stderr is inherited so operators see
//! the verifier's own diagnostics.

pub mod mock;

use std::path::Path;
use std::process::Command;

use thiserror::Error;

use crate::core::types::{Oid, SignatureRequirement};

/// Errors from running a verifier.
///
/// Note that a *rejection* is not an error here; it is the
/// [`Verdict::Rejected`] value. Errors mean the verifier could not be
/// consulted at all.
#[derive(Debug, Error)]
pub enum VerifierError {
    /// The verifier command could not be spawned.
    #[error("failed to run verifier '{command}': {source}")]
    Spawn {
        /// The command that failed to start
        command: String,
        /// The underlying IO error
        source: std::io::Error,
    },
}

/// Outcome of a verification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The revision carries the required endorsement.
    Accepted,
    /// The revision must not become reachable from the tracked branch.
    Rejected,
}

impl Verdict {
    /// Whether the revision was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// The injected verification capability.
///
/// Implementations decide whether `revision`, as found in the working
/// copy at `workdir`, satisfies `requirement`.
pub trait RevisionVerifier {
    /// Verify one revision under one signature requirement.
    ///
    /// # Errors
    ///
    /// Returns [`VerifierError`] only when the verdict could not be
    /// obtained; a negative verdict is `Ok(Verdict::Rejected)`.
    fn verify(
        &self,
        workdir: &Path,
        revision: &Oid,
        requirement: SignatureRequirement,
    ) -> Result<Verdict, VerifierError>;
}

/// Verifier that shells out to an external command.
#[derive(Debug, Clone)]
pub struct ExternalVerifier {
    /// The command to spawn.
    command: String,
}

impl ExternalVerifier {
    /// Create a verifier for the given command.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// The configured command.
    pub fn command(&self) -> &str {
        &self.command
    }
}

impl RevisionVerifier for ExternalVerifier {
    fn verify(
        &self,
        workdir: &Path,
        revision: &Oid,
        requirement: SignatureRequirement,
    ) -> Result<Verdict, VerifierError> {
        let status = Command::new(&self.command)
            .arg(workdir)
            .arg(revision.as_str())
            .arg(requirement.keyword())
            .status()
            .map_err(|e| VerifierError::Spawn {
                command: self.command.clone(),
                source: e,
            })?;

        if status.success() {
            Ok(Verdict::Accepted)
        } else {
            Ok(Verdict::Rejected)
        }
    }
}
