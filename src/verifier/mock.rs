//! verifier::mock
//!
//! Mock verifier implementation for deterministic testing.
//!
//! # Design
//!
//! The mock records every verification request and returns a scripted
//! verdict, so protocol tests can assert both the decision flow and the
//! exact arguments the engine hands to the capability.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use sourcegate::core::types::{Oid, SignatureRequirement};
//! use sourcegate::verifier::mock::MockVerifier;
//! use sourcegate::verifier::{RevisionVerifier, Verdict};
//!
//! let verifier = MockVerifier::accepting();
//! let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//!
//! let verdict = verifier
//!     .verify(Path::new("/tmp/repo"), &oid, SignatureRequirement::SignedTag)
//!     .unwrap();
//!
//! assert_eq!(verdict, Verdict::Accepted);
//! assert_eq!(verifier.calls().len(), 1);
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::core::types::{Oid, SignatureRequirement};

use super::{RevisionVerifier, Verdict, VerifierError};

/// A recorded verification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// The working copy the engine asked about.
    pub workdir: PathBuf,
    /// The candidate revision.
    pub revision: Oid,
    /// The requirement under the selected policy.
    pub requirement: SignatureRequirement,
}

/// Mock verifier for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share
/// state.
#[derive(Debug, Clone)]
pub struct MockVerifier {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug)]
struct Inner {
    verdict: Verdict,
    calls: Vec<RecordedCall>,
}

impl MockVerifier {
    /// A verifier that accepts every revision.
    pub fn accepting() -> Self {
        Self::with_verdict(Verdict::Accepted)
    }

    /// A verifier that rejects every revision.
    pub fn rejecting() -> Self {
        Self::with_verdict(Verdict::Rejected)
    }

    /// A verifier with the given fixed verdict.
    pub fn with_verdict(verdict: Verdict) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                verdict,
                calls: Vec::new(),
            })),
        }
    }

    /// All requests made so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.lock().unwrap().calls.clone()
    }
}

impl RevisionVerifier for MockVerifier {
    fn verify(
        &self,
        workdir: &Path,
        revision: &Oid,
        requirement: SignatureRequirement,
    ) -> Result<Verdict, VerifierError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(RecordedCall {
            workdir: workdir.to_path_buf(),
            revision: revision.clone(),
            requirement,
        });
        Ok(inner.verdict)
    }
}
