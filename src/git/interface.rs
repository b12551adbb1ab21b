//! git::interface
//!
//! Git interface implementation using git2.
//!
//! Errors are normalized into the typed categories of [`GitError`] so
//! higher layers can distinguish "the revision is missing" (a protocol
//! failure) from incidental repository problems.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::types::{BranchName, Fingerprint, Oid, TypeError};

/// Errors from git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// The path does not contain a git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was opened
        path: PathBuf,
    },

    /// A revision spec (ref, marker, or oid) did not resolve.
    #[error("revision not found: {spec}")]
    RevisionNotFound {
        /// The spec that failed to resolve
        spec: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => GitError::RevisionNotFound {
                spec: context.to_string(),
            },
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: context.to_string(),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        GitError::Internal {
            message: err.to_string(),
        }
    }
}

/// Summary of a commit, for operator-facing output.
#[derive(Debug, Clone)]
pub struct CommitSummary {
    /// The commit OID
    pub oid: Oid,
    /// First line of the commit message
    pub summary: String,
    /// Author name
    pub author: String,
    /// Author timestamp
    pub time: chrono::DateTime<chrono::Utc>,
}

/// The git interface.
///
/// One instance wraps one opened repository. Ref lookups re-read from
/// disk, so a handle stays valid across subprocess git invocations that
/// mutate refs.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    /// Open the repository at exactly the given path.
    ///
    /// No upward discovery: the working copy under management is a known
    /// directory, and silently resolving to an enclosing repository would
    /// point every subsequent ref operation at the wrong object store.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if the path is not a repository
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::open(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        Ok(Self { repo })
    }

    /// Path to the `.git` directory.
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// Whether the repository has shallow (grafted) history.
    pub fn is_shallow(&self) -> bool {
        self.repo.is_shallow()
    }

    // =========================================================================
    // Revision and Ref Resolution
    // =========================================================================

    /// Resolve a revision spec (e.g. `FETCH_HEAD`, `HEAD`,
    /// `refs/heads/main`) to the commit it names, peeling through tags.
    ///
    /// # Errors
    ///
    /// - [`GitError::RevisionNotFound`] if the spec does not resolve
    pub fn resolve_revision(&self, spec: &str) -> Result<Oid, GitError> {
        let object = self
            .repo
            .revparse_single(spec)
            .map_err(|e| GitError::from_git2(e, spec))?;

        let commit = object
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, spec))?;

        Oid::new(commit.id().to_string()).map_err(|e| e.into())
    }

    /// Check if a ref exists.
    pub fn ref_exists(&self, refname: &str) -> bool {
        self.repo.find_reference(refname).is_ok()
    }

    /// Get the current branch name, if on a branch.
    ///
    /// Returns `None` if HEAD is detached or unborn.
    pub fn current_branch(&self) -> Result<Option<BranchName>, GitError> {
        let head = match self.repo.head() {
            Ok(h) => h,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(GitError::from_git2(e, "HEAD")),
        };

        if head.is_branch() {
            if let Some(name) = head.shorthand() {
                // Branch names outside our grammar (e.g. slashed names from
                // a manually prepared checkout) read as "not the target".
                return Ok(BranchName::new(name).ok());
            }
        }

        Ok(None) // Detached HEAD
    }

    /// Check whether a branch name exists anywhere in the copy: as a
    /// local branch or as a remote-tracking ref under any remote.
    pub fn branch_exists_anywhere(&self, branch: &BranchName) -> Result<bool, GitError> {
        if self.ref_exists(&format!("refs/heads/{}", branch)) {
            return Ok(true);
        }

        let pattern = format!("refs/remotes/*/{}", branch);
        let refs = self
            .repo
            .references_glob(&pattern)
            .map_err(|e| GitError::Internal {
                message: e.message().to_string(),
            })?;

        Ok(refs.count() > 0)
    }

    // =========================================================================
    // Ancestry
    // =========================================================================

    /// Check if `ancestor` is an ancestor of `descendant`.
    ///
    /// Returns true if ancestor == descendant (a commit is its own
    /// ancestor).
    pub fn is_ancestor(&self, ancestor: &Oid, descendant: &Oid) -> Result<bool, GitError> {
        if ancestor == descendant {
            return Ok(true);
        }

        let ancestor_oid = git2::Oid::from_str(ancestor.as_str())
            .map_err(|e| GitError::from_git2(e, ancestor.as_str()))?;
        let descendant_oid = git2::Oid::from_str(descendant.as_str())
            .map_err(|e| GitError::from_git2(e, descendant.as_str()))?;

        self.repo
            .graph_descendant_of(descendant_oid, ancestor_oid)
            .map_err(|e| GitError::Internal {
                message: e.message().to_string(),
            })
    }

    // =========================================================================
    // Ref Mutation
    // =========================================================================

    /// Force-update a ref to point at the given commit.
    ///
    /// Used for the remote-tracking reference after a verified
    /// reconciliation; branch tips themselves are moved by the checkout
    /// and merge subprocesses.
    pub fn update_ref(&self, refname: &str, oid: &Oid, message: &str) -> Result<(), GitError> {
        let git_oid =
            git2::Oid::from_str(oid.as_str()).map_err(|e| GitError::from_git2(e, oid.as_str()))?;

        self.repo
            .reference(refname, git_oid, true, message)
            .map_err(|e| GitError::from_git2(e, refname))?;

        Ok(())
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Summary of a commit for display.
    ///
    /// # Errors
    ///
    /// - [`GitError::RevisionNotFound`] if the commit doesn't exist
    pub fn commit_summary(&self, oid: &Oid) -> Result<CommitSummary, GitError> {
        let git_oid =
            git2::Oid::from_str(oid.as_str()).map_err(|e| GitError::from_git2(e, oid.as_str()))?;

        let commit = self
            .repo
            .find_commit(git_oid)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;

        let author = commit.author();
        let time = chrono::DateTime::from_timestamp(author.when().seconds(), 0)
            .unwrap_or(chrono::DateTime::UNIX_EPOCH)
            .with_timezone(&chrono::Utc);

        Ok(CommitSummary {
            oid: oid.clone(),
            summary: commit.summary().unwrap_or("").to_string(),
            author: author.name().unwrap_or("").to_string(),
            time,
        })
    }

    /// Fingerprint of all local branch tips and remote-tracking refs.
    ///
    /// The witness value for the rollback invariant: a rejected
    /// verification must leave this unchanged for a pre-existing copy.
    pub fn fingerprint_refs(&self) -> Result<Fingerprint, GitError> {
        let mut entries = Vec::new();

        for pattern in ["refs/heads/*", "refs/remotes/*"] {
            let refs = self
                .repo
                .references_glob(pattern)
                .map_err(|e| GitError::Internal {
                    message: e.message().to_string(),
                })?;

            for reference in refs {
                let reference = reference.map_err(|e| GitError::Internal {
                    message: e.message().to_string(),
                })?;

                let name = match reference.name() {
                    Some(n) => n.to_string(),
                    None => continue, // Skip refs with non-UTF8 names
                };

                let target = match reference.peel_to_commit() {
                    Ok(commit) => commit.id(),
                    Err(_) => match reference.target() {
                        Some(oid) => oid,
                        None => continue,
                    },
                };

                let oid = match Oid::new(target.to_string()) {
                    Ok(o) => o,
                    Err(_) => continue,
                };

                entries.push((name, oid));
            }
        }

        Ok(Fingerprint::compute(&entries))
    }
}
