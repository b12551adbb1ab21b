//! git
//!
//! Single interface for in-repository git operations.
//!
//! # Architecture
//!
//! This module is the only doorway to git2. All reads of refs, revisions
//! and ancestry, and all ref mutations, flow through [`Git`]; no other
//! module imports `git2` directly. Network transport (clone and fetch) is
//! the one exception to libgit2 usage: it shells out to the `git` binary
//! from [`crate::engine::transport`], because the system git honors the
//! operator's full transport configuration (credentials, proxies,
//! protocol allow-lists) which libgit2 does not.
//!
//! # Responsibilities
//!
//! - Repository opening and shallow detection
//! - Revision and ref resolution (including the FETCH_HEAD/HEAD
//!   candidate markers)
//! - Current-branch query and branch existence probes
//! - Ancestry queries for fast-forward decisions
//! - Tracking-reference updates
//! - Ref-state fingerprinting

mod interface;

pub use interface::{CommitSummary, Git, GitError};
