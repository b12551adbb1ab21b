//! sourcegate - verified synchronization of component source repositories
//!
//! sourcegate keeps a local working copy of a component's source in sync
//! with its remote origin, admitting freshly fetched history into the
//! tracked branch only after an external signature verifier has accepted
//! the candidate revision. It is invoked once per component by an outer
//! build orchestrator.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - The linear synchronization protocol:
//!   locate -> transport -> verify -> reconcile (or rollback)
//! - [`core`] - Domain types and explicit layered configuration
//! - [`git`] - Single interface for in-repository git operations
//! - [`verifier`] - The injected revision-verification capability
//! - [`ui`] - Console output utilities
//!
//! # Correctness Invariants
//!
//! 1. No ref reachable from the tracked branch ever points at a revision
//!    that failed verification
//! 2. Rejection of a fetch leaves the pre-existing trusted state
//!    byte-identical; rejection of a fresh clone leaves no trace on disk
//! 3. Branch integration is fast-forward-only; divergent history is a
//!    hard failure, never auto-merged
//! 4. Every identifier that reaches a subprocess argument or filesystem
//!    path is validated at construction time

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod ui;
pub mod verifier;
