//! engine::transport
//!
//! Clone-vs-fetch selection and the transport operation itself.
//!
//! # Mode selection
//!
//! Fetch mode when the working copy is the self marker, or exists on disk
//! and `clean` is not set; clone mode otherwise. Clone mode removes any
//! stale path first, so a half-removed or corrupted copy resets
//! idempotently.
//!
//! # Candidate marker
//!
//! The stage's product is a marker, not a resolved revision: `FETCH_HEAD`
//! after a fetch, `HEAD` after a `--no-checkout` clone. Resolution to a
//! concrete OID happens in the verify stage so a missing marker fails
//! there, loudly.
//!
//! # Failure classification
//!
//! git reports "branch does not exist" only through stderr text, so the
//! stderr of a failed transport is matched against the known phrasings.
//! With `ignore_missing` set, any transport failure is downgraded to the
//! soft skip outcome.

use std::fs;
use std::process::Command;

use crate::git::Git;
use crate::ui::output::{self, Verbosity};

use super::{Located, RemoteLocation, SyncError};

/// How the working copy was brought up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// A fresh clone was created by this run.
    Cloned,
    /// An existing copy was fetched into.
    Fetched,
}

/// Result of a completed transport: the mode plus the candidate marker.
#[derive(Debug, Clone)]
pub struct Transported {
    /// Clone or fetch.
    pub mode: TransportMode,
    /// The revision marker naming the candidate (`HEAD` or `FETCH_HEAD`).
    pub marker: &'static str,
}

/// Transport either completes with a candidate or soft-skips.
#[derive(Debug)]
pub enum TransportOutcome {
    /// Transport succeeded; a candidate revision awaits verification.
    Completed(Transported),
    /// The remote branch is absent and the caller opted into ignoring
    /// that; the run ends successfully with no mutation.
    Skipped,
}

/// Perform the transport step.
///
/// This is the only stage allowed to mutate the repository object store;
/// later stages only move refs.
pub fn transport(
    located: &Located,
    verbosity: Verbosity,
) -> Result<TransportOutcome, SyncError> {
    let fetch_mode = located.self_dir || (located.dir.exists() && !located.clean);

    if fetch_mode {
        fetch(located, verbosity)
    } else {
        clone(located, verbosity)
    }
}

/// Fetch the target branch and all tags into the existing copy.
fn fetch(located: &Located, verbosity: Verbosity) -> Result<TransportOutcome, SyncError> {
    output::print(
        format!(
            "Fetching '{}' of '{}' from {}",
            located.branch, located.component, located.remote
        ),
        verbosity,
    );

    // Deepen a shallow copy when full history is wanted. If the path is
    // not openable as a repository the fetch below fails with the real
    // diagnostic, so the probe failure is ignored here.
    let deepen = !located.shallow
        && Git::open(&located.dir)
            .map(|git| git.is_shallow())
            .unwrap_or(false);

    let mut args: Vec<&str> = vec!["fetch", "-q", "--tags"];
    if deepen {
        output::debug("shallow copy: deepening to full history", verbosity);
        args.push("--unshallow");
    }
    args.push(located.remote.fetch_arg());
    args.push(located.branch.as_str());

    let output = Command::new("git")
        .current_dir(&located.dir)
        .args(&args)
        .output()
        .map_err(|e| SyncError::Transport {
            remote: located.remote.fetch_arg().to_string(),
            detail: format!("failed to run git: {e}"),
        })?;

    if output.status.success() {
        Ok(TransportOutcome::Completed(Transported {
            mode: TransportMode::Fetched,
            marker: "FETCH_HEAD",
        }))
    } else {
        handle_failure(located, &output.stderr, verbosity)
    }
}

/// Clone fresh, without checkout, restricted to the target branch.
fn clone(located: &Located, verbosity: Verbosity) -> Result<TransportOutcome, SyncError> {
    let url = match &located.remote {
        RemoteLocation::Url(url) => url,
        RemoteLocation::Named(name) => {
            return Err(SyncError::InvalidInput(format!(
                "remote override '{name}' requires an existing working copy at '{}'",
                located.dir.display()
            )));
        }
    };

    // Idempotent reset of whatever is in the way (an earlier aborted
    // clone, or a pre-existing copy under --clean).
    if located.dir.exists() {
        output::debug(
            format!("removing stale path {}", located.dir.display()),
            verbosity,
        );
        fs::remove_dir_all(&located.dir).map_err(|e| SyncError::Transport {
            remote: url.clone(),
            detail: format!("failed to remove stale path '{}': {e}", located.dir.display()),
        })?;
    }

    output::print(
        format!("Cloning '{}' of '{}' from {}", located.branch, located.component, url),
        verbosity,
    );

    let mut args: Vec<&str> = vec!["clone", "-n", "-q"];
    if located.shallow {
        args.extend(["--depth", "1"]);
    }
    args.extend(["-b", located.branch.as_str(), url.as_str()]);

    let dir = located.dir.to_string_lossy().into_owned();
    let output = Command::new("git")
        .args(&args)
        .arg(&dir)
        .output()
        .map_err(|e| SyncError::Transport {
            remote: url.clone(),
            detail: format!("failed to run git: {e}"),
        })?;

    if output.status.success() {
        Ok(TransportOutcome::Completed(Transported {
            mode: TransportMode::Cloned,
            marker: "HEAD",
        }))
    } else {
        handle_failure(located, &output.stderr, verbosity)
    }
}

/// Map a failed transport to its outcome: soft skip, `BranchAbsent`, or
/// `Transport`.
fn handle_failure(
    located: &Located,
    stderr: &[u8],
    verbosity: Verbosity,
) -> Result<TransportOutcome, SyncError> {
    let stderr = String::from_utf8_lossy(stderr);
    let detail = stderr.trim();

    if located.ignore_missing {
        output::warn(
            format!(
                "transport for '{}' failed ({}); ignoring as requested",
                located.component,
                first_line(detail)
            ),
            verbosity,
        );
        return Ok(TransportOutcome::Skipped);
    }

    if is_branch_absent(detail) {
        Err(SyncError::BranchAbsent {
            remote: located.remote.fetch_arg().to_string(),
            branch: located.branch.to_string(),
        })
    } else {
        Err(SyncError::Transport {
            remote: located.remote.fetch_arg().to_string(),
            detail: detail.to_string(),
        })
    }
}

/// Whether stderr reports that the requested branch/ref does not exist.
///
/// Covers the fetch phrasing and the clone phrasings git emits;
/// case-insensitive because capitalization varies across git versions.
fn is_branch_absent(stderr: &str) -> bool {
    let stderr = stderr.to_ascii_lowercase();
    stderr.contains("couldn't find remote ref")
        || (stderr.contains("remote branch") && stderr.contains("not found"))
        || stderr.contains("not found in upstream")
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or(s)
}
