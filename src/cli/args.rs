//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Environment Fallbacks
//!
//! Every option has a `SOURCEGATE_*` environment fallback so an outer
//! build orchestrator can drive the tool without assembling argument
//! lists. Flags on the command line always win.

use clap::Parser;
use std::path::PathBuf;

pub use clap_complete::Shell;

/// sourcegate - verified synchronization of component source repositories
#[derive(Parser, Debug)]
#[command(name = "sgate")]
#[command(author, version, about, long_about = "\
Synchronize one component's working copy with its remote origin, admitting \
fetched history into the tracked branch only after an external signature \
verifier has accepted the candidate revision.\n\n\
On rejection the run rolls back: a fresh clone is removed entirely, while a \
pre-existing repository only loses the fetch marker, leaving the previously \
trusted branch state untouched.",
    after_help = "\
WORKFLOW EXAMPLES:
    # Clone-or-fetch a component, verify, fast-forward the branch
    sgate core-agent --branch release4.2

    # Explicit URL, shallow history
    sgate core-agent --branch main --url https://example.org/core-agent.git --shallow

    # Verification gate only; leave the branch alone
    sgate core-agent --branch main --fetch-only

    # Orchestrator style: configuration via environment
    SOURCEGATE_BRANCH=main SOURCEGATE_SHALLOW=true sgate core-agent

EXIT STATUS:
    0 on success, including a legitimately absent remote branch under
    --ignore-missing; non-zero on any failure."
)]
pub struct Cli {
    /// Component to synchronize (e.g. "core-agent" or "vendor/component");
    /// may be omitted when derivable from --path
    #[arg(
        value_name = "COMPONENT",
        required_unless_present_any = ["completions", "path"]
    )]
    pub component: Option<String>,

    /// Branch to synchronize (per-component config overrides win)
    #[arg(long, env = "SOURCEGATE_BRANCH")]
    pub branch: Option<String>,

    /// Explicit remote URL override
    #[arg(long, env = "SOURCEGATE_URL")]
    pub url: Option<String>,

    /// Named-remote override; fetch from this remote of the existing copy
    #[arg(long, env = "SOURCEGATE_REMOTE", conflicts_with = "url")]
    pub remote: Option<String>,

    /// Base URL for the templated default location
    #[arg(long, env = "SOURCEGATE_BASEURL", value_name = "URL")]
    pub base_url: Option<String>,

    /// Repository-name prefix for the templated default location
    #[arg(long, env = "SOURCEGATE_PREFIX")]
    pub prefix: Option<String>,

    /// Repository-name suffix for the templated default location
    #[arg(long, env = "SOURCEGATE_SUFFIX")]
    pub suffix: Option<String>,

    /// Working copy path; "." targets the current directory
    #[arg(long, env = "SOURCEGATE_PATH")]
    pub path: Option<String>,

    /// Discard any existing working copy and clone fresh
    #[arg(long, env = "SOURCEGATE_CLEAN")]
    pub clean: bool,

    /// Prefer shallow history
    #[arg(long, env = "SOURCEGATE_SHALLOW")]
    pub shallow: bool,

    /// Stop after transport and verification; do not touch the branch
    #[arg(long, env = "SOURCEGATE_FETCH_ONLY")]
    pub fetch_only: bool,

    /// Treat a missing remote branch as success with no action
    #[arg(long, env = "SOURCEGATE_IGNORE_MISSING")]
    pub ignore_missing: bool,

    /// Space-separated components to sync WITHOUT verification (loud)
    #[arg(
        long = "skip-verify-list",
        env = "SOURCEGATE_SKIP_VERIFY",
        value_name = "LIST"
    )]
    pub skip_verify_list: Option<String>,

    /// Space-separated components for which a signed commit is sufficient
    #[arg(
        long = "commit-sig-list",
        env = "SOURCEGATE_COMMIT_SIG_SUFFICIENT",
        value_name = "LIST"
    )]
    pub commit_sig_list: Option<String>,

    /// External verifier command
    #[arg(long, env = "SOURCEGATE_VERIFIER", value_name = "CMD")]
    pub verifier: Option<String>,

    /// Configuration file (default: standard search locations)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run as if sgate was started in this directory
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Enable debug tracing
    #[arg(long, env = "SOURCEGATE_DEBUG")]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate shell completions and exit
    #[arg(long, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}
