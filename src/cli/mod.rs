//! cli
//!
//! Command-line interface layer.
//!
//! # Responsibilities
//!
//! - Parse arguments and environment fallbacks
//! - Assemble the [`Config`](crate::core::config::Config) and the engine
//!   [`Request`](crate::engine::Request)
//! - Construct the external verifier capability
//! - Map the engine outcome to the process exit status
//!
//! The CLI layer is thin; all repository decisions live in
//! [`crate::engine`].

pub mod args;

pub use args::{Cli, Shell};

use anyhow::Result;
use clap::CommandFactory;

use crate::core::config::{Config, Overrides};
use crate::engine::{self, Outcome, Request};
use crate::ui::output::{self, Verbosity};
use crate::verifier::ExternalVerifier;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "sgate", &mut std::io::stdout());
        return Ok(());
    }

    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);

    let config = Config::load(cli.config.as_deref())?.with_overrides(Overrides {
        url: cli.url,
        remote: cli.remote,
        base_url: cli.base_url,
        prefix: cli.prefix,
        suffix: cli.suffix,
        skip_list: cli.skip_verify_list,
        commit_sig_list: cli.commit_sig_list,
        verifier: cli.verifier,
    });

    if let Some(path) = config.loaded_from() {
        output::debug(format!("configuration from {}", path.display()), verbosity);
    }

    let component = match cli.component {
        Some(component) => component,
        None => component_from_path(cli.path.as_deref()).ok_or_else(|| {
            anyhow::anyhow!("a component name is required when --path does not imply one")
        })?,
    };

    let request = Request {
        component,
        branch: cli.branch,
        path: cli.path,
        cwd: cli.cwd,
        clean: cli.clean,
        shallow: cli.shallow,
        fetch_only: cli.fetch_only,
        ignore_missing: cli.ignore_missing,
    };

    let verifier = ExternalVerifier::new(config.verifier_command());
    output::debug(
        format!("verifier command: {}", verifier.command()),
        verbosity,
    );

    match engine::run(&request, &config, &verifier, verbosity)? {
        Outcome::Done | Outcome::Skipped => Ok(()),
    }
}

/// Derive the component name from the working copy path, when possible.
///
/// The self marker carries no name; otherwise the last path segment is
/// the component.
fn component_from_path(path: Option<&str>) -> Option<String> {
    let path = path?;
    if path == "." {
        return None;
    }
    Some(path.rsplit('/').next().unwrap_or(path).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod component_derivation {
        use super::*;

        #[test]
        fn from_plain_path() {
            assert_eq!(
                component_from_path(Some("core-agent")),
                Some("core-agent".to_string())
            );
        }

        #[test]
        fn from_namespaced_path() {
            assert_eq!(
                component_from_path(Some("vendor/core-agent")),
                Some("core-agent".to_string())
            );
        }

        #[test]
        fn self_marker_has_no_name() {
            assert_eq!(component_from_path(Some(".")), None);
        }

        #[test]
        fn absent_path_has_no_name() {
            assert_eq!(component_from_path(None), None);
        }
    }
}
