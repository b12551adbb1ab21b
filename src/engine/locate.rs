//! engine::locate
//!
//! Location resolution and the single input-validation gate.
//!
//! # Precedence
//!
//! URL resolution, strongest first:
//! 1. Named-remote override (fetches from an existing remote of the copy)
//! 2. Explicit URL
//! 3. Per-component URL from configuration
//! 4. Templated default: `<base_url>/<prefix><component><suffix>`
//!
//! Branch resolution: per-component branch from configuration, else the
//! globally supplied branch.
//!
//! # Validation
//!
//! Everything that later reaches a subprocess argument or a filesystem
//! path is validated here, before any network or disk operation: the
//! component name, the branch name, the working copy path (the `.` self
//! marker or a namespaced identifier), every allow-list entry, and the
//! remote name/URL shape. The allow-lists are also checked for
//! overlapping membership of the current component, which is a
//! configuration error rather than a silent policy choice.

use std::path::PathBuf;

use crate::core::config::Config;
use crate::core::types::{BranchName, ComponentName};

use super::{Request, SyncError};

/// Where transport pulls from: a remote of the existing working copy, or
/// a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteLocation {
    /// A named remote of the existing repository.
    Named(String),
    /// A remote URL.
    Url(String),
}

impl RemoteLocation {
    /// The value handed to `git fetch` / `git clone`.
    pub fn fetch_arg(&self) -> &str {
        match self {
            RemoteLocation::Named(name) => name,
            RemoteLocation::Url(url) => url,
        }
    }
}

impl std::fmt::Display for RemoteLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteLocation::Named(name) => write!(f, "remote '{name}'"),
            RemoteLocation::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Fully resolved and validated inputs for one run.
#[derive(Debug, Clone)]
pub struct Located {
    /// The component being synchronized.
    pub component: ComponentName,
    /// The effective branch.
    pub branch: BranchName,
    /// The effective remote location.
    pub remote: RemoteLocation,
    /// Remote name used for the local tracking reference.
    pub tracking_remote: String,
    /// Absolute path of the working copy.
    pub dir: PathBuf,
    /// Whether the working copy is the `.` self marker (always fetch
    /// mode, never removed).
    pub self_dir: bool,
    /// Components whose verification is skipped.
    pub skip_verification: Vec<ComponentName>,
    /// Components for which a signed commit is sufficient.
    pub commit_signature_sufficient: Vec<ComponentName>,
    /// Force a fresh clone.
    pub clean: bool,
    /// Shallow preference.
    pub shallow: bool,
    /// Stop after transport and verification.
    pub fetch_only: bool,
    /// Treat a missing remote branch as success.
    pub ignore_missing: bool,
}

/// Resolve and validate all inputs.
///
/// # Errors
///
/// [`SyncError::InvalidInput`] for any malformed identifier, path, list
/// entry, or an impossible combination (component present in both
/// allow-lists).
pub fn locate(req: &Request, config: &Config) -> Result<Located, SyncError> {
    let component = ComponentName::new(req.component.clone())?;

    let branch_raw = config
        .component_branch(&component)
        .map(String::from)
        .or_else(|| req.branch.clone())
        .ok_or_else(|| SyncError::InvalidInput("no branch supplied".to_string()))?;
    let branch = BranchName::new(branch_raw)?;

    let cwd = match &req.cwd {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(|e| {
            SyncError::InvalidInput(format!("cannot determine working directory: {e}"))
        })?,
    };

    let (dir, self_dir) = match req.path.as_deref() {
        Some(".") => (cwd.clone(), true),
        Some(raw) => {
            // Same grammar as component names: at most two safe segments,
            // so the path cannot escape the base directory.
            let validated = ComponentName::new(raw.to_string()).map_err(|_| {
                SyncError::InvalidInput(format!(
                    "invalid repository path '{raw}': expected '.' or a namespaced identifier"
                ))
            })?;
            (cwd.join(validated.as_str()), false)
        }
        None => (cwd.join(component.as_str()), false),
    };

    let skip_verification = parse_component_list(&config.skip_entries(), "skip-verification")?;
    let commit_signature_sufficient = parse_component_list(
        &config.commit_sig_entries(),
        "commit-signature-sufficient",
    )?;

    if skip_verification.contains(&component) && commit_signature_sufficient.contains(&component) {
        return Err(SyncError::InvalidInput(format!(
            "component '{component}' is listed in both the skip-verification and \
             commit-signature-sufficient lists; refusing to choose a policy"
        )));
    }

    let remote = resolve_remote(&component, config)?;

    Ok(Located {
        component,
        branch,
        remote,
        tracking_remote: config.tracking_remote().to_string(),
        dir,
        self_dir,
        skip_verification,
        commit_signature_sufficient,
        clean: req.clean,
        shallow: req.shallow,
        fetch_only: req.fetch_only,
        ignore_missing: req.ignore_missing,
    })
}

/// Apply the URL precedence order.
fn resolve_remote(
    component: &ComponentName,
    config: &Config,
) -> Result<RemoteLocation, SyncError> {
    if let Some(name) = config.remote_override() {
        validate_remote_name(name)?;
        return Ok(RemoteLocation::Named(name.to_string()));
    }

    let url = if let Some(url) = config.explicit_url() {
        url.to_string()
    } else if let Some(url) = config.component_url(component) {
        url.to_string()
    } else {
        format!(
            "{}/{}{}{}",
            config.base_url(),
            config.url_prefix(),
            component,
            config.url_suffix()
        )
    };

    validate_url(&url)?;
    Ok(RemoteLocation::Url(url))
}

/// Validate allow-list entries into component names.
fn parse_component_list(
    entries: &[String],
    list_name: &str,
) -> Result<Vec<ComponentName>, SyncError> {
    entries
        .iter()
        .map(|entry| {
            ComponentName::new(entry.clone()).map_err(|e| {
                SyncError::InvalidInput(format!("invalid {list_name} list entry: {e}"))
            })
        })
        .collect()
}

/// A remote name must be a plain identifier; anything option-shaped or
/// containing whitespace is rejected before it reaches a subprocess.
fn validate_remote_name(name: &str) -> Result<(), SyncError> {
    let valid = !name.is_empty()
        && !name.starts_with('-')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(SyncError::InvalidInput(format!(
            "invalid remote name '{name}'"
        )))
    }
}

/// URLs are operator-supplied and deliberately loosely checked, but an
/// option-shaped or whitespace-bearing value is never a URL.
fn validate_url(url: &str) -> Result<(), SyncError> {
    let valid = !url.is_empty()
        && !url.starts_with('-')
        && !url.chars().any(|c| c.is_whitespace() || c.is_control());
    if valid {
        Ok(())
    } else {
        Err(SyncError::InvalidInput(format!("invalid remote URL '{url}'")))
    }
}
