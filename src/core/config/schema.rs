//! core::config::schema
//!
//! Serde schema for the configuration file.
//!
//! # Design
//!
//! All fields are optional; defaults and precedence are applied by the
//! [`Config`](super::Config) accessors, not here. Unknown fields are
//! rejected so typos fail loudly instead of silently weakening the
//! verification setup.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::types::{BranchName, ComponentName};

use super::ConfigError;

/// Root of the configuration file.
///
/// # Example
///
/// ```toml
/// remote = "upstream"
///
/// [template]
/// base_url = "https://github.com"
/// prefix = "QubesOS/qubes-"
/// suffix = ".git"
///
/// [verify]
/// skip = ["builder-local"]
/// commit_signature_sufficient = ["linux-template"]
/// command = "sgate-verify-rev"
///
/// [components.core-agent]
/// branch = "release4.2"
///
/// [components.linux-kernel]
/// url = "https://example.org/kernel.git"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Named-remote override; when set, transport fetches from this remote
    /// of the existing working copy instead of a URL.
    pub remote: Option<String>,

    /// URL template parts.
    #[serde(default)]
    pub template: TemplateConfig,

    /// Verification policy configuration.
    #[serde(default)]
    pub verify: VerifyConfig,

    /// Per-component overrides, keyed by component name.
    #[serde(default)]
    pub components: BTreeMap<String, ComponentConfig>,
}

/// Parts of the templated default URL:
/// `<base_url>/<prefix><component><suffix>`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateConfig {
    pub base_url: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

/// Trust-policy allow-lists and the verifier command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyConfig {
    /// Components whose verification is skipped entirely.
    #[serde(default)]
    pub skip: Vec<String>,

    /// Components for which a signed commit is sufficient (the default
    /// policy requires a signed tag specifically).
    #[serde(default)]
    pub commit_signature_sufficient: Vec<String>,

    /// External verifier command.
    pub command: Option<String>,
}

/// Overrides for a single component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentConfig {
    /// Remote URL override for this component.
    pub url: Option<String>,

    /// Branch override for this component.
    pub branch: Option<String>,
}

impl FileConfig {
    /// Validate all identifier-shaped values in the file.
    ///
    /// Component keys and allow-list entries must be valid component
    /// names, branch overrides must be valid branch names. This runs at
    /// load time, before any network or disk mutation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for entry in self
            .verify
            .skip
            .iter()
            .chain(self.verify.commit_signature_sufficient.iter())
        {
            ComponentName::new(entry.clone())
                .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        }

        for (key, component) in &self.components {
            ComponentName::new(key.clone())
                .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
            if let Some(branch) = &component.branch {
                BranchName::new(branch.clone())
                    .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_validates() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn full_config_parses() {
        let toml = r#"
            remote = "upstream"

            [template]
            base_url = "https://github.com"
            prefix = "QubesOS/qubes-"
            suffix = ".git"

            [verify]
            skip = ["builder-local"]
            commit_signature_sufficient = ["linux-template"]
            command = "my-verify"

            [components.core-agent]
            branch = "release4.2"
        "#;
        let config: FileConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.remote.as_deref(), Some("upstream"));
        assert_eq!(config.verify.skip, vec!["builder-local"]);
        assert_eq!(
            config.components["core-agent"].branch.as_deref(),
            Some("release4.2")
        );
    }

    #[test]
    fn unknown_fields_rejected() {
        let result: Result<FileConfig, _> = toml::from_str("unknown_field = true");
        assert!(result.is_err());
    }

    #[test]
    fn bad_skip_entry_rejected() {
        let toml = r#"
            [verify]
            skip = ["../escape"]
        "#;
        let config: FileConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_branch_override_rejected() {
        let toml = r#"
            [components.core-agent]
            branch = "../etc"
        "#;
        let config: FileConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_component_key_rejected() {
        let toml = r#"
            [components."a/b/c"]
            branch = "main"
        "#;
        let config: FileConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_err());
    }
}
