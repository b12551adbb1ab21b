//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! All configuration is resolved once, up front, into an explicit
//! [`Config`] value; the engine never performs name-based lookups at run
//! time. Two layers feed it:
//!
//! - **File**: TOML file with URL template parts, the named-remote
//!   override, verification allow-lists and per-component overrides.
//! - **Overrides**: values from CLI flags and their environment fallbacks,
//!   which take precedence over the file.
//!
//! # File Locations
//!
//! Searched in order:
//! 1. `$SOURCEGATE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/sourcegate/config.toml`
//! 3. `~/.sourcegate/config.toml`
//!
//! Missing files are not an error; defaults apply.
//!
//! # Example
//!
//! ```no_run
//! use sourcegate::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! println!("verifier: {}", config.verifier_command());
//! println!("tracking remote: {}", config.tracking_remote());
//! ```

pub mod schema;

pub use schema::{ComponentConfig, FileConfig, TemplateConfig, VerifyConfig};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::types::ComponentName;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Values supplied on the command line or through `SOURCEGATE_*`
/// environment variables. Anything set here wins over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Explicit remote URL.
    pub url: Option<String>,
    /// Named-remote override.
    pub remote: Option<String>,
    /// Template base URL.
    pub base_url: Option<String>,
    /// Template repository prefix.
    pub prefix: Option<String>,
    /// Template repository suffix.
    pub suffix: Option<String>,
    /// Space-separated skip-verification list.
    pub skip_list: Option<String>,
    /// Space-separated commit-signature-sufficient list.
    pub commit_sig_list: Option<String>,
    /// External verifier command.
    pub verifier: Option<String>,
}

/// Merged configuration with precedence applied by accessor methods.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Configuration file contents (defaults if no file was found).
    pub file: FileConfig,
    /// CLI/environment overrides.
    pub overrides: Overrides,
    /// Path the file layer was loaded from, if any.
    loaded_from: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the given file, or the standard locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read,
    /// parsed, or validated. A missing file is not an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => Self::find_config_file(),
        };

        let (file, loaded_from) = match path {
            Some(p) => (Self::read_file(&p)?, Some(p)),
            None => (FileConfig::default(), None),
        };

        file.validate()?;

        Ok(Config {
            file,
            overrides: Overrides::default(),
            loaded_from,
        })
    }

    /// Attach CLI/environment overrides.
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Locate the config file in the standard search order.
    fn find_config_file() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("SOURCEGATE_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("sourcegate/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        if let Some(home) = dirs::home_dir() {
            let path = home.join(".sourcegate/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        None
    }

    fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Named-remote override, if any. Takes precedence over every URL
    /// source when present.
    pub fn remote_override(&self) -> Option<&str> {
        self.overrides
            .remote
            .as_deref()
            .or(self.file.remote.as_deref())
    }

    /// Remote name used for the local tracking reference.
    ///
    /// Defaults to "origin" when no named remote is configured.
    pub fn tracking_remote(&self) -> &str {
        self.remote_override().unwrap_or("origin")
    }

    /// Explicit URL override from the command line.
    pub fn explicit_url(&self) -> Option<&str> {
        self.overrides.url.as_deref()
    }

    /// Per-component URL override from the file.
    pub fn component_url(&self, component: &ComponentName) -> Option<&str> {
        self.file
            .components
            .get(component.as_str())
            .and_then(|c| c.url.as_deref())
    }

    /// Per-component branch override from the file.
    pub fn component_branch(&self, component: &ComponentName) -> Option<&str> {
        self.file
            .components
            .get(component.as_str())
            .and_then(|c| c.branch.as_deref())
    }

    /// Template base URL. Defaults to "https://github.com".
    pub fn base_url(&self) -> &str {
        self.overrides
            .base_url
            .as_deref()
            .or(self.file.template.base_url.as_deref())
            .unwrap_or("https://github.com")
    }

    /// Template repository prefix. Defaults to "".
    pub fn url_prefix(&self) -> &str {
        self.overrides
            .prefix
            .as_deref()
            .or(self.file.template.prefix.as_deref())
            .unwrap_or("")
    }

    /// Template repository suffix. Defaults to ".git".
    pub fn url_suffix(&self) -> &str {
        self.overrides
            .suffix
            .as_deref()
            .or(self.file.template.suffix.as_deref())
            .unwrap_or(".git")
    }

    /// Raw skip-verification list entries, overrides winning over file.
    pub fn skip_entries(&self) -> Vec<String> {
        match &self.overrides.skip_list {
            Some(list) => list.split_whitespace().map(String::from).collect(),
            None => self.file.verify.skip.clone(),
        }
    }

    /// Raw commit-signature-sufficient list entries.
    pub fn commit_sig_entries(&self) -> Vec<String> {
        match &self.overrides.commit_sig_list {
            Some(list) => list.split_whitespace().map(String::from).collect(),
            None => self.file.verify.commit_signature_sufficient.clone(),
        }
    }

    /// External verifier command. Defaults to "sgate-verify-rev".
    pub fn verifier_command(&self) -> &str {
        self.overrides
            .verifier
            .as_deref()
            .or(self.file.verify.command.as_deref())
            .unwrap_or("sgate-verify-rev")
    }

    /// Path the file layer was loaded from, if any.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(contents: &str) -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, contents).unwrap();
        (temp, path)
    }

    #[test]
    fn defaults_without_file() {
        let config = Config::load(Some(Path::new("/nonexistent/sourcegate.toml")));
        // An explicitly named but missing file is a read error
        assert!(config.is_err());
    }

    #[test]
    fn defaults_apply() {
        let config = Config::default();
        assert_eq!(config.tracking_remote(), "origin");
        assert_eq!(config.base_url(), "https://github.com");
        assert_eq!(config.url_prefix(), "");
        assert_eq!(config.url_suffix(), ".git");
        assert_eq!(config.verifier_command(), "sgate-verify-rev");
        assert!(config.remote_override().is_none());
        assert!(config.skip_entries().is_empty());
    }

    #[test]
    fn load_from_explicit_path() {
        let (_temp, path) = write_config(
            r#"
            [template]
            base_url = "https://git.example.org"
            prefix = "team-"

            [verify]
            skip = ["builder-local"]
            "#,
        );

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.base_url(), "https://git.example.org");
        assert_eq!(config.url_prefix(), "team-");
        assert_eq!(config.url_suffix(), ".git");
        assert_eq!(config.skip_entries(), vec!["builder-local"]);
        assert_eq!(config.loaded_from(), Some(path.as_path()));
    }

    #[test]
    fn invalid_file_rejected() {
        let (_temp, path) = write_config("verify = \"not-a-table\"");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn invalid_list_entry_rejected() {
        let (_temp, path) = write_config(
            r#"
            [verify]
            skip = ["../escape"]
            "#,
        );
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn overrides_win_over_file() {
        let (_temp, path) = write_config(
            r#"
            remote = "upstream"

            [verify]
            skip = ["from-file"]
            command = "file-verify"
            "#,
        );

        let config = Config::load(Some(&path)).unwrap().with_overrides(Overrides {
            remote: Some("mirror".to_string()),
            skip_list: Some("a b".to_string()),
            verifier: Some("cli-verify".to_string()),
            ..Default::default()
        });

        assert_eq!(config.remote_override(), Some("mirror"));
        assert_eq!(config.tracking_remote(), "mirror");
        assert_eq!(config.skip_entries(), vec!["a", "b"]);
        assert_eq!(config.verifier_command(), "cli-verify");
    }

    #[test]
    fn component_overrides() {
        let (_temp, path) = write_config(
            r#"
            [components.core-agent]
            url = "https://example.org/agent.git"
            branch = "release4.2"
            "#,
        );

        let config = Config::load(Some(&path)).unwrap();
        let component = ComponentName::new("core-agent").unwrap();
        let other = ComponentName::new("other").unwrap();

        assert_eq!(
            config.component_url(&component),
            Some("https://example.org/agent.git")
        );
        assert_eq!(config.component_branch(&component), Some("release4.2"));
        assert!(config.component_url(&other).is_none());
        assert!(config.component_branch(&other).is_none());
    }
}
