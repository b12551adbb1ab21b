//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`ComponentName`] - Validated managed-component identifier
//! - [`BranchName`] - Validated branch name
//! - [`Oid`] - Git object identifier (SHA)
//! - [`TrustPolicy`] - Verification requirement selected for a run
//! - [`Fingerprint`] - Ref-state hash used to witness rollback behavior
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values cannot
//! be represented, which matters here beyond ordinary hygiene: component
//! and branch strings are interpolated into subprocess arguments and into
//! on-disk paths, and membership in the verification-exemption lists is
//! keyed by component name. The patterns are deliberately stricter than
//! git's own refname rules.
//!
//! # Examples
//!
//! ```
//! use sourcegate::core::types::{BranchName, ComponentName, Oid};
//!
//! let branch = BranchName::new("release4.2").unwrap();
//! let component = ComponentName::new("qubes/core-agent").unwrap();
//! let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//!
//! // Path traversal cannot be expressed
//! assert!(BranchName::new("../etc").is_err());
//! assert!(ComponentName::new("a/../b").is_err());
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name '{0}': must match ^[A-Za-z][A-Za-z0-9._-]+$")]
    InvalidBranchName(String),

    #[error("invalid component name '{0}': {1}")]
    InvalidComponentName(String, String),

    #[error("invalid object id: {0}")]
    InvalidOid(String),
}

/// A validated branch name.
///
/// The accepted grammar is `^[A-Za-z][A-Za-z0-9._-]+$`: a leading ASCII
/// letter followed by at least one letter, digit, `.`, `_` or `-`. No
/// slashes, so a branch name can never smuggle a path component into a
/// subprocess argument.
///
/// # Example
///
/// ```
/// use sourcegate::core::types::BranchName;
///
/// assert!(BranchName::new("main").is_ok());
/// assert!(BranchName::new("release4.2").is_ok());
///
/// assert!(BranchName::new("m").is_err());        // too short
/// assert!(BranchName::new("4release").is_err()); // must start with a letter
/// assert!(BranchName::new("../etc").is_err());
/// assert!(BranchName::new("-rf").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name does not match
    /// the branch grammar.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        let mut chars = name.chars();
        let first = chars
            .next()
            .ok_or_else(|| TypeError::InvalidBranchName(name.to_string()))?;
        if !first.is_ascii_alphabetic() {
            return Err(TypeError::InvalidBranchName(name.to_string()));
        }
        // The grammar requires at least one character after the first.
        let mut rest = 0usize;
        for c in chars {
            if !(c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-') {
                return Err(TypeError::InvalidBranchName(name.to_string()));
            }
            rest += 1;
        }
        if rest == 0 {
            return Err(TypeError::InvalidBranchName(name.to_string()));
        }
        Ok(())
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated component identifier.
///
/// One or two `/`-separated segments, each starting with a letter or digit
/// and continuing with letters, digits, `.`, `_` or `-`. The two-segment
/// form covers namespaced components (`vendor/component`). Because the
/// first character of a segment must be alphanumeric, `.` and `..`
/// segments are unrepresentable and the name is safe to join onto a
/// directory path.
///
/// # Example
///
/// ```
/// use sourcegate::core::types::ComponentName;
///
/// assert!(ComponentName::new("core-agent").is_ok());
/// assert!(ComponentName::new("qubes/linux-kernel").is_ok());
///
/// assert!(ComponentName::new("a/b/c").is_err());
/// assert!(ComponentName::new("../up").is_err());
/// assert!(ComponentName::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ComponentName(String);

impl ComponentName {
    /// Create a new validated component name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidComponentName` if the name does not match
    /// the namespaced-identifier grammar.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidComponentName(
                name.to_string(),
                "name cannot be empty".into(),
            ));
        }

        let segments: Vec<&str> = name.split('/').collect();
        if segments.len() > 2 {
            return Err(TypeError::InvalidComponentName(
                name.to_string(),
                "at most one namespace separator allowed".into(),
            ));
        }

        for segment in segments {
            let mut chars = segment.chars();
            match chars.next() {
                Some(c) if c.is_ascii_alphanumeric() => {}
                _ => {
                    return Err(TypeError::InvalidComponentName(
                        name.to_string(),
                        "segments must start with a letter or digit".into(),
                    ));
                }
            }
            for c in chars {
                if !(c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-') {
                    return Err(TypeError::InvalidComponentName(
                        name.to_string(),
                        format!("segment contains invalid character '{c}'"),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Get the component name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ComponentName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ComponentName> for String {
    fn from(name: ComponentName) -> Self {
        name.0
    }
}

impl AsRef<str> for ComponentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ComponentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A git object identifier (SHA-1 or SHA-256).
///
/// OIDs are normalized to lowercase for consistency.
///
/// # Example
///
/// ```
/// use sourcegate::core::types::Oid;
///
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
/// assert_eq!(oid.short(7), "abc123d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Create a new validated object id.
    ///
    /// The OID is normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a valid hex OID.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        Self::validate(&oid)?;
        Ok(Self(oid))
    }

    /// Get an abbreviated form of the OID.
    ///
    /// Returns the first `len` characters, or the full OID if `len`
    /// exceeds its length.
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    fn validate(oid: &str) -> Result<(), TypeError> {
        // SHA-1 is 40 hex chars, SHA-256 is 64
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(())
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The verification requirement selected for one run.
///
/// Exactly one policy is active per invocation; it is selected once by a
/// pure lookup against the configured allow-lists and never changes
/// afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustPolicy {
    /// Verification intentionally disabled for this component.
    Skip,
    /// A signed tag pointing at the candidate revision is required.
    SignedTag,
    /// Either a signed tag or a signed commit is sufficient.
    SignedTagOrCommit,
}

impl TrustPolicy {
    /// The signature requirement to hand to the external verifier, or
    /// `None` when verification is skipped.
    pub fn requirement(&self) -> Option<SignatureRequirement> {
        match self {
            TrustPolicy::Skip => None,
            TrustPolicy::SignedTag => Some(SignatureRequirement::SignedTag),
            TrustPolicy::SignedTagOrCommit => Some(SignatureRequirement::SignedTagOrCommit),
        }
    }
}

impl std::fmt::Display for TrustPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TrustPolicy::Skip => "no-verification",
            TrustPolicy::SignedTag => "signed-tag-required",
            TrustPolicy::SignedTagOrCommit => "signed-tag-or-commit-required",
        };
        write!(f, "{s}")
    }
}

/// What the external verifier is asked to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureRequirement {
    /// Only a signed tag is acceptable.
    SignedTag,
    /// A signed commit is also acceptable.
    SignedTagOrCommit,
}

impl SignatureRequirement {
    /// The policy keyword passed on the verifier command line.
    pub fn keyword(&self) -> &'static str {
        match self {
            SignatureRequirement::SignedTag => "signed-tag",
            SignatureRequirement::SignedTagOrCommit => "signed-tag-or-commit",
        }
    }
}

impl std::fmt::Display for SignatureRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// A stable hash over repository ref state.
///
/// Computed over a sorted set of `(refname, oid)` pairs so the result is
/// independent of enumeration order. Tests use this to prove that a
/// rejected verification leaves the trusted refs byte-identical.
///
/// # Example
///
/// ```
/// use sourcegate::core::types::{Fingerprint, Oid};
///
/// let refs = vec![(
///     "refs/heads/main".to_string(),
///     Oid::new("abc123def4567890abc123def4567890abc12345").unwrap(),
/// )];
///
/// assert_eq!(Fingerprint::compute(&refs), Fingerprint::compute(&refs));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute a fingerprint from a set of (refname, oid) pairs.
    pub fn compute(refs: &[(String, Oid)]) -> Self {
        let mut sorted: Vec<_> = refs.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));

        let mut hasher = Sha256::new();
        for (refname, oid) in sorted {
            hasher.update(refname.as_bytes());
            hasher.update(b"\0");
            hasher.update(oid.as_str().as_bytes());
            hasher.update(b"\n");
        }

        let result = hasher.finalize();
        Self(hex::encode(result))
    }

    /// Get the fingerprint as a hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod branch_name {
        use super::*;

        #[test]
        fn valid_branch_names() {
            assert!(BranchName::new("main").is_ok());
            assert!(BranchName::new("master").is_ok());
            assert!(BranchName::new("release4.2").is_ok());
            assert!(BranchName::new("fix_123").is_ok());
            assert!(BranchName::new("v1-stable").is_ok());
        }

        #[test]
        fn empty_rejected() {
            assert!(BranchName::new("").is_err());
        }

        #[test]
        fn single_char_rejected() {
            assert!(BranchName::new("m").is_err());
        }

        #[test]
        fn leading_non_letter_rejected() {
            assert!(BranchName::new("4release").is_err());
            assert!(BranchName::new(".hidden").is_err());
            assert!(BranchName::new("-rf").is_err());
            assert!(BranchName::new("_x").is_err());
        }

        #[test]
        fn path_traversal_rejected() {
            assert!(BranchName::new("../etc").is_err());
            assert!(BranchName::new("a/b").is_err());
        }

        #[test]
        fn special_chars_rejected() {
            assert!(BranchName::new("has space").is_err());
            assert!(BranchName::new("has~tilde").is_err());
            assert!(BranchName::new("has:colon").is_err());
            assert!(BranchName::new("semi;colon").is_err());
            assert!(BranchName::new("dollar$var").is_err());
        }

        #[test]
        fn serde_roundtrip() {
            let name = BranchName::new("release4.2").unwrap();
            let json = serde_json::to_string(&name).unwrap();
            let parsed: BranchName = serde_json::from_str(&json).unwrap();
            assert_eq!(name, parsed);
        }

        #[test]
        fn serde_rejects_invalid() {
            let result: Result<BranchName, _> = serde_json::from_str("\"../etc\"");
            assert!(result.is_err());
        }
    }

    mod component_name {
        use super::*;

        #[test]
        fn valid_component_names() {
            assert!(ComponentName::new("core-agent").is_ok());
            assert!(ComponentName::new("linux_kernel").is_ok());
            assert!(ComponentName::new("app-2.0").is_ok());
            assert!(ComponentName::new("qubes/core-agent").is_ok());
            assert!(ComponentName::new("0day-tracker").is_ok());
        }

        #[test]
        fn empty_rejected() {
            assert!(ComponentName::new("").is_err());
        }

        #[test]
        fn deep_nesting_rejected() {
            assert!(ComponentName::new("a/b/c").is_err());
        }

        #[test]
        fn dot_segments_rejected() {
            assert!(ComponentName::new(".").is_err());
            assert!(ComponentName::new("..").is_err());
            assert!(ComponentName::new("../up").is_err());
            assert!(ComponentName::new("a/..").is_err());
        }

        #[test]
        fn empty_segment_rejected() {
            assert!(ComponentName::new("/leading").is_err());
            assert!(ComponentName::new("trailing/").is_err());
        }

        #[test]
        fn special_chars_rejected() {
            assert!(ComponentName::new("has space").is_err());
            assert!(ComponentName::new("shell;inject").is_err());
            assert!(ComponentName::new("tilde~1").is_err());
        }
    }

    mod oid {
        use super::*;

        #[test]
        fn valid_sha1() {
            assert!(Oid::new("abc123def4567890abc123def4567890abc12345").is_ok());
        }

        #[test]
        fn valid_sha256() {
            let sha256 = "abc123def4567890abc123def4567890abc123def4567890abc123def456789a";
            assert_eq!(sha256.len(), 64);
            assert!(Oid::new(sha256).is_ok());
        }

        #[test]
        fn normalizes_to_lowercase() {
            let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
            assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
        }

        #[test]
        fn short_form() {
            let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
            assert_eq!(oid.short(7), "abc123d");
            assert_eq!(oid.short(100), oid.as_str());
        }

        #[test]
        fn invalid_length() {
            assert!(Oid::new("").is_err());
            assert!(Oid::new("abc123").is_err());
        }

        #[test]
        fn non_hex_rejected() {
            assert!(Oid::new("xyz123def4567890abc123def4567890abc12345").is_err());
        }
    }

    mod trust_policy {
        use super::*;

        #[test]
        fn skip_has_no_requirement() {
            assert_eq!(TrustPolicy::Skip.requirement(), None);
        }

        #[test]
        fn requirements_map_to_keywords() {
            assert_eq!(
                TrustPolicy::SignedTag.requirement().unwrap().keyword(),
                "signed-tag"
            );
            assert_eq!(
                TrustPolicy::SignedTagOrCommit
                    .requirement()
                    .unwrap()
                    .keyword(),
                "signed-tag-or-commit"
            );
        }

        #[test]
        fn display_names() {
            assert_eq!(TrustPolicy::Skip.to_string(), "no-verification");
            assert_eq!(TrustPolicy::SignedTag.to_string(), "signed-tag-required");
        }
    }

    mod fingerprint {
        use super::*;

        fn oid(s: &str) -> Oid {
            Oid::new(s).unwrap()
        }

        #[test]
        fn deterministic() {
            let refs = vec![(
                "refs/heads/main".to_string(),
                oid("abc123def4567890abc123def4567890abc12345"),
            )];
            assert_eq!(Fingerprint::compute(&refs), Fingerprint::compute(&refs));
        }

        #[test]
        fn order_independent() {
            let a = (
                "refs/heads/main".to_string(),
                oid("abc123def4567890abc123def4567890abc12345"),
            );
            let b = (
                "refs/remotes/origin/main".to_string(),
                oid("def456abc7890123def456abc7890123def45678"),
            );

            let fp1 = Fingerprint::compute(&[a.clone(), b.clone()]);
            let fp2 = Fingerprint::compute(&[b, a]);
            assert_eq!(fp1, fp2);
        }

        #[test]
        fn different_refs_different_fingerprint() {
            let fp1 = Fingerprint::compute(&[(
                "refs/heads/main".to_string(),
                oid("abc123def4567890abc123def4567890abc12345"),
            )]);
            let fp2 = Fingerprint::compute(&[(
                "refs/heads/main".to_string(),
                oid("def456abc7890123def456abc7890123def45678"),
            )]);
            assert_ne!(fp1, fp2);
        }
    }
}
