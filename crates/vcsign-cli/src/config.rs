//! # CLI Configuration
//!
//! Optional YAML file (`--config`), then environment overrides. Holds no
//! key material; keys are always named on the command line.
//!
//! ```yaml
//! proof_purpose: assertionMethod
//! verification_method: did:example:issuer#key-1
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use vcsign_vc::{ProofOptions, ProofPurpose};

/// Overrides the proof purpose for both `sign` and `present`.
pub const ENV_PROOF_PURPOSE: &str = "VCSIGN_PROOF_PURPOSE";
/// Overrides the verification method written into new proofs.
pub const ENV_VERIFICATION_METHOD: &str = "VCSIGN_VERIFICATION_METHOD";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    #[serde(default)]
    pub proof_purpose: Option<ProofPurpose>,
    #[serde(default)]
    pub verification_method: Option<String>,
}

impl CliConfig {
    /// Load from `path` (if any), then apply process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_env(|name| std::env::var(name).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply overrides from `lookup`, which maps a variable name to its
    /// value. Empty values are ignored.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(purpose) = non_empty(ENV_PROOF_PURPOSE) {
            let purpose = purpose
                .trim()
                .parse::<ProofPurpose>()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("invalid {ENV_PROOF_PURPOSE}"))?;
            self.proof_purpose = Some(purpose);
        }
        if let Some(method) = non_empty(ENV_VERIFICATION_METHOD) {
            self.verification_method = Some(method.trim().to_string());
        }
        Ok(self)
    }

    /// Layer the configured overrides onto `defaults`.
    pub fn proof_options(&self, defaults: ProofOptions) -> ProofOptions {
        let mut options = defaults;
        if let Some(purpose) = self.proof_purpose {
            options = options.with_purpose(purpose);
        }
        if let Some(method) = &self.verification_method {
            options = options.with_verification_method(method.clone());
        }
        options
    }
}
