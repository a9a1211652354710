//! # Proof Types
//!
//! The detached proof block embedded in credentials and presentations,
//! and the per-call options that shape a new proof.
//!
//! The proof object has rigid structure: exactly `type`, `created`,
//! `verificationMethod`, `proofPurpose`, and `proofValue`. Unknown fields
//! are rejected so nothing unsigned can ride along inside it.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vcsign_core::{Clock, SystemClock, Timestamp};
use vcsign_crypto::{Ed25519PublicKey, Ed25519Signature};

/// Signature scheme named by a proof's `type` field.
///
/// Only [`ProofType::Ed25519Signature2020`] is implemented. Any other name
/// is preserved as [`ProofType::Other`] so the document still parses and
/// verification can report it as unsupported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProofType {
    /// Ed25519 signature over the canonical document bytes.
    Ed25519Signature2020,
    /// A scheme this engine does not implement.
    Other(String),
}

impl ProofType {
    pub fn as_str(&self) -> &str {
        match self {
            ProofType::Ed25519Signature2020 => "Ed25519Signature2020",
            ProofType::Other(name) => name,
        }
    }

    /// Returns `true` if this engine can verify proofs of this type.
    pub fn is_supported(&self) -> bool {
        matches!(self, ProofType::Ed25519Signature2020)
    }
}

impl From<String> for ProofType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Ed25519Signature2020" => ProofType::Ed25519Signature2020,
            _ => ProofType::Other(s),
        }
    }
}

impl From<ProofType> for String {
    fn from(t: ProofType) -> Self {
        match t {
            ProofType::Ed25519Signature2020 => "Ed25519Signature2020".to_string(),
            ProofType::Other(name) => name,
        }
    }
}

impl std::fmt::Display for ProofType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The purpose of a cryptographic proof.
///
/// Follows the W3C verification relationship vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProofPurpose {
    /// The issuer asserts the credential claims are true.
    AssertionMethod,
    /// The holder authenticates as the presenter.
    Authentication,
    CapabilityInvocation,
    CapabilityDelegation,
    KeyAgreement,
}

impl ProofPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProofPurpose::AssertionMethod => "assertionMethod",
            ProofPurpose::Authentication => "authentication",
            ProofPurpose::CapabilityInvocation => "capabilityInvocation",
            ProofPurpose::CapabilityDelegation => "capabilityDelegation",
            ProofPurpose::KeyAgreement => "keyAgreement",
        }
    }
}

impl std::fmt::Display for ProofPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProofPurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assertionMethod" => Ok(ProofPurpose::AssertionMethod),
            "authentication" => Ok(ProofPurpose::Authentication),
            "capabilityInvocation" => Ok(ProofPurpose::CapabilityInvocation),
            "capabilityDelegation" => Ok(ProofPurpose::CapabilityDelegation),
            "keyAgreement" => Ok(ProofPurpose::KeyAgreement),
            other => Err(format!("unknown proof purpose '{other}'")),
        }
    }
}

/// A detached proof embedded under a document's `proof` key.
///
/// ## Security Invariant
///
/// `proof_value` is the hex-encoded signature over the canonical bytes of
/// the enclosing document with its `proof` field removed. A proof never
/// covers itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Proof {
    /// The signature scheme.
    #[serde(rename = "type")]
    pub proof_type: ProofType,

    /// When the proof was created (UTC, truncated to seconds).
    pub created: DateTime<Utc>,

    /// DID URL identifying the signing key.
    #[serde(rename = "verificationMethod")]
    pub verification_method: String,

    #[serde(rename = "proofPurpose")]
    pub proof_purpose: ProofPurpose,

    /// Hex-encoded signature bytes (128 hex characters for Ed25519).
    #[serde(rename = "proofValue")]
    pub proof_value: String,
}

impl Proof {
    /// Build an Ed25519Signature2020 proof from a fresh signature.
    pub fn new_ed25519(
        verification_method: String,
        proof_purpose: ProofPurpose,
        created: Timestamp,
        signature: &Ed25519Signature,
    ) -> Self {
        Self {
            proof_type: ProofType::Ed25519Signature2020,
            created: *created.as_datetime(),
            verification_method,
            proof_purpose,
            proof_value: signature.to_hex(),
        }
    }
}

/// Options applied when a proof is created.
///
/// The defaults match credential issuance: purpose `assertionMethod`, the
/// signer's own `did:key` as verification method, and the system clock.
#[derive(Debug, Clone)]
pub struct ProofOptions {
    pub proof_purpose: ProofPurpose,
    /// Overrides the `did:key` URL derived from the signing key.
    pub verification_method: Option<String>,
    pub clock: Arc<dyn Clock>,
}

impl ProofOptions {
    /// Options for an issuer asserting a credential.
    pub fn assertion() -> Self {
        Self {
            proof_purpose: ProofPurpose::AssertionMethod,
            verification_method: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Options for a holder authenticating a presentation.
    pub fn authentication() -> Self {
        Self {
            proof_purpose: ProofPurpose::Authentication,
            ..Self::assertion()
        }
    }

    pub fn with_purpose(mut self, purpose: ProofPurpose) -> Self {
        self.proof_purpose = purpose;
        self
    }

    pub fn with_verification_method(mut self, method: impl Into<String>) -> Self {
        self.verification_method = Some(method.into());
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The verification method recorded for a proof made by `public_key`.
    pub fn verification_method_for(&self, public_key: &Ed25519PublicKey) -> String {
        self.verification_method
            .clone()
            .unwrap_or_else(|| public_key.verification_method())
    }
}

impl Default for ProofOptions {
    fn default() -> Self {
        Self::assertion()
    }
}
