//! # Verifiable Credential
//!
//! Defines [`VerifiableCredential`]: a W3C credential envelope, the schema
//! binding resolved when it was constructed, and the evaluator used to
//! check the subject.
//!
//! ## Lifecycle
//!
//! A credential is built from a document (`Constructed`), and
//! [`sign`](VerifiableCredential::sign) returns a new instance carrying a
//! proof (`Signed`). Signing again replaces the proof. Verifying a
//! credential that was never signed fails with [`VcError::MissingProof`].
//!
//! ## Security Invariants
//!
//! - The signed bytes come from the document exactly as received, not from
//!   the typed [`CredentialBody`]. Parsing normalizes some fields (a bare
//!   `https://issuer.example` gains a trailing `/`, `+00:00` becomes `Z`),
//!   so re-serializing the body would change what the proof covers.
//! - **Signing** canonicalizes that document with `proof` removed and signs
//!   those bytes.
//! - **Verification** recomputes the same bytes, checks the signature,
//!   and only then re-runs the schema check. A tampered subject that still
//!   satisfies the schema is caught by the signature, not the schema.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use vcsign_core::{CanonicalBytes, Document};
use vcsign_crypto::{Ed25519KeyPair, Ed25519PublicKey};
use vcsign_schema::{JsonSchemaEvaluator, SchemaEvaluator, META_SCHEMA_ID};

use crate::binding::SchemaBinding;
use crate::builder::VerifiableCredentialBuilder;
use crate::engine;
use crate::envelope::{parse_envelope, CredentialSchema, CredentialStatus, OneOrMany};
use crate::error::{ConstructionError, SchemaError, VcError};
use crate::proof::{Proof, ProofOptions};

const REQUIRED_FIELDS: [&str; 2] = ["issuer", "credentialSubject"];

/// The serialized fields of a credential.
///
/// The envelope is rigid (unknown top-level fields are rejected), while
/// `credential_subject` is an arbitrary document. Optional fields absent
/// from the source stay absent on output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialBody {
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<OneOrMany<Url>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Url>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub credential_type: Option<OneOrMany<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub issuer: Url,

    #[serde(rename = "validFrom", default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,

    /// Carried and signed; expiry is never enforced.
    #[serde(rename = "validUntil", default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,

    #[serde(
        rename = "credentialStatus",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub credential_status: Option<OneOrMany<CredentialStatus>>,

    #[serde(
        rename = "credentialSchema",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub credential_schema: Option<OneOrMany<CredentialSchema>>,

    #[serde(rename = "credentialSubject")]
    pub credential_subject: Document,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
}

impl CredentialBody {
    /// Returns `true` if any `credentialSchema` entry names the JSON-Schema
    /// meta-schema.
    pub fn declares_meta_schema(&self) -> bool {
        self.credential_schema
            .as_ref()
            .is_some_and(|schemas| schemas.iter().any(|s| s.id.as_str() == META_SCHEMA_ID))
    }
}

/// A W3C Verifiable Credential bound to an optional governing schema.
#[derive(Debug, Clone)]
pub struct VerifiableCredential {
    body: CredentialBody,
    /// The mapping the body was parsed from; source of the signing input.
    document: Document,
    binding: SchemaBinding,
    evaluator: Arc<dyn SchemaEvaluator>,
}

impl VerifiableCredential {
    /// Parse `document` and bind it to `binding`.
    ///
    /// With no explicit binding, a document whose `credentialSchema` names
    /// the meta-schema resolves to [`SchemaBinding::SelfDescribing`]. The
    /// schema itself is not evaluated here; see
    /// [`check_schema`](Self::check_schema).
    pub fn new(document: Document, binding: SchemaBinding) -> Result<Self, ConstructionError> {
        let body: CredentialBody = parse_envelope(document.clone(), &REQUIRED_FIELDS)?;
        let binding = match binding {
            SchemaBinding::None if body.declares_meta_schema() => SchemaBinding::SelfDescribing,
            other => other,
        };
        Ok(Self {
            body,
            document,
            binding,
            evaluator: Arc::new(JsonSchemaEvaluator::new()),
        })
    }

    /// Parse `document` without an explicit schema.
    pub fn from_document(document: Document) -> Result<Self, ConstructionError> {
        Self::new(document, SchemaBinding::None)
    }

    /// Build a complete unsigned credential around `subject`.
    ///
    /// Fills in the v2 context, random `urn:uuid:` id and issuer, the
    /// `VerifiableCredential` type, and a `credentialSchema` entry for the
    /// bound schema's `$id` (the meta-schema for self-describing subjects).
    ///
    /// # Errors
    ///
    /// [`SchemaError::MissingSchemaId`] if an inline or delegated schema has
    /// no string `$id`.
    pub fn create(subject: Document, binding: SchemaBinding) -> Result<Self, VcError> {
        let builder = match &binding {
            SchemaBinding::None => VerifiableCredentialBuilder::without_schema(subject)?,
            bound => VerifiableCredentialBuilder::new(subject, &bound.schema_id()?)?,
        };
        let mut credential = builder.build()?;
        credential.binding = binding;
        Ok(credential)
    }

    /// Replace the evaluator used for structural checks.
    pub fn with_evaluator(mut self, evaluator: Arc<dyn SchemaEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn body(&self) -> &CredentialBody {
        &self.body
    }

    pub fn issuer(&self) -> &Url {
        &self.body.issuer
    }

    pub fn credential_subject(&self) -> &Document {
        &self.body.credential_subject
    }

    pub fn proof(&self) -> Option<&Proof> {
        self.body.proof.as_ref()
    }

    pub fn is_signed(&self) -> bool {
        self.body.proof.is_some()
    }

    pub fn binding(&self) -> &SchemaBinding {
        &self.binding
    }

    /// Check the subject against the bound schema, if any.
    pub fn check_schema(&self) -> Result<(), SchemaError> {
        self.binding
            .check(&self.body.credential_subject, self.evaluator.as_ref())
    }

    /// Canonical bytes covered by the proof.
    pub fn signing_input(&self) -> Result<CanonicalBytes, VcError> {
        engine::signing_input(&self.document)
    }

    /// Sign with default issuance options (`assertionMethod`, `did:key`
    /// verification method, system clock).
    pub fn sign(&self, key_pair: &Ed25519KeyPair) -> Result<Self, VcError> {
        self.sign_with(key_pair, &ProofOptions::assertion())
    }

    /// Check the schema binding, then return a copy carrying a fresh proof.
    pub fn sign_with(
        &self,
        key_pair: &Ed25519KeyPair,
        options: &ProofOptions,
    ) -> Result<Self, VcError> {
        self.check_schema()?;
        let proof = engine::create_proof(&self.document, key_pair, options)?;
        let mut signed = self.clone();
        signed.document = engine::embed_proof(&self.document, &proof)?;
        signed.body.proof = Some(proof);
        Ok(signed)
    }

    /// Verify the proof against `public_key`, then re-check the schema.
    ///
    /// # Errors
    ///
    /// Signature failures ([`VcError::MissingProof`],
    /// [`VcError::SignatureMismatch`], [`VcError::UnsupportedScheme`]) are
    /// reported before any [`VcError::Schema`] failure.
    pub fn verify(&self, public_key: &Ed25519PublicKey) -> Result<(), VcError> {
        let proof = self.body.proof.as_ref().ok_or(VcError::MissingProof)?;
        engine::check_signature(proof, &self.signing_input()?, public_key)?;
        self.check_schema()?;
        Ok(())
    }

    /// The credential as a plain document: the fields as received, plus the
    /// current proof.
    pub fn to_object(&self) -> Result<Document, VcError> {
        Ok(self.document.clone())
    }
}

impl TryFrom<Document> for VerifiableCredential {
    type Error = ConstructionError;

    fn try_from(document: Document) -> Result<Self, Self::Error> {
        Self::from_document(document)
    }
}
