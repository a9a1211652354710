//! # Verifiable Presentation
//!
//! A holder-signed bundle of one or more credentials.
//!
//! ## Nested Credentials
//!
//! The presentation proof covers every nested credential exactly as
//! serialized by its own `to_object`, proof included. Nested credentials
//! are immutable once bundled: there is no mutable accessor, and signing
//! the presentation (again) never adds, strips, or rewrites a nested
//! proof. To change a credential, build a new presentation.
//!
//! The presentation proof covers the header fields exactly as received.
//! The typed header is a parsed view and is never re-serialized.
//!
//! Verifying the presentation checks the presentation proof only. Each
//! nested credential is verified separately by the caller, against its own
//! issuer's key, via [`VerifiablePresentation::credentials`].

use serde::{Deserialize, Serialize};
use serde_json::Map;
use url::Url;
use uuid::Uuid;
use vcsign_core::{CanonicalBytes, Document};
use vcsign_crypto::{Ed25519KeyPair, Ed25519PublicKey};

use crate::credential::VerifiableCredential;
use crate::engine::{self, PROOF_FIELD};
use crate::envelope::{parse_envelope, OneOrMany, VC_CONTEXT_V2, VERIFIABLE_PRESENTATION_TYPE};
use crate::error::{ConstructionError, VcError};
use crate::proof::{Proof, ProofOptions};

const CREDENTIALS_FIELD: &str = "verifiableCredential";
const REQUIRED_FIELDS: [&str; 1] = ["type"];

/// Every presentation field except the nested credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct PresentationHeader {
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    context: Option<OneOrMany<Url>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<Url>,

    #[serde(rename = "type")]
    presentation_type: OneOrMany<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    holder: Option<Url>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    proof: Option<Proof>,
}

/// A W3C Verifiable Presentation.
#[derive(Debug, Clone)]
pub struct VerifiablePresentation {
    header: PresentationHeader,
    /// Every top-level field except `verifiableCredential`, as received.
    fields: Map<String, Document>,
    credentials: OneOrMany<VerifiableCredential>,
}

impl VerifiablePresentation {
    /// Parse a presentation document.
    ///
    /// Each entry of `verifiableCredential` is parsed as a credential with
    /// no explicit schema (self-describing entries are still detected).
    pub fn new(document: Document) -> Result<Self, ConstructionError> {
        let Document::Object(mut map) = document else {
            return Err(ConstructionError::NotAMapping);
        };
        let raw = map
            .remove(CREDENTIALS_FIELD)
            .ok_or_else(|| ConstructionError::MissingField(CREDENTIALS_FIELD.to_string()))?;
        let header: PresentationHeader =
            parse_envelope(Document::Object(map.clone()), &REQUIRED_FIELDS)?;

        let credentials = match raw {
            Document::Array(items) if items.is_empty() => {
                return Err(ConstructionError::EmptyCredentialList)
            }
            Document::Array(items) => OneOrMany::Many(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| parse_nested(index, item))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            item @ Document::Object(_) => OneOrMany::One(parse_nested(0, item)?),
            other => {
                return Err(ConstructionError::InvalidField(format!(
                    "{CREDENTIALS_FIELD} must be a credential or a list of credentials, got {other}"
                )))
            }
        };

        Ok(Self {
            header,
            fields: map,
            credentials,
        })
    }

    /// Bundle already-built credentials for `holder`.
    ///
    /// Fills in the v2 context, a random `urn:uuid:` id, and the
    /// `VerifiablePresentation` type.
    pub fn from_credentials(
        credentials: Vec<VerifiableCredential>,
        holder: Url,
    ) -> Result<Self, ConstructionError> {
        if credentials.is_empty() {
            return Err(ConstructionError::EmptyCredentialList);
        }
        let context = Url::parse(VC_CONTEXT_V2)
            .map_err(|e| ConstructionError::InvalidField(format!("@context: {e}")))?;
        let id = Url::parse(&format!("urn:uuid:{}", Uuid::new_v4()))
            .map_err(|e| ConstructionError::InvalidField(format!("id: {e}")))?;

        let header = PresentationHeader {
            context: Some(OneOrMany::Many(vec![context])),
            id: Some(id),
            presentation_type: OneOrMany::One(VERIFIABLE_PRESENTATION_TYPE.to_string()),
            holder: Some(holder),
            proof: None,
        };
        let fields = match serde_json::to_value(&header) {
            Ok(Document::Object(fields)) => fields,
            Ok(_) => return Err(ConstructionError::NotAMapping),
            Err(e) => return Err(ConstructionError::InvalidField(e.to_string())),
        };
        Ok(Self {
            header,
            fields,
            credentials: OneOrMany::Many(credentials),
        })
    }

    pub fn id(&self) -> Option<&Url> {
        self.header.id.as_ref()
    }

    pub fn holder(&self) -> Option<&Url> {
        self.header.holder.as_ref()
    }

    pub fn proof(&self) -> Option<&Proof> {
        self.header.proof.as_ref()
    }

    pub fn is_signed(&self) -> bool {
        self.header.proof.is_some()
    }

    /// The nested credentials, read-only.
    pub fn credentials(&self) -> &[VerifiableCredential] {
        self.credentials.as_slice()
    }

    /// Canonical bytes covered by the presentation proof.
    pub fn signing_input(&self) -> Result<CanonicalBytes, VcError> {
        engine::signing_input(&self.to_object()?)
    }

    /// Sign with default holder options (`authentication`).
    pub fn sign(&self, key_pair: &Ed25519KeyPair) -> Result<Self, VcError> {
        self.sign_with(key_pair, &ProofOptions::authentication())
    }

    /// Return a copy carrying a fresh presentation proof. Nested
    /// credentials are carried over untouched.
    pub fn sign_with(
        &self,
        key_pair: &Ed25519KeyPair,
        options: &ProofOptions,
    ) -> Result<Self, VcError> {
        let proof = engine::create_proof(&self.to_object()?, key_pair, options)?;
        let mut signed = self.clone();
        signed
            .fields
            .insert(PROOF_FIELD.to_string(), serde_json::to_value(&proof)?);
        signed.header.proof = Some(proof);
        Ok(signed)
    }

    /// Verify the presentation proof. Nested credential proofs are not
    /// checked.
    pub fn verify(&self, public_key: &Ed25519PublicKey) -> Result<(), VcError> {
        let proof = self.header.proof.as_ref().ok_or(VcError::MissingProof)?;
        engine::check_signature(proof, &self.signing_input()?, public_key)
    }

    /// The presentation as a plain document: the header fields as received,
    /// the current proof, and each credential's own `to_object`.
    pub fn to_object(&self) -> Result<Document, VcError> {
        let nested = match &self.credentials {
            OneOrMany::One(credential) => credential.to_object()?,
            OneOrMany::Many(credentials) => Document::Array(
                credentials
                    .iter()
                    .map(VerifiableCredential::to_object)
                    .collect::<Result<_, _>>()?,
            ),
        };
        let mut map = self.fields.clone();
        map.insert(CREDENTIALS_FIELD.to_string(), nested);
        Ok(Document::Object(map))
    }
}

impl TryFrom<Document> for VerifiablePresentation {
    type Error = ConstructionError;

    fn try_from(document: Document) -> Result<Self, Self::Error> {
        Self::new(document)
    }
}

fn parse_nested(index: usize, item: Document) -> Result<VerifiableCredential, ConstructionError> {
    VerifiableCredential::from_document(item).map_err(|e| ConstructionError::NestedCredential {
        index,
        source: Box::new(e),
    })
}
