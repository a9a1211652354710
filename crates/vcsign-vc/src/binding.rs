//! # Schema Binding
//!
//! Decides which JSON-Schema governs a credential's subject and whether
//! that schema can be trusted. The source is one of a closed set of
//! variants, resolved once when the credential is constructed:
//!
//! | Variant          | Governing schema                                      |
//! |------------------|-------------------------------------------------------|
//! | `None`           | none; the subject is unvalidated                      |
//! | `Inline`         | a schema document supplied by the caller              |
//! | `Delegated`      | the subject of a [`SignedSchema`] credential, trusted only after its proof verifies |
//! | `SelfDescribing` | the JSON-Schema meta-schema; the subject *is* a schema |
//!
//! Structural evaluation is handed to a [`SchemaEvaluator`]; this module
//! only selects the schema, checks its trust, and maps the outcome onto
//! [`SchemaError`].

use vcsign_core::Document;
use vcsign_crypto::Ed25519PublicKey;
use vcsign_schema::{SchemaEvaluator, META_SCHEMA_ID};

use crate::credential::VerifiableCredential;
use crate::engine;
use crate::error::{SchemaError, VcError};

/// A credential whose subject is a JSON-Schema, paired with the public key
/// of its issuer.
#[derive(Debug, Clone)]
pub struct SignedSchema {
    credential: Box<VerifiableCredential>,
    public_key: Ed25519PublicKey,
}

impl SignedSchema {
    pub fn new(credential: VerifiableCredential, public_key: Ed25519PublicKey) -> Self {
        Self {
            credential: Box::new(credential),
            public_key,
        }
    }

    pub fn credential(&self) -> &VerifiableCredential {
        &self.credential
    }

    pub fn public_key(&self) -> &Ed25519PublicKey {
        &self.public_key
    }

    /// The schema document, without any trust check.
    pub fn schema(&self) -> &Document {
        self.credential.credential_subject()
    }

    /// The schema document, once the schema credential's proof verifies
    /// against the issuer key.
    ///
    /// # Errors
    ///
    /// [`SchemaError::SchemaSignatureInvalid`] wrapping the proof failure.
    pub fn trusted_schema(&self) -> Result<&Document, SchemaError> {
        let document = self
            .credential
            .to_object()
            .map_err(|e| SchemaError::SchemaSignatureInvalid(Box::new(e)))?;
        engine::verify_proof(&document, &self.public_key)
            .map_err(|e| SchemaError::SchemaSignatureInvalid(Box::new(e)))?;
        Ok(self.schema())
    }
}

/// Where a credential's governing schema comes from.
#[derive(Debug, Clone, Default)]
pub enum SchemaBinding {
    /// No schema; structural validation is skipped.
    #[default]
    None,
    /// A schema document supplied directly.
    Inline(Document),
    /// A schema carried by a separately signed credential.
    Delegated(SignedSchema),
    /// The subject is itself a schema, checked against the meta-schema.
    SelfDescribing,
}

impl SchemaBinding {
    /// Returns `true` unless the binding is [`SchemaBinding::None`].
    pub fn is_bound(&self) -> bool {
        !matches!(self, SchemaBinding::None)
    }

    /// The `$id` naming the governing schema, for `credentialSchema`.
    ///
    /// Self-describing credentials are governed by the meta-schema.
    ///
    /// # Errors
    ///
    /// [`SchemaError::MissingSchemaId`] if there is no schema or the schema
    /// has no string `$id`.
    pub fn schema_id(&self) -> Result<String, SchemaError> {
        let schema = match self {
            SchemaBinding::None => return Err(SchemaError::MissingSchemaId),
            SchemaBinding::SelfDescribing => return Ok(META_SCHEMA_ID.to_string()),
            SchemaBinding::Inline(schema) => schema,
            SchemaBinding::Delegated(signed) => signed.schema(),
        };
        schema
            .get("$id")
            .and_then(Document::as_str)
            .map(str::to_string)
            .ok_or(SchemaError::MissingSchemaId)
    }

    /// Check `subject` against the governing schema.
    ///
    /// For `Delegated`, the schema credential's proof is verified first;
    /// an untrusted schema is never evaluated.
    pub fn check(
        &self,
        subject: &Document,
        evaluator: &dyn SchemaEvaluator,
    ) -> Result<(), SchemaError> {
        match self {
            SchemaBinding::None => Ok(()),
            SchemaBinding::Inline(schema) => Ok(evaluator.validate(schema, subject)?),
            SchemaBinding::Delegated(signed) => {
                let schema = signed.trusted_schema()?;
                Ok(evaluator.validate(schema, subject)?)
            }
            SchemaBinding::SelfDescribing => Ok(evaluator.check_schema(subject)?),
        }
    }
}

impl From<SignedSchema> for SchemaBinding {
    fn from(signed: SignedSchema) -> Self {
        SchemaBinding::Delegated(signed)
    }
}

/// Construct a credential from `document` under `binding` and check its
/// subject up front.
///
/// Construction errors surface as [`VcError::Construction`]; trust and
/// structural failures as [`VcError::Schema`].
pub fn bind(document: Document, binding: SchemaBinding) -> Result<VerifiableCredential, VcError> {
    let credential = VerifiableCredential::new(document, binding)?;
    credential.check_schema()?;
    Ok(credential)
}
