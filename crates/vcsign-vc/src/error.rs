//! # Error Types
//!
//! Three error families, one per lifecycle stage:
//!
//! - [`ConstructionError`] is raised only when an entity is built from a
//!   document, never afterwards.
//! - [`SchemaError`] reports schema trust and structural failures.
//! - [`VcError`] is returned by `sign`, `verify`, and `to_object`. Every
//!   verification failure has its own variant so callers can tell a
//!   missing proof from a forged one.

use thiserror::Error;
use vcsign_core::CanonicalizationError;
use vcsign_schema::{EvaluationError, SchemaViolations};

/// Malformed input document, detected at construction.
#[derive(Error, Debug)]
pub enum ConstructionError {
    /// The document's root is not a mapping.
    #[error("document root must be a mapping")]
    NotAMapping,

    /// A required field is absent.
    #[error("missing required field '{0}'")]
    MissingField(String),

    /// A field is present but has the wrong shape, or is not recognised.
    #[error("invalid field: {0}")]
    InvalidField(String),

    /// A presentation must carry at least one credential.
    #[error("presentation must carry at least one verifiable credential")]
    EmptyCredentialList,

    /// A credential nested inside a presentation failed to parse.
    #[error("verifiableCredential[{index}]: {source}")]
    NestedCredential {
        /// Position of the credential in `verifiableCredential`.
        index: usize,
        /// Why it failed.
        #[source]
        source: Box<ConstructionError>,
    },
}

/// Schema trust or structural failure.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The signed schema credential's proof did not verify against the
    /// supplied issuer key; its subject is not trusted.
    #[error("schema credential signature invalid: {0}")]
    SchemaSignatureInvalid(#[source] Box<VcError>),

    /// The credential subject does not conform to the bound schema.
    #[error("credential subject does not satisfy schema:\n{0}")]
    SchemaValidationFailed(SchemaViolations),

    /// The schema (or, for self-describing credentials, the subject) is not
    /// a valid JSON-Schema document.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// The bound schema has no string `$id` to reference it by.
    #[error("schema has no string $id")]
    MissingSchemaId,
}

impl From<EvaluationError> for SchemaError {
    fn from(e: EvaluationError) -> Self {
        match e {
            EvaluationError::InvalidSchema(msg) => SchemaError::InvalidSchema(msg),
            EvaluationError::ValidationFailed(v) => SchemaError::SchemaValidationFailed(v),
        }
    }
}

/// Errors from signing, verification, and serialization.
#[derive(Error, Debug)]
pub enum VcError {
    /// The input document could not be turned into an entity.
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    /// Canonicalization of the signing input failed.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// The document carries no proof.
    #[error("document has no proof")]
    MissingProof,

    /// The proof value does not verify over the canonical bytes.
    #[error("signature mismatch: {0}")]
    SignatureMismatch(String),

    /// The proof names a signature scheme this engine does not implement.
    #[error("unsupported proof type: {0}")]
    UnsupportedScheme(String),

    /// The `proof` field is present but not a well-formed proof object.
    #[error("malformed proof: {0}")]
    MalformedProof(String),

    /// Schema trust or structural validation failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Proofs can only be attached to mapping documents.
    #[error("document root must be a mapping to carry a proof")]
    NotAMapping,

    /// Entity serialization failed.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
