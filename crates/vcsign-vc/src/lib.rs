//! # vcsign-vc — Verifiable Credentials
//!
//! Signing and verification of W3C Verifiable Credentials and
//! Presentations:
//!
//! - **Proof engine** (`engine.rs`): attaches a detached Ed25519 proof to
//!   any mapping document and verifies it. The signing input is the
//!   canonical form of the document with its `proof` field removed.
//!
//! - **Schema binding** (`binding.rs`): selects the JSON-Schema governing a
//!   credential subject (inline, delegated to a [`SignedSchema`]
//!   credential, or self-describing) and checks trust before use.
//!
//! - **Credential / Presentation** (`credential.rs`, `presentation.rs`,
//!   `builder.rs`): the entity layer with `sign`, `verify`, and
//!   `to_object`.
//!
//! ## Security Invariant
//!
//! All signing input is `CanonicalBytes` from `vcsign-core`. Proof signing
//! uses real Ed25519; nothing cryptographic is mocked, in production or in
//! tests.
//!
//! ## Crate Policy
//!
//! - Depends on `vcsign-core`, `vcsign-crypto`, and `vcsign-schema`.
//! - Failures are returned as typed errors and never logged.
//! - `credentialSubject` is an arbitrary document; the envelope and the
//!   proof object are rigid.

pub mod binding;
pub mod builder;
pub mod credential;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod presentation;
pub mod proof;

pub use binding::{bind, SchemaBinding, SignedSchema};
pub use builder::VerifiableCredentialBuilder;
pub use credential::{CredentialBody, VerifiableCredential};
pub use engine::{attach_proof, create_proof, signing_input, verify_proof};
pub use envelope::{CredentialSchema, CredentialStatus, OneOrMany};
pub use error::{ConstructionError, SchemaError, VcError};
pub use presentation::VerifiablePresentation;
pub use proof::{Proof, ProofOptions, ProofPurpose, ProofType};
