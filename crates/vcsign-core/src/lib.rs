//! # vcsign-core — Foundational Types
//!
//! The leaf of the vcsign crate graph. Everything that signs or verifies a
//! credential ultimately reduces a document to bytes through this crate.
//!
//! ## Key Design Principles
//!
//! 1. **One document type.** A [`Document`] is a `serde_json::Value` tree of
//!    mappings, sequences, strings, numbers, booleans, and null. Credential
//!    subjects, schemas, and proofs are all carried as documents.
//!
//! 2. **`CanonicalBytes` newtype.** All signing input flows through
//!    [`CanonicalBytes::new()`]. The output depends only on the document's
//!    value, never on the key order or formatting of its source text.
//!
//! 3. **UTC-only timestamps.** [`Timestamp`] is UTC with seconds precision,
//!    and proof creation times are read from an injectable [`Clock`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `vcsign-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod error;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use error::{CanonicalizationError, CryptoError, VcsignError};
pub use temporal::{Clock, FixedClock, SystemClock, Timestamp};

/// An untyped document tree: the generic carrier for credential subjects,
/// schemas, and proofs.
pub type Document = serde_json::Value;

/// A mapping node of a [`Document`].
pub type DocumentMap = serde_json::Map<String, serde_json::Value>;
