//! # Error Types — Structured Error Hierarchy
//!
//! Defines the low-level error types shared by every vcsign crate. All
//! errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - Canonicalization errors are fatal to the enclosing sign/verify call.
//! - Cryptographic errors carry enough context to identify the bad input
//!   without echoing key material.

use thiserror::Error;

/// Top-level error type for vcsign core operations.
#[derive(Error, Debug)]
pub enum VcsignError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A cryptographic primitive rejected its input.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// A timestamp could not be parsed or constructed.
    #[error("invalid timestamp: {0}")]
    Timestamp(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// NaN and the infinities have no canonical textual form.
    #[error("non-finite number has no canonical representation: {0}")]
    NonFiniteNumber(f64),

    /// The value could not be converted into a document tree, e.g. a map
    /// whose keys are not strings.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error in cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Key parsing failed (wrong length, bad hex, not a curve point).
    #[error("key error: {0}")]
    KeyError(String),

    /// Signature bytes could not be decoded.
    #[error("invalid signature encoding: {0}")]
    InvalidSignature(String),

    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),
}
