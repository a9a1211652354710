//! # vcsign-crypto — Key Material
//!
//! Provides the single signature scheme used across vcsign:
//!
//! - **Ed25519** key generation from the operating system's CSPRNG,
//!   32-byte private seed and 32-byte public key export.
//! - **Signing** that accepts only `CanonicalBytes`, so nothing
//!   un-canonicalized can ever be signed.
//! - **`did:key` derivation** for the `verificationMethod` recorded in
//!   proofs.
//!
//! ## Crate Policy
//!
//! - Depends only on `vcsign-core` internally.
//! - No mocking of cryptographic operations in tests.
//! - Private key bytes are only reachable through the explicit
//!   [`Ed25519KeyPair::private_bytes`] export and never appear in `Debug`.

pub mod ed25519;

pub use ed25519::{
    generate_keys, verify, verify_with_public_key, Ed25519KeyPair, Ed25519PublicKey,
    Ed25519Signature, ED25519_PRIVATE_KEY_LEN, ED25519_PUBLIC_KEY_LEN, ED25519_SIGNATURE_LEN,
};
