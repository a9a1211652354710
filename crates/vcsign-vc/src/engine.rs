//! # Proof Engine
//!
//! Attaches and checks detached proofs on arbitrary mapping documents.
//! The engine knows nothing about credential shape: it strips the `proof`
//! key, canonicalizes what is left, and signs or verifies those bytes.
//!
//! ## Security Invariants
//!
//! - The signing input is [`CanonicalBytes`] of the document without its
//!   `proof` field, so a proof never covers itself and re-signing replaces
//!   rather than nests.
//! - Verification has no partial-match leniency: any decoding, length, key,
//!   or signature failure is a [`VcError::SignatureMismatch`].

use vcsign_core::{CanonicalBytes, Document};
use vcsign_crypto::{verify_with_public_key, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};

use crate::error::VcError;
use crate::proof::{Proof, ProofOptions, ProofType};

/// Key under which the proof is embedded.
pub const PROOF_FIELD: &str = "proof";

/// Canonical bytes of `document` with any `proof` field removed.
pub fn signing_input(document: &Document) -> Result<CanonicalBytes, VcError> {
    let map = document.as_object().ok_or(VcError::NotAMapping)?;
    let mut body = map.clone();
    body.remove(PROOF_FIELD);
    Ok(CanonicalBytes::from_document(&Document::Object(body))?)
}

/// Sign `document` and return the proof without embedding it.
pub fn create_proof(
    document: &Document,
    key_pair: &Ed25519KeyPair,
    options: &ProofOptions,
) -> Result<Proof, VcError> {
    let canonical = signing_input(document)?;
    let signature = key_pair.sign(&canonical);
    Ok(Proof::new_ed25519(
        options.verification_method_for(&key_pair.public_key()),
        options.proof_purpose,
        options.clock.now(),
        &signature,
    ))
}

/// Sign `document` and return a copy carrying the new proof.
///
/// Any existing proof is discarded before signing and overwritten in the
/// output.
pub fn attach_proof(
    document: &Document,
    key_pair: &Ed25519KeyPair,
    options: &ProofOptions,
) -> Result<Document, VcError> {
    let proof = create_proof(document, key_pair, options)?;
    embed_proof(document, &proof)
}

/// Copy of `document` with `proof` stored under [`PROOF_FIELD`], replacing
/// any proof already there.
pub fn embed_proof(document: &Document, proof: &Proof) -> Result<Document, VcError> {
    let mut signed = document.as_object().cloned().ok_or(VcError::NotAMapping)?;
    signed.insert(PROOF_FIELD.to_string(), serde_json::to_value(proof)?);
    Ok(Document::Object(signed))
}

/// Check the proof embedded in `document` against `public_key`.
///
/// # Errors
///
/// - [`VcError::NotAMapping`] if the document root is not a mapping.
/// - [`VcError::MissingProof`] if there is no `proof` (or it is null).
/// - [`VcError::UnsupportedScheme`] if `proof.type` is not Ed25519Signature2020.
/// - [`VcError::MalformedProof`] if the proof object does not parse.
/// - [`VcError::SignatureMismatch`] if the signature does not verify.
pub fn verify_proof(document: &Document, public_key: &Ed25519PublicKey) -> Result<(), VcError> {
    let map = document.as_object().ok_or(VcError::NotAMapping)?;
    let raw = match map.get(PROOF_FIELD) {
        None | Some(Document::Null) => return Err(VcError::MissingProof),
        Some(raw) => raw,
    };

    // Scheme before shape: other suites use other proof layouts.
    if let Some(name) = raw.get("type").and_then(Document::as_str) {
        let proof_type = ProofType::from(name.to_string());
        if !proof_type.is_supported() {
            return Err(VcError::UnsupportedScheme(proof_type.to_string()));
        }
    }

    let proof: Proof =
        serde_json::from_value(raw.clone()).map_err(|e| VcError::MalformedProof(e.to_string()))?;
    check_signature(&proof, &signing_input(document)?, public_key)
}

/// Verify an already-parsed proof over precomputed canonical bytes.
pub fn check_signature(
    proof: &Proof,
    canonical: &CanonicalBytes,
    public_key: &Ed25519PublicKey,
) -> Result<(), VcError> {
    if !proof.proof_type.is_supported() {
        return Err(VcError::UnsupportedScheme(proof.proof_type.to_string()));
    }

    let signature = Ed25519Signature::from_hex(&proof.proof_value)
        .map_err(|e| VcError::SignatureMismatch(e.to_string()))?;

    verify_with_public_key(canonical, &signature, public_key)
        .map_err(|e| VcError::SignatureMismatch(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use vcsign_core::{FixedClock, Timestamp};
    use vcsign_crypto::generate_keys;

    fn fixed_options() -> ProofOptions {
        let ts = Timestamp::parse("2026-03-01T09:30:00Z").unwrap();
        ProofOptions::default().with_clock(Arc::new(FixedClock(ts)))
    }

    #[test]
    fn attach_then_verify() {
        let kp = generate_keys();
        let doc = json!({"claim": "value", "n": [1, 2, 3]});
        let signed = attach_proof(&doc, &kp, &fixed_options()).unwrap();

        assert_eq!(signed["proof"]["type"], "Ed25519Signature2020");
        assert_eq!(signed["proof"]["created"], "2026-03-01T09:30:00Z");
        assert_eq!(signed["proof"]["proofPurpose"], "assertionMethod");
        assert_eq!(
            signed["proof"]["verificationMethod"],
            kp.public_key().verification_method()
        );
        verify_proof(&signed, &kp.public_key()).unwrap();
    }

    #[test]
    fn attach_does_not_touch_input() {
        let kp = generate_keys();
        let doc = json!({"a": 1});
        let _ = attach_proof(&doc, &kp, &fixed_options()).unwrap();
        assert_eq!(doc, json!({"a": 1}));
    }

    #[test]
    fn signing_input_ignores_proof() {
        let bare = json!({"a": 1, "b": {"c": 2}});
        let with_proof = json!({"b": {"c": 2}, "proof": {"anything": true}, "a": 1});
        assert_eq!(
            signing_input(&bare).unwrap(),
            signing_input(&with_proof).unwrap()
        );
    }

    #[test]
    fn resigning_overwrites_proof() {
        let kp1 = generate_keys();
        let kp2 = generate_keys();
        let doc = json!({"a": 1});
        let once = attach_proof(&doc, &kp1, &fixed_options()).unwrap();
        let twice = attach_proof(&once, &kp2, &fixed_options()).unwrap();

        verify_proof(&twice, &kp2.public_key()).unwrap();
        assert!(matches!(
            verify_proof(&twice, &kp1.public_key()),
            Err(VcError::SignatureMismatch(_))
        ));
        assert!(twice["proof"].is_object());
    }

    #[test]
    fn deterministic_with_fixed_clock() {
        let kp = generate_keys();
        let a = attach_proof(&json!({"x": 1, "y": 2}), &kp, &fixed_options()).unwrap();
        let b = attach_proof(&json!({"y": 2, "x": 1}), &kp, &fixed_options()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn reordered_keys_still_verify() {
        let kp = generate_keys();
        let signed = attach_proof(&json!({"x": 1, "y": {"p": 1, "q": 2}}), &kp, &fixed_options())
            .unwrap();
        let text = serde_json::to_string(&signed).unwrap();
        let reparsed: Document = serde_json::from_str(&text).unwrap();
        let reordered = json!({"y": {"q": 2, "p": 1}, "proof": reparsed["proof"].clone(), "x": 1});
        verify_proof(&reordered, &kp.public_key()).unwrap();
    }

    #[test]
    fn missing_proof() {
        let kp = generate_keys();
        assert!(matches!(
            verify_proof(&json!({"a": 1}), &kp.public_key()),
            Err(VcError::MissingProof)
        ));
        assert!(matches!(
            verify_proof(&json!({"a": 1, "proof": null}), &kp.public_key()),
            Err(VcError::MissingProof)
        ));
    }

    #[test]
    fn non_mapping_rejected() {
        let kp = generate_keys();
        assert!(matches!(
            attach_proof(&json!([1, 2]), &kp, &fixed_options()),
            Err(VcError::NotAMapping)
        ));
        assert!(matches!(
            verify_proof(&json!("s"), &kp.public_key()),
            Err(VcError::NotAMapping)
        ));
    }

    #[test]
    fn unsupported_scheme() {
        let kp = generate_keys();
        let mut signed = attach_proof(&json!({"a": 1}), &kp, &fixed_options()).unwrap();
        signed["proof"]["type"] = json!("RsaSignature2018");
        match verify_proof(&signed, &kp.public_key()) {
            Err(VcError::UnsupportedScheme(name)) => assert_eq!(name, "RsaSignature2018"),
            other => panic!("expected UnsupportedScheme, got {other:?}"),
        }
    }

    #[test]
    fn malformed_proof() {
        let kp = generate_keys();
        let doc = json!({"a": 1, "proof": {"type": "Ed25519Signature2020"}});
        assert!(matches!(
            verify_proof(&doc, &kp.public_key()),
            Err(VcError::MalformedProof(_))
        ));
        let doc = json!({"a": 1, "proof": "deadbeef"});
        assert!(matches!(
            verify_proof(&doc, &kp.public_key()),
            Err(VcError::MalformedProof(_))
        ));
    }

    #[test]
    fn bad_proof_value_is_mismatch() {
        let kp = generate_keys();
        let signed = attach_proof(&json!({"a": 1}), &kp, &fixed_options()).unwrap();

        let mut truncated = signed.clone();
        truncated["proof"]["proofValue"] = json!("abcd");
        assert!(matches!(
            verify_proof(&truncated, &kp.public_key()),
            Err(VcError::SignatureMismatch(_))
        ));

        let mut not_hex = signed;
        not_hex["proof"]["proofValue"] = json!("zz".repeat(64));
        assert!(matches!(
            verify_proof(&not_hex, &kp.public_key()),
            Err(VcError::SignatureMismatch(_))
        ));
    }

    #[test]
    fn tampered_body_is_mismatch() {
        let kp = generate_keys();
        let mut signed = attach_proof(&json!({"a": 1}), &kp, &fixed_options()).unwrap();
        signed["a"] = json!(2);
        assert!(matches!(
            verify_proof(&signed, &kp.public_key()),
            Err(VcError::SignatureMismatch(_))
        ));
    }

    #[test]
    fn tampered_proof_metadata_is_not_signed() {
        // Proof metadata sits outside the signed bytes.
        let kp = generate_keys();
        let mut signed = attach_proof(&json!({"a": 1}), &kp, &fixed_options()).unwrap();
        signed["proof"]["created"] = json!("2030-01-01T00:00:00Z");
        verify_proof(&signed, &kp.public_key()).unwrap();

        signed["proof"]["extra"] = json!(1);
        assert!(matches!(
            verify_proof(&signed, &kp.public_key()),
            Err(VcError::MalformedProof(_))
        ));
    }
}
