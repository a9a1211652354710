//! Credentials validated against a separately signed schema credential.

use std::sync::Arc;

use serde_json::{json, Value};
use vcsign_crypto::{generate_keys, Ed25519KeyPair};
use vcsign_schema::{EvaluationError, SchemaEvaluator, META_SCHEMA_ID};
use vcsign_vc::{
    bind, verify_proof, SchemaBinding, SchemaError, SignedSchema, VcError, VerifiableCredential,
};

fn membership_schema() -> Value {
    json!({
        "$schema": META_SCHEMA_ID,
        "$id": "https://schemas.vcsign.dev/membership.json",
        "type": "object",
        "properties": {
            "id": {"type": "string"},
            "level": {"enum": ["bronze", "silver", "gold"]}
        },
        "required": ["id", "level"]
    })
}

/// A schema credential signed by `authority`, plus the authority key.
fn signed_schema(authority: &Ed25519KeyPair) -> SignedSchema {
    let schema_vc = VerifiableCredential::create(membership_schema(), SchemaBinding::SelfDescribing)
        .unwrap()
        .sign(authority)
        .unwrap();
    SignedSchema::new(schema_vc, authority.public_key())
}

fn member(level: &str) -> Value {
    json!({
        "issuer": "did:example:club",
        "credentialSubject": {"id": "did:example:alice", "level": level}
    })
}

#[test]
fn delegated_schema_sign_and_verify() {
    let authority = generate_keys();
    let issuer = generate_keys();

    let vc = VerifiableCredential::new(member("gold"), signed_schema(&authority).into()).unwrap();
    let signed = vc.sign(&issuer).unwrap();
    signed.verify(&issuer.public_key()).unwrap();
}

#[test]
fn schema_credential_is_self_describing_after_transport() {
    let authority = generate_keys();
    let schema = signed_schema(&authority);
    let transported =
        VerifiableCredential::from_document(schema.credential().to_object().unwrap()).unwrap();
    assert!(matches!(transported.binding(), SchemaBinding::SelfDescribing));
    transported.verify(&authority.public_key()).unwrap();
}

#[test]
fn subject_violating_schema_fails_to_sign() {
    let authority = generate_keys();
    let issuer = generate_keys();
    let vc = VerifiableCredential::new(member("platinum"), signed_schema(&authority).into()).unwrap();

    match vc.sign(&issuer) {
        Err(VcError::Schema(SchemaError::SchemaValidationFailed(violations))) => {
            assert_eq!(violations.violations()[0].instance_path, "/level");
        }
        other => panic!("expected SchemaValidationFailed, got {other:?}"),
    }
}

#[test]
fn wrong_authority_key_is_schema_signature_invalid() {
    let authority = generate_keys();
    let impostor = generate_keys();
    let schema_vc = signed_schema(&authority).credential().clone();
    let binding = SignedSchema::new(schema_vc, impostor.public_key());

    let result = bind(member("gold"), binding.into());
    assert!(matches!(
        result,
        Err(VcError::Schema(SchemaError::SchemaSignatureInvalid(_)))
    ));
}

#[test]
fn unsigned_schema_credential_is_not_trusted() {
    let authority = generate_keys();
    let unsigned = VerifiableCredential::create(membership_schema(), SchemaBinding::SelfDescribing)
        .unwrap();
    let binding = SignedSchema::new(unsigned, authority.public_key());

    match bind(member("gold"), binding.into()) {
        Err(VcError::Schema(SchemaError::SchemaSignatureInvalid(cause))) => {
            assert!(matches!(*cause, VcError::MissingProof));
        }
        other => panic!("expected SchemaSignatureInvalid, got {other:?}"),
    }
}

#[test]
fn corrupted_schema_proof_flips_outcome_but_credential_signature_holds() {
    let authority = generate_keys();
    let issuer = generate_keys();
    let schema = signed_schema(&authority);

    let signed = VerifiableCredential::new(member("silver"), schema.clone().into())
        .unwrap()
        .sign(&issuer)
        .unwrap();
    signed.verify(&issuer.public_key()).unwrap();

    let mut schema_doc = schema.credential().to_object().unwrap();
    let proof_value = schema_doc["proof"]["proofValue"].as_str().unwrap().to_string();
    let flipped = if proof_value.starts_with('0') { "1" } else { "0" };
    schema_doc["proof"]["proofValue"] = json!(format!("{flipped}{}", &proof_value[1..]));
    let corrupted = SignedSchema::new(
        VerifiableCredential::from_document(schema_doc).unwrap(),
        authority.public_key(),
    );

    let rebound = VerifiableCredential::new(signed.to_object().unwrap(), corrupted.into()).unwrap();
    match rebound.verify(&issuer.public_key()) {
        Err(VcError::Schema(SchemaError::SchemaSignatureInvalid(cause))) => {
            assert!(matches!(*cause, VcError::SignatureMismatch(_)));
        }
        other => panic!("expected SchemaSignatureInvalid, got {other:?}"),
    }
    verify_proof(&rebound.to_object().unwrap(), &issuer.public_key()).unwrap();
}

#[test]
fn tampered_subject_that_still_conforms_is_a_signature_failure() {
    let authority = generate_keys();
    let issuer = generate_keys();
    let schema = signed_schema(&authority);
    let signed = VerifiableCredential::new(member("bronze"), schema.clone().into())
        .unwrap()
        .sign(&issuer)
        .unwrap();

    let mut doc = signed.to_object().unwrap();
    doc["credentialSubject"]["level"] = json!("gold");
    let tampered = VerifiableCredential::new(doc, schema.into()).unwrap();
    assert!(matches!(
        tampered.verify(&issuer.public_key()),
        Err(VcError::SignatureMismatch(_))
    ));
}

#[test]
fn inline_schema_rechecked_at_verify() {
    let issuer = generate_keys();
    let loose = json!({"type": "object"});
    let strict = json!({"type": "object", "required": ["level", "expiresAt"]});

    let signed = VerifiableCredential::new(member("gold"), SchemaBinding::Inline(loose))
        .unwrap()
        .sign(&issuer)
        .unwrap();
    let rebound =
        VerifiableCredential::new(signed.to_object().unwrap(), SchemaBinding::Inline(strict)).unwrap();

    match rebound.verify(&issuer.public_key()) {
        Err(VcError::Schema(SchemaError::SchemaValidationFailed(v))) => assert_eq!(v.len(), 1),
        other => panic!("expected SchemaValidationFailed, got {other:?}"),
    }
}

#[test]
fn self_describing_subject_must_be_a_schema() {
    let k = generate_keys();
    let vc = VerifiableCredential::create(json!({"type": 12}), SchemaBinding::SelfDescribing).unwrap();
    assert!(matches!(
        vc.sign(&k),
        Err(VcError::Schema(SchemaError::InvalidSchema(_)))
    ));
}

#[test]
fn unbound_credential_skips_structural_checks() {
    let k = generate_keys();
    let vc = bind(json!({"issuer": "urn:uuid:X", "credentialSubject": 42}), SchemaBinding::None)
        .unwrap();
    vc.sign(&k).unwrap().verify(&k.public_key()).unwrap();
}

#[derive(Debug)]
struct RejectEverything;

impl SchemaEvaluator for RejectEverything {
    fn validate(&self, _schema: &Value, _instance: &Value) -> Result<(), EvaluationError> {
        Err(EvaluationError::InvalidSchema("rejected".into()))
    }

    fn check_schema(&self, _candidate: &Value) -> Result<(), EvaluationError> {
        Err(EvaluationError::InvalidSchema("rejected".into()))
    }
}

#[test]
fn evaluator_is_pluggable() {
    let k = generate_keys();
    let vc = VerifiableCredential::new(member("gold"), SchemaBinding::Inline(json!({})))
        .unwrap()
        .with_evaluator(Arc::new(RejectEverything));
    assert!(matches!(
        vc.sign(&k),
        Err(VcError::Schema(SchemaError::InvalidSchema(_)))
    ));
}
