//! # Credential Subcommands
//!
//! `create`, `sign`, and `verify` for single credentials.
//!
//! The governing schema is chosen with one of `--schema <FILE>` (inline
//! JSON-Schema), `--signed-schema <FILE> --schema-pubkey <FILE>` (a schema
//! credential trusted only if its proof verifies), or `--self-describing`.
//! With none of these the subject is not structurally checked, except that
//! a credential whose `credentialSchema` names the meta-schema is always
//! checked as a schema.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use url::Url;
use vcsign_core::Timestamp;
use vcsign_vc::{
    bind, ProofOptions, SchemaBinding, SignedSchema, VerifiableCredential,
    VerifiableCredentialBuilder,
};

use crate::config::CliConfig;
use crate::keys::{load_key_pair, load_public_key};
use crate::{read_json, write_json};

/// Where the governing schema comes from.
#[derive(Args, Debug, Default, Clone)]
pub struct SchemaArgs {
    /// Inline JSON-Schema document governing the subject.
    #[arg(long, value_name = "FILE", conflicts_with_all = ["signed_schema", "self_describing"])]
    pub schema: Option<PathBuf>,
    /// Signed credential whose subject is the governing schema.
    #[arg(long, value_name = "FILE", requires = "schema_pubkey", conflicts_with = "self_describing")]
    pub signed_schema: Option<PathBuf>,
    /// Public key (hex or did:key) of the signed schema's issuer.
    #[arg(long, value_name = "FILE", requires = "signed_schema")]
    pub schema_pubkey: Option<PathBuf>,
    /// The subject is itself a JSON-Schema, checked against the meta-schema.
    #[arg(long)]
    pub self_describing: bool,
}

impl SchemaArgs {
    pub fn binding(&self) -> Result<SchemaBinding> {
        if let Some(path) = &self.schema {
            return Ok(SchemaBinding::Inline(read_json(path)?));
        }
        if let (Some(path), Some(key_path)) = (&self.signed_schema, &self.schema_pubkey) {
            let credential = VerifiableCredential::from_document(read_json(path)?)
                .with_context(|| format!("invalid schema credential: {}", path.display()))?;
            let public_key = load_public_key(key_path)?;
            tracing::debug!(schema = %path.display(), "using signed schema");
            return Ok(SignedSchema::new(credential, public_key).into());
        }
        if self.self_describing {
            return Ok(SchemaBinding::SelfDescribing);
        }
        Ok(SchemaBinding::None)
    }
}

/// Arguments for `vcsign create`.
#[derive(Args, Debug, Default)]
pub struct CreateArgs {
    /// JSON document to use as `credentialSubject`.
    #[arg(value_name = "SUBJECT")]
    pub subject: PathBuf,
    #[command(flatten)]
    pub schema: SchemaArgs,
    /// Issuer URL (defaults to a random urn:uuid).
    #[arg(long)]
    pub issuer: Option<Url>,
    /// Credential id (defaults to a random urn:uuid).
    #[arg(long)]
    pub id: Option<Url>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Additional credential type. Repeatable.
    #[arg(long = "type", value_name = "TYPE")]
    pub types: Vec<String>,
    /// Start of validity, RFC 3339 UTC (e.g. 2026-01-01T00:00:00Z).
    #[arg(long, value_parser = parse_timestamp)]
    pub valid_from: Option<Timestamp>,
    /// End of validity, RFC 3339 UTC.
    #[arg(long, value_parser = parse_timestamp)]
    pub valid_until: Option<Timestamp>,
    /// Write the credential here instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Arguments for `vcsign sign`.
#[derive(Args, Debug, Default)]
pub struct SignArgs {
    /// Credential document to sign.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
    /// Issuer private key (hex-encoded 32-byte seed).
    #[arg(long)]
    pub key: PathBuf,
    #[command(flatten)]
    pub schema: SchemaArgs,
    /// Write the signed credential here instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Arguments for `vcsign verify`.
#[derive(Args, Debug, Default)]
pub struct VerifyArgs {
    /// Signed credential document.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
    /// Issuer public key (hex or did:key).
    #[arg(long)]
    pub pubkey: PathBuf,
    #[command(flatten)]
    pub schema: SchemaArgs,
}

fn parse_timestamp(s: &str) -> Result<Timestamp, String> {
    Timestamp::parse(s).map_err(|e| e.to_string())
}

/// Build an unsigned credential around a subject.
pub fn run_create(args: &CreateArgs) -> Result<u8> {
    let subject = read_json(&args.subject)?;
    let binding = args.schema.binding()?;

    let mut builder = match &binding {
        SchemaBinding::None => VerifiableCredentialBuilder::without_schema(subject)?,
        bound => {
            let schema_id = bound.schema_id().context("schema has no $id")?;
            VerifiableCredentialBuilder::new(subject, &schema_id)?
        }
    };
    if let Some(issuer) = &args.issuer {
        builder = builder.issuer(issuer.clone());
    }
    if args.id.is_some() {
        builder = builder.id(args.id.clone());
    }
    if let Some(name) = &args.name {
        builder = builder.name(name.clone());
    }
    if let Some(description) = &args.description {
        builder = builder.description(description.clone());
    }
    for credential_type in &args.types {
        builder = builder.add_type(credential_type.clone());
    }
    if let Some(from) = args.valid_from {
        builder = builder.valid_from(*from.as_datetime());
    }
    if let Some(until) = args.valid_until {
        builder = builder.valid_until(*until.as_datetime());
    }

    let document = builder.build()?.to_object()?;
    let credential =
        bind(document, binding).context("credential subject does not satisfy its schema")?;

    tracing::info!(issuer = %credential.issuer(), "created credential");
    write_json(&credential.to_object()?, args.output.as_deref())?;
    Ok(0)
}

/// Attach an issuer proof to a credential.
pub fn run_sign(args: &SignArgs, config: &CliConfig) -> Result<u8> {
    let key_pair = load_key_pair(&args.key)?;
    let credential = load_credential(&args.file, &args.schema)?;
    let options = config.proof_options(ProofOptions::assertion());

    let signed = credential
        .sign_with(&key_pair, &options)
        .with_context(|| format!("failed to sign {}", args.file.display()))?;

    tracing::info!(
        file = %args.file.display(),
        purpose = %options.proof_purpose,
        replaced = credential.is_signed(),
        "signed credential"
    );
    write_json(&signed.to_object()?, args.output.as_deref())?;
    Ok(0)
}

/// Check the credential proof, then its schema.
pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let public_key = load_public_key(&args.pubkey)?;
    let credential = load_credential(&args.file, &args.schema)?;

    match credential.verify(&public_key) {
        Ok(()) => {
            tracing::info!(file = %args.file.display(), "credential verified");
            println!("OK: credential is valid");
            Ok(0)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "credential verification failed");
            println!("FAIL: credential verification failed: {e}");
            Ok(1)
        }
    }
}

fn load_credential(path: &Path, schema: &SchemaArgs) -> Result<VerifiableCredential> {
    let document = read_json(path)?;
    VerifiableCredential::new(document, schema.binding()?)
        .with_context(|| format!("invalid credential: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::cmd_keygen;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
        path
    }

    fn read(path: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    fn age_schema() -> Value {
        json!({
            "$id": "https://schemas.example/age",
            "type": "object",
            "properties": {"age": {"type": "integer", "minimum": 0}},
            "required": ["age"]
        })
    }

    fn verify_args(file: PathBuf, pubkey: PathBuf) -> VerifyArgs {
        VerifyArgs {
            file,
            pubkey,
            schema: SchemaArgs::default(),
        }
    }

    #[test]
    fn create_sign_verify_flow() {
        let dir = tempfile::tempdir().unwrap();
        cmd_keygen(dir.path(), "issuer").unwrap();
        let subject = write(&dir, "subject.json", &json!({"age": 30}));
        let schema = write(&dir, "schema.json", &age_schema());
        let unsigned = dir.path().join("unsigned.json");
        let signed = dir.path().join("signed.json");

        let create = CreateArgs {
            subject,
            schema: SchemaArgs {
                schema: Some(schema.clone()),
                ..SchemaArgs::default()
            },
            issuer: Some(Url::parse("did:example:issuer").unwrap()),
            name: Some("Age".to_string()),
            types: vec!["AgeCredential".to_string()],
            output: Some(unsigned.clone()),
            ..CreateArgs::default()
        };
        assert_eq!(run_create(&create).unwrap(), 0);
        let doc = read(&unsigned);
        assert_eq!(doc["issuer"], "did:example:issuer");
        assert_eq!(doc["credentialSchema"]["id"], "https://schemas.example/age");
        assert_eq!(doc["type"], json!(["VerifiableCredential", "AgeCredential"]));
        assert!(doc.get("proof").is_none());

        let sign = SignArgs {
            file: unsigned,
            key: dir.path().join("issuer.key"),
            schema: SchemaArgs {
                schema: Some(schema.clone()),
                ..SchemaArgs::default()
            },
            output: Some(signed.clone()),
        };
        assert_eq!(run_sign(&sign, &CliConfig::default()).unwrap(), 0);
        assert_eq!(read(&signed)["proof"]["proofPurpose"], "assertionMethod");

        let verify = VerifyArgs {
            schema: SchemaArgs {
                schema: Some(schema),
                ..SchemaArgs::default()
            },
            ..verify_args(signed, dir.path().join("issuer.pub"))
        };
        assert_eq!(run_verify(&verify).unwrap(), 0);
    }

    #[test]
    fn create_rejects_nonconforming_subject() {
        let dir = tempfile::tempdir().unwrap();
        let create = CreateArgs {
            subject: write(&dir, "subject.json", &json!({"age": -1})),
            schema: SchemaArgs {
                schema: Some(write(&dir, "schema.json", &age_schema())),
                ..SchemaArgs::default()
            },
            output: Some(dir.path().join("out.json")),
            ..CreateArgs::default()
        };
        assert!(run_create(&create).is_err());
        assert!(!dir.path().join("out.json").exists());
    }

    #[test]
    fn verify_fails_on_tamper_and_wrong_key() {
        let dir = tempfile::tempdir().unwrap();
        cmd_keygen(dir.path(), "issuer").unwrap();
        cmd_keygen(dir.path(), "other").unwrap();
        let unsigned = write(
            &dir,
            "vc.json",
            &json!({"issuer": "did:example:issuer", "credentialSubject": {"age": 30}}),
        );
        let signed = dir.path().join("signed.json");
        let sign = SignArgs {
            file: unsigned,
            key: dir.path().join("issuer.key"),
            output: Some(signed.clone()),
            ..SignArgs::default()
        };
        run_sign(&sign, &CliConfig::default()).unwrap();

        let wrong_key = verify_args(signed.clone(), dir.path().join("other.pub"));
        assert_eq!(run_verify(&wrong_key).unwrap(), 1);

        let mut tampered = read(&signed);
        tampered["credentialSubject"]["age"] = json!(31);
        let tampered = write(&dir, "tampered.json", &tampered);
        let args = verify_args(tampered, dir.path().join("issuer.pub"));
        assert_eq!(run_verify(&args).unwrap(), 1);
    }

    #[test]
    fn verify_unsigned_fails() {
        let dir = tempfile::tempdir().unwrap();
        cmd_keygen(dir.path(), "issuer").unwrap();
        let unsigned = write(
            &dir,
            "vc.json",
            &json!({"issuer": "did:example:issuer", "credentialSubject": {}}),
        );
        let args = verify_args(unsigned, dir.path().join("issuer.pub"));
        assert_eq!(run_verify(&args).unwrap(), 1);
    }

    #[test]
    fn signed_schema_trust_chain() {
        let dir = tempfile::tempdir().unwrap();
        cmd_keygen(dir.path(), "authority").unwrap();
        cmd_keygen(dir.path(), "issuer").unwrap();

        // Schema credential, self-describing, signed by the authority.
        let schema_unsigned = dir.path().join("schema-unsigned.json");
        let create = CreateArgs {
            subject: write(&dir, "schema.json", &age_schema()),
            schema: SchemaArgs {
                self_describing: true,
                ..SchemaArgs::default()
            },
            output: Some(schema_unsigned.clone()),
            ..CreateArgs::default()
        };
        run_create(&create).unwrap();
        let schema_vc = dir.path().join("schema-vc.json");
        let sign = SignArgs {
            file: schema_unsigned,
            key: dir.path().join("authority.key"),
            output: Some(schema_vc.clone()),
            ..SignArgs::default()
        };
        run_sign(&sign, &CliConfig::default()).unwrap();

        let delegated = |pubkey: &str| SchemaArgs {
            signed_schema: Some(schema_vc.clone()),
            schema_pubkey: Some(dir.path().join(pubkey)),
            ..SchemaArgs::default()
        };

        let signed = dir.path().join("signed.json");
        let sign = SignArgs {
            file: write(
                &dir,
                "vc.json",
                &json!({"issuer": "did:example:issuer", "credentialSubject": {"age": 30}}),
            ),
            key: dir.path().join("issuer.key"),
            schema: delegated("authority.pub"),
            output: Some(signed.clone()),
        };
        run_sign(&sign, &CliConfig::default()).unwrap();

        let trusted = VerifyArgs {
            schema: delegated("authority.pub"),
            ..verify_args(signed.clone(), dir.path().join("issuer.pub"))
        };
        assert_eq!(run_verify(&trusted).unwrap(), 0);

        // Right credential key, wrong authority key: the schema is untrusted.
        let untrusted = VerifyArgs {
            schema: delegated("issuer.pub"),
            ..verify_args(signed, dir.path().join("issuer.pub"))
        };
        assert_eq!(run_verify(&untrusted).unwrap(), 1);
    }

    #[test]
    fn config_overrides_proof_options() {
        let dir = tempfile::tempdir().unwrap();
        cmd_keygen(dir.path(), "issuer").unwrap();
        let signed = dir.path().join("signed.json");
        let sign = SignArgs {
            file: write(
                &dir,
                "vc.json",
                &json!({"issuer": "did:example:issuer", "credentialSubject": {}}),
            ),
            key: dir.path().join("issuer.key"),
            output: Some(signed.clone()),
            ..SignArgs::default()
        };
        let config = CliConfig::from_yaml(
            "proof_purpose: capabilityDelegation\nverification_method: did:example:issuer#key-1\n",
        )
        .unwrap();
        run_sign(&sign, &config).unwrap();

        let proof = &read(&signed)["proof"];
        assert_eq!(proof["proofPurpose"], "capabilityDelegation");
        assert_eq!(proof["verificationMethod"], "did:example:issuer#key-1");
        assert_eq!(
            run_verify(&verify_args(signed, dir.path().join("issuer.pub"))).unwrap(),
            0
        );
    }

    #[test]
    fn timestamps_must_be_utc() {
        assert!(parse_timestamp("2026-01-01T00:00:00Z").is_ok());
        assert!(parse_timestamp("2026-01-01T00:00:00+02:00").is_err());
    }
}
