//! # Presentation Subcommands
//!
//! `present` bundles signed credentials under a holder proof;
//! `verify-presentation` checks that proof and, given issuer keys, each
//! nested credential.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use url::Url;
use vcsign_crypto::Ed25519PublicKey;
use vcsign_vc::{ProofOptions, VerifiableCredential, VerifiablePresentation};

use crate::config::CliConfig;
use crate::keys::{load_key_pair, load_public_key};
use crate::{read_json, write_json};

/// Arguments for `vcsign present`.
#[derive(Args, Debug, Default)]
pub struct PresentArgs {
    /// Credential documents to bundle, in order.
    #[arg(value_name = "CREDENTIAL", required = true)]
    pub credentials: Vec<PathBuf>,
    /// Holder private key (hex-encoded 32-byte seed).
    #[arg(long)]
    pub key: PathBuf,
    /// Holder URL (defaults to the did:key of the holder key).
    #[arg(long)]
    pub holder: Option<Url>,
    /// Write the presentation here instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Arguments for `vcsign verify-presentation`.
#[derive(Args, Debug, Default)]
pub struct VerifyPresentationArgs {
    /// Signed presentation document.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
    /// Holder public key (hex or did:key).
    #[arg(long)]
    pub pubkey: PathBuf,
    /// Issuer public key for nested credentials. Give one to check every
    /// credential against it, or one per credential in order.
    #[arg(long = "issuer-pubkey", value_name = "FILE")]
    pub issuer_pubkeys: Vec<PathBuf>,
}

pub fn run_present(args: &PresentArgs, config: &CliConfig) -> Result<u8> {
    let key_pair = load_key_pair(&args.key)?;
    let credentials = args
        .credentials
        .iter()
        .map(|path| {
            VerifiableCredential::from_document(read_json(path)?)
                .with_context(|| format!("invalid credential: {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let holder = match &args.holder {
        Some(holder) => holder.clone(),
        None => Url::parse(&key_pair.public_key().did_key()).context("invalid did:key holder")?,
    };
    let unsigned_count = credentials.iter().filter(|c| !c.is_signed()).count();
    if unsigned_count > 0 {
        tracing::warn!(unsigned_count, "bundling credentials without an issuer proof");
    }

    let options = config.proof_options(ProofOptions::authentication());
    let presentation = VerifiablePresentation::from_credentials(credentials, holder)?
        .sign_with(&key_pair, &options)
        .context("failed to sign presentation")?;

    tracing::info!(
        credentials = presentation.credentials().len(),
        holder = ?presentation.holder().map(Url::as_str),
        "signed presentation"
    );
    write_json(&presentation.to_object()?, args.output.as_deref())?;
    Ok(0)
}

pub fn run_verify_presentation(args: &VerifyPresentationArgs) -> Result<u8> {
    let holder_key = load_public_key(&args.pubkey)?;
    let presentation = VerifiablePresentation::new(read_json(&args.file)?)
        .with_context(|| format!("invalid presentation: {}", args.file.display()))?;
    let issuer_keys = args
        .issuer_pubkeys
        .iter()
        .map(|path| load_public_key(path))
        .collect::<Result<Vec<_>>>()?;
    let issuer_keys = assign_issuer_keys(&issuer_keys, presentation.credentials().len())?;

    let mut failures = 0usize;
    match presentation.verify(&holder_key) {
        Ok(()) => println!("OK: presentation proof is valid"),
        Err(e) => {
            println!("FAIL: presentation verification failed: {e}");
            failures += 1;
        }
    }

    for (index, (credential, key)) in presentation
        .credentials()
        .iter()
        .zip(issuer_keys)
        .enumerate()
    {
        let Some(key) = key else { continue };
        match credential.verify(key) {
            Ok(()) => println!("OK: credential {index} is valid"),
            Err(e) => {
                println!("FAIL: credential {index} verification failed: {e}");
                failures += 1;
            }
        }
    }

    tracing::info!(failures, file = %args.file.display(), "presentation checked");
    Ok(if failures == 0 { 0 } else { 1 })
}

/// Pair each nested credential with the key it is checked against.
fn assign_issuer_keys(
    keys: &[Ed25519PublicKey],
    credential_count: usize,
) -> Result<Vec<Option<&Ed25519PublicKey>>> {
    match keys.len() {
        0 => Ok(vec![None; credential_count]),
        1 => Ok(vec![keys.first(); credential_count]),
        n if n == credential_count => Ok(keys.iter().map(Some).collect()),
        n => bail!(
            "got {n} issuer keys for {credential_count} credentials; give one key or one per credential"
        ),
    }
}
