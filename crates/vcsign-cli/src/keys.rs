//! # Keygen Subcommand
//!
//! Ed25519 key pairs on disk as lowercase hex: `<prefix>.key` holds the
//! 32-byte seed, `<prefix>.pub` the 32-byte public key.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use vcsign_crypto::{generate_keys, Ed25519KeyPair, Ed25519PublicKey};

/// Arguments for `vcsign keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Output directory for the key files.
    #[arg(long, short, default_value = ".")]
    pub output: PathBuf,
    /// Prefix for the key filenames.
    #[arg(long, default_value = "vcsign")]
    pub prefix: String,
}

pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    cmd_keygen(&args.output, &args.prefix)
}

/// Generate a fresh key pair and write both halves under `output_dir`.
pub fn cmd_keygen(output_dir: &Path, prefix: &str) -> Result<u8> {
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "failed to create output directory: {}",
            output_dir.display()
        )
    })?;

    let key_pair = generate_keys();
    let public_key = key_pair.public_key();
    let pub_hex = public_key.to_hex();

    let key_path = output_dir.join(format!("{prefix}.key"));
    let pub_path = output_dir.join(format!("{prefix}.pub"));

    std::fs::write(&key_path, key_pair.private_hex())
        .with_context(|| format!("failed to write private key: {}", key_path.display()))?;
    std::fs::write(&pub_path, &pub_hex)
        .with_context(|| format!("failed to write public key: {}", pub_path.display()))?;

    tracing::info!(key = %key_path.display(), public = %pub_path.display(), "generated key pair");

    println!("OK: generated Ed25519 keypair");
    println!("  Private key: {}", key_path.display());
    println!("  Public key:  {}", pub_path.display());
    println!("  Public key (hex): {pub_hex}");
    println!("  did:key: {}", public_key.did_key());

    Ok(0)
}

/// Read a hex-encoded private key file.
pub fn load_key_pair(path: &Path) -> Result<Ed25519KeyPair> {
    if !path.exists() {
        bail!("private key file not found: {}", path.display());
    }
    let hex = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read private key: {}", path.display()))?;
    let key_pair = Ed25519KeyPair::from_hex(hex.trim())
        .with_context(|| format!("invalid private key: {}", path.display()))?;
    tracing::debug!(path = %path.display(), public = %key_pair.public_key(), "loaded private key");
    Ok(key_pair)
}

/// Read a public key file: lowercase hex, or a `did:key` identifier.
pub fn load_public_key(path: &Path) -> Result<Ed25519PublicKey> {
    if !path.exists() {
        bail!("public key file not found: {}", path.display());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read public key: {}", path.display()))?;
    let content = content.trim();
    let public_key = if content.starts_with("did:key:") {
        Ed25519PublicKey::from_did_key(content)
    } else {
        Ed25519PublicKey::from_hex(content)
    }
    .with_context(|| format!("invalid public key: {}", path.display()))?;
    Ok(public_key)
}
