//! # vcsign-cli — the `vcsign` Command
//!
//! Thin file-based wrapper over `vcsign-vc`. Keys live on disk as lowercase
//! hex (`<prefix>.key` holds the 32-byte seed, `<prefix>.pub` the 32-byte
//! public key); documents are JSON.
//!
//! ## Subcommands
//!
//! ```bash
//! vcsign keygen --prefix issuer
//! vcsign create subject.json --schema schema.json -o unsigned.json
//! vcsign sign unsigned.json --key issuer.key -o signed.json
//! vcsign verify signed.json --pubkey issuer.pub
//! vcsign present signed.json --key holder.key -o vp.json
//! vcsign verify-presentation vp.json --pubkey holder.pub --issuer-pubkey issuer.pub
//! ```
//!
//! Every handler returns the process exit code: `0` on success, `1` when a
//! verification fails. I/O and parse errors propagate as `anyhow::Error`.

pub mod config;
pub mod credential;
pub mod keys;
pub mod presentation;

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

/// Read and parse a JSON document.
pub fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse JSON: {}", path.display()))
}

/// Write `value` as pretty JSON to `output`, or to stdout when absent.
pub fn write_json(value: &Value, output: Option<&Path>) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    match output {
        Some(path) => {
            std::fs::write(path, text + "\n")
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote document");
        }
        None => println!("{text}"),
    }
    Ok(())
}
