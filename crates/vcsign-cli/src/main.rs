//! # vcsign CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vcsign_cli::config::CliConfig;
use vcsign_cli::credential::{run_create, run_sign, run_verify, CreateArgs, SignArgs, VerifyArgs};
use vcsign_cli::keys::{run_keygen, KeygenArgs};
use vcsign_cli::presentation::{
    run_present, run_verify_presentation, PresentArgs, VerifyPresentationArgs,
};

/// Sign and verify W3C Verifiable Credentials with Ed25519.
///
/// Documents are canonicalized before signing, so key order and whitespace
/// never affect a proof. Credentials can be bound to a JSON-Schema, either
/// inline or carried by a separately signed schema credential.
#[derive(Parser, Debug)]
#[command(name = "vcsign", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a new Ed25519 key pair.
    Keygen(KeygenArgs),

    /// Build an unsigned credential around a subject document.
    Create(CreateArgs),

    /// Attach an issuer proof to a credential.
    Sign(SignArgs),

    /// Verify a credential's proof and schema.
    Verify(VerifyArgs),

    /// Bundle signed credentials into a holder-signed presentation.
    Present(PresentArgs),

    /// Verify a presentation proof and, optionally, its credentials.
    VerifyPresentation(VerifyPresentationArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "vcsign starting");

    let result = CliConfig::load(cli.config.as_deref()).and_then(|config| {
        tracing::debug!(?config, "loaded configuration");
        match &cli.command {
            Commands::Keygen(args) => run_keygen(args),
            Commands::Create(args) => run_create(args),
            Commands::Sign(args) => run_sign(args, &config),
            Commands::Verify(args) => run_verify(args),
            Commands::Present(args) => run_present(args, &config),
            Commands::VerifyPresentation(args) => run_verify_presentation(args),
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_keygen_defaults() {
        let cli = Cli::try_parse_from(["vcsign", "keygen"]).unwrap();
        if let Commands::Keygen(args) = cli.command {
            assert_eq!(args.output, PathBuf::from("."));
            assert_eq!(args.prefix, "vcsign");
        } else {
            panic!("expected keygen");
        }
    }

    #[test]
    fn cli_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "vcsign", "verify", "vc.json", "--pubkey", "issuer.pub", "-vv", "--config", "c.yaml",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("c.yaml")));
        if let Commands::Verify(args) = cli.command {
            assert_eq!(args.file, PathBuf::from("vc.json"));
            assert!(args.schema.schema.is_none());
        } else {
            panic!("expected verify");
        }
    }

    #[test]
    fn cli_parse_signed_schema_requires_pubkey() {
        assert!(Cli::try_parse_from([
            "vcsign", "verify", "vc.json", "--pubkey", "i.pub", "--signed-schema", "s.json",
        ])
        .is_err());

        let cli = Cli::try_parse_from([
            "vcsign",
            "verify",
            "vc.json",
            "--pubkey",
            "i.pub",
            "--signed-schema",
            "s.json",
            "--schema-pubkey",
            "a.pub",
        ])
        .unwrap();
        if let Commands::Verify(args) = cli.command {
            assert_eq!(args.schema.signed_schema, Some(PathBuf::from("s.json")));
            assert_eq!(args.schema.schema_pubkey, Some(PathBuf::from("a.pub")));
        }
    }

    #[test]
    fn cli_parse_schema_sources_conflict() {
        assert!(Cli::try_parse_from([
            "vcsign",
            "create",
            "subject.json",
            "--schema",
            "s.json",
            "--self-describing",
        ])
        .is_err());
    }

    #[test]
    fn cli_parse_create_options() {
        let cli = Cli::try_parse_from([
            "vcsign",
            "create",
            "subject.json",
            "--issuer",
            "did:example:issuer",
            "--type",
            "AgeCredential",
            "--type",
            "KycCredential",
            "--valid-from",
            "2026-01-01T00:00:00Z",
        ])
        .unwrap();
        if let Commands::Create(args) = cli.command {
            assert_eq!(args.issuer.unwrap().as_str(), "did:example:issuer");
            assert_eq!(args.types, vec!["AgeCredential", "KycCredential"]);
            assert_eq!(args.valid_from.unwrap().to_iso8601(), "2026-01-01T00:00:00Z");
        } else {
            panic!("expected create");
        }

        assert!(Cli::try_parse_from([
            "vcsign",
            "create",
            "subject.json",
            "--valid-from",
            "2026-01-01T00:00:00+01:00",
        ])
        .is_err());
    }

    #[test]
    fn cli_parse_present_requires_credentials() {
        assert!(Cli::try_parse_from(["vcsign", "present", "--key", "h.key"]).is_err());

        let cli = Cli::try_parse_from([
            "vcsign",
            "verify-presentation",
            "vp.json",
            "--pubkey",
            "h.pub",
            "--issuer-pubkey",
            "a.pub",
            "--issuer-pubkey",
            "b.pub",
        ])
        .unwrap();
        if let Commands::VerifyPresentation(args) = cli.command {
            assert_eq!(args.issuer_pubkeys.len(), 2);
        } else {
            panic!("expected verify-presentation");
        }
    }
}
