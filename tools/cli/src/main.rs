//! Strongbox CLI - command line front end for the crypto core.
//!
//! Each subcommand maps onto one core operation. Secrets are prompted for
//! or read from a named environment variable, never taken from argv.
//! Results go to stdout and logs to stderr, so output can be piped.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use zeroize::Zeroizing;

use strongbox_crypto::{CryptoConfig, Strongbox};

#[derive(Parser)]
#[command(name = "strongbox")]
#[command(about = "Strongbox - passphrase encryption and password hashing")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON file overriding the PBKDF2 iteration counts.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SecretArgs {
    /// Read the secret from this environment variable instead of prompting.
    #[arg(long, value_name = "VAR")]
    secret_env: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt text into a base-64 envelope.
    Encrypt {
        /// Text to encrypt (default: read stdin verbatim).
        #[arg(short, long)]
        text: Option<String>,

        #[command(flatten)]
        secret: SecretArgs,
    },

    /// Decrypt a base-64 envelope.
    Decrypt {
        /// Envelope to decrypt (default: read stdin).
        #[arg(short, long)]
        package: Option<String>,

        #[command(flatten)]
        secret: SecretArgs,
    },

    /// Hash a password for storage.
    Hash {
        #[command(flatten)]
        secret: SecretArgs,
    },

    /// Verify a password against a stored hash; exits with status 1 on mismatch.
    Verify {
        /// Stored base-64 password hash.
        #[arg(short, long)]
        stored: String,

        #[command(flatten)]
        secret: SecretArgs,
    },

    /// Print the effective configuration as JSON.
    ShowConfig,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(cli.verbose))
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let service = load_service(cli.config.as_deref())?;

    match cli.command {
        Commands::Encrypt { text, secret } => cmd_encrypt(&service, text, &secret),
        Commands::Decrypt { package, secret } => cmd_decrypt(&service, package, &secret),
        Commands::Hash { secret } => cmd_hash(&service, &secret),
        Commands::Verify { stored, secret } => cmd_verify(&service, &stored, &secret),
        Commands::ShowConfig => cmd_show_config(&service),
    }
}

/// `--verbose` forces debug output; otherwise `RUST_LOG` applies, defaulting to info.
fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Build the service from an optional configuration file.
fn load_service(path: Option<&Path>) -> Result<Strongbox> {
    let config = match path {
        Some(path) => {
            let config = CryptoConfig::load(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            info!("Using configuration from {}", path.display());
            config
        }
        None => CryptoConfig::default(),
    };

    Strongbox::new(config).context("Invalid configuration")
}

/// Obtain a secret from the environment or an interactive prompt.
fn read_secret(args: &SecretArgs, prompt: &str, confirm: bool) -> Result<Zeroizing<String>> {
    if let Some(var) = &args.secret_env {
        debug!("Reading secret from environment variable {}", var);
        let value = std::env::var(var)
            .with_context(|| format!("Environment variable {} is not set", var))?;
        return Ok(Zeroizing::new(value));
    }

    let secret = Zeroizing::new(rpassword::prompt_password(prompt).context("Failed to read secret")?);

    if confirm {
        let again = Zeroizing::new(
            rpassword::prompt_password("Confirm: ").context("Failed to read secret")?,
        );
        if *secret != *again {
            anyhow::bail!("Secrets do not match");
        }
        if secret.is_empty() {
            anyhow::bail!("Secret cannot be empty");
        }
    }

    Ok(secret)
}

/// Take an argument value or fall back to all of stdin.
fn read_input(value: Option<String>) -> Result<Zeroizing<String>> {
    match value {
        Some(value) => Ok(Zeroizing::new(value)),
        None => {
            let mut buf = Zeroizing::new(String::new());
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Encrypt text.
fn cmd_encrypt(service: &Strongbox, text: Option<String>, secret: &SecretArgs) -> Result<ExitCode> {
    let plaintext = read_input(text)?;
    let secret = read_secret(secret, "Enter passphrase: ", true)?;

    let package = service
        .encrypt(&plaintext, &secret)
        .context("Encryption failed")?;

    println!("{}", package);
    Ok(ExitCode::SUCCESS)
}

/// Decrypt an envelope.
fn cmd_decrypt(service: &Strongbox, package: Option<String>, secret: &SecretArgs) -> Result<ExitCode> {
    let package = read_input(package)?;
    let secret = read_secret(secret, "Enter passphrase: ", false)?;

    let plaintext = Zeroizing::new(
        service
            .decrypt(package.trim(), &secret)
            .map_err(|e| anyhow::anyhow!("{}: {}", e.kind(), e))
            .context("Decryption failed")?,
    );

    let mut stdout = io::stdout().lock();
    stdout.write_all(plaintext.as_bytes())?;
    stdout.flush()?;
    Ok(ExitCode::SUCCESS)
}

/// Hash a password.
fn cmd_hash(service: &Strongbox, secret: &SecretArgs) -> Result<ExitCode> {
    let password = read_secret(secret, "Enter password: ", true)?;

    let stored = service
        .hash_password(&password)
        .context("Password hashing failed")?;

    println!("{}", stored);
    Ok(ExitCode::SUCCESS)
}

/// Verify a password.
fn cmd_verify(service: &Strongbox, stored: &str, secret: &SecretArgs) -> Result<ExitCode> {
    let password = read_secret(secret, "Enter password: ", false)?;

    if service.verify_password(&password, stored.trim()) {
        println!("Password matches.");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Password does not match.");
        Ok(ExitCode::from(1))
    }
}

/// Show the active configuration.
fn cmd_show_config(service: &Strongbox) -> Result<ExitCode> {
    println!("{}", service.config().to_json()?);
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_encrypt() {
        let cli = Cli::try_parse_from([
            "strongbox",
            "encrypt",
            "--text",
            "hello",
            "--secret-env",
            "SB_SECRET",
        ])
        .unwrap();

        match cli.command {
            Commands::Encrypt { text, secret } => {
                assert_eq!(text.as_deref(), Some("hello"));
                assert_eq!(secret.secret_env.as_deref(), Some("SB_SECRET"));
            }
            _ => panic!("expected encrypt"),
        }
    }

    #[test]
    fn test_parse_verify_requires_stored() {
        assert!(Cli::try_parse_from(["strongbox", "verify"]).is_err());
        assert!(Cli::try_parse_from(["strongbox", "verify", "--stored", "abc"]).is_ok());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["strongbox", "hash", "-v", "--config", "cfg.json"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("cfg.json")));
    }

    #[test]
    fn test_secret_from_env() {
        std::env::set_var("STRONGBOX_CLI_TEST_SECRET", "s3cret");
        let args = SecretArgs {
            secret_env: Some("STRONGBOX_CLI_TEST_SECRET".to_string()),
        };

        let secret = read_secret(&args, "unused", true).unwrap();
        assert_eq!(secret.as_str(), "s3cret");
    }

    #[test]
    fn test_missing_env_secret_fails() {
        let args = SecretArgs {
            secret_env: Some("STRONGBOX_CLI_TEST_UNSET_VARIABLE".to_string()),
        };
        assert!(read_secret(&args, "unused", false).is_err());
    }

    #[test]
    fn test_log_filter_honours_rust_log() {
        assert_eq!(log_filter(true).to_string(), "debug");

        std::env::set_var("RUST_LOG", "warn");
        assert_eq!(log_filter(false).to_string(), "warn");

        std::env::remove_var("RUST_LOG");
        assert_eq!(log_filter(false).to_string(), "info");
    }

    #[test]
    fn test_default_service() {
        let service = load_service(None).unwrap();
        assert_eq!(service.config(), &CryptoConfig::default());
    }
}
