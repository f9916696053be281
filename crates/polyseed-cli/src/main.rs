//! Polyseed CLI.
//!
//! Creates, converts, encrypts and derives keys from Polyseed mnemonic
//! seeds entirely offline.

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use polyseed_core::{Coin, Polyseed, SeedConfig};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Polyseed: 16-word mnemonic seeds with birthday and encryption.
#[derive(Parser)]
#[command(name = "polyseed", version, about)]
struct Cli {
    /// Output in JSON format (no colors, machine-readable).
    #[arg(long, global = true)]
    json: bool,

    /// JSON configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// User feature bits new seeds may carry (e.g. 5, 0b101, 0x5).
    #[arg(long, global = true, value_parser = parse_mask)]
    enable_features: Option<u8>,

    /// Network the phrase and keys are bound to (monero, aeon, wownero or a number).
    #[arg(long, global = true, default_value = "monero")]
    coin: Coin,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new seed and print its phrase.
    Create(commands::seed::CreateArgs),
    /// Decode a phrase and show the seed it contains.
    Decode(commands::seed::PhraseArgs),
    /// Encode a stored binary record as a phrase.
    Encode(commands::seed::EncodeArgs),
    /// Encrypt or decrypt a phrase with a password.
    Crypt(commands::seed::CryptArgs),
    /// Derive a key from a phrase.
    Keygen(commands::seed::KeygenArgs),
    /// List supported languages.
    Langs,
    /// Walk through create, encrypt, encode, decode and key derivation.
    Demo,
}

// ---------------------------------------------------------------------------
// Global options passed to every command handler
// ---------------------------------------------------------------------------

/// Shared options threaded into command handlers.
pub struct GlobalOpts {
    pub json: bool,
    pub coin: Coin,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let opts = GlobalOpts {
        json: cli.json,
        coin: cli.coin,
    };

    let result = build_context(cli.config.as_deref(), cli.enable_features)
        .and_then(|ctx| dispatch(&ctx, &opts, cli.command));

    if let Err(e) = result {
        output::print_error(&e, opts.json);
        std::process::exit(1);
    }
}

fn build_context(
    config_path: Option<&std::path::Path>,
    enable_features: Option<u8>,
) -> std::result::Result<Polyseed, String> {
    let mut config = match config_path {
        Some(path) => SeedConfig::load(path).map_err(|e| e.to_string())?,
        None => SeedConfig::default(),
    };
    if let Some(mask) = enable_features {
        let count = config.enable_features(mask).map_err(|e| e.to_string())?;
        tracing::debug!(mask, count, "features enabled");
    }
    Polyseed::with_os_primitives(config).map_err(|e| e.to_string())
}

fn dispatch(ctx: &Polyseed, opts: &GlobalOpts, cmd: Commands) -> std::result::Result<(), String> {
    match cmd {
        Commands::Create(args) => commands::seed::create(ctx, opts, args),
        Commands::Decode(args) => commands::seed::decode(ctx, opts, args),
        Commands::Encode(args) => commands::seed::encode(ctx, opts, args),
        Commands::Crypt(args) => commands::seed::crypt(ctx, opts, args),
        Commands::Keygen(args) => commands::seed::keygen(ctx, opts, args),
        Commands::Langs => commands::lang::list(opts),
        Commands::Demo => commands::demo::run(ctx, opts),
    }
}

/// Parses a feature mask in decimal, `0b` binary or `0x` hex notation.
fn parse_mask(s: &str) -> std::result::Result<u8, String> {
    let s = s.trim();
    let parsed = if let Some(bin) = s.strip_prefix("0b") {
        u8::from_str_radix(bin, 2)
    } else if let Some(hex) = s.strip_prefix("0x") {
        u8::from_str_radix(hex, 16)
    } else {
        s.parse::<u8>()
    };
    parsed.map_err(|e| format!("invalid feature mask '{s}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_mask_notations() {
        assert_eq!(parse_mask("5"), Ok(5));
        assert_eq!(parse_mask("0b101"), Ok(5));
        assert_eq!(parse_mask("0x5"), Ok(5));
        assert!(parse_mask("0b2").is_err());
        assert!(parse_mask("abc").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
