//! Seed commands: create, decode, encode, crypt and keygen.

use std::path::PathBuf;

use clap::Args;
use polyseed_core::{Features, Language, Mnemonic, Polyseed, Seed, MAX_KEY_BYTES};
use serde::Serialize;

use crate::output;
use crate::GlobalOpts;

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

/// A phrase given as one quoted argument or as separate words.
#[derive(Args)]
pub struct PhraseArgs {
    /// The 16-word phrase.
    #[arg(required = true, num_args = 1..)]
    pub words: Vec<String>,
}

impl PhraseArgs {
    fn phrase(&self) -> String {
        self.words.join(" ")
    }
}

#[derive(Args)]
pub struct CreateArgs {
    /// Feature bits for the new seed (must be enabled).
    #[arg(long, default_value_t = 0)]
    pub features: u8,

    /// Phrase language (name, English name or code).
    #[arg(long, default_value = "en")]
    pub lang: String,

    /// Encrypt the seed with this password before printing it.
    #[arg(long)]
    pub password: Option<String>,

    /// Also write the 32-byte binary record to this file.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct EncodeArgs {
    /// Binary record file written by `create --out`.
    #[arg(long)]
    pub record: PathBuf,

    /// Phrase language (name, English name or code).
    #[arg(long, default_value = "en")]
    pub lang: String,
}

#[derive(Args)]
pub struct CryptArgs {
    #[command(flatten)]
    pub phrase: PhraseArgs,

    /// Password to encrypt or decrypt with.
    #[arg(long)]
    pub password: String,

    /// Output language; defaults to the language of the input.
    #[arg(long)]
    pub lang: Option<String>,
}

#[derive(Args)]
pub struct KeygenArgs {
    #[command(flatten)]
    pub phrase: PhraseArgs,

    /// Decrypt the seed with this password first.
    #[arg(long)]
    pub password: Option<String>,

    /// Key length in bytes (1 to 1024).
    #[arg(
        long,
        default_value_t = 32,
        value_parser = clap::value_parser!(u16).range(1..=MAX_KEY_BYTES as i64)
    )]
    pub len: u16,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Public description of a seed; never includes entropy.
#[derive(Serialize)]
struct SeedReport<'a> {
    phrase: &'a str,
    language: &'static str,
    coin: String,
    birthday: u64,
    birthday_raw: u16,
    features: u8,
    encrypted: bool,
}

impl<'a> SeedReport<'a> {
    fn new(seed: &Seed, phrase: &'a Mnemonic, opts: &GlobalOpts) -> Self {
        Self {
            phrase: phrase.as_str(),
            language: phrase.language().code(),
            coin: opts.coin.to_string(),
            birthday: seed.birthday(),
            birthday_raw: seed.birthday_raw(),
            features: seed.features().bits(),
            encrypted: seed.is_encrypted(),
        }
    }

    fn print(&self, json_mode: bool, language: &Language) {
        if json_mode {
            output::print_json(self);
            return;
        }
        output::print_phrase(self.phrase);
        output::print_kv("Language", &language.to_string());
        output::print_kv("Coin", &self.coin);
        output::print_kv("Birthday", &format_birthday(self.birthday));
        output::print_kv("Features", &format!("{:#06b}", self.features));
        output::print_kv("Encrypted", if self.encrypted { "yes" } else { "no" });
    }
}

fn format_birthday(unix: u64) -> String {
    i64::try_from(unix)
        .ok()
        .and_then(|t| chrono::DateTime::from_timestamp(t, 0))
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| unix.to_string())
}

fn report(seed: &Seed, phrase: &Mnemonic, opts: &GlobalOpts) {
    SeedReport::new(seed, phrase, opts).print(opts.json, phrase.language());
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub fn create(
    ctx: &Polyseed,
    opts: &GlobalOpts,
    args: CreateArgs,
) -> std::result::Result<(), String> {
    let features = Features::new(args.features)
        .ok_or_else(|| format!("feature mask {:#x} exceeds 4 bits", args.features))?;
    let language = Language::by_name(&args.lang).map_err(|e| e.to_string())?;

    let mut seed = ctx.create(features).map_err(|e| e.to_string())?;
    if let Some(password) = &args.password {
        seed.crypt(password).map_err(|e| e.to_string())?;
    }

    if let Some(path) = &args.out {
        seed.store_file(path).map_err(|e| e.to_string())?;
        tracing::info!(path = %path.display(), "record written");
    }

    let phrase = seed.encode(language, opts.coin).map_err(|e| e.to_string())?;
    report(&seed, &phrase, opts);
    Ok(())
}

pub fn decode(
    ctx: &Polyseed,
    opts: &GlobalOpts,
    args: PhraseArgs,
) -> std::result::Result<(), String> {
    let (seed, language) = ctx
        .decode(&args.phrase(), opts.coin)
        .map_err(|e| e.to_string())?;
    let phrase = seed.encode(language, opts.coin).map_err(|e| e.to_string())?;
    report(&seed, &phrase, opts);
    Ok(())
}

pub fn encode(
    ctx: &Polyseed,
    opts: &GlobalOpts,
    args: EncodeArgs,
) -> std::result::Result<(), String> {
    let seed = ctx.load_file(&args.record).map_err(|e| e.to_string())?;
    let phrase = seed
        .encode_named(&args.lang, opts.coin)
        .map_err(|e| e.to_string())?;
    report(&seed, &phrase, opts);
    Ok(())
}

pub fn crypt(
    ctx: &Polyseed,
    opts: &GlobalOpts,
    args: CryptArgs,
) -> std::result::Result<(), String> {
    let (mut seed, detected) = ctx
        .decode(&args.phrase.phrase(), opts.coin)
        .map_err(|e| e.to_string())?;
    let language = match &args.lang {
        Some(name) => Language::by_name(name).map_err(|e| e.to_string())?,
        None => detected,
    };

    seed.crypt(&args.password).map_err(|e| e.to_string())?;
    let phrase = seed.encode(language, opts.coin).map_err(|e| e.to_string())?;
    report(&seed, &phrase, opts);
    Ok(())
}

pub fn keygen(
    ctx: &Polyseed,
    opts: &GlobalOpts,
    args: KeygenArgs,
) -> std::result::Result<(), String> {
    let (mut seed, _) = ctx
        .decode(&args.phrase.phrase(), opts.coin)
        .map_err(|e| e.to_string())?;

    if seed.is_encrypted() {
        let password = args
            .password
            .as_deref()
            .ok_or("seed is encrypted; pass --password to decrypt it")?;
        seed.crypt(password).map_err(|e| e.to_string())?;
    }

    let key = seed.keygen(opts.coin, usize::from(args.len)).map_err(|e| e.to_string())?;
    let key_hex = hex::encode(key.as_bytes());

    if opts.json {
        output::print_json(&serde_json::json!({
            "coin": opts.coin.to_string(),
            "key": key_hex,
        }));
    } else {
        output::print_kv("Coin", &opts.coin.to_string());
        output::print_kv("Key", &key_hex);
    }
    Ok(())
}
