//! End-to-end walkthrough of the seed lifecycle.
//!
//! Creates a seed, derives a key, encrypts it, encodes the encrypted
//! seed in English, decodes the phrase again, decrypts and checks that
//! the recovered key matches.

use colored::Colorize;
use polyseed_core::{Features, Language, Polyseed};

use crate::output;
use crate::GlobalOpts;

const PASSWORD: &str = "password123";
const KEY_LEN: usize = 32;

pub fn run(ctx: &Polyseed, opts: &GlobalOpts) -> std::result::Result<(), String> {
    let human = !opts.json;
    let step = |msg: &str| {
        if human {
            println!("{}", msg.dimmed());
        }
    };

    // 1. Create, derive, encrypt, encode.
    step("Generating new seed...");
    let mut seed = ctx.create(Features::NONE).map_err(|e| e.to_string())?;
    let key1 = hex::encode(
        seed.keygen(opts.coin, KEY_LEN)
            .map_err(|e| e.to_string())?
            .as_bytes(),
    );
    if human {
        output::print_kv("Private key", &key1);
    }

    step(&format!("Encrypting with password '{PASSWORD}' ..."));
    seed.crypt(PASSWORD).map_err(|e| e.to_string())?;

    let phrase = seed
        .encode(Language::english(), opts.coin)
        .map_err(|e| e.to_string())?;
    if human {
        output::print_kv("Mnemonic", phrase.as_str());
        println!("{}", "-".repeat(49).dimmed());
    }
    seed.zeroize();

    // 2. Decode, detect, decrypt, derive again.
    step("Decoding mnemonic phrase...");
    let (mut restored, language) = ctx
        .decode(phrase.as_str(), opts.coin)
        .map_err(|e| e.to_string())?;
    let was_encrypted = restored.is_encrypted();
    if human {
        output::print_kv("Detected language", &language.to_string());
        output::print_kv("Encrypted", if was_encrypted { "yes" } else { "no" });
    }

    if was_encrypted {
        step(&format!("Decrypting with password '{PASSWORD}' ..."));
        restored.crypt(PASSWORD).map_err(|e| e.to_string())?;
    }

    let key2 = hex::encode(
        restored
            .keygen(opts.coin, KEY_LEN)
            .map_err(|e| e.to_string())?
            .as_bytes(),
    );
    let keys_match = key1 == key2;

    if opts.json {
        output::print_json(&serde_json::json!({
            "coin": opts.coin.to_string(),
            "mnemonic": phrase.as_str(),
            "language": language.code(),
            "encrypted": was_encrypted,
            "key": key2,
            "keys_match": keys_match,
        }));
    } else {
        output::print_kv("Private key", &key2);
    }

    if !keys_match {
        return Err("recovered key does not match the original".into());
    }
    if human {
        output::print_success("keys match");
    }
    Ok(())
}
