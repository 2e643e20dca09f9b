//! CryptoPAn CLI
//!
//! Prefix-preserving anonymization of IP addresses in text streams.
//! Rewrites INPUT_FILE to stdout; diagnostics and the key echo go to
//! stderr.

mod commands;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use commands::scrub_file;
use cryptopan::{default_no_anonymize, special_purpose_v4, AddressPolicy, KEY_LEN};
use rand::prelude::*;
use std::path::PathBuf;

// =============================================================================
// CLI DEFINITION
// =============================================================================

#[derive(Parser)]
#[command(name = "cryptopan")]
#[command(about = "Prefix-preserving IP address anonymizer for text streams", long_about = None)]
#[command(version)]
struct Cli {
    /// Text file to anonymize (rewritten to stdout)
    #[arg(value_name = "INPUT_FILE")]
    input: PathBuf,

    /// 64 hex characters (32 bytes); a random key is generated when omitted
    #[arg(value_name = "HEX_KEY")]
    key: Option<String>,
}

// =============================================================================
// KEY HANDLING
// =============================================================================

/// Decodes the key argument, or draws a fresh one from the CSPRNG and
/// echoes it on stderr so the run can be reproduced.
fn resolve_key(arg: Option<&str>) -> Result<[u8; KEY_LEN]> {
    match arg {
        Some(hex_key) => {
            let bytes = hex::decode(hex_key).context("HEX_KEY is not valid hex")?;
            bytes.try_into().map_err(|bytes: Vec<u8>| {
                anyhow!("HEX_KEY must encode exactly {KEY_LEN} bytes, found {}", bytes.len())
            })
        }
        None => {
            let mut key = [0u8; KEY_LEN];
            rand::rng().fill(&mut key[..]);
            eprintln!("generating a new random key");
            eprintln!("using key `{}'", hex::encode(key));
            eprintln!("pass it as HEX_KEY to reproduce this output");
            Ok(key)
        }
    }
}

// =============================================================================
// ENTRY POINT
// =============================================================================

fn main() -> Result<()> {
    // Usage errors exit with 1, not clap's default 2.
    let cli = Cli::try_parse().unwrap_or_else(|err| {
        let _ = err.print();
        std::process::exit(i32::from(err.use_stderr()));
    });

    let key = resolve_key(cli.key.as_deref())?;
    let policy = AddressPolicy::with_networks(&key, default_no_anonymize(), special_purpose_v4())?;

    scrub_file(&cli.input, &policy)
}
