//! Signing utility for Cardioform model artifacts.
//!
//! Writes `manifest.json` (SHA-256 of `models.json` and `scaler.json`) and an
//! Ed25519 signature over it (`artifacts.sig`) into the artifact directory.
//!
//! # Usage
//!
//! ```bash
//! sign_artifacts <artifact_dir>
//! sign_artifacts --generate [--out-seed <path>]
//! ```
//!
//! The seed (32 bytes, base64) is read from the file named by
//! `CARDIOFORM_SIGNING_KEY_B64_FILE`; debug builds also accept it inline in
//! `CARDIOFORM_SIGNING_KEY_B64`. Seed material is zeroized after use.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use base64::engine::general_purpose;
use base64::Engine;
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use cardioform::adapters::artifacts::{
    sha256_hex, SignedManifest, MANIFEST_FILE, MANIFEST_VERSION, MODELS_FILE, SCALER_FILE,
    SIGNATURE_FILE,
};

const KEY_FILE_ENV: &str = "CARDIOFORM_SIGNING_KEY_B64_FILE";
const KEY_ENV_DEV: &str = "CARDIOFORM_SIGNING_KEY_B64";

const USAGE: &str = "Usage: sign_artifacts <artifact_dir> | sign_artifacts --generate [--out-seed <path>]";

#[derive(Zeroize, ZeroizeOnDrop)]
struct Seed([u8; 32]);

enum Command {
    Sign(PathBuf),
    Generate { out_seed: Option<PathBuf> },
}

fn parse_args() -> Result<Command> {
    let mut args = env::args().skip(1);
    let mut dir: Option<PathBuf> = None;
    let mut generate = false;
    let mut out_seed: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--generate" => generate = true,
            "--out-seed" => {
                let path = args.next().ok_or_else(|| anyhow!(USAGE))?;
                out_seed = Some(PathBuf::from(path));
            }
            "-h" | "--help" => bail!(USAGE),
            _ if dir.is_none() => dir = Some(PathBuf::from(arg)),
            _ => bail!(USAGE),
        }
    }

    match (generate, dir) {
        (true, None) => Ok(Command::Generate { out_seed }),
        (false, Some(dir)) if out_seed.is_none() => Ok(Command::Sign(dir)),
        _ => bail!(USAGE),
    }
}

fn read_seed_b64() -> Result<Zeroizing<String>> {
    let raw = if let Ok(path) = env::var(KEY_FILE_ENV) {
        Zeroizing::new(
            fs::read_to_string(path.trim()).context("Failed reading signing key file")?,
        )
    } else if cfg!(debug_assertions) && env::var(KEY_ENV_DEV).is_ok() {
        Zeroizing::new(env::var(KEY_ENV_DEV).unwrap_or_default())
    } else {
        bail!(
            "Missing signing key. Set {KEY_FILE_ENV} (inline {KEY_ENV_DEV} is accepted in debug builds only)."
        );
    };

    let secret = Zeroizing::new(raw.trim().to_string());
    if secret.is_empty() {
        bail!("Empty signing key");
    }
    Ok(secret)
}

fn read_seed() -> Result<Seed> {
    let b64 = read_seed_b64()?;
    let raw = Zeroizing::new(
        general_purpose::STANDARD
            .decode(b64.as_bytes())
            .context("Invalid base64 in signing key")?,
    );
    let bytes: [u8; 32] = raw.as_slice().try_into().map_err(|_| {
        anyhow!(
            "Signing key seed must be 32 bytes after base64 decode (got {})",
            raw.len()
        )
    })?;
    Ok(Seed(bytes))
}

fn sign(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        bail!("Artifact directory not found: {dir:?}");
    }

    let mut files = BTreeMap::new();
    for name in [MODELS_FILE, SCALER_FILE] {
        let path = dir.join(name);
        let bytes = fs::read(&path).with_context(|| format!("Failed to read {path:?}"))?;
        files.insert(name.to_string(), sha256_hex(&bytes));
    }

    let manifest = SignedManifest {
        version: MANIFEST_VERSION,
        created_at: chrono::Utc::now().timestamp(),
        files,
    };
    let manifest_bytes =
        serde_json::to_vec_pretty(&manifest).context("Failed to serialize manifest")?;

    let seed = read_seed()?;
    let signing_key = SigningKey::from_bytes(&seed.0);
    drop(seed);

    let manifest_path = dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, &manifest_bytes)
        .with_context(|| format!("Failed to write {manifest_path:?}"))?;

    let sig_path = dir.join(SIGNATURE_FILE);
    fs::write(&sig_path, signing_key.sign(&manifest_bytes).to_bytes())
        .with_context(|| format!("Failed to write {sig_path:?}"))?;

    println!("Signed manifest: {manifest_path:?}");
    println!("Wrote signature: {sig_path:?}");
    println!(
        "CARDIOFORM_ARTIFACT_PUBKEY_B64={}",
        general_purpose::STANDARD.encode(signing_key.verifying_key().as_bytes())
    );
    Ok(())
}

fn write_secret_file(path: &Path, contents: &str) -> Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);
    let mut file = options
        .open(path)
        .with_context(|| format!("Refusing to overwrite or cannot create {path:?}"))?;
    file.write_all(contents.as_bytes())?;
    file.write_all(b"\n")?;
    Ok(())
}

fn generate(out_seed: Option<&Path>) -> Result<()> {
    let mut seed = Seed([0u8; 32]);
    OsRng.fill_bytes(&mut seed.0);
    let verifying_key = SigningKey::from_bytes(&seed.0).verifying_key();
    let seed_b64 = Zeroizing::new(general_purpose::STANDARD.encode(seed.0));
    drop(seed);

    match out_seed {
        Some(path) => {
            write_secret_file(path, &seed_b64)?;
            println!("Wrote signing seed: {path:?}");
        }
        None => println!("SIGNING_SEED_B64={}", seed_b64.as_str()),
    }
    println!(
        "CARDIOFORM_ARTIFACT_PUBKEY_B64={}",
        general_purpose::STANDARD.encode(verifying_key.as_bytes())
    );
    Ok(())
}

fn main() -> Result<()> {
    match parse_args()? {
        Command::Sign(dir) => sign(&dir),
        Command::Generate { out_seed } => generate(out_seed.as_deref()),
    }
}
