//! Helpers behind the `platform-webhooks` binary.

use std::io::Read;
use std::path::Path;

use anyhow::Context;

use crate::config::Config;
use crate::errors::{Error, Result};
use crate::webhooks::signing::{self, SignatureResult};

/// Read a payload byte-exact; trailing newlines are part of the signed body.
pub fn read_payload(path: &Path) -> anyhow::Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut payload = Vec::new();
        std::io::stdin().read_to_end(&mut payload).context("Failed to read payload from stdin")?;
        Ok(payload)
    } else {
        std::fs::read(path).with_context(|| format!("Failed to read payload from {}", path.display()))
    }
}

/// Pick the secret from `--secret`, falling back to configuration.
pub fn resolve_secret(flag: Option<String>, config: &Config) -> Result<String> {
    flag.or_else(|| config.signature.secret.clone())
        .filter(|s| !s.is_empty())
        .ok_or(Error::MissingSecret)
}

/// Header lines printed by `sign`.
pub fn header_lines(result: &SignatureResult) -> Vec<String> {
    result
        .headers()
        .into_iter()
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect()
}

/// Sign a payload file with the resolved secret.
pub fn sign_file(path: &Path, secret: &str, timestamp: Option<i64>) -> anyhow::Result<SignatureResult> {
    let payload = read_payload(path)?;
    Ok(signing::sign(&payload, secret, timestamp))
}
