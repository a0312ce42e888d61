//! Configuration management.
//!
//! Configuration is loaded from an optional YAML file with environment variable overrides. The
//! file path defaults to `platform-webhooks.yaml` but can be specified via the `-f` flag or the
//! `PLATFORM_WEBHOOKS_CONFIG` environment variable. A missing file is not an error.
//!
//! ## Loading Priority
//!
//! Sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file**
//! 2. **Environment variables** prefixed with `PLATFORM_WEBHOOKS_`, using `__` for nesting
//! 3. **WEBHOOK_SECRET** - Special case: overrides `signature.secret` if set
//!
//! ```yaml
//! signature:
//!   secret: whsec_...
//!   tolerance_secs: 300
//! ```
//!
//! ```bash
//! PLATFORM_WEBHOOKS_SIGNATURE__TOLERANCE_SECS=600
//! WEBHOOK_SECRET=whsec_...
//! ```

use clap::{Parser, Subcommand};
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::Error;
use crate::webhooks::signing::DEFAULT_TOLERANCE_SECS;

/// Sign or verify platform webhook payloads
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "PLATFORM_WEBHOOKS_CONFIG", default_value = "platform-webhooks.yaml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign a payload and print the headers to send with it
    Sign {
        /// File holding the exact request body; `-` reads stdin
        #[arg(short, long, default_value = "-")]
        payload_file: PathBuf,
        /// Unix seconds to sign for (defaults to now)
        #[arg(short, long)]
        timestamp: Option<i64>,
        /// Shared secret (overrides configuration)
        #[arg(long)]
        secret: Option<String>,
    },
    /// Verify a received payload against its signature headers
    Verify {
        /// File holding the exact request body; `-` reads stdin
        #[arg(short, long, default_value = "-")]
        payload_file: PathBuf,
        /// Value of the X-Webhook-Signature header
        #[arg(short, long)]
        signature: String,
        /// Value of the X-Webhook-Timestamp header
        #[arg(short, long)]
        timestamp: String,
        /// Shared secret (overrides configuration)
        #[arg(long)]
        secret: Option<String>,
        /// Replay window in seconds (overrides configuration)
        #[arg(long)]
        tolerance: Option<u64>,
    },
}

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Signature verification settings
    pub signature: SignatureConfig,
}

/// Signature settings shared by signers and verifiers.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignatureConfig {
    /// Shared secret for the webhook endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    /// Maximum allowed distance between a signature's timestamp and now (default: 300)
    pub tolerance_secs: u64,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            secret: None,
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        Self::load_from(&args.config)
    }

    #[allow(clippy::result_large_err)]
    pub fn load_from(path: &str) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(path).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    pub fn figment(path: &str) -> Figment {
        Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("PLATFORM_WEBHOOKS_").ignore(&["CONFIG"]).split("__"))
            .merge(Env::raw().only(&["WEBHOOK_SECRET"]).map(|_| "signature.secret".into()))
    }

    /// Validate the configuration for consistency
    pub fn validate(&self) -> Result<(), Error> {
        if matches!(self.signature.secret.as_deref(), Some("")) {
            return Err(Error::Other(anyhow::anyhow!(
                "Config validation: signature.secret is set but empty. \
                 Remove it or set WEBHOOK_SECRET to the endpoint's shared secret."
            )));
        }

        Ok(())
    }
}
