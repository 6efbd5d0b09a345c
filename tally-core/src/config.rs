//! Configuration management
//!
//! settings.json in the tally directory:
//! ```json
//! {
//!   "auth": {
//!     "jwtSecret": "…",
//!     "tokenTtlSeconds": 86400,
//!     "passwordHashing": { "memoryCost": 19456, "timeCost": 2, "parallelism": 1, "outputLen": 32 }
//!   }
//! }
//! ```
//! Keys the CLI doesn't manage are preserved on save.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::Duration;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::domain::{Argon2Params, DEFAULT_TOKEN_TTL_SECONDS};

pub const SETTINGS_FILE: &str = "settings.json";
pub const ENV_JWT_SECRET: &str = "TALLY_JWT_SECRET";
pub const ENV_TOKEN_TTL: &str = "TALLY_TOKEN_TTL_SECONDS";

/// Ten years
pub const MAX_TOKEN_TTL_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    auth: AuthSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    jwt_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token_ttl_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password_hashing: Option<Argon2Params>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Effective configuration: settings.json with environment overrides applied
#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: Option<String>,
    pub token_ttl_seconds: i64,
    pub password_hashing: Argon2Params,
    // File contents, written back on save so env overrides never persist
    raw: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            password_hashing: Argon2Params::default(),
            raw: SettingsFile::default(),
        }
    }
}

impl Config {
    /// Load config from the tally directory
    ///
    /// The JWT secret and token lifetime can be overridden with
    /// TALLY_JWT_SECRET and TALLY_TOKEN_TTL_SECONDS.
    pub fn load(tally_dir: &Path) -> Result<Self> {
        let raw = read_settings(tally_dir)?;
        Self::from_settings(raw, |key| std::env::var(key).ok())
    }

    fn from_settings(raw: SettingsFile, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = env(ENV_JWT_SECRET)
            .filter(|s| !s.is_empty())
            .or_else(|| raw.auth.jwt_secret.clone());

        let token_ttl_seconds = match env(ENV_TOKEN_TTL) {
            Some(value) => value
                .trim()
                .parse::<i64>()
                .with_context(|| format!("{} must be a whole number of seconds", ENV_TOKEN_TTL))?,
            None => raw.auth.token_ttl_seconds.unwrap_or(DEFAULT_TOKEN_TTL_SECONDS),
        };

        let config = Self {
            jwt_secret,
            token_ttl_seconds,
            password_hashing: raw.auth.password_hashing.clone().unwrap_or_default(),
            raw,
        };
        config.token_ttl()?;
        Ok(config)
    }

    /// Save config to the tally directory, preserving unmanaged settings
    pub fn save(&self, tally_dir: &Path) -> Result<()> {
        let mut settings = read_settings(tally_dir)?;
        settings.auth.jwt_secret = self.raw.auth.jwt_secret.clone();
        settings.auth.token_ttl_seconds = self.raw.auth.token_ttl_seconds;
        settings.auth.password_hashing = self.raw.auth.password_hashing.clone();

        std::fs::create_dir_all(tally_dir)
            .with_context(|| format!("Failed to create {}", tally_dir.display()))?;
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(tally_dir.join(SETTINGS_FILE), content)
            .context("Failed to write settings.json")?;
        Ok(())
    }

    /// Return the signing secret, generating and persisting one on first use
    pub fn ensure_jwt_secret(&mut self, tally_dir: &Path) -> Result<String> {
        if let Some(secret) = &self.jwt_secret {
            return Ok(secret.clone());
        }

        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        let secret = hex::encode(bytes);

        self.raw.auth.jwt_secret = Some(secret.clone());
        self.jwt_secret = Some(secret.clone());
        self.save(tally_dir)?;
        tracing::info!("Generated new token signing secret");

        Ok(secret)
    }

    /// Token lifetime, between one second and MAX_TOKEN_TTL_SECONDS
    pub fn token_ttl(&self) -> Result<Duration> {
        let seconds = self.token_ttl_seconds;
        if seconds <= 0 {
            bail!("Token lifetime must be positive, got {}", seconds);
        }
        if seconds > MAX_TOKEN_TTL_SECONDS {
            bail!(
                "Token lifetime must not exceed {} seconds, got {}",
                MAX_TOKEN_TTL_SECONDS,
                seconds
            );
        }
        Duration::try_seconds(seconds)
            .with_context(|| format!("Token lifetime of {} seconds is out of range", seconds))
    }
}

fn read_settings(tally_dir: &Path) -> Result<SettingsFile> {
    let settings_path = tally_dir.join(SETTINGS_FILE);
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&settings_path)
        .with_context(|| format!("Failed to read {}", settings_path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", settings_path.display()))
}
