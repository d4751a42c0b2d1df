//! Configuration loading and validation for the `cipherkit` binary.
//!
//! Values come from `CIPHERKIT_*` environment variables; command line flags
//! override them per invocation.

use anyhow::{Context, Result};
use common::{CipherPaddingMode, DigestMode};
use serde::Deserialize;

const ENV_PREFIX: &str = "CIPHERKIT";

/// Validated binary configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Tracing filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable ones.
    #[serde(default)]
    pub log_json: bool,

    /// Digest mode for `digest`, `hmac`, `sign-file` and `verify-file`.
    #[serde(default = "default_digest_mode")]
    pub digest_mode: DigestMode,

    /// Cipher spec for `encrypt` and `decrypt`, e.g. `"sm4-cbc"`.
    #[serde(default = "default_cipher")]
    pub cipher: String,

    #[serde(default)]
    pub padding: CipherPaddingMode,
}

fn default_log_level() -> String {
    "warn".into()
}
fn default_digest_mode() -> DigestMode {
    DigestMode::Sha256
}
fn default_cipher() -> String {
    "sm4-cbc".into()
}

impl Config {
    /// Load and validate configuration from `CIPHERKIT_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::load(config::Environment::with_prefix(ENV_PREFIX))
    }

    fn load(env: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(env.try_parsing(true))
            .build()
            .context("failed to build cipherkit configuration")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise cipherkit configuration")?;

        c.validate()?;
        Ok(c)
    }

    fn validate(&self) -> Result<()> {
        if self.log_level.trim().is_empty() {
            anyhow::bail!("CIPHERKIT_LOG_LEVEL must not be empty");
        }
        cipherkit::symmetric::resolve(&self.cipher)
            .context("CIPHERKIT_CIPHER is not a supported cipher spec")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    fn valid() -> Config {
        Config {
            log_level: "info".into(),
            log_json: false,
            digest_mode: DigestMode::Sha256,
            cipher: "sm4-cbc".into(),
            padding: CipherPaddingMode::Pkcs7,
        }
    }

    #[test]
    fn defaults() {
        let cfg = Config::load(env(&[])).unwrap();
        assert_eq!(cfg.log_level, "warn");
        assert!(!cfg.log_json);
        assert_eq!(cfg.digest_mode, DigestMode::Sha256);
        assert_eq!(cfg.cipher, "sm4-cbc");
        assert_eq!(cfg.padding, CipherPaddingMode::Pkcs7);
    }

    #[test]
    fn reads_prefixed_variables() {
        let cfg = Config::load(env(&[
            ("CIPHERKIT_LOG_LEVEL", "debug"),
            ("CIPHERKIT_LOG_JSON", "true"),
            ("CIPHERKIT_DIGEST_MODE", "SM3"),
            ("CIPHERKIT_CIPHER", "AES-256-CTR"),
            ("CIPHERKIT_PADDING", "ansix923"),
        ]))
        .unwrap();
        assert_eq!(cfg.log_level, "debug");
        assert!(cfg.log_json);
        assert_eq!(cfg.digest_mode, DigestMode::Sm3);
        assert_eq!(cfg.cipher, "AES-256-CTR");
        assert_eq!(cfg.padding, CipherPaddingMode::AnsiX923);
    }

    #[test]
    fn unknown_digest_mode_fails_to_load() {
        assert!(Config::load(env(&[("CIPHERKIT_DIGEST_MODE", "sha0")])).is_err());
    }

    #[test]
    fn validate_rejects_empty_log_level() {
        let cfg = Config {
            log_level: "  ".into(),
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_cipher() {
        let cfg = Config {
            cipher: "des-cbc".into(),
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_accepts_valid_config() {
        assert!(valid().validate().is_ok());
    }
}
