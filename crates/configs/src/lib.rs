//! Layered configuration: built-in defaults, an optional `whisperwall.toml`
//! next to the binary, then `WW_`-prefixed environment variables, later
//! sources winning.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Socket address the HTTP server binds to.
    pub bind_addr: String,
    /// SQLite connection string.
    pub database_url: String,
    /// Salt for the identity hasher. Optional: the hasher falls back to a
    /// predictable default and the binary logs the degradation.
    identity_salt: Option<SecretString>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let cfg = config::Config::builder()
            .set_default("bind_addr", "127.0.0.1:8080")?
            .set_default("database_url", "sqlite:whisperwall.db")?
            .add_source(config::File::with_name("whisperwall").required(false))
            .add_source(config::Environment::with_prefix("WW"))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }

    /// Exposes the salt for hasher construction. Kept out of `Debug` output
    /// by `secrecy` everywhere else.
    pub fn identity_salt(&self) -> Option<&str> {
        self.identity_salt.as_ref().map(|s| s.expose_secret())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_any_sources() {
        let cfg = AppConfig::load().unwrap();
        assert_eq!(cfg.bind_addr, "127.0.0.1:8080");
        assert_eq!(cfg.database_url, "sqlite:whisperwall.db");
        assert!(cfg.identity_salt().is_none());
    }
}
