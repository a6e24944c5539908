//! Server configuration
//!
//! Layered with figment: built-in defaults, then an optional TOML file, then
//! `BEACOND_*` environment variables. The binary merges CLI flags on top.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Result};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "BEACOND_";

/// SQLite file used when none is configured
pub const DEFAULT_DB_PATH: &str = "beacond.db";

/// Server configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// SQLite database file; None = in-memory (tests only)
    pub db_path: Option<String>,
    /// Shared secret expected in `X-Admin-Key`
    pub admin_key: String,
    /// Image generation endpoint; None disables the proxy
    pub image_api_url: Option<String>,
    pub image_api_key: Option<String>,
    pub image_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            db_path: Some(DEFAULT_DB_PATH.to_string()),
            admin_key: String::new(),
            image_api_url: None,
            image_api_key: None,
            image_timeout_secs: 60,
        }
    }
}

impl Config {
    /// Defaults + optional TOML file + environment
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Extract and validate a config from `figment`
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configs the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.admin_key.is_empty() {
            bail!("admin_key must be set (e.g. via {}ADMIN_KEY)", ENV_PREFIX);
        }
        if self.image_timeout_secs == 0 {
            bail!("image_timeout_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_addr", &self.bind_addr)
            .field("db_path", &self.db_path)
            .field("admin_key", &"<redacted>")
            .field("image_api_url", &self.image_api_url)
            .field("image_api_key", &self.image_api_key.as_ref().map(|_| "<redacted>"))
            .field("image_timeout_secs", &self.image_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_need_admin_key() {
        let config = Config::default();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.db_path.as_deref(), Some(DEFAULT_DB_PATH));
        assert_eq!(config.image_timeout(), Duration::from_secs(60));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "beacond.toml",
                r#"
                bind_addr = "0.0.0.0:9000"
                admin_key = "from-file"
                image_api_url = "http://images.local/generate"
                "#,
            )?;
            jail.set_env("BEACOND_ADMIN_KEY", "from-env");

            let config =
                Config::from_figment(&Config::figment(Some(Path::new("beacond.toml")))).unwrap();
            assert_eq!(config.bind_addr.port(), 9000);
            assert_eq!(config.admin_key, "from-env");
            assert_eq!(
                config.image_api_url.as_deref(),
                Some("http://images.local/generate")
            );
            assert_eq!(config.image_timeout_secs, 60);
            Ok(())
        });
    }

    #[test]
    fn test_missing_file_is_ignored() {
        Jail::expect_with(|jail| {
            jail.set_env("BEACOND_ADMIN_KEY", "k");
            let config =
                Config::from_figment(&Config::figment(Some(Path::new("absent.toml")))).unwrap();
            assert_eq!(config.admin_key, "k");
            assert_eq!(config.db_path.as_deref(), Some(DEFAULT_DB_PATH));
            Ok(())
        });
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = Config {
            admin_key: "k".to_string(),
            image_timeout_secs: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config {
            admin_key: "topsecret".to_string(),
            image_api_key: Some("apikey".to_string()),
            ..Config::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("topsecret"));
        assert!(!debug.contains("apikey"));
    }
}
