use anyhow::Context;
use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use std::fs;

/// Environment variable that overrides `postgres_url`.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    pub auth: AuthConfig,
    /// PostgreSQL connection URL. Without one, drinks live in memory.
    #[serde(default)]
    pub postgres_url: Option<String>,
    /// Add the demo `water` drink when the menu is empty at startup
    #[serde(default)]
    pub seed_demo_drink: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

/// Identity provider settings for bearer token verification.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthConfig {
    /// Tenant domain, e.g. `menu.eu.auth0.com`. Issuer is `https://{domain}/`.
    pub domain: String,
    pub audience: String,
    #[serde(default = "default_algorithms")]
    pub algorithms: Vec<Algorithm>,
    /// Overrides `https://{domain}/.well-known/jwks.json`
    #[serde(default)]
    pub jwks_url: Option<String>,
    #[serde(default = "default_jwks_timeout_ms")]
    pub jwks_timeout_ms: u64,
    /// 0 disables the key cache: every verification re-fetches the key set.
    #[serde(default = "default_jwks_cache_ttl_secs")]
    pub jwks_cache_ttl_secs: u64,
    /// Minimum gap between key set fetches caused by unknown key-ids.
    #[serde(default = "default_jwks_min_refresh_secs")]
    pub jwks_min_refresh_secs: u64,
}

fn default_algorithms() -> Vec<Algorithm> {
    vec![Algorithm::RS256]
}

fn default_jwks_timeout_ms() -> u64 {
    5_000
}

fn default_jwks_cache_ttl_secs() -> u64 {
    600
}

fn default_jwks_min_refresh_secs() -> u64 {
    30
}

impl AuthConfig {
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain)
    }

    pub fn jwks_url(&self) -> String {
        self.jwks_url
            .clone()
            .unwrap_or_else(|| format!("https://{}/.well-known/jwks.json", self.domain))
    }
}

impl AppConfig {
    /// Load `config/{env}.yaml`, then apply environment overrides.
    pub fn load(env: &str) -> anyhow::Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let mut config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path))?;

        if let Ok(url) = std::env::var(DATABASE_URL_ENV) {
            if !url.is_empty() {
                config.postgres_url = Some(url);
            }
        }
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }
}
