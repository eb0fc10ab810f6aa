use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use solace_ai::client::DEFAULT_BASE_URL;
use solace_api::moderation::FailMode;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "changeme",
    "secret",
];

pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub media_dir: PathBuf,
    pub jwt_secret: String,
    pub ai_api_key: String,
    pub ai_model: String,
    pub ai_base_url: String,
    pub moderation_fail_mode: FailMode,
    pub pending_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let jwt_secret = var("SOLACE_JWT_SECRET").unwrap_or_default();
        if jwt_secret.trim().is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("SOLACE_JWT_SECRET is unset or still a placeholder; set it in your .env file");
        }

        let ai_api_key = var("SOLACE_AI_API_KEY").unwrap_or_default();
        if ai_api_key.trim().is_empty() {
            bail!("SOLACE_AI_API_KEY is required");
        }

        let host = get("SOLACE_HOST", "0.0.0.0");
        let port: u16 = get("SOLACE_PORT", "3000")
            .parse()
            .context("SOLACE_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .context("SOLACE_HOST must be an IP address")?;

        let moderation_fail_mode: FailMode = get("SOLACE_MODERATION_FAIL_MODE", "open")
            .parse()
            .map_err(anyhow::Error::msg)?;

        let pending_ttl_secs: u64 = get("SOLACE_PENDING_TTL_SECS", "900")
            .parse()
            .context("SOLACE_PENDING_TTL_SECS must be a number of seconds")?;

        Ok(Self {
            addr,
            db_path: get("SOLACE_DB_PATH", "solace.db").into(),
            media_dir: get("SOLACE_MEDIA_DIR", "./media").into(),
            jwt_secret,
            ai_api_key,
            ai_model: get("SOLACE_AI_MODEL", "gemini-1.5-flash"),
            ai_base_url: get("SOLACE_AI_BASE_URL", DEFAULT_BASE_URL),
            moderation_fail_mode,
            pending_ttl: Duration::from_secs(pending_ttl_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[("SOLACE_JWT_SECRET", "a-real-secret"), ("SOLACE_AI_API_KEY", "key")]).unwrap();
        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.db_path, PathBuf::from("solace.db"));
        assert_eq!(config.ai_model, "gemini-1.5-flash");
        assert_eq!(config.moderation_fail_mode, FailMode::Open);
        assert_eq!(config.pending_ttl, Duration::from_secs(900));
    }

    #[test]
    fn placeholder_secret_is_rejected() {
        assert!(load(&[("SOLACE_JWT_SECRET", "dev-secret-change-me"), ("SOLACE_AI_API_KEY", "key")]).is_err());
        assert!(load(&[("SOLACE_AI_API_KEY", "key")]).is_err());
    }

    #[test]
    fn api_key_and_fail_mode() {
        assert!(load(&[("SOLACE_JWT_SECRET", "a-real-secret")]).is_err());
        let config = load(&[
            ("SOLACE_JWT_SECRET", "a-real-secret"),
            ("SOLACE_AI_API_KEY", "key"),
            ("SOLACE_MODERATION_FAIL_MODE", "closed"),
        ])
        .unwrap();
        assert_eq!(config.moderation_fail_mode, FailMode::Closed);
        assert!(
            load(&[
                ("SOLACE_JWT_SECRET", "a-real-secret"),
                ("SOLACE_AI_API_KEY", "key"),
                ("SOLACE_MODERATION_FAIL_MODE", "sometimes"),
            ])
            .is_err()
        );
    }
}
