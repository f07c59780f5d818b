use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// JWT secrets that must never reach production.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_dir: PathBuf,
    pub media_dir: PathBuf,
    pub legacy_status_in_body: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let jwt_secret = lookup("CATROWEB_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("CATROWEB_JWT_SECRET is unset or still a placeholder");
        }

        let port = var("CATROWEB_PORT", "8080")
            .parse()
            .context("CATROWEB_PORT must be a port number")?;

        let legacy_status_in_body = match var("CATROWEB_LEGACY_STATUS_IN_BODY", "true")
            .to_ascii_lowercase()
            .as_str()
        {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            other => bail!("CATROWEB_LEGACY_STATUS_IN_BODY must be a boolean, got '{}'", other),
        };

        Ok(Self {
            jwt_secret,
            db_path: var("CATROWEB_DB_PATH", "catroweb.db").into(),
            host: var("CATROWEB_HOST", "0.0.0.0"),
            port,
            log_dir: var("CATROWEB_LOG_DIR", "./var/log").into(),
            media_dir: var("CATROWEB_MEDIA_DIR", "./public/resources/mediapackage").into(),
            legacy_status_in_body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[("CATROWEB_JWT_SECRET", "a-real-secret")]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.db_path, PathBuf::from("catroweb.db"));
        assert!(config.legacy_status_in_body);
    }

    #[test]
    fn rejects_missing_or_placeholder_secret() {
        assert!(config(&[]).is_err());
        assert!(config(&[("CATROWEB_JWT_SECRET", "dev-secret-change-me")]).is_err());
    }

    #[test]
    fn parses_overrides() {
        let config = config(&[
            ("CATROWEB_JWT_SECRET", "a-real-secret"),
            ("CATROWEB_PORT", "9000"),
            ("CATROWEB_LEGACY_STATUS_IN_BODY", "false"),
            ("CATROWEB_LOG_DIR", "/srv/logs"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert!(!config.legacy_status_in_body);
        assert_eq!(config.log_dir, PathBuf::from("/srv/logs"));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config(&[("CATROWEB_JWT_SECRET", "s"), ("CATROWEB_PORT", "http")]).is_err());
        assert!(
            config(&[("CATROWEB_JWT_SECRET", "s"), ("CATROWEB_LEGACY_STATUS_IN_BODY", "maybe")])
                .is_err()
        );
    }
}
