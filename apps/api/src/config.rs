use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Upload ceiling advertised by the upload widget (5 MB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_ANALYSIS_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_ROLE: &str = "general";

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub max_upload_bytes: usize,
    pub analysis_timeout: Duration,
    /// Keyword profile used when a request names neither a role nor custom keywords.
    pub default_role: String,
    /// Optional JSON file overriding the built-in analysis rules.
    pub rules_path: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let max_upload_bytes: usize =
            parse_or(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;
        if max_upload_bytes == 0 {
            anyhow::bail!("MAX_UPLOAD_BYTES must be greater than zero");
        }

        let timeout_secs: u64 =
            parse_or(&lookup, "ANALYSIS_TIMEOUT_SECS", DEFAULT_ANALYSIS_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            anyhow::bail!("ANALYSIS_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Config {
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            max_upload_bytes,
            analysis_timeout: Duration::from_secs(timeout_secs),
            default_role: lookup("DEFAULT_ROLE").unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            rules_path: lookup("ATS_RULES_PATH").filter(|p| !p.trim().is_empty()),
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.analysis_timeout, Duration::from_secs(20));
        assert_eq!(config.default_role, "general");
        assert!(config.rules_path.is_none());
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("MAX_UPLOAD_BYTES", "1024"),
            ("ANALYSIS_TIMEOUT_SECS", "3"),
            ("DEFAULT_ROLE", "software-engineer"),
            ("ATS_RULES_PATH", "/etc/atscheck/rules.json"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(config.analysis_timeout, Duration::from_secs(3));
        assert_eq!(config.default_role, "software-engineer");
        assert_eq!(config.rules_path.as_deref(), Some("/etc/atscheck/rules.json"));
    }

    #[test]
    fn test_invalid_port_is_rejected_with_context() {
        let err = config_from(&[("PORT", "not-a-port")]).unwrap_err();
        assert!(format!("{err:#}").contains("PORT"));
    }

    #[test]
    fn test_zero_limits_are_rejected() {
        assert!(config_from(&[("MAX_UPLOAD_BYTES", "0")]).is_err());
        assert!(config_from(&[("ANALYSIS_TIMEOUT_SECS", "0")]).is_err());
    }

    #[test]
    fn test_blank_rules_path_is_ignored() {
        let config = config_from(&[("ATS_RULES_PATH", "  ")]).unwrap();
        assert!(config.rules_path.is_none());
    }
}
