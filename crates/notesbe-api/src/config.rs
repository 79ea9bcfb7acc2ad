//! Server configuration from environment variables.
//!
//! `.env` is loaded by the binary before [`ServerConfig::from_env`] runs.
//! Every component receives its settings from this struct at construction;
//! nothing reads the environment after startup.

use std::time::Duration;

use notesbe_core::{Error, Result};

/// Default PostgreSQL DSN.
pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/notesbe";
/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default bind port.
pub const DEFAULT_PORT: u16 = 8081;
/// Default bearer-token lifetime (2 hours).
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 7200;
/// Longest accepted bearer-token lifetime (30 days).
pub const MAX_TOKEN_TTL_SECS: u64 = 30 * 24 * 3600;
/// Default time to wait for a pooled connection.
pub const DEFAULT_DB_CONNECT_TIMEOUT_SECS: u64 = 30;
/// Default env filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "notesbe_api=debug,tower_http=debug";

/// Global rate limiter settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Requests allowed per period (burst size).
    pub requests: u32,
    pub period: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests: 100,
            period: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    /// A configuration with limiting turned off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `json` or `text`.
    pub format: String,
    /// Optional file path; enables daily-rotated file output.
    pub file: Option<String>,
    /// ANSI color override (auto-detected when `None`).
    pub ansi: Option<bool>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            file: None,
            ansi: None,
        }
    }
}

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub token_secret: String,
    pub token_ttl: Duration,
    pub rate_limit: RateLimitConfig,
    /// Run embedded migrations at startup.
    pub migrate: bool,
    pub db_max_connections: u32,
    /// How long a request waits for a pooled connection.
    pub db_connect_timeout: Duration,
    pub log: LogConfig,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    ///
    /// Unset variables take their defaults. `TOKEN_SECRET` has no default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token_secret = lookup("TOKEN_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| Error::Config("TOKEN_SECRET must be set".to_string()))?;

        let rate_limit = RateLimitConfig {
            enabled: parse_bool(&lookup, "RATE_LIMIT_ENABLED", true)?,
            requests: parse_num(&lookup, "RATE_LIMIT_REQUESTS", 100)?,
            period: Duration::from_secs(parse_num(&lookup, "RATE_LIMIT_PERIOD_SECS", 60)?),
        };
        if rate_limit.enabled && (rate_limit.requests == 0 || rate_limit.period.is_zero()) {
            return Err(Error::Config(
                "RATE_LIMIT_REQUESTS and RATE_LIMIT_PERIOD_SECS must be non-zero".to_string(),
            ));
        }

        let token_ttl = Duration::from_secs(parse_num(
            &lookup,
            "TOKEN_TTL_SECS",
            DEFAULT_TOKEN_TTL_SECS,
        )?);
        if token_ttl.is_zero() || token_ttl.as_secs() > MAX_TOKEN_TTL_SECS {
            return Err(Error::Config(format!(
                "TOKEN_TTL_SECS must be between 1 and {}",
                MAX_TOKEN_TTL_SECS
            )));
        }

        let db_connect_timeout = Duration::from_secs(parse_num(
            &lookup,
            "DB_CONNECT_TIMEOUT_SECS",
            DEFAULT_DB_CONNECT_TIMEOUT_SECS,
        )?);
        let db_max_connections = parse_num(&lookup, "DB_MAX_CONNECTIONS", 10)?;
        if db_max_connections == 0 || db_connect_timeout.is_zero() {
            return Err(Error::Config(
                "DB_MAX_CONNECTIONS and DB_CONNECT_TIMEOUT_SECS must be non-zero".to_string(),
            ));
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_num(&lookup, "PORT", DEFAULT_PORT)?,
            token_secret,
            token_ttl,
            rate_limit,
            migrate: parse_bool(&lookup, "DATABASE_MIGRATE", true)?,
            db_max_connections,
            db_connect_timeout,
            log: LogConfig {
                format: lookup("LOG_FORMAT").unwrap_or_else(|| "text".to_string()),
                file: lookup("LOG_FILE").filter(|s| !s.is_empty()),
                ansi: lookup("LOG_ANSI").map(|v| v == "true" || v == "1"),
            },
        })
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_num<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} must be a number, got {:?}", key, raw))),
    }
}

fn parse_bool<F>(lookup: &F, key: &str, default: bool) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).as_deref().map(str::trim) {
        None => Ok(default),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(Error::Config(format!(
            "{} must be true/false, got {:?}",
            key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServerConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_only_secret() {
        let config = config_from(&[("TOKEN_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.bind_addr(), "0.0.0.0:8081");
        assert_eq!(config.token_ttl, Duration::from_secs(7200));
        assert_eq!(config.rate_limit, RateLimitConfig::default());
        assert!(config.migrate);
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.db_connect_timeout, Duration::from_secs(30));
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn test_missing_secret_is_config_error() {
        let err = config_from(&[]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = config_from(&[("TOKEN_SECRET", "  ")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("TOKEN_SECRET", "s3cret"),
            ("PORT", "9000"),
            ("HOST", "127.0.0.1"),
            ("TOKEN_TTL_SECS", "60"),
            ("RATE_LIMIT_ENABLED", "false"),
            ("DATABASE_MIGRATE", "0"),
            ("LOG_FORMAT", "json"),
            ("LOG_ANSI", "false"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.token_ttl, Duration::from_secs(60));
        assert!(!config.rate_limit.enabled);
        assert!(!config.migrate);
        assert_eq!(config.log.format, "json");
        assert_eq!(config.log.ansi, Some(false));
    }

    #[test]
    fn test_malformed_numbers_rejected() {
        let err = config_from(&[("TOKEN_SECRET", "s"), ("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("PORT")));
    }

    #[test]
    fn test_zero_rate_limit_rejected_only_when_enabled() {
        let err = config_from(&[("TOKEN_SECRET", "s"), ("RATE_LIMIT_REQUESTS", "0")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let config = config_from(&[
            ("TOKEN_SECRET", "s"),
            ("RATE_LIMIT_REQUESTS", "0"),
            ("RATE_LIMIT_ENABLED", "false"),
        ])
        .unwrap();
        assert!(!config.rate_limit.enabled);
    }

    #[test]
    fn test_token_ttl_bounds() {
        let err = config_from(&[("TOKEN_SECRET", "s"), ("TOKEN_TTL_SECS", "0")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = config_from(&[("TOKEN_SECRET", "s"), ("TOKEN_TTL_SECS", "10000000000000")])
            .unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("TOKEN_TTL_SECS")));

        let max = MAX_TOKEN_TTL_SECS.to_string();
        let config =
            config_from(&[("TOKEN_SECRET", "s"), ("TOKEN_TTL_SECS", max.as_str())]).unwrap();
        assert_eq!(config.token_ttl.as_secs(), MAX_TOKEN_TTL_SECS);
    }

    #[test]
    fn test_pool_settings() {
        let config = config_from(&[
            ("TOKEN_SECRET", "s"),
            ("DB_MAX_CONNECTIONS", "4"),
            ("DB_CONNECT_TIMEOUT_SECS", "5"),
        ])
        .unwrap();
        assert_eq!(config.db_max_connections, 4);
        assert_eq!(config.db_connect_timeout, Duration::from_secs(5));

        let err = config_from(&[("TOKEN_SECRET", "s"), ("DB_MAX_CONNECTIONS", "0")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
