//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::str::FromStr;

use chrono::Duration;

use crate::auth::PasswordHasher;

/// Longest accepted session lifetime (one year)
pub const MAX_SESSION_TTL_MINUTES: i64 = 60 * 24 * 365;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL; the in-memory store is used when absent
    pub database_url: Option<String>,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Bearer session lifetime
    pub session_ttl: Duration,

    /// Origin allowed by CORS (the web frontend)
    pub cors_allowed_origin: String,

    /// Argon2 memory cost (KiB) for new password hashes
    pub password_hash_memory_kib: u32,

    /// Argon2 iterations for new password hashes
    pub password_hash_iterations: u32,

    /// How often expired sessions are purged
    pub session_purge_interval_secs: u64,

    /// Emit JSON log lines instead of human-readable ones
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?;

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = parse_or(&lookup, "PORT", 8000)?;

        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        let session_ttl_minutes: i64 = parse_or(&lookup, "SESSION_TTL_MINUTES", 1440)?;
        let session_ttl = Some(session_ttl_minutes)
            .filter(|minutes| (1..=MAX_SESSION_TTL_MINUTES).contains(minutes))
            .and_then(Duration::try_minutes)
            .ok_or(ConfigError::InvalidValue("SESSION_TTL_MINUTES"))?;

        let cors_allowed_origin = lookup("CORS_ALLOWED_ORIGIN")
            .unwrap_or_else(|| "http://localhost:5173".to_string());

        let password_hash_memory_kib: u32 = parse_or(
            &lookup,
            "PASSWORD_HASH_MEMORY_KIB",
            PasswordHasher::DEFAULT_MEMORY_KIB,
        )?;
        if password_hash_memory_kib < PasswordHasher::MIN_MEMORY_KIB {
            return Err(ConfigError::InvalidValue("PASSWORD_HASH_MEMORY_KIB"));
        }

        let password_hash_iterations: u32 = parse_or(
            &lookup,
            "PASSWORD_HASH_ITERATIONS",
            PasswordHasher::DEFAULT_ITERATIONS,
        )?;
        if password_hash_iterations == 0 {
            return Err(ConfigError::InvalidValue("PASSWORD_HASH_ITERATIONS"));
        }

        let session_purge_interval_secs = parse_or(&lookup, "SESSION_PURGE_INTERVAL_SECS", 300)?;

        let log_json = lookup("LOG_FORMAT").is_some_and(|format| format.eq_ignore_ascii_case("json"));

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            session_ttl,
            cors_allowed_origin,
            password_hash_memory_kib,
            password_hash_iterations,
            session_purge_interval_secs,
            log_json,
        })
    }

    /// Password hasher with the configured argon2 cost
    pub fn password_hasher(&self) -> PasswordHasher {
        PasswordHasher::new(self.password_hash_memory_kib, self.password_hash_iterations)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue(key)),
        None => Ok(default),
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert!(config.database_url.is_none());
        assert_eq!(config.port, 8000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.session_ttl, Duration::minutes(1440));
        assert_eq!(config.cors_allowed_origin, "http://localhost:5173");
        assert_eq!(config.password_hash_memory_kib, 19 * 1024);
        assert_eq!(config.password_hash_iterations, 2);
        assert!(!config.is_production());
        assert!(!config.log_json);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/nutrition"),
            ("PORT", "9000"),
            ("ENVIRONMENT", "production"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();

        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/nutrition"));
        assert_eq!(config.port, 9000);
        assert!(config.is_production());
        assert!(config.log_json);
    }

    #[test]
    fn test_blank_database_url_is_absent() {
        let config = config_from(&[("DATABASE_URL", "  ")]).unwrap();
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_invalid_port() {
        let result = config_from(&[("PORT", "eighty")]);
        assert!(matches!(result, Err(ConfigError::InvalidValue("PORT"))));
    }

    #[test]
    fn test_non_positive_ttl_rejected() {
        let result = config_from(&[("SESSION_TTL_MINUTES", "0")]);
        assert!(matches!(result, Err(ConfigError::InvalidValue("SESSION_TTL_MINUTES"))));
    }

    #[test]
    fn test_oversized_ttl_rejected() {
        for minutes in ["200000000000", "9223372036854775807", "525601"] {
            let result = config_from(&[("SESSION_TTL_MINUTES", minutes)]);
            assert!(
                matches!(result, Err(ConfigError::InvalidValue("SESSION_TTL_MINUTES"))),
                "{minutes}"
            );
        }

        let config = config_from(&[("SESSION_TTL_MINUTES", "525600")]).unwrap();
        assert_eq!(config.session_ttl, Duration::days(365));
    }

    #[test]
    fn test_password_cost_validated() {
        let result = config_from(&[("PASSWORD_HASH_MEMORY_KIB", "4")]);
        assert!(matches!(result, Err(ConfigError::InvalidValue("PASSWORD_HASH_MEMORY_KIB"))));

        let result = config_from(&[("PASSWORD_HASH_ITERATIONS", "0")]);
        assert!(matches!(result, Err(ConfigError::InvalidValue("PASSWORD_HASH_ITERATIONS"))));
    }
}
