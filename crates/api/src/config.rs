//! Application configuration loaded from environment variables.

use std::time::Duration;

use cache::SNAPSHOT_TTL;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `DATABASE_URL`: PostgreSQL connection string; in-memory stores when unset
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: `5`)
/// - `CACHE_TTL_SECS`: snapshot lifetime in seconds (default: one hour)
/// - `CACHE_SWEEP_SECS`: interval between expired-entry sweeps (default: `60`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub cache_ttl: Duration,
    pub cache_sweep: Duration,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            database_max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.database_max_connections),
            cache_ttl: lookup("CACHE_TTL_SECS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            cache_sweep: lookup("CACHE_SWEEP_SECS")
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_sweep),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            database_max_connections: 5,
            cache_ttl: SNAPSHOT_TTL,
            cache_sweep: Duration::from_secs(60),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert!(config.database_url.is_none());
        assert_eq!(config.cache_ttl, Duration::from_secs(3600));
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_reads_overrides() {
        let config = config_from(&[
            ("PORT", "9090"),
            ("DATABASE_URL", "postgres://localhost/distribution"),
            ("DATABASE_MAX_CONNECTIONS", "20"),
            ("CACHE_TTL_SECS", "30"),
            ("CACHE_SWEEP_SECS", "5"),
        ]);
        assert_eq!(config.port, 9090);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/distribution")
        );
        assert_eq!(config.database_max_connections, 20);
        assert_eq!(config.cache_ttl, Duration::from_secs(30));
        assert_eq!(config.cache_sweep, Duration::from_secs(5));
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let config = config_from(&[
            ("PORT", "http"),
            ("CACHE_TTL_SECS", "-1"),
            ("CACHE_SWEEP_SECS", "0"),
            ("DATABASE_URL", ""),
        ]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.cache_ttl, SNAPSHOT_TTL);
        assert_eq!(config.cache_sweep, Duration::from_secs(60));
        assert!(config.database_url.is_none());
    }
}
