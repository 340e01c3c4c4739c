//! Process settings read once from the environment at startup.

use crate::error::ConfigError;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Connection pool and statement logging options for the session provider.
#[derive(Clone, Debug, PartialEq)]
pub struct DbSettings {
    pub url: String,
    /// Base pool size; connections are opened on demand.
    pub pool_size: u32,
    /// Extra connections allowed above `pool_size` under load.
    pub max_overflow: u32,
    /// Emit sqlx statement logging (`sqlx::query` target).
    pub echo: bool,
    /// Log connection checkout and checkin.
    pub echo_pool: bool,
    pub acquire_timeout: Duration,
}

impl DbSettings {
    pub fn max_connections(&self) -> u32 {
        self.pool_size.saturating_add(self.max_overflow).max(1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl FromStr for StoreKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StoreKind::Postgres),
            "memory" | "in-memory" => Ok(StoreKind::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub db: DbSettings,
    pub bind_addr: SocketAddr,
    pub static_dir: PathBuf,
    pub store: StoreKind,
    /// Create missing tables before serving.
    pub bootstrap: bool,
}

impl Settings {
    /// Read settings from the process environment. Call after `dotenvy::dotenv()`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Build settings from an explicit variable map; missing keys take defaults, malformed ones fail.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let db = DbSettings {
            url: vars
                .get("DATABASE_URL")
                .cloned()
                .unwrap_or_else(|| "postgres://localhost/storekeeper".into()),
            pool_size: parse_or(vars, "DB_POOL_SIZE", 5)?,
            max_overflow: parse_or(vars, "DB_MAX_OVERFLOW", 10)?,
            echo: parse_flag(vars, "DB_ECHO")?,
            echo_pool: parse_flag(vars, "DB_ECHO_POOL")?,
            acquire_timeout: Duration::from_secs(parse_or(vars, "DB_ACQUIRE_TIMEOUT_SECS", 30)?),
        };
        let bind_addr = parse_or(vars, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8000)))?;
        let static_dir = vars
            .get("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("static"));
        let store = parse_or(vars, "STORE", StoreKind::Postgres)?;
        let bootstrap = parse_flag(vars, "DB_BOOTSTRAP")?;
        Ok(Settings {
            db,
            bind_addr,
            static_dir,
            store,
            bootstrap,
        })
    }
}

fn parse_or<T: FromStr>(vars: &HashMap<String, String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
            key,
            value: raw.to_string(),
        }),
    }
}

fn parse_flag(vars: &HashMap<String, String>, key: &'static str) -> Result<bool, ConfigError> {
    match vars.get(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) => match v.as_str() {
            "" | "0" | "false" | "no" | "off" => Ok(false),
            "1" | "true" | "yes" | "on" => Ok(true),
            _ => Err(ConfigError::Invalid { key, value: v.clone() }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let s = Settings::from_vars(&HashMap::new()).unwrap();
        assert_eq!(s.db.url, "postgres://localhost/storekeeper");
        assert_eq!(s.db.pool_size, 5);
        assert_eq!(s.db.max_overflow, 10);
        assert_eq!(s.db.max_connections(), 15);
        assert!(!s.db.echo);
        assert!(!s.db.echo_pool);
        assert_eq!(s.bind_addr.port(), 8000);
        assert_eq!(s.static_dir, PathBuf::from("static"));
        assert_eq!(s.store, StoreKind::Postgres);
        assert!(!s.bootstrap);
    }

    #[test]
    fn reads_overrides() {
        let s = Settings::from_vars(&vars(&[
            ("DATABASE_URL", "postgres://db/shop"),
            ("DB_POOL_SIZE", "2"),
            ("DB_MAX_OVERFLOW", "0"),
            ("DB_ECHO", "true"),
            ("DB_ECHO_POOL", "1"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("STORE", "memory"),
        ]))
        .unwrap();
        assert_eq!(s.db.url, "postgres://db/shop");
        assert_eq!(s.db.max_connections(), 2);
        assert!(s.db.echo);
        assert!(s.db.echo_pool);
        assert_eq!(s.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(s.store, StoreKind::Memory);
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = Settings::from_vars(&vars(&[("DB_POOL_SIZE", "many")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DB_POOL_SIZE", .. }));

        let err = Settings::from_vars(&vars(&[("DB_ECHO", "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DB_ECHO", .. }));
    }
}
