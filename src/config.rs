use std::{env, time::Duration};

/// Connection settings for the MySQL pool.
#[derive(Debug, Clone, PartialEq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    /// Upper bound on concurrently checked-out connections.
    pub connection_limit: u32,
    pub acquire_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            name: "kalanow_db".to_string(),
            connection_limit: 10,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            host: lookup("DB_HOST").unwrap_or(defaults.host),
            port: parsed(&lookup, "DB_PORT").unwrap_or(defaults.port),
            user: lookup("DB_USER").unwrap_or(defaults.user),
            password: lookup("DB_PASSWORD").unwrap_or(defaults.password),
            name: lookup("DB_NAME").unwrap_or(defaults.name),
            connection_limit: parsed::<u32, _>(&lookup, "DB_CONNECTION_LIMIT")
                .unwrap_or(defaults.connection_limit)
                .clamp(1, 100),
            acquire_timeout: parsed(&lookup, "DB_ACQUIRE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.acquire_timeout),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub db: DbConfig,
    /// HS256 key for session cookies. Auth actions fail while it is unset.
    pub session_secret: Option<String>,
    pub session_ttl_hours: i64,
    pub payment_delay: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::from_lookup(|key| env::var(key).ok()))
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parsed(&lookup, "APP_PORT").unwrap_or(3000);
        let session_secret = lookup("SESSION_SECRET").filter(|s| !s.is_empty());
        let session_ttl_hours = parsed::<i64, _>(&lookup, "SESSION_TTL_HOURS")
            .filter(|h| *h > 0)
            .unwrap_or(24);
        let payment_delay = parsed(&lookup, "PAYMENT_DELAY_MS")
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(1500));

        Self {
            host,
            port,
            db: DbConfig::from_lookup(&lookup),
            session_secret,
            session_ttl_hours,
            payment_delay,
        }
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse::<T>().ok())
}
