use std::{fmt, net::SocketAddr, str::FromStr, time::Duration};

use crate::error::ConfigError;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://fallsense.db?mode=rwc";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 1440;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: SocketAddr,
    /// Idle time after which a session is discarded.
    pub session_ttl: Duration,
    /// Send the session cookie with the `Secure` attribute.
    pub cookie_secure: bool,
    /// When set and no user exists yet, an `admin` account is seeded with this password.
    pub seed_admin_password: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database_url)
            .field("database_max_connections", &self.database_max_connections)
            .field("bind_addr", &self.bind_addr)
            .field("session_ttl", &self.session_ttl)
            .field("cookie_secure", &self.cookie_secure)
            .field(
                "seed_admin_password",
                &self.seed_admin_password.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            database_max_connections: 5,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            cookie_secure: false,
            seed_admin_password: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            database_max_connections: parse(&lookup, "DATABASE_MAX_CONNECTIONS")?
                .unwrap_or(defaults.database_max_connections),
            bind_addr: parse(&lookup, "BIND_ADDR")?.unwrap_or(defaults.bind_addr),
            session_ttl: parse(&lookup, "SESSION_TTL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_ttl),
            cookie_secure: parse(&lookup, "COOKIE_SECURE")?.unwrap_or(defaults.cookie_secure),
            seed_admin_password: lookup("SEED_ADMIN_PASSWORD").filter(|p| !p.is_empty()),
        })
    }
}

fn parse<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
