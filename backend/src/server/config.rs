//! Application settings and the HTTP server configuration built from them.

use std::net::SocketAddr;

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use blog_backend::inbound::http::cookies::SessionCookieConfig;
use blog_backend::inbound::http::session_config::SessionSettings;
use blog_backend::outbound::persistence::DbPool;
use blog_backend::outbound::security::{MAX_PASSWORD_COST, MIN_PASSWORD_COST};

const DEFAULT_BIND_ADDR: SocketAddr =
    SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED), 8080);

/// Settings layered from defaults, a config file, `BLOG_*` environment
/// variables and command-line flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BLOG")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL URL. Without it the in-memory store is used.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    #[ortho_config(default = 10)]
    pub db_max_connections: u32,
    /// bcrypt work factor for new password hashes.
    #[ortho_config(default = 12)]
    pub password_cost: u32,
    /// Session token and cookie lifetime.
    #[ortho_config(default = 168)]
    pub session_ttl_hours: u32,
    /// Seed demo accounts and posts at startup.
    #[ortho_config(default = false)]
    pub seed_demo: bool,
}

/// Rejected settings values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("password cost must be between {min} and {max}, got {value}")]
    PasswordCost { value: u32, min: u32, max: u32 },
    #[error("session ttl must be at least one hour")]
    SessionTtl,
    #[error("db max connections must be at least one")]
    DbMaxConnections,
}

impl AppSettings {
    /// Listen address, `0.0.0.0:8080` unless configured.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr.unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Pool size.
    pub fn db_max_connections(&self) -> Result<u32, SettingsError> {
        match self.db_max_connections {
            0 => Err(SettingsError::DbMaxConnections),
            size => Ok(size),
        }
    }

    /// bcrypt cost within the range the hasher accepts.
    pub fn password_cost(&self) -> Result<u32, SettingsError> {
        let value = self.password_cost;
        if (MIN_PASSWORD_COST..=MAX_PASSWORD_COST).contains(&value) {
            Ok(value)
        } else {
            Err(SettingsError::PasswordCost {
                value,
                min: MIN_PASSWORD_COST,
                max: MAX_PASSWORD_COST,
            })
        }
    }

    /// Session lifetime shared by tokens and cookies.
    pub fn session_ttl(&self) -> Result<TimeDelta, SettingsError> {
        match self.session_ttl_hours {
            0 => Err(SettingsError::SessionTtl),
            hours => Ok(TimeDelta::hours(i64::from(hours))),
        }
    }
}

/// Everything needed to build the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) session: SessionSettings,
    pub(crate) session_ttl: TimeDelta,
    pub(crate) password_cost: u32,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a server configuration from validated settings.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        session: SessionSettings,
        session_ttl: TimeDelta,
        password_cost: u32,
    ) -> Self {
        Self {
            bind_addr,
            session,
            session_ttl,
            password_cost,
            db_pool: None,
        }
    }

    /// Attach a database connection pool for the Diesel repositories.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attributes of the session cookie.
    pub(crate) fn cookie_config(&self) -> SessionCookieConfig {
        SessionCookieConfig {
            secure: self.session.cookie_secure,
            same_site: self.session.same_site,
            ttl: self.session_ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "BLOG_BIND_ADDR",
        "BLOG_DATABASE_URL",
        "BLOG_DB_MAX_CONNECTIONS",
        "BLOG_PASSWORD_COST",
        "BLOG_SESSION_TTL_HOURS",
        "BLOG_SEED_DEMO",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("blog-backend")])
            .expect("config should load")
    }

    fn settings() -> AppSettings {
        AppSettings {
            bind_addr: None,
            database_url: None,
            db_max_connections: 10,
            password_cost: 12,
            session_ttl_hours: 168,
            seed_demo: false,
        }
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), DEFAULT_BIND_ADDR);
        assert_eq!(settings.database_url(), None);
        assert_eq!(settings.db_max_connections(), Ok(10));
        assert_eq!(settings.password_cost(), Ok(12));
        assert_eq!(settings.session_ttl(), Ok(TimeDelta::days(7)));
        assert!(!settings.seed_demo);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("BLOG_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "BLOG_DATABASE_URL",
                Some("postgres://localhost/blog".to_owned()),
            ),
            ("BLOG_DB_MAX_CONNECTIONS", Some("4".to_owned())),
            ("BLOG_PASSWORD_COST", Some("10".to_owned())),
            ("BLOG_SESSION_TTL_HOURS", Some("2".to_owned())),
            ("BLOG_SEED_DEMO", Some("true".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr(),
            "127.0.0.1:9000".parse::<SocketAddr>().expect("address")
        );
        assert_eq!(settings.database_url(), Some("postgres://localhost/blog"));
        assert_eq!(settings.db_max_connections(), Ok(4));
        assert_eq!(settings.password_cost(), Ok(10));
        assert_eq!(settings.session_ttl(), Ok(TimeDelta::hours(2)));
        assert!(settings.seed_demo);
    }

    #[rstest]
    #[case(Some("  ".to_owned()), None)]
    #[case(Some(" postgres://db/blog ".to_owned()), Some("postgres://db/blog"))]
    fn blank_database_url_means_memory(
        #[case] raw: Option<String>,
        #[case] expected: Option<&str>,
    ) {
        let settings = AppSettings {
            database_url: raw,
            ..settings()
        };
        assert_eq!(settings.database_url(), expected);
    }

    #[rstest]
    #[case(3)]
    #[case(32)]
    fn password_cost_outside_bcrypt_range_is_rejected(#[case] cost: u32) {
        let settings = AppSettings {
            password_cost: cost,
            ..settings()
        };
        assert!(matches!(
            settings.password_cost(),
            Err(SettingsError::PasswordCost { value, .. }) if value == cost
        ));
    }

    #[rstest]
    fn zero_values_are_rejected() {
        let settings = AppSettings {
            db_max_connections: 0,
            session_ttl_hours: 0,
            ..settings()
        };
        assert_eq!(
            settings.db_max_connections(),
            Err(SettingsError::DbMaxConnections)
        );
        assert_eq!(settings.session_ttl(), Err(SettingsError::SessionTtl));
    }
}
