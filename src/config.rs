use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_EXCLUDED_PATHS: &str = "/api/v1/status/,/users/,/sessions/,/reset_password/";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Postgres URL; the in-memory store is used when unset.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub session_cookie: String,
    pub excluded_paths: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            db_max_connections: 10,
            host: "0.0.0.0".into(),
            port: 5000,
            session_cookie: "session_id".into(),
            excluded_paths: split_paths(DEFAULT_EXCLUDED_PATHS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let port = parse_or("APP_PORT", std::env::var("APP_PORT").ok(), defaults.port)?;
        let db_max_connections = parse_or(
            "DB_MAX_CONNECTIONS",
            std::env::var("DB_MAX_CONNECTIONS").ok(),
            defaults.db_max_connections,
        )?;
        Ok(Self {
            database_url,
            db_max_connections,
            host: std::env::var("APP_HOST").unwrap_or(defaults.host),
            port,
            session_cookie: std::env::var("SESSION_COOKIE_NAME").unwrap_or(defaults.session_cookie),
            excluded_paths: std::env::var("AUTH_EXCLUDED_PATHS")
                .map(|v| split_paths(&v))
                .unwrap_or(defaults.excluded_paths),
        })
    }
}

/// Unset falls back to `default`; a value that does not parse is an error.
fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(v) => v.trim().parse::<T>().with_context(|| format!("parse {name}")),
        None => Ok(default),
    }
}

fn split_paths(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}
