//! Server configuration loaded from `TASKBOARD_*` environment variables.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::auth::jwt::{JwtConfig, DEFAULT_TOKEN_TTL_HOURS};
use crate::ordering::PositionerKind;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// SQLite file. `None` means the platform data directory.
    pub db_path: Option<PathBuf>,
    pub jwt: JwtConfig,
    /// Allowed CORS origins. `None` allows any origin.
    pub cors_origins: Option<Vec<String>>,
    pub positioner: PositionerKind,
    /// Re-broadcast board events sent by WebSocket clients.
    pub client_relay: bool,
}

impl AppConfig {
    /// Load from the process environment. Call `dotenvy::dotenv()` first to
    /// pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variable names. Empty values count as
    /// unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("TASKBOARD_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match var("TASKBOARD_PORT") {
            Some(p) => p
                .trim()
                .parse()
                .with_context(|| format!("TASKBOARD_PORT must be a port number, got '{p}'"))?,
            None => DEFAULT_PORT,
        };

        let token_ttl_hours = match var("TASKBOARD_TOKEN_TTL_HOURS") {
            Some(h) => h.trim().parse().with_context(|| {
                format!("TASKBOARD_TOKEN_TTL_HOURS must be a whole number, got '{h}'")
            })?,
            None => DEFAULT_TOKEN_TTL_HOURS,
        };

        let jwt = match var("TASKBOARD_JWT_SECRET") {
            Some(secret) => JwtConfig::new(secret, token_ttl_hours),
            None => {
                tracing::warn!(
                    "TASKBOARD_JWT_SECRET is not set; tokens will not survive a restart"
                );
                JwtConfig::ephemeral(token_ttl_hours)
            }
        };

        let cors_origins = var("TASKBOARD_CORS_ORIGINS").map(|s| {
            s.split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect()
        });

        let positioner = match var("TASKBOARD_POSITIONER") {
            Some(p) => p
                .parse()
                .map_err(|e: String| anyhow::anyhow!("TASKBOARD_POSITIONER: {e}"))?,
            None => PositionerKind::default(),
        };

        let client_relay = var("TASKBOARD_CLIENT_RELAY")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        Ok(Self {
            host,
            port,
            db_path: var("TASKBOARD_DB_PATH").map(PathBuf::from),
            jwt,
            cors_origins,
            positioner,
            client_relay,
        })
    }

    /// Defaults with a fixed secret. Used by tests.
    pub fn for_tests() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: 0,
            db_path: None,
            jwt: JwtConfig::new("test-secret", DEFAULT_TOKEN_TTL_HOURS),
            cors_origins: None,
            positioner: PositionerKind::default(),
            client_relay: false,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
