//! Server configuration from environment variables
//!
//! | Variable                  | Default                           |
//! |---------------------------|-----------------------------------|
//! | `TABLETOP_HOST`           | `127.0.0.1`                       |
//! | `TABLETOP_PORT`           | `7420`                            |
//! | `TABLETOP_DATABASE`       | `<data dir>/tabletop/tabletop.db` |
//! | `TABLETOP_TOKEN_SECRET`   | required                          |
//! | `TABLETOP_QUEUE_CAPACITY` | `100`                             |
//! | `TABLETOP_LOG_DIR`        | `<data dir>/tabletop/logs`        |
//! | `TABLETOP_CORS`           | `true`                            |

use anyhow::{anyhow, bail, Context, Result};
use std::path::PathBuf;
use std::str::FromStr;
use tabletop_gateway::GatewayConfig;

/// Everything the binary needs to start
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub gateway: GatewayConfig,
    pub database_path: PathBuf,
}

impl ServerConfig {
    /// Build from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = GatewayConfig::default();

        let token_secret = lookup("TABLETOP_TOKEN_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| anyhow!("TABLETOP_TOKEN_SECRET must be set"))?;

        let subscriber_capacity = parse_var(&lookup, "TABLETOP_QUEUE_CAPACITY")?
            .unwrap_or(defaults.subscriber_capacity);
        if subscriber_capacity == 0 {
            bail!("TABLETOP_QUEUE_CAPACITY must be at least 1");
        }

        let gateway = GatewayConfig {
            host: lookup("TABLETOP_HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "TABLETOP_PORT")?.unwrap_or(defaults.port),
            enable_cors: parse_var(&lookup, "TABLETOP_CORS")?.unwrap_or(defaults.enable_cors),
            subscriber_capacity,
            token_secret: token_secret.into_bytes(),
        };

        let database_path = lookup("TABLETOP_DATABASE")
            .map(PathBuf::from)
            .unwrap_or_else(tabletop_storage::default_database_path);

        Ok(Self {
            gateway,
            database_path,
        })
    }
}

/// Directory for rolling log files
pub fn logs_dir() -> PathBuf {
    std::env::var("TABLETOP_LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("tabletop")
                .join("logs")
        })
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .with_context(|| format!("{} has an invalid value '{}'", key, value))
        })
        .transpose()
}
