//! Configuration management for org chart services.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (`ORGCHART_` prefix, `__` between sections,
//!    e.g. `ORGCHART_NEO4J__URI`)
//! 2. Config file (`orgchart.toml` by default)
//! 3. Defaults

use serde::Deserialize;

use crate::error::Result;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrgChartConfig {
    #[serde(default)]
    pub neo4j: Neo4jSettings,

    #[serde(default)]
    pub log: LogSettings,
}

/// Connection settings for the Neo4j graph store.
#[derive(Debug, Clone, Deserialize)]
pub struct Neo4jSettings {
    #[serde(default = "default_uri")]
    pub uri: String,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_password")]
    pub password: String,

    /// Size of the bolt connection pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Rows pulled per round trip.
    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,

    #[serde(default = "default_database")]
    pub database: String,
}

/// Logging settings for the binaries.
#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_user() -> String {
    "neo4j".to_string()
}

fn default_password() -> String {
    "orgchart-dev".to_string()
}

fn default_max_connections() -> u32 {
    16
}

fn default_fetch_size() -> usize {
    256
}

fn default_database() -> String {
    "neo4j".to_string()
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for Neo4jSettings {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            user: default_user(),
            password: default_password(),
            max_connections: default_max_connections(),
            fetch_size: default_fetch_size(),
            database: default_database(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

/// Load configuration from `<file_prefix>.{toml,yaml,json,...}` (optional)
/// overlaid with `ORGCHART_*` environment variables.
pub fn load(file_prefix: &str) -> Result<OrgChartConfig> {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(
            config::Environment::with_prefix("ORGCHART")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(cfg.try_deserialize::<OrgChartConfig>()?)
}
