use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::RegistryError;

pub const DEFAULT_CONFIG_FILE: &str = "registry.toml";
pub const ENV_PREFIX: &str = "REGISTRY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub audit: AuditConfig,
}

/// Audit table settings. Missing or invalid values are only reported when the
/// first audit entry is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    pub connection_string: String,
    pub table_name: String,
    /// Remember a successful table check for the lifetime of the process.
    pub cache_table_ready: bool,
    pub failure_policy: AuditFailurePolicy,
}

/// What a mutation reports when its relational write committed but the audit
/// write failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditFailurePolicy {
    /// Surface the audit failure to the caller as a persistence failure.
    #[default]
    Propagate,
    /// Log the audit failure and report the relational outcome.
    LogAndContinue,
}

impl AppConfig {
    /// Layer defaults, an optional TOML file and `REGISTRY__*` environment
    /// variables, in that order.
    pub fn load(path: Option<&Path>) -> Result<Self, RegistryError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = Config::builder()
            .set_default("database_url", "sqlite://employees.db")?
            .set_default("server_host", "0.0.0.0")?
            .set_default("server_port", 3000)?
            .set_default("audit.connection_string", "")?
            .set_default("audit.table_name", "")?
            .set_default("audit.cache_table_ready", false)?
            .set_default("audit.failure_policy", "propagate")?
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
