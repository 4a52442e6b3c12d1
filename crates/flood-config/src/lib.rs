use serde::{Deserialize, Serialize};
use std::{env, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Local,
    Dev,
    Test,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_env(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "local" => Self::Local,
            "dev" | "development" => Self::Dev,
            "test" | "testing" => Self::Test,
            "staging" => Self::Staging,
            "prod" | "production" => Self::Prod,
            _ => Self::Local,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Self::Local => "local",
            Self::Dev => "dev",
            Self::Test => "test",
            Self::Staging => "staging",
            Self::Prod => "prod",
        };
        write!(f, "{}", value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl StorageBackend {
    pub fn from_env(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Self::Postgres,
            _ => Self::Memory,
        }
    }
}

/// Key lookup so configuration can be built from something other than the
/// process environment.
pub type VarSource<'a> = &'a dyn Fn(&str) -> Option<String>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub service_name: String,
    pub environment: Environment,
    pub bind_addr: String,
    pub metrics_addr: Option<String>,
    pub log_level: String,
    pub storage_backend: StorageBackend,
}

impl ServiceConfig {
    pub fn from_env(default_service_name: &str) -> Self {
        Self::from_source(default_service_name, &|key| env::var(key).ok())
    }

    pub fn from_source(default_service_name: &str, vars: VarSource<'_>) -> Self {
        let service_name = var_or(vars, "FLOOD_SERVICE_NAME", default_service_name);
        let environment = Environment::from_env(&var_or(vars, "FLOOD_ENV", "local"));
        let bind_addr = var_or(vars, "FLOOD_BIND_ADDR", "0.0.0.0:8080");
        let metrics_addr = vars("FLOOD_METRICS_ADDR").filter(|value| !value.trim().is_empty());
        let log_level = var_or(vars, "FLOOD_LOG_LEVEL", "info");
        let storage_backend =
            StorageBackend::from_env(&var_or(vars, "FLOOD_STORAGE_BACKEND", "memory"));

        Self {
            service_name,
            environment,
            bind_addr,
            metrics_addr,
            log_level,
            storage_backend,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    pub tracking_code_prefix: String,
    pub tracking_code_length: usize,
    pub tracking_code_attempts: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            tracking_code_prefix: "SOS".to_string(),
            tracking_code_length: 6,
            tracking_code_attempts: 8,
        }
    }
}

impl DispatchConfig {
    pub const MIN_CODE_LENGTH: usize = 4;
    pub const MAX_CODE_LENGTH: usize = 32;

    pub fn from_env() -> Self {
        Self::from_source(&|key| env::var(key).ok())
    }

    pub fn from_source(vars: VarSource<'_>) -> Self {
        let defaults = Self::default();
        let tracking_code_prefix = vars("FLOOD_TRACKING_CODE_PREFIX")
            .map(|value| value.trim().to_ascii_uppercase())
            .unwrap_or(defaults.tracking_code_prefix);
        let tracking_code_length = vars("FLOOD_TRACKING_CODE_LENGTH")
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(defaults.tracking_code_length)
            .clamp(Self::MIN_CODE_LENGTH, Self::MAX_CODE_LENGTH);
        let tracking_code_attempts = vars("FLOOD_TRACKING_CODE_ATTEMPTS")
            .and_then(|value| value.trim().parse::<u32>().ok())
            .filter(|attempts| *attempts > 0)
            .unwrap_or(defaults.tracking_code_attempts);

        Self {
            tracking_code_prefix,
            tracking_code_length,
            tracking_code_attempts,
        }
    }
}

fn var_or(vars: VarSource<'_>, key: &str, default: &str) -> String {
    vars(key).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn service_defaults_apply_when_unset() {
        let vars = source(&[]);
        let config = ServiceConfig::from_source("flood-api", &|key| vars.get(key).cloned());
        assert_eq!(config.service_name, "flood-api");
        assert_eq!(config.environment, Environment::Local);
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.metrics_addr, None);
        assert_eq!(config.storage_backend, StorageBackend::Memory);
    }

    #[test]
    fn service_reads_overrides() {
        let vars = source(&[
            ("FLOOD_ENV", "production"),
            ("FLOOD_STORAGE_BACKEND", "PostgreSQL"),
            ("FLOOD_METRICS_ADDR", "127.0.0.1:9000"),
        ]);
        let config = ServiceConfig::from_source("flood-api", &|key| vars.get(key).cloned());
        assert_eq!(config.environment, Environment::Prod);
        assert_eq!(config.storage_backend, StorageBackend::Postgres);
        assert_eq!(config.metrics_addr.as_deref(), Some("127.0.0.1:9000"));
    }

    #[test]
    fn tracking_code_length_is_clamped() {
        let vars = source(&[
            ("FLOOD_TRACKING_CODE_PREFIX", "res"),
            ("FLOOD_TRACKING_CODE_LENGTH", "2"),
            ("FLOOD_TRACKING_CODE_ATTEMPTS", "0"),
        ]);
        let config = DispatchConfig::from_source(&|key| vars.get(key).cloned());
        assert_eq!(config.tracking_code_prefix, "RES");
        assert_eq!(config.tracking_code_length, DispatchConfig::MIN_CODE_LENGTH);
        assert_eq!(config.tracking_code_attempts, 8);
    }
}
