use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub storage: StorageConfig,
    #[serde(default)]
    pub location: LocationConfig,
    pub gateway: GatewayConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
    Redis,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Session file for the `file` backend
    #[serde(default = "default_storage_path")]
    pub path: String,
    pub redis_url: Option<String>,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

fn default_storage_path() -> String { "data/session.json".into() }
fn default_key_prefix() -> String { "rideflow".into() }

#[derive(Debug, Deserialize, Clone)]
pub struct LocationConfig {
    #[serde(default = "default_position_timeout")]
    pub position_timeout_secs: u64,
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: usize,
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

fn default_position_timeout() -> u64 { 10 }
fn default_min_query_chars() -> usize { 2 }
fn default_max_candidates() -> usize { 5 }
fn default_recent_limit() -> usize { 5 }

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            position_timeout_secs: default_position_timeout(),
            min_query_chars: default_min_query_chars(),
            max_candidates: default_max_candidates(),
            recent_limit: default_recent_limit(),
        }
    }
}

impl LocationConfig {
    pub fn position_timeout(&self) -> Duration {
        Duration::from_secs(self.position_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GatewayMode {
    Simulated,
    Http,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    pub mode: GatewayMode,
    pub base_url: Option<String>,
    #[serde(default = "default_simulated_delay")]
    pub simulated_delay_ms: u64,
}

fn default_simulated_delay() -> u64 { 1500 }

impl GatewayConfig {
    pub fn simulated_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_delay_ms)
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides are optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Developer overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(environment())
            .build()?;

        s.try_deserialize()
    }
}

/// Eg.. `RIDEFLOW__STORAGE__BACKEND=redis` sets `storage.backend`
fn environment() -> config::Environment {
    config::Environment::with_prefix("RIDEFLOW").separator("__")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_optional_keys() {
        let s = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [storage]
                backend = "file"

                [location]
                recent_limit = 3

                [gateway]
                mode = "simulated"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let config: Config = s.try_deserialize().unwrap();

        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.storage.path, "data/session.json");
        assert_eq!(config.location.position_timeout(), Duration::from_secs(10));
        assert_eq!(config.location.min_query_chars, 2);
        assert_eq!(config.location.recent_limit, 3);
        assert_eq!(config.gateway.mode, GatewayMode::Simulated);
        assert_eq!(config.gateway.simulated_delay(), Duration::from_millis(1500));
    }

    #[test]
    fn test_environment_overrides_nested_keys() {
        let vars = [
            ("RIDEFLOW__STORAGE__BACKEND", "redis"),
            ("RIDEFLOW__GATEWAY__MODE", "http"),
            // Single underscore after the prefix is not picked up
            ("RIDEFLOW_STORAGE__PATH", "ignored.json"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let s = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [storage]
                backend = "file"

                [gateway]
                mode = "simulated"
                "#,
                config::FileFormat::Toml,
            ))
            .add_source(environment().source(Some(vars)))
            .build()
            .unwrap();
        let config: Config = s.try_deserialize().unwrap();

        assert_eq!(config.storage.backend, StorageBackend::Redis);
        assert_eq!(config.storage.path, "data/session.json");
        assert_eq!(config.gateway.mode, GatewayMode::Http);
    }
}
