//! Bootstrap configuration: a YAML file read once at startup via
//! `serde_yaml::from_reader`, merged with the listener option surface
//! [`ingress_dag::types::config_surface::ListenerConfig`] the DAG builder
//! already knows how to consume.

use std::fs::File;
use std::time::Duration;

use ingress_dag::types::config_surface::ListenerConfig;
use serde::Deserialize;

const DEFAULT_DEBOUNCE_MS: u64 = 100;
const MAX_DEBOUNCE_MS: u64 = 10_000;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListenAddresses {
    /// Address the five xDS gRPC services are served on, e.g. `0.0.0.0:18000`.
    pub xds: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapConfig {
    pub listen: ListenAddresses,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default)]
    pub listener: ListenerConfig,
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

impl BootstrapConfig {
    /// The event-coalescing debounce window, capped at 10s.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms.min(MAX_DEBOUNCE_MS))
    }
}

pub fn load(path: &str) -> BootstrapConfig {
    let file = File::open(path).unwrap_or_else(|err| panic!("unable to open bootstrap config {path}: {err}"));
    serde_yaml::from_reader(file).unwrap_or_else(|err| panic!("unable to parse bootstrap config {path}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debounce_is_capped_at_ten_seconds() {
        let config = BootstrapConfig {
            listen: ListenAddresses { xds: "0.0.0.0:18000".to_string() },
            debounce_ms: 60_000,
            log_format: LogFormat::Text,
            listener: ListenerConfig::default(),
        };
        assert_eq!(config.debounce(), Duration::from_secs(10));
    }

    #[test]
    fn default_debounce_is_one_hundred_millis() {
        assert_eq!(default_debounce_ms(), 100);
    }
}
