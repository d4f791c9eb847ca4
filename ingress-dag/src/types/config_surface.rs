//! Listener configuration surface and the per-route auth strategy,
//! modeled the way a pluggable, mostly-optional configuration struct
//! with `#[serde(untagged)]` enums represents its variant-like options.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AuthType {
    Key { key: KeyAuth },
    Jwt { jwt: JwtAuth },
    External { external: ExternalAuth },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct KeyAuth {
    pub allowed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct JwtAuth {
    pub providers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct ExternalAuth {
    pub extension_service: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLogLevel {
    Info,
    Error,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerHeaderTransformation {
    Overwrite,
    AppendIfAbsent,
    PassThrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionAlgorithm {
    Gzip,
    Brotli,
    Zstd,
    Disabled,
}

impl Default for CompressionAlgorithm {
    fn default() -> Self {
        // "unknown -> gzip"; also the default when the option is absent
        // entirely.
        CompressionAlgorithm::Gzip
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TimeoutsConfig {
    pub request: Option<Duration>,
    pub connection_idle: Option<Duration>,
    pub stream_idle: Option<Duration>,
    pub max_connection_duration: Option<Duration>,
    pub delayed_close: Option<Duration>,
    pub connection_shutdown_grace_period: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SocketOptionsConfig {
    pub tos: Option<u8>,
    pub traffic_class: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RateLimitServiceConfig {
    pub extension_service_ref: String,
    pub domain: String,
    pub sni: Option<String>,
    pub timeout: Option<Duration>,
    pub fail_open: bool,
    pub enable_x_ratelimit_headers: bool,
    pub enable_resource_exhausted_code: bool,
}

/// The full recognized listener option surface. Every field is optional
/// and the builder applies documented defaults, in the style of an
/// all-`Option<T>` struct deserialized straight off the bootstrap YAML.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ListenerConfig {
    pub use_proxy_proto: Option<bool>,
    pub http_access_log: Option<String>,
    pub https_access_log: Option<String>,
    pub access_log_level: Option<AccessLogLevel>,
    pub minimum_tls_version: Option<String>,
    pub maximum_tls_version: Option<String>,
    pub cipher_suites: Option<Vec<String>>,
    pub xff_num_trusted_hops: Option<u32>,
    pub merge_slashes: Option<bool>,
    pub server_header_transformation: Option<ServerHeaderTransformation>,
    pub allow_chunked_length: Option<bool>,
    pub max_requests_per_connection: Option<u32>,
    pub http2_max_concurrent_streams: Option<u32>,
    pub per_connection_buffer_limit_bytes: Option<u32>,
    pub compression_algorithm: Option<CompressionAlgorithm>,
    pub timeouts: Option<TimeoutsConfig>,
    pub strip_trailing_host_dot: Option<bool>,
    pub socket_options: Option<SocketOptionsConfig>,
    pub rate_limit_config: Option<RateLimitServiceConfig>,
    pub fallback_certificate: Option<crate::types::key::NamespacedName>,
}

impl ListenerConfig {
    pub fn http_access_log_path(&self) -> &str {
        self.http_access_log.as_deref().unwrap_or("/dev/stdout")
    }

    pub fn https_access_log_path(&self) -> &str {
        self.https_access_log.as_deref().unwrap_or("/dev/stdout")
    }

    pub fn compression(&self) -> CompressionAlgorithm {
        self.compression_algorithm.unwrap_or_default()
    }
}
