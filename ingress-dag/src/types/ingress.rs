use std::collections::BTreeMap;
use std::time::Duration;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use super::meta::HasMeta;

/// `networking.k8s.io/v1 Ingress` shape.
#[derive(Debug, Clone, PartialEq)]
pub struct IngressRule {
    pub metadata: ObjectMeta,
    pub tls: Vec<IngressTls>,
    pub rules: Vec<HttpIngressRule>,
    pub default_backend: Option<Backend>,
    pub annotations: BTreeMap<String, String>,
}

impl HasMeta for IngressRule {
    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }
}

impl super::key::ContentHash for IngressRule {
    fn content_hash(&self) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut h = ahash::AHasher::default();
        self.tls.hash(&mut h);
        self.rules.hash(&mut h);
        self.default_backend.hash(&mut h);
        self.annotations.hash(&mut h);
        h.finish()
    }
}

impl IngressRule {
    /// Recognized annotation keys. Unknown annotations are
    /// ignored — callers look these up by exact key and treat a missing
    /// key as "not configured".
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }

    pub fn allow_http(&self) -> bool {
        self.annotation("kubernetes.io/ingress.allow-http")
            .map(|v| v != "false")
            .unwrap_or(true)
    }

    pub fn force_ssl_redirect(&self) -> bool {
        self.annotation("ingress.kubernetes.io/force-ssl-redirect")
            .map(|v| v == "true")
            .unwrap_or(false)
    }

    pub fn tls_minimum_protocol_version(&self) -> Option<&str> {
        self.annotation("projectcontour.io/tls-minimum-protocol-version")
    }

    pub fn tls_maximum_protocol_version(&self) -> Option<&str> {
        self.annotation("projectcontour.io/tls-maximum-protocol-version")
    }

    /// `Some(Duration::ZERO)` means "disabled" (the annotation's `infinity`
    /// value), distinct from `None` meaning "not set".
    pub fn request_timeout(&self) -> Option<Duration> {
        self.annotation("projectcontour.io/request-timeout").and_then(parse_duration)
    }

    pub fn per_try_timeout(&self) -> Option<Duration> {
        self.annotation("projectcontour.io/per-try-timeout").and_then(parse_duration)
    }

    pub fn retry_on(&self) -> Option<Vec<String>> {
        self.annotation("projectcontour.io/retry-on")
            .map(|v| v.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect())
    }

    pub fn num_retries(&self) -> Option<u32> {
        self.annotation("projectcontour.io/num-retries").and_then(|v| v.parse().ok())
    }

    pub fn websocket_routes(&self) -> Vec<String> {
        self.annotation("projectcontour.io/websocket-routes")
            .map(|v| v.split(',').map(|p| p.trim().to_string()).filter(|p| !p.is_empty()).collect())
            .unwrap_or_default()
    }
}

/// Hand-rolled so as not to pull in a duration-parsing crate for five
/// annotation values: `<number><unit>` with `unit` one of
/// `ns`/`us`/`ms`/`s`/`m`/`h` (bare number means seconds), or `infinity`.
fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("infinity") || value.eq_ignore_ascii_case("infinite") {
        return Some(Duration::ZERO);
    }
    let split_at = value.find(|c: char| !c.is_ascii_digit() && c != '.').unwrap_or(value.len());
    let (number, unit) = value.split_at(split_at);
    let number: f64 = number.parse().ok()?;
    let seconds_per_unit = match unit {
        "ns" => 1e-9,
        "us" | "µs" => 1e-6,
        "ms" => 1e-3,
        "s" | "" => 1.0,
        "m" => 60.0,
        "h" => 3600.0,
        _ => return None,
    };
    Some(Duration::from_secs_f64(number * seconds_per_unit))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IngressTls {
    pub hosts: Vec<String>,
    pub secret_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HttpIngressRule {
    pub host: Option<String>,
    pub paths: Vec<HttpIngressPath>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IngressPathType {
    Exact,
    Prefix,
    ImplementationSpecific,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HttpIngressPath {
    pub path: String,
    pub path_type: IngressPathType,
    pub backend: Backend,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Backend {
    pub service_name: String,
    pub service_port: PortRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PortRef {
    Number(u16),
    Name(String),
}
