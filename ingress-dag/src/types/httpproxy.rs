use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use super::ingress::PortRef;
use super::key::{ContentHash, NamespacedName};
use super::meta::HasMeta;

/// `projectcontour.io/v1 HTTPProxy` shape.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpProxy {
    pub metadata: ObjectMeta,
    pub virtualhost: Option<VirtualHostSpec>,
    pub includes: Vec<Inclusion>,
    pub routes: Vec<RouteSpec>,
    pub tcpproxy: Option<TcpProxySpec>,
}

impl HasMeta for HttpProxy {
    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }
}

impl HttpProxy {
    pub fn is_root(&self) -> bool {
        self.virtualhost.is_some()
    }
}

impl ContentHash for HttpProxy {
    fn content_hash(&self) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut h = ahash::AHasher::default();
        self.virtualhost.hash(&mut h);
        self.includes.hash(&mut h);
        self.routes.hash(&mut h);
        self.tcpproxy.hash(&mut h);
        h.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VirtualHostSpec {
    pub fqdn: String,
    pub tls: Option<VhostTlsSpec>,
    pub cors_policy: Option<CorsPolicy>,
    pub rate_limit_policy: Option<RateLimitPolicy>,
    pub authorization: Option<AuthorizationPolicy>,
    pub enable_fallback_certificate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VhostTlsSpec {
    pub secret_name: Option<NamespacedName>,
    pub minimum_tls_version: Option<String>,
    pub maximum_tls_version: Option<String>,
    pub cipher_suites: Vec<String>,
    pub passthrough: bool,
    pub client_validation: Option<DownstreamValidation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DownstreamValidation {
    pub ca_secret: NamespacedName,
    pub skip_client_cert_validation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CorsPolicy {
    pub allow_origin: Vec<String>,
    pub allow_credentials: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateLimitPolicy {
    pub extension_service: NamespacedName,
    pub domain: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthorizationPolicy {
    pub extension_service: NamespacedName,
    pub fail_open: bool,
}

/// An `include` edge: a reference to another HTTPProxy plus the match
/// conditions to compose onto every leaf route reached through it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Inclusion {
    pub target: NamespacedName,
    pub conditions: MatchConditions,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MatchConditions {
    pub prefix: Option<String>,
    pub headers: Vec<HeaderMatchSpec>,
    pub query_params: Vec<QueryMatchSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MatchKind {
    Exact,
    Contains,
    Present,
    NotPresent,
    Regex,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HeaderMatchSpec {
    pub name: String,
    pub kind: MatchKind,
    pub value: Option<String>,
    pub invert: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryMatchSpec {
    pub name: String,
    pub kind: MatchKind,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathMatchSpec {
    Prefix(String),
    Exact(String),
    Regex(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteSpec {
    pub conditions: MatchConditions,
    pub path: Option<PathMatchSpec>,
    pub services: Vec<RouteService>,
    pub mirror: Option<RouteService>,
    pub timeout: Option<std::time::Duration>,
    pub retry: Option<RetryPolicy>,
    pub websocket: bool,
    pub auth: Option<super::config_surface::AuthType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteService {
    pub name: NamespacedName,
    pub port: PortRef,
    pub weight: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RetryPolicy {
    pub num_retries: u32,
    pub per_try_timeout: Option<std::time::Duration>,
    pub retry_on: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TcpProxySpec {
    pub services: Vec<RouteService>,
}
