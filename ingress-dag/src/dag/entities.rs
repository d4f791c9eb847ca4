//! Graph (DAG) entity types. These are the builder's output —
//! translators read them, never source objects directly.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::types::config_surface::{AuthType, ListenerConfig};
use crate::types::httpproxy::CorsPolicy;
use crate::types::key::NamespacedName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerProtocol {
    Http,
    Https,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Listener {
    pub name: String,
    pub address: String,
    pub port: u16,
    pub protocol: ListenerProtocol,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathMatch {
    Exact(String),
    Regex(String),
    SegmentPrefix(String),
    Prefix(String),
}

impl PathMatch {
    /// Descending specificity rank used by the route comparator.
    pub fn specificity_rank(&self) -> u8 {
        match self {
            PathMatch::Exact(_) => 0,
            PathMatch::Regex(_) => 1,
            PathMatch::SegmentPrefix(_) => 2,
            PathMatch::Prefix(_) => 3,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            PathMatch::Exact(v) | PathMatch::Regex(v) | PathMatch::SegmentPrefix(v) | PathMatch::Prefix(v) => v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HeaderMatchKind {
    Exact,
    Contains,
    Present,
    NotPresent,
    Regex,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeaderMatch {
    pub name: String,
    pub kind: HeaderMatchKind,
    pub value: Option<String>,
    pub invert: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryMatch {
    pub name: String,
    pub kind: HeaderMatchKind,
    pub value: Option<String>,
}

/// A reference to a coalesced cluster plus the route-level weight assigned
/// to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WeightedClusterRef {
    pub cluster_name: String,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RoutePolicies {
    pub timeout: Option<Duration>,
    pub retry: Option<RoutePolicyRetry>,
    pub websocket: bool,
    pub auth: Option<AuthType>,
    pub mirror: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoutePolicyRetry {
    pub num_retries: u32,
    pub per_try_timeout: Option<Duration>,
    pub retry_on: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route {
    pub path_match: PathMatch,
    pub header_matches: Vec<HeaderMatch>,
    pub query_matches: Vec<QueryMatch>,
    pub clusters: Vec<WeightedClusterRef>,
    pub policies: RoutePolicies,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VirtualHost {
    pub fqdn: String,
    pub routes: Vec<Route>,
    pub cors_policy: Option<CorsPolicy>,
    pub rate_limit_ref: Option<NamespacedName>,
    pub authz_ref: Option<NamespacedName>,
    /// Set by an Ingress `force-ssl-redirect` annotation: Envoy redirects
    /// before route matching, so `routes` is typically empty for these.
    pub require_tls: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownstreamValidation {
    pub ca_secret: NamespacedName,
    pub skip_client_cert_validation: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SecureVirtualHost {
    pub base: VirtualHost,
    pub secret_ref: NamespacedName,
    pub min_tls_version: String,
    pub max_tls_version: String,
    pub cipher_suites: Vec<String>,
    pub alpn_protocols: Vec<String>,
    pub downstream_validation: Option<DownstreamValidation>,
    pub fallback_enabled: bool,
    pub jwt_providers: Vec<String>,
    pub authz_service: Option<NamespacedName>,
    /// Set when the owning HTTPProxy carries a `tcpproxy` block: the
    /// listener translator emits a raw `TcpProxy` filter for this SNI match
    /// instead of routing HTTP, and `base.routes` is ignored.
    pub tcp_proxy: Option<Vec<WeightedClusterRef>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadBalancingPolicy {
    RoundRobin,
    Random,
    LeastRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct HealthCheckSpec {
    pub path: Option<String>,
    pub interval: Option<Duration>,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct UpstreamTlsSpec {
    pub sni: Option<String>,
    pub ca_secret: Option<NamespacedName>,
}

/// The coalescing key: two routes producing the same tuple share one
/// cluster. `Hash` drives the deterministic identity used to build the
/// cluster name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClusterTuple {
    pub namespace: String,
    pub service_name: String,
    pub port: u16,
    pub load_balancing_policy: LoadBalancingPolicy,
    pub upstream_tls: Option<UpstreamTlsSpec>,
    pub health_check: Option<HealthCheckSpec>,
    pub connect_timeout: Option<Duration>,
    pub protocol: crate::types::service::Protocol,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub name: String,
    pub tuple: ClusterTuple,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalityEndpoint {
    pub address: std::net::IpAddr,
    pub port: u16,
    pub healthy: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterLoadAssignment {
    pub cluster_name: String,
    pub endpoints: Vec<LocalityEndpoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionCluster {
    pub cluster: Cluster,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSecret {
    pub name: NamespacedName,
    pub cert_chain: Vec<u8>,
    pub private_key: Vec<u8>,
}

/// An error recorded against a source object rather than raised past the
/// build task. `kind` names which of the seven error kinds applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStatus {
    pub key: crate::types::key::ObjectKey,
    pub kind: StatusKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    StructuralValidation,
    ReferenceResolution,
    Conflict,
    CycleOrDepthExceeded,
}

/// Everything the builder produced for one build cycle, before translation.
#[derive(Debug, Clone, Default)]
pub struct Dag {
    pub http_listener: Option<Listener>,
    pub https_listener: Option<Listener>,
    pub virtual_hosts: Vec<VirtualHost>,
    pub secure_virtual_hosts: Vec<SecureVirtualHost>,
    pub clusters: Vec<Cluster>,
    pub extension_clusters: Vec<ExtensionCluster>,
    pub load_assignments: Vec<ClusterLoadAssignment>,
    pub secrets: Vec<ValidatedSecret>,
    pub fallback: Option<FallbackCertificate>,
    pub statuses: Vec<ObjectStatus>,
    /// The bootstrap listener option surface, carried through so the
    /// listener/route translators can read it without a second input.
    pub listener_config: ListenerConfig,
    /// `"{namespace}/{name}"` of every resolved `ExtensionService` to the
    /// cluster name of its first target, used to look up the backend for a
    /// vhost's rate-limit or authorization extension reference.
    pub extension_service_clusters: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FallbackCertificate {
    pub secret: NamespacedName,
    pub vhosts: Vec<String>,
}
