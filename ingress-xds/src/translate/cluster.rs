//! Cluster translation: one per coalesced backend tuple plus
//! one per ExtensionService, carrying load-balancing policy, health checks,
//! and upstream TLS.

use ingress_dag::dag::entities::{ClusterTuple, Dag, LoadBalancingPolicy};

use envoy_types::pb::envoy::config::cluster::v3::{
    cluster::{ClusterDiscoveryType, DiscoveryType, LbPolicy},
    Cluster as EnvoyCluster,
};
use envoy_types::pb::envoy::config::core::v3::health_check;
use envoy_types::pb::envoy::config::core::v3::HealthCheck;
use envoy_types::pb::envoy::extensions::transport_sockets::tls::v3::{
    CommonTlsContext, UpstreamTlsContext,
};
use envoy_types::pb::google::protobuf::{Any, Duration as PbDuration};
use prost::Message;

use crate::resource_cache::EncodedResource;

pub(crate) const CLUSTER_TYPE_URL: &str = "type.googleapis.com/envoy.config.cluster.v3.Cluster";
const UPSTREAM_TLS_CONTEXT_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.transport_sockets.tls.v3.UpstreamTlsContext";

pub fn build(dag: &Dag) -> Vec<EncodedResource> {
    let mut out: Vec<EncodedResource> = dag.clusters.iter().map(|c| encode(build_cluster(&c.name, &c.tuple, None))).collect();
    out.extend(dag.extension_clusters.iter().map(|ext| encode(build_extension_cluster(ext))));
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}

fn encode(cluster: EnvoyCluster) -> EncodedResource {
    EncodedResource { name: cluster.name.clone(), any: crate::translate::any(CLUSTER_TYPE_URL, cluster.encode_to_vec()) }
}

fn build_cluster(name: &str, tuple: &ClusterTuple, connect_timeout: Option<std::time::Duration>) -> EnvoyCluster {
    EnvoyCluster {
        name: name.to_string(),
        cluster_discovery_type: Some(ClusterDiscoveryType::Type(DiscoveryType::Eds as i32)),
        lb_policy: lb_policy(tuple.load_balancing_policy) as i32,
        connect_timeout: Some(duration_to_pb(connect_timeout.or(tuple.connect_timeout).unwrap_or(std::time::Duration::from_secs(5)))),
        health_checks: tuple.health_check.as_ref().map(build_health_check).into_iter().collect(),
        transport_socket: tuple.upstream_tls.as_ref().map(build_upstream_tls),
        ..Default::default()
    }
}

fn build_extension_cluster(ext: &ingress_dag::dag::entities::ExtensionCluster) -> EnvoyCluster {
    build_cluster(&ext.cluster.name, &ext.cluster.tuple, ext.timeout)
}

fn lb_policy(policy: LoadBalancingPolicy) -> LbPolicy {
    match policy {
        LoadBalancingPolicy::RoundRobin => LbPolicy::RoundRobin,
        LoadBalancingPolicy::Random => LbPolicy::Random,
        LoadBalancingPolicy::LeastRequest => LbPolicy::LeastRequest,
    }
}

fn build_health_check(spec: &ingress_dag::dag::entities::HealthCheckSpec) -> HealthCheck {
    HealthCheck {
        timeout: spec.timeout.map(duration_to_pb),
        interval: spec.interval.map(duration_to_pb),
        unhealthy_threshold: Some(envoy_types::pb::google::protobuf::UInt32Value { value: 3 }),
        healthy_threshold: Some(envoy_types::pb::google::protobuf::UInt32Value { value: 2 }),
        health_checker: spec.path.as_ref().map(|path| {
            health_check::HealthChecker::HttpHealthCheck(health_check::HttpHealthCheck {
                path: path.clone(),
                ..Default::default()
            })
        }),
        ..Default::default()
    }
}

fn build_upstream_tls(spec: &ingress_dag::dag::entities::UpstreamTlsSpec) -> envoy_types::pb::envoy::config::core::v3::TransportSocket {
    let upstream = UpstreamTlsContext {
        common_tls_context: Some(CommonTlsContext::default()),
        sni: spec.sni.clone().unwrap_or_default(),
        ..Default::default()
    };
    envoy_types::pb::envoy::config::core::v3::TransportSocket {
        name: "envoy.transport_sockets.tls".to_string(),
        config_type: Some(
            envoy_types::pb::envoy::config::core::v3::transport_socket::ConfigType::TypedConfig(Any {
                type_url: UPSTREAM_TLS_CONTEXT_TYPE_URL.to_string(),
                value: upstream.encode_to_vec(),
            }),
        ),
    }
}

fn duration_to_pb(d: std::time::Duration) -> PbDuration {
    PbDuration { seconds: d.as_secs() as i64, nanos: d.subsec_nanos() as i32 }
}
