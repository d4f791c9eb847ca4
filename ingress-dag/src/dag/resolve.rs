//! Shared backend-resolution helpers used by every processor that turns a
//! `(namespace, name, port)` reference into a coalesced [`Cluster`] plus its
//! [`ClusterLoadAssignment`].

use crate::cache::{SourceObject, Snapshot};
use crate::types::ingress::PortRef;
use crate::types::key::{Kind, ObjectKey};

use super::cluster::cluster_name;
use super::entities::{ClusterLoadAssignment, ClusterTuple, LoadBalancingPolicy, LocalityEndpoint};

/// Resolve `(namespace, service_name, port_ref)` against the cache
/// snapshot, returning the coalesced cluster name and a freshly built load
/// assignment. `None` means the reference is dangling: the caller drops
/// the referencing route/vhost and records an error, it never falls back
/// to a different value.
pub fn resolve_backend(
    snapshot: &Snapshot,
    namespace: &str,
    service_name: &str,
    port_ref: &PortRef,
) -> Option<(ClusterTuple, ClusterLoadAssignment)> {
    let service_key = ObjectKey::new(Kind::Service, namespace, service_name);
    let service = match snapshot.get(&service_key)? {
        SourceObject::Service(s) => s.clone(),
        _ => return None,
    };
    let port = service.resolve_port(port_ref)?;
    let protocol = service
        .ports
        .iter()
        .find(|p| p.port == port)
        .map(|p| p.protocol)
        .unwrap_or(crate::types::service::Protocol::Tcp);

    let tuple = ClusterTuple {
        namespace: namespace.to_string(),
        service_name: service_name.to_string(),
        port,
        load_balancing_policy: LoadBalancingPolicy::RoundRobin,
        upstream_tls: None,
        health_check: None,
        connect_timeout: None,
        protocol,
    };

    let name = cluster_name(&tuple);
    let endpoints = endpoints_for(snapshot, namespace, service_name, port);
    Some((tuple, ClusterLoadAssignment { cluster_name: name, endpoints }))
}

fn endpoints_for(snapshot: &Snapshot, namespace: &str, service_name: &str, port: u16) -> Vec<LocalityEndpoint> {
    let mut endpoints: Vec<LocalityEndpoint> = snapshot
        .of_kind(Kind::EndpointSlice)
        .filter(|(k, _)| k.namespace == namespace)
        .filter_map(|(_, obj)| match obj {
            SourceObject::EndpointSlice(slice) if slice.service_name == service_name => Some(slice.clone()),
            _ => None,
        })
        .flat_map(|slice| {
            slice
                .endpoints
                .iter()
                .map(|e| LocalityEndpoint { address: e.address, port, healthy: e.ready })
                .collect::<Vec<_>>()
        })
        .collect();
    // Snapshot iteration order tracks object insertion order, not wire
    // content — sort so two snapshots with the same endpoints in a
    // different insertion order produce byte-equal output.
    endpoints.sort_by(|a, b| (a.address, a.port).cmp(&(b.address, b.port)));
    endpoints
}
