//! Translators: pure functions from an `ingress_dag::dag::Dag` to named,
//! `Any`-wrapped Envoy protobuf resources.

pub mod cluster;
pub mod endpoint;
pub mod listener;
pub mod route;
pub mod secret;

pub(crate) fn any(type_url: &str, value: Vec<u8>) -> envoy_types::pb::google::protobuf::Any {
    envoy_types::pb::google::protobuf::Any { type_url: type_url.to_string(), value }
}

/// The single shared external-authorization backend for the whole listener,
/// chosen deterministically (lowest fqdn first) from whichever vhosts
/// reference one. Envoy's `ext_authz` filter has one backend per filter
/// chain; per-vhost opt-in/opt-out happens via `typed_per_filter_config`.
pub(crate) fn authz_backend(dag: &ingress_dag::dag::entities::Dag) -> Option<String> {
    let mut refs: Vec<&ingress_dag::types::key::NamespacedName> = dag.virtual_hosts.iter().filter_map(|v| v.authz_ref.as_ref()).collect();
    refs.extend(dag.secure_virtual_hosts.iter().filter_map(|s| s.base.authz_ref.as_ref()));
    refs.extend(dag.secure_virtual_hosts.iter().filter_map(|s| s.authz_service.as_ref()));
    refs.sort_by(|a, b| (a.namespace.as_str(), a.name.as_str()).cmp(&(b.namespace.as_str(), b.name.as_str())));
    refs.into_iter().find_map(|r| dag.extension_service_clusters.get(&format!("{}/{}", r.namespace, r.name)).cloned())
}
