//! ClusterLoadAssignment translation: one per cluster, built
//! from `EndpointSlice` objects with health-state filtering, a single
//! default locality.

use ingress_dag::dag::entities::{ClusterLoadAssignment as DagCla, Dag, LocalityEndpoint};

use envoy_types::pb::envoy::config::core::v3::{
    address::Address as AddressType, socket_address::PortSpecifier, Address, HealthStatus, Locality,
    SocketAddress,
};
use envoy_types::pb::envoy::config::endpoint::v3::{
    lb_endpoint::HostIdentifier, ClusterLoadAssignment as EnvoyCla, Endpoint as EnvoyEndpoint,
    LbEndpoint, LocalityLbEndpoints,
};
use prost::Message;

use crate::resource_cache::EncodedResource;

pub(crate) const CLA_TYPE_URL: &str = "type.googleapis.com/envoy.config.endpoint.v3.ClusterLoadAssignment";

pub fn build(dag: &Dag) -> Vec<EncodedResource> {
    let mut out: Vec<EncodedResource> = dag.load_assignments.iter().map(|cla| encode(build_cla(cla))).collect();
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}

fn encode(cla: EnvoyCla) -> EncodedResource {
    EncodedResource { name: cla.cluster_name.clone(), any: crate::translate::any(CLA_TYPE_URL, cla.encode_to_vec()) }
}

fn build_cla(cla: &DagCla) -> EnvoyCla {
    EnvoyCla {
        cluster_name: cla.cluster_name.clone(),
        endpoints: vec![LocalityLbEndpoints {
            locality: Some(Locality::default()),
            lb_endpoints: cla.endpoints.iter().map(build_lb_endpoint).collect(),
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn build_lb_endpoint(endpoint: &LocalityEndpoint) -> LbEndpoint {
    let socket_address = SocketAddress {
        address: endpoint.address.to_string(),
        port_specifier: Some(PortSpecifier::PortValue(endpoint.port as u32)),
        ..Default::default()
    };
    LbEndpoint {
        health_status: if endpoint.healthy { HealthStatus::Healthy as i32 } else { HealthStatus::Unhealthy as i32 },
        host_identifier: Some(HostIdentifier::Endpoint(EnvoyEndpoint {
            address: Some(Address { address: Some(AddressType::SocketAddress(socket_address)) }),
            ..Default::default()
        })),
        ..Default::default()
    }
}
