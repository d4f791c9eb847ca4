use std::net::IpAddr;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use super::key::ContentHash;
use super::meta::HasMeta;

/// `discovery.k8s.io/v1 EndpointSlice` shape, lifecycle independent of the
/// `Service` it backs.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointSlice {
    pub metadata: ObjectMeta,
    pub service_name: String,
    pub port: u16,
    pub endpoints: Vec<Endpoint>,
}

impl HasMeta for EndpointSlice {
    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }
}

impl ContentHash for EndpointSlice {
    fn content_hash(&self) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut h = ahash::AHasher::default();
        self.service_name.hash(&mut h);
        self.port.hash(&mut h);
        self.endpoints.hash(&mut h);
        h.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub address: IpAddr,
    pub ready: bool,
}
