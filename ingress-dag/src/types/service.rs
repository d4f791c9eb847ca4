use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use super::ingress::PortRef;
use super::key::ContentHash;
use super::meta::HasMeta;

/// `v1 Service` shape, trimmed to the fields routes can reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub metadata: ObjectMeta,
    pub ports: Vec<ServicePort>,
}

impl HasMeta for Service {
    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }
}

impl Service {
    /// Resolve a `PortRef` (number or name) to a concrete port number.
    pub fn resolve_port(&self, port_ref: &PortRef) -> Option<u16> {
        match port_ref {
            PortRef::Number(n) => self.ports.iter().any(|p| p.port == *n).then_some(*n),
            PortRef::Name(name) => self
                .ports
                .iter()
                .find(|p| p.name.as_deref() == Some(name.as_str()))
                .map(|p| p.port),
        }
    }
}

impl ContentHash for Service {
    fn content_hash(&self) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut h = ahash::AHasher::default();
        self.ports.hash(&mut h);
        h.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServicePort {
    pub name: Option<String>,
    pub port: u16,
    pub protocol: Protocol,
    pub target_port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Tcp,
    Udp,
}
