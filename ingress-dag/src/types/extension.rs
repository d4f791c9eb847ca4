use std::time::Duration;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use super::httpproxy::RouteService;
use super::key::ContentHash;
use super::meta::HasMeta;

/// A gRPC service reference used by filters such as rate-limit or external
/// authorization.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionService {
    pub metadata: ObjectMeta,
    pub protocol: ExtensionProtocol,
    pub targets: Vec<RouteService>,
    pub timeout: Option<Duration>,
}

impl HasMeta for ExtensionService {
    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }
}

impl ContentHash for ExtensionService {
    fn content_hash(&self) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut h = ahash::AHasher::default();
        self.protocol.hash(&mut h);
        self.targets.hash(&mut h);
        self.timeout.hash(&mut h);
        h.finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionProtocol {
    Grpc,
    Grpcs,
}
