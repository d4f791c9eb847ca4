//! The xDS stream server: five independent gRPC services,
//! one per type URL, sharing one generic per-stream state machine.

pub mod discovery_stream;
pub mod services;

use std::sync::Arc;

use ingress_dag::Dag;

use crate::caches::{ClusterCache, EndpointCache, ListenerCache, RouteCache, SecretCache};

/// Owns the five translator caches and republishes a freshly built DAG to
/// all of them. One instance is shared by the event hub and by every
/// `tonic` service built from [`XdsServer::into_services`].
pub struct XdsServer {
    pub listeners: Arc<ListenerCache>,
    pub routes: Arc<RouteCache>,
    pub clusters: Arc<ClusterCache>,
    pub endpoints: Arc<EndpointCache>,
    pub secrets: Arc<SecretCache>,
}

impl XdsServer {
    pub fn new() -> Self {
        XdsServer {
            listeners: Arc::new(ListenerCache::new()),
            routes: Arc::new(RouteCache::new()),
            clusters: Arc::new(ClusterCache::new()),
            endpoints: Arc::new(EndpointCache::new()),
            secrets: Arc::new(SecretCache::new()),
        }
    }

    /// Publish a new DAG to every cache. Each cache independently decides,
    /// via [`crate::resource_cache::ResourceStore::on_change`], whether its
    /// own resource set actually changed.
    pub fn publish(&self, dag: &Dag) {
        self.listeners.on_change(dag);
        self.routes.on_change(dag);
        self.clusters.on_change(dag);
        self.endpoints.on_change(dag);
        self.secrets.on_change(dag);
    }

    pub fn listener_service(&self) -> services::ListenerService {
        services::ListenerService::new(self.listeners.clone())
    }

    pub fn route_service(&self) -> services::RouteService {
        services::RouteService::new(self.routes.clone())
    }

    pub fn cluster_service(&self) -> services::ClusterService {
        services::ClusterService::new(self.clusters.clone())
    }

    pub fn endpoint_service(&self) -> services::EndpointService {
        services::EndpointService::new(self.endpoints.clone())
    }

    pub fn secret_service(&self) -> services::SecretService {
        services::SecretService::new(self.secrets.clone())
    }
}

impl Default for XdsServer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource_cache::ResourceCache;

    #[test]
    fn publish_is_idempotent_for_an_unchanged_dag() {
        let server = XdsServer::new();
        let dag = Dag::default();
        server.publish(&dag);
        let v1 = server.listeners.version();
        server.publish(&dag);
        assert_eq!(server.listeners.version(), v1);
    }
}
