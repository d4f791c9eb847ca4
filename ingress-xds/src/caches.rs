//! The five per-type xDS caches. Each wraps a
//! [`ResourceStore`] fed by one `translate::*::build` call and implements
//! [`ResourceCache`] for its `DiscoveryStream`. A shared per-type-url
//! resource map, split into five distinct stores so `RouteCache` can carry
//! its own `query` override.

use ingress_dag::Dag;
use prost::Message;

use crate::resource_cache::{EncodedResource, ResourceCache, ResourceStore};
use crate::translate;

fn default_query(store: &ResourceStore, names: &[String]) -> Vec<EncodedResource> {
    if names.is_empty() {
        return store.contents();
    }
    names.iter().filter_map(|name| store.get(name)).collect()
}

pub struct ListenerCache {
    store: ResourceStore,
}

impl ListenerCache {
    pub fn new() -> Self {
        ListenerCache { store: ResourceStore::new(translate::listener::LISTENER_TYPE_URL) }
    }

    pub fn on_change(&self, dag: &Dag) {
        self.store.on_change(translate::listener::build(dag));
    }
}

impl Default for ListenerCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceCache for ListenerCache {
    fn type_url(&self) -> &'static str {
        self.store.type_url()
    }

    fn version(&self) -> u64 {
        self.store.version()
    }

    fn contents(&self) -> Vec<EncodedResource> {
        self.store.contents()
    }

    fn query(&self, names: &[String]) -> Vec<EncodedResource> {
        default_query(&self.store, names)
    }

    fn subscribe(&self) -> tokio::sync::broadcast::Receiver<u64> {
        self.store.subscribe()
    }
}

pub struct ClusterCache {
    store: ResourceStore,
}

impl ClusterCache {
    pub fn new() -> Self {
        ClusterCache { store: ResourceStore::new(translate::cluster::CLUSTER_TYPE_URL) }
    }

    pub fn on_change(&self, dag: &Dag) {
        self.store.on_change(translate::cluster::build(dag));
    }
}

impl Default for ClusterCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceCache for ClusterCache {
    fn type_url(&self) -> &'static str {
        self.store.type_url()
    }

    fn version(&self) -> u64 {
        self.store.version()
    }

    fn contents(&self) -> Vec<EncodedResource> {
        self.store.contents()
    }

    fn query(&self, names: &[String]) -> Vec<EncodedResource> {
        default_query(&self.store, names)
    }

    fn subscribe(&self) -> tokio::sync::broadcast::Receiver<u64> {
        self.store.subscribe()
    }
}

pub struct EndpointCache {
    store: ResourceStore,
}

impl EndpointCache {
    pub fn new() -> Self {
        EndpointCache { store: ResourceStore::new(translate::endpoint::CLA_TYPE_URL) }
    }

    pub fn on_change(&self, dag: &Dag) {
        self.store.on_change(translate::endpoint::build(dag));
    }
}

impl Default for EndpointCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceCache for EndpointCache {
    fn type_url(&self) -> &'static str {
        self.store.type_url()
    }

    fn version(&self) -> u64 {
        self.store.version()
    }

    fn contents(&self) -> Vec<EncodedResource> {
        self.store.contents()
    }

    fn query(&self, names: &[String]) -> Vec<EncodedResource> {
        default_query(&self.store, names)
    }

    fn subscribe(&self) -> tokio::sync::broadcast::Receiver<u64> {
        self.store.subscribe()
    }
}

pub struct SecretCache {
    store: ResourceStore,
}

impl SecretCache {
    pub fn new() -> Self {
        SecretCache { store: ResourceStore::new(translate::secret::SECRET_TYPE_URL) }
    }

    pub fn on_change(&self, dag: &Dag) {
        self.store.on_change(translate::secret::build(dag));
    }
}

impl Default for SecretCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceCache for SecretCache {
    fn type_url(&self) -> &'static str {
        self.store.type_url()
    }

    fn version(&self) -> u64 {
        self.store.version()
    }

    fn contents(&self) -> Vec<EncodedResource> {
        self.store.contents()
    }

    fn query(&self, names: &[String]) -> Vec<EncodedResource> {
        default_query(&self.store, names)
    }

    fn subscribe(&self) -> tokio::sync::broadcast::Receiver<u64> {
        self.store.subscribe()
    }
}

/// Unlike the other four, unknown route-config names are synthesized as
/// empty `RouteConfiguration`s rather than omitted: a listener that
/// references a route config by name must get *something* back or it never
/// finishes warming.
pub struct RouteCache {
    store: ResourceStore,
}

impl RouteCache {
    pub fn new() -> Self {
        RouteCache { store: ResourceStore::new(translate::route::ROUTE_CONFIGURATION_TYPE_URL) }
    }

    pub fn on_change(&self, dag: &Dag) {
        self.store.on_change(translate::route::build(dag));
    }

    fn synthesize_empty(&self, name: &str) -> EncodedResource {
        let empty = envoy_types::pb::envoy::config::route::v3::RouteConfiguration {
            name: name.to_string(),
            ..Default::default()
        };
        EncodedResource {
            name: name.to_string(),
            any: crate::translate::any(translate::route::ROUTE_CONFIGURATION_TYPE_URL, empty.encode_to_vec()),
        }
    }
}

impl Default for RouteCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceCache for RouteCache {
    fn type_url(&self) -> &'static str {
        self.store.type_url()
    }

    fn version(&self) -> u64 {
        self.store.version()
    }

    fn contents(&self) -> Vec<EncodedResource> {
        self.store.contents()
    }

    fn query(&self, names: &[String]) -> Vec<EncodedResource> {
        if names.is_empty() {
            return self.store.contents();
        }
        names
            .iter()
            .map(|name| self.store.get(name).unwrap_or_else(|| self.synthesize_empty(name)))
            .collect()
    }

    fn subscribe(&self) -> tokio::sync::broadcast::Receiver<u64> {
        self.store.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_cache_synthesizes_empty_config_for_unknown_names() {
        let cache = RouteCache::new();
        let results = cache.query(&["ingress_http".to_string()]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "ingress_http");
    }

    #[test]
    fn listener_cache_omits_unknown_names() {
        let cache = ListenerCache::new();
        let results = cache.query(&["nonexistent".to_string()]);
        assert!(results.is_empty());
    }
}
