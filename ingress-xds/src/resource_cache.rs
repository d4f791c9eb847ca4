//! The contract shared by all five translators, modeled on a
//! delta-computing `apply_built_resources`-style single-mutex
//! `{version, values}` pattern, generalized from one shared
//! cache keyed by type URL to one `ResourceStore` instance per translator.

use std::collections::BTreeMap;

use envoy_types::pb::google::protobuf::Any;
use parking_lot::Mutex;
use tokio::sync::broadcast;

/// One published xDS resource: the wire-ready `Any` plus the name it's
/// addressed by in `DiscoveryRequest.resource_names`.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedResource {
    pub name: String,
    pub any: Any,
}

/// Behavior common to all five translators.
pub trait ResourceCache: Send + Sync {
    fn type_url(&self) -> &'static str;
    fn version(&self) -> u64;
    fn contents(&self) -> Vec<EncodedResource>;
    fn query(&self, names: &[String]) -> Vec<EncodedResource>;
    fn subscribe(&self) -> broadcast::Receiver<u64>;
}

struct Inner {
    version: u64,
    values: BTreeMap<String, EncodedResource>,
}

/// Generic `{version, values}` store. Translator-specific types
/// (`ListenerCache`, `RouteCache`, ...) wrap one of these and implement
/// [`ResourceCache`], so each can override `query`'s unknown-name behavior
/// independently — see `RouteCache`'s route-config synthesis rule.
pub struct ResourceStore {
    type_url: &'static str,
    inner: Mutex<Inner>,
    changes: broadcast::Sender<u64>,
}

impl ResourceStore {
    pub fn new(type_url: &'static str) -> Self {
        let (changes, _) = broadcast::channel(32);
        ResourceStore { type_url, inner: Mutex::new(Inner { version: 0, values: BTreeMap::new() }), changes }
    }

    /// Replace the store's contents with a freshly translated resource set.
    /// Bumps the version and broadcasts iff the resource set differs from
    /// the one currently held, by membership or by content.
    pub fn on_change(&self, resources: Vec<EncodedResource>) {
        let mut inner = self.inner.lock();
        let incoming: BTreeMap<String, EncodedResource> =
            resources.into_iter().map(|r| (r.name.clone(), r)).collect();

        let changed = incoming.len() != inner.values.len()
            || incoming.iter().any(|(name, resource)| {
                inner.values.get(name).map(|existing| existing.any.value != resource.any.value).unwrap_or(true)
            });
        if !changed {
            return;
        }

        inner.version += 1;
        inner.values = incoming;
        let _ = self.changes.send(inner.version);
    }

    pub fn type_url(&self) -> &'static str {
        self.type_url
    }

    pub fn version(&self) -> u64 {
        self.inner.lock().version
    }

    pub fn contents(&self) -> Vec<EncodedResource> {
        self.inner.lock().values.values().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<EncodedResource> {
        self.inner.lock().values.get(name).cloned()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<u64> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(name: &str, payload: &[u8]) -> EncodedResource {
        EncodedResource {
            name: name.to_string(),
            any: Any { type_url: "type.googleapis.com/test".to_string(), value: payload.to_vec() },
        }
    }

    #[test]
    fn on_change_is_a_noop_when_the_resource_set_is_unchanged() {
        let store = ResourceStore::new("test");
        store.on_change(vec![resource("a", b"1")]);
        assert_eq!(store.version(), 1);
        store.on_change(vec![resource("a", b"1")]);
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn on_change_bumps_version_on_content_change() {
        let store = ResourceStore::new("test");
        store.on_change(vec![resource("a", b"1")]);
        store.on_change(vec![resource("a", b"2")]);
        assert_eq!(store.version(), 2);
    }

    #[test]
    fn on_change_bumps_version_on_removal() {
        let store = ResourceStore::new("test");
        store.on_change(vec![resource("a", b"1"), resource("b", b"1")]);
        store.on_change(vec![resource("a", b"1")]);
        assert_eq!(store.version(), 2);
        assert_eq!(store.contents().len(), 1);
    }

    #[tokio::test]
    async fn subscribers_observe_version_bumps() {
        let store = ResourceStore::new("test");
        let mut rx = store.subscribe();
        store.on_change(vec![resource("a", b"1")]);
        assert_eq!(rx.recv().await.unwrap(), 1);
    }
}
