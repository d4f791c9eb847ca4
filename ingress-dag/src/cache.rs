//! Object cache: the live set of source objects the builder reads from.
//!
//! Writers call `upsert`/`remove`, each mutation answers whether it
//! actually changed anything via [`ContentHash`], and a `version` counter
//! plus a `tokio::sync::broadcast` channel notify anyone waiting on a
//! fresh snapshot. Rather than caching already-built Envoy resources, this
//! holds the raw Kubernetes-ish source objects the DAG builder consumes —
//! one `HashMap` per [`Kind`], guarded by a single `parking_lot::Mutex`
//! since critical sections are short.

use std::collections::HashMap;
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::types::endpoints::EndpointSlice;
use crate::types::extension::ExtensionService;
use crate::types::httpproxy::HttpProxy;
use crate::types::ingress::IngressRule;
use crate::types::key::{ContentHash, Kind, ObjectKey};
use crate::types::secret::Secret;
use crate::types::service::Service;

/// A source object tagged with its kind, stored behind `Arc` so snapshots
/// are cheap to hand out without cloning the underlying data.
#[derive(Debug, Clone)]
pub enum SourceObject {
    Ingress(Arc<IngressRule>),
    HttpProxy(Arc<HttpProxy>),
    Service(Arc<Service>),
    EndpointSlice(Arc<EndpointSlice>),
    Secret(Arc<Secret>),
    ExtensionService(Arc<ExtensionService>),
}

impl SourceObject {
    pub fn kind(&self) -> Kind {
        match self {
            SourceObject::Ingress(_) => Kind::Ingress,
            SourceObject::HttpProxy(_) => Kind::HttpProxy,
            SourceObject::Service(_) => Kind::Service,
            SourceObject::EndpointSlice(_) => Kind::EndpointSlice,
            SourceObject::Secret(_) => Kind::Secret,
            SourceObject::ExtensionService(_) => Kind::ExtensionService,
        }
    }

    fn content_hash(&self) -> u64 {
        match self {
            SourceObject::Ingress(o) => o.content_hash(),
            SourceObject::HttpProxy(o) => o.content_hash(),
            SourceObject::Service(o) => o.content_hash(),
            SourceObject::EndpointSlice(o) => o.content_hash(),
            SourceObject::Secret(o) => o.content_hash(),
            SourceObject::ExtensionService(o) => o.content_hash(),
        }
    }
}

struct Entry {
    object: SourceObject,
    hash: u64,
}

/// A point-in-time, shareable view of everything the cache held when the
/// snapshot was taken. Builds always run over a consistent snapshot,
/// never the live mutable map.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub objects: AHashMap<ObjectKey, SourceObject>,
}

impl Snapshot {
    pub fn get(&self, key: &ObjectKey) -> Option<&SourceObject> {
        self.objects.get(key)
    }

    pub fn of_kind(&self, kind: Kind) -> impl Iterator<Item = (&ObjectKey, &SourceObject)> {
        self.objects.iter().filter(move |(k, _)| k.kind == kind)
    }
}

/// Whether an `upsert` actually changed the cache's content, used by
/// callers deciding whether a rebuild is warranted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Inserted,
    Updated,
    Unchanged,
    Removed,
    NotPresent,
}

struct Inner {
    entries: HashMap<ObjectKey, Entry>,
    version: u64,
}

/// The live object cache. Cheap to clone (it's an `Arc` internally via the
/// caller holding a single shared instance); all mutation goes through a
/// short-lived `parking_lot::Mutex` lock, preferred here over `std::sync`
/// for hot paths.
pub struct ObjectCache {
    inner: Mutex<Inner>,
    changes: broadcast::Sender<u64>,
}

impl Default for ObjectCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectCache {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(128);
        ObjectCache {
            inner: Mutex::new(Inner { entries: HashMap::new(), version: 0 }),
            changes,
        }
    }

    /// Insert or update a source object. Returns [`ChangeKind::Unchanged`]
    /// when the object's structural hash didn't move — the common case on
    /// a resync where nothing actually changed.
    pub fn upsert(&self, key: ObjectKey, object: SourceObject) -> ChangeKind {
        let hash = object.content_hash();
        let mut inner = self.inner.lock();
        let change = match inner.entries.get(&key) {
            Some(existing) if existing.hash == hash => ChangeKind::Unchanged,
            Some(_) => ChangeKind::Updated,
            None => ChangeKind::Inserted,
        };
        if change != ChangeKind::Unchanged {
            inner.entries.insert(key, Entry { object, hash });
            inner.version += 1;
            let _ = self.changes.send(inner.version);
        }
        change
    }

    pub fn remove(&self, key: &ObjectKey) -> ChangeKind {
        let mut inner = self.inner.lock();
        match inner.entries.remove(key) {
            Some(_) => {
                inner.version += 1;
                let _ = self.changes.send(inner.version);
                ChangeKind::Removed
            }
            None => ChangeKind::NotPresent,
        }
    }

    pub fn version(&self) -> u64 {
        self.inner.lock().version
    }

    /// Subscribe to version bumps; the builder's debounce loop wakes on
    /// these rather than polling.
    pub fn subscribe(&self) -> broadcast::Receiver<u64> {
        self.changes.subscribe()
    }

    /// Take an atomic, shareable snapshot of the current contents.
    pub fn snapshot(&self) -> Snapshot {
        let inner = self.inner.lock();
        let objects = inner
            .entries
            .iter()
            .map(|(k, e)| (k.clone(), e.object.clone()))
            .collect();
        Snapshot { objects }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::key::NamespacedName;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use std::collections::BTreeMap;

    fn ingress(name: &str) -> IngressRule {
        IngressRule {
            metadata: ObjectMeta { name: Some(name.into()), namespace: Some("default".into()), ..Default::default() },
            tls: vec![],
            rules: vec![],
            default_backend: None,
            annotations: BTreeMap::new(),
        }
    }

    #[test]
    fn reinserting_identical_content_is_unchanged() {
        let cache = ObjectCache::new();
        let key = ObjectKey::new(Kind::Ingress, "default", "web");
        let first = cache.upsert(key.clone(), SourceObject::Ingress(Arc::new(ingress("web"))));
        assert_eq!(first, ChangeKind::Inserted);

        let second = cache.upsert(key.clone(), SourceObject::Ingress(Arc::new(ingress("web"))));
        assert_eq!(second, ChangeKind::Unchanged);
        assert_eq!(cache.version(), 1);
    }

    #[test]
    fn changing_content_bumps_version() {
        let cache = ObjectCache::new();
        let key = ObjectKey::new(Kind::Ingress, "default", "web");
        cache.upsert(key.clone(), SourceObject::Ingress(Arc::new(ingress("web"))));

        let mut changed = ingress("web");
        changed.default_backend = Some(crate::types::ingress::Backend {
            service_name: "svc".into(),
            service_port: crate::types::ingress::PortRef::Number(80),
        });
        let change = cache.upsert(key, SourceObject::Ingress(Arc::new(changed)));
        assert_eq!(change, ChangeKind::Updated);
        assert_eq!(cache.version(), 2);
    }

    #[test]
    fn snapshot_is_isolated_from_later_writes() {
        let cache = ObjectCache::new();
        let key = ObjectKey::new(Kind::Ingress, "default", "web");
        cache.upsert(key.clone(), SourceObject::Ingress(Arc::new(ingress("web"))));
        let snap = cache.snapshot();
        cache.remove(&key);
        assert!(snap.get(&key).is_some());
        assert!(cache.snapshot().get(&key).is_none());
    }

    #[test]
    fn removing_unknown_key_reports_not_present() {
        let cache = ObjectCache::new();
        let key = ObjectKey::new(Kind::Secret, "default", "missing");
        assert_eq!(cache.remove(&key), ChangeKind::NotPresent);
        let _ = NamespacedName::new("default", "missing");
    }
}
