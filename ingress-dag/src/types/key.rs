use std::fmt;

/// Computes a structural hash over the parts of a source object that
/// determine behavior, excluding bookkeeping fields (`resource_version`,
/// timestamps, labels/annotations not otherwise interpreted). The object
/// cache uses this to answer "did this upsert actually change anything"
/// without requiring every nested `ObjectMeta` to implement `Hash`.
pub trait ContentHash {
    fn content_hash(&self) -> u64;
}

/// Discriminates the five source object kinds the cache stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Ingress,
    HttpProxy,
    Service,
    EndpointSlice,
    Secret,
    ExtensionService,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::Ingress => "Ingress",
            Kind::HttpProxy => "HTTPProxy",
            Kind::Service => "Service",
            Kind::EndpointSlice => "EndpointSlice",
            Kind::Secret => "Secret",
            Kind::ExtensionService => "ExtensionService",
        };
        f.write_str(s)
    }
}

/// All source references are by `(namespace, name[, port|key])`; the cache
/// itself is keyed by `(kind, namespace, name)` — a dangling port/key lookup
/// is a reference-resolution error recorded on the referrer, not a cache
/// miss.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub kind: Kind,
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(kind: Kind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        ObjectKey {
            kind,
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.kind, self.namespace, self.name)
    }
}

/// A namespace+name reference as it appears embedded in another object,
/// before it has been resolved against the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespacedName {
    pub namespace: String,
    pub name: String,
}

impl NamespacedName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        NamespacedName {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for NamespacedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
