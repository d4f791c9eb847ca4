//! xDS translators and stream server: the third and fourth subsystems of
//! the ingress xDS translation core. Consumes a validated
//! [`ingress_dag::Dag`] and serves it to Envoy proxies over `tonic` gRPC.

pub mod caches;
pub mod error;
pub mod resource_cache;
pub mod server;
pub mod translate;

pub use caches::{ClusterCache, EndpointCache, ListenerCache, RouteCache, SecretCache};
pub use error::XdsError;
pub use resource_cache::{EncodedResource, ResourceCache, ResourceStore};
pub use server::XdsServer;
