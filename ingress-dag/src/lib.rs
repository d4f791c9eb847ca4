//! Object cache and DAG builder: the first two subsystems of the ingress
//! xDS translation core. Consumes a stream of source objects
//! (Ingress, HTTPProxy, Service, EndpointSlice, Secret, ExtensionService)
//! and produces a validated graph ready for the xDS translators.

pub mod cache;
pub mod dag;
pub mod error;
pub mod types;

pub use cache::{ChangeKind, ObjectCache, SourceObject};
pub use dag::{build, Dag};
pub use error::BuildError;
