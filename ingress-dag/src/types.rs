pub mod config_surface;
pub mod endpoints;
pub mod extension;
pub mod httpproxy;
pub mod ingress;
pub mod key;
pub mod meta;
pub mod secret;
pub mod service;

pub use endpoints::EndpointSlice;
pub use extension::ExtensionService;
pub use httpproxy::HttpProxy;
pub use ingress::IngressRule;
pub use key::{Kind, NamespacedName, ObjectKey};
pub use secret::Secret;
pub use service::Service;
