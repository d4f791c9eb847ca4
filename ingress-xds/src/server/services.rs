//! Thin tonic service wrappers, one per type URL, each binding the generic
//! [`discovery_stream::drive`] driver to one concrete cache. Delta xDS is
//! explicitly out of scope; the delta RPCs are wired but reject with
//! `unimplemented`.

use std::pin::Pin;
use std::sync::Arc;

use envoy_types::pb::envoy::service::cluster::v3::cluster_discovery_service_server::ClusterDiscoveryService;
use envoy_types::pb::envoy::service::discovery::v3::{DeltaDiscoveryRequest, DiscoveryRequest, DiscoveryResponse};
use envoy_types::pb::envoy::service::endpoint::v3::endpoint_discovery_service_server::EndpointDiscoveryService;
use envoy_types::pb::envoy::service::listener::v3::listener_discovery_service_server::ListenerDiscoveryService;
use envoy_types::pb::envoy::service::route::v3::route_discovery_service_server::RouteDiscoveryService;
use envoy_types::pb::envoy::service::secret::v3::secret_discovery_service_server::SecretDiscoveryService;
use futures_util::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status, Streaming};

use crate::caches::{ClusterCache, EndpointCache, ListenerCache, RouteCache, SecretCache};
use crate::resource_cache::ResourceCache;

use super::discovery_stream::drive;

type ResponseStream = Pin<Box<dyn Stream<Item = Result<DiscoveryResponse, Status>> + Send + 'static>>;

const RESPONSE_CHANNEL_DEPTH: usize = 16;

fn fetch<C: ResourceCache>(cache: &C, request: DiscoveryRequest) -> Response<DiscoveryResponse> {
    let resources = if request.resource_names.is_empty() { cache.contents() } else { cache.query(&request.resource_names) };
    Response::new(DiscoveryResponse {
        version_info: cache.version().to_string(),
        resources: resources.into_iter().map(|r| r.any).collect(),
        type_url: cache.type_url().to_string(),
        nonce: String::new(),
        ..Default::default()
    })
}

macro_rules! discovery_service {
    ($service_name:ident, $trait_name:path, $cache_ty:ty, $stream_method:ident, $delta_method:ident, $fetch_method:ident, $stream_assoc:ident, $delta_assoc:ident) => {
        pub struct $service_name {
            cache: Arc<$cache_ty>,
        }

        impl $service_name {
            pub fn new(cache: Arc<$cache_ty>) -> Self {
                $service_name { cache }
            }
        }

        #[tonic::async_trait]
        impl $trait_name for $service_name {
            type $stream_assoc = ResponseStream;

            async fn $stream_method(&self, request: Request<Streaming<DiscoveryRequest>>) -> Result<Response<Self::$stream_assoc>, Status> {
                let requests = request.into_inner();
                let (tx, rx) = mpsc::channel(RESPONSE_CHANNEL_DEPTH);
                let cache = self.cache.clone();
                tokio::spawn(drive(cache, requests, tx));
                let stream: ResponseStream = Box::pin(ReceiverStream::new(rx));
                Ok(Response::new(stream))
            }

            type $delta_assoc = ResponseStream;

            async fn $delta_method(
                &self,
                _request: Request<Streaming<DeltaDiscoveryRequest>>,
            ) -> Result<Response<Self::$delta_assoc>, Status> {
                Err(Status::unimplemented("delta xDS is not served"))
            }

            async fn $fetch_method(&self, request: Request<DiscoveryRequest>) -> Result<Response<DiscoveryResponse>, Status> {
                Ok(fetch(self.cache.as_ref(), request.into_inner()))
            }
        }
    };
}

discovery_service!(
    ListenerService,
    ListenerDiscoveryService,
    ListenerCache,
    stream_listeners,
    delta_listeners,
    fetch_listeners,
    StreamListenersStream,
    DeltaListenersStream
);

discovery_service!(
    RouteService,
    RouteDiscoveryService,
    RouteCache,
    stream_routes,
    delta_routes,
    fetch_routes,
    StreamRoutesStream,
    DeltaRoutesStream
);

discovery_service!(
    ClusterService,
    ClusterDiscoveryService,
    ClusterCache,
    stream_clusters,
    delta_clusters,
    fetch_clusters,
    StreamClustersStream,
    DeltaClustersStream
);

discovery_service!(
    EndpointService,
    EndpointDiscoveryService,
    EndpointCache,
    stream_endpoints,
    delta_endpoints,
    fetch_endpoints,
    StreamEndpointsStream,
    DeltaEndpointsStream
);

discovery_service!(
    SecretService,
    SecretDiscoveryService,
    SecretCache,
    stream_secrets,
    delta_secrets,
    fetch_secrets,
    StreamSecretsStream,
    DeltaSecretsStream
);
