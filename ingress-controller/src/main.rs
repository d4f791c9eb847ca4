mod config;
mod hub;

use std::env;
use std::sync::Arc;

use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::fmt;

use envoy_types::pb::envoy::service::cluster::v3::cluster_discovery_service_server::ClusterDiscoveryServiceServer;
use envoy_types::pb::envoy::service::endpoint::v3::endpoint_discovery_service_server::EndpointDiscoveryServiceServer;
use envoy_types::pb::envoy::service::listener::v3::listener_discovery_service_server::ListenerDiscoveryServiceServer;
use envoy_types::pb::envoy::service::route::v3::route_discovery_service_server::RouteDiscoveryServiceServer;
use envoy_types::pb::envoy::service::secret::v3::secret_discovery_service_server::SecretDiscoveryServiceServer;
use tonic::transport::Server;

use ingress_dag::ObjectCache;
use ingress_xds::XdsServer;

use crate::hub::EventHub;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = fmt()
        .with_target(false)
        .with_level(true)
        .with_thread_names(false)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("failed to set tracing subscriber");

    dotenv().ok();

    let config_path = env::var("INGRESS_XDS_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
    let bootstrap = config::load(&config_path);

    let cache = Arc::new(ObjectCache::new());
    let xds_server = Arc::new(XdsServer::new());

    let hub = EventHub::new(cache.clone(), xds_server.clone(), bootstrap.listener.clone(), bootstrap.debounce());
    tokio::spawn(hub.run());

    let addr = bootstrap.listen.xds.parse()?;
    info!(%addr, "ingress xds control plane listening");

    Server::builder()
        .add_service(ListenerDiscoveryServiceServer::new(xds_server.listener_service()))
        .add_service(RouteDiscoveryServiceServer::new(xds_server.route_service()))
        .add_service(ClusterDiscoveryServiceServer::new(xds_server.cluster_service()))
        .add_service(EndpointDiscoveryServiceServer::new(xds_server.endpoint_service()))
        .add_service(SecretDiscoveryServiceServer::new(xds_server.secret_service()))
        .serve(addr)
        .await?;

    Ok(())
}
