//! Listener translation: one listener per bound address.
//! HTTPS filter chains are matched by SNI server name (ascending) with the
//! fallback chain last; each chain routes via RDS to the route config the
//! [`route`](super::route) translator built for it.

use ingress_dag::dag::entities::{Dag, FallbackCertificate, Listener as DagListener, SecureVirtualHost};
use ingress_dag::types::config_surface::{
    AccessLogLevel, CompressionAlgorithm, ListenerConfig, ServerHeaderTransformation,
};

use envoy_types::pb::envoy::config::accesslog::v3::{
    comparison_filter, access_log, access_log_filter, AccessLog, AccessLogFilter, ComparisonFilter, StatusCodeFilter,
};
use envoy_types::pb::envoy::config::core::v3::{
    address::Address as AddressType, config_source::ConfigSourceSpecifier, grpc_service,
    socket_address::PortSpecifier, socket_option, transport_socket::ConfigType as TransportSocketConfigType,
    Address, AggregatedConfigSource, ConfigSource, GrpcService, Http2ProtocolOptions,
    HttpProtocolOptions as CommonHttpProtocolOptions, RuntimeUInt32, SocketAddress, SocketOption,
    TransportSocket, TypedExtensionConfig,
};
use envoy_types::pb::envoy::config::listener::v3::{
    listener_filter::ConfigType as ListenerFilterConfigType, Filter, FilterChain, FilterChainMatch, Listener,
    ListenerFilter,
};
use envoy_types::pb::envoy::config::ratelimit::v3::RateLimitServiceConfig as RlsServiceConfig;
use envoy_types::pb::envoy::extensions::access_loggers::file::v3::FileAccessLog;
use envoy_types::pb::envoy::extensions::compression::brotli::compressor::v3::Brotli;
use envoy_types::pb::envoy::extensions::compression::gzip::compressor::v3::Gzip;
use envoy_types::pb::envoy::extensions::compression::zstd::compressor::v3::Zstd;
use envoy_types::pb::envoy::extensions::filters::http::compressor::v3::Compressor;
use envoy_types::pb::envoy::extensions::filters::http::cors::v3::Cors;
use envoy_types::pb::envoy::extensions::filters::http::ext_authz::v3::{ext_authz, ExtAuthz};
use envoy_types::pb::envoy::extensions::filters::http::ratelimit::v3::RateLimit as RateLimitFilter;
use envoy_types::pb::envoy::extensions::filters::http::router::v3::Router as RouterFilter;
use envoy_types::pb::envoy::extensions::filters::listener::proxy_protocol::v3::ProxyProtocol;
use envoy_types::pb::envoy::extensions::filters::network::http_connection_manager::v3::{
    http_connection_manager::{CodecType, RouteSpecifier, ServerHeaderTransformation as HcmServerHeaderTransformation},
    http_filter::ConfigType as HttpFilterConfigType,
    Http1ProtocolOptions, HttpConnectionManager, HttpFilter, Rds,
};
use envoy_types::pb::envoy::extensions::filters::network::tcp_proxy::v3::{
    tcp_proxy::ClusterSpecifier as TcpClusterSpecifier, TcpProxy,
};
use envoy_types::pb::envoy::extensions::transport_sockets::tls::v3::{
    common_tls_context, CertificateValidationContext, CommonTlsContext, DownstreamTlsContext,
    SdsSecretConfig,
};
use envoy_types::pb::google::protobuf::{Any, Duration as PbDuration, UInt32Value};
use prost::Message;

use crate::resource_cache::EncodedResource;
use crate::translate::route::{https_route_name, FALLBACK_ROUTE_NAME, HTTP_ROUTE_NAME};

pub(crate) const LISTENER_TYPE_URL: &str = "type.googleapis.com/envoy.config.listener.v3.Listener";
const HTTP_FILTER_NAME: &str = "envoy.filters.network.http_connection_manager";
const TCP_FILTER_NAME: &str = "envoy.filters.network.tcp_proxy";
const ROUTER_FILTER_NAME: &str = "envoy.filters.http.router";
const CORS_FILTER_NAME: &str = "envoy.filters.http.cors";
const COMPRESSOR_FILTER_NAME: &str = "envoy.filters.http.compressor";
const RATELIMIT_FILTER_NAME: &str = "envoy.filters.http.ratelimit";
pub(crate) const EXT_AUTHZ_FILTER_NAME: &str = "envoy.filters.http.ext_authz";
const TLS_TRANSPORT_SOCKET: &str = "envoy.transport_sockets.tls";
const FALLBACK_CHAIN_NAME: &str = "fallback-certificate";

pub fn build(dag: &Dag) -> Vec<EncodedResource> {
    let mut out = Vec::new();

    if let Some(listener) = &dag.http_listener {
        out.push(encode(build_http_listener(listener, dag)));
    }

    if let Some(listener) = &dag.https_listener {
        out.push(encode(build_https_listener(listener, dag)));
    }

    out
}

fn encode(listener: Listener) -> EncodedResource {
    EncodedResource { name: listener.name.clone(), any: crate::translate::any(LISTENER_TYPE_URL, listener.encode_to_vec()) }
}

fn socket_address(listener: &DagListener) -> Address {
    Address {
        address: Some(AddressType::SocketAddress(SocketAddress {
            address: listener.address.clone(),
            port_specifier: Some(PortSpecifier::PortValue(listener.port as u32)),
            ..Default::default()
        })),
    }
}

fn build_http_listener(listener: &DagListener, dag: &Dag) -> Listener {
    let cfg = &dag.listener_config;
    Listener {
        name: listener.name.clone(),
        address: Some(socket_address(listener)),
        filter_chains: vec![FilterChain {
            filters: vec![hcm_filter(HTTP_ROUTE_NAME, &listener.name, cfg.http_access_log_path(), cfg, dag)],
            ..Default::default()
        }],
        listener_filters: listener_filters(cfg),
        socket_options: socket_options(cfg),
        per_connection_buffer_limit_bytes: cfg.per_connection_buffer_limit_bytes.map(|v| UInt32Value { value: v }),
        ..Default::default()
    }
}

/// One filter chain per secure vhost, SNI-ordered ascending, then the
/// fallback chain last with no `server_names` match.
fn build_https_listener(listener: &DagListener, dag: &Dag) -> Listener {
    let cfg = &dag.listener_config;
    let mut vhosts: Vec<&SecureVirtualHost> = dag.secure_virtual_hosts.iter().collect();
    vhosts.sort_by(|a, b| a.base.fqdn.cmp(&b.base.fqdn));

    let mut filter_chains: Vec<FilterChain> = vhosts.iter().map(|svhost| build_secure_filter_chain(svhost, &listener.name, cfg, dag)).collect();

    if let Some(fallback) = &dag.fallback {
        filter_chains.push(build_fallback_filter_chain(fallback, &listener.name, cfg, dag));
    }

    Listener {
        name: listener.name.clone(),
        address: Some(socket_address(listener)),
        filter_chains,
        listener_filters: listener_filters(cfg),
        socket_options: socket_options(cfg),
        per_connection_buffer_limit_bytes: cfg.per_connection_buffer_limit_bytes.map(|v| UInt32Value { value: v }),
        ..Default::default()
    }
}

fn build_secure_filter_chain(svhost: &SecureVirtualHost, stat_prefix: &str, cfg: &ListenerConfig, dag: &Dag) -> FilterChain {
    let filter = if let Some(clusters) = &svhost.tcp_proxy {
        tcp_proxy_filter(clusters, stat_prefix)
    } else {
        hcm_filter(&https_route_name(&svhost.base.fqdn), stat_prefix, cfg.https_access_log_path(), cfg, dag)
    };

    FilterChain {
        filter_chain_match: Some(FilterChainMatch { server_names: vec![svhost.base.fqdn.clone()], ..Default::default() }),
        filters: vec![filter],
        transport_socket: Some(downstream_transport_socket(svhost)),
        ..Default::default()
    }
}

fn build_fallback_filter_chain(fallback: &FallbackCertificate, stat_prefix: &str, cfg: &ListenerConfig, dag: &Dag) -> FilterChain {
    FilterChain {
        name: FALLBACK_CHAIN_NAME.to_string(),
        filter_chain_match: Some(FilterChainMatch {
            transport_protocol: "tls".to_string(),
            ..Default::default()
        }),
        filters: vec![hcm_filter(FALLBACK_ROUTE_NAME, stat_prefix, cfg.https_access_log_path(), cfg, dag)],
        transport_socket: Some(sds_transport_socket(&fallback.secret)),
        ..Default::default()
    }
}

fn downstream_transport_socket(svhost: &SecureVirtualHost) -> TransportSocket {
    let name = format!("{}/{}", svhost.secret_ref.namespace, svhost.secret_ref.name);
    let validation_context_type = svhost.downstream_validation.as_ref().map(|v| {
        let ca_name = format!("{}/{}", v.ca_secret.namespace, v.ca_secret.name);
        if v.skip_client_cert_validation {
            common_tls_context::ValidationContextType::ValidationContext(CertificateValidationContext::default())
        } else {
            common_tls_context::ValidationContextType::ValidationContextSdsSecretConfig(sds_config(&ca_name))
        }
    });

    let common = CommonTlsContext {
        tls_certificate_sds_secret_configs: vec![sds_config(&name)],
        validation_context_type,
        alpn_protocols: svhost.alpn_protocols.clone(),
        tls_params: Some(tls_params(&svhost.min_tls_version, &svhost.max_tls_version, &svhost.cipher_suites)),
        ..Default::default()
    };

    wrap_downstream(common)
}

fn sds_transport_socket(secret: &ingress_dag::types::key::NamespacedName) -> TransportSocket {
    let name = format!("{}/{}", secret.namespace, secret.name);
    let common = CommonTlsContext { tls_certificate_sds_secret_configs: vec![sds_config(&name)], ..Default::default() };
    wrap_downstream(common)
}

fn wrap_downstream(common: CommonTlsContext) -> TransportSocket {
    let downstream = DownstreamTlsContext { common_tls_context: Some(common), ..Default::default() };
    TransportSocket {
        name: TLS_TRANSPORT_SOCKET.to_string(),
        config_type: Some(TransportSocketConfigType::TypedConfig(Any {
            type_url: "type.googleapis.com/envoy.extensions.transport_sockets.tls.v3.DownstreamTlsContext".to_string(),
            value: downstream.encode_to_vec(),
        })),
    }
}

fn sds_config(name: &str) -> SdsSecretConfig {
    SdsSecretConfig {
        name: name.to_string(),
        sds_config: Some(ConfigSource {
            config_source_specifier: Some(ConfigSourceSpecifier::Ads(AggregatedConfigSource::default())),
            ..Default::default()
        }),
    }
}

fn tls_params(
    min: &str,
    max: &str,
    cipher_suites: &[String],
) -> envoy_types::pb::envoy::extensions::transport_sockets::tls::v3::TlsParameters {
    use envoy_types::pb::envoy::extensions::transport_sockets::tls::v3::tls_parameters::TlsProtocol;
    envoy_types::pb::envoy::extensions::transport_sockets::tls::v3::TlsParameters {
        tls_minimum_protocol_version: ordinal_to_protocol(min) as i32,
        tls_maximum_protocol_version: ordinal_to_protocol(max) as i32,
        cipher_suites: cipher_suites.to_vec(),
        ..Default::default()
    }
}

fn ordinal_to_protocol(version: &str) -> envoy_types::pb::envoy::extensions::transport_sockets::tls::v3::tls_parameters::TlsProtocol {
    use envoy_types::pb::envoy::extensions::transport_sockets::tls::v3::tls_parameters::TlsProtocol;
    match version {
        "1.2" => TlsProtocol::TlsV12,
        "1.3" => TlsProtocol::TlsV13,
        _ => TlsProtocol::TlsAuto,
    }
}

/// Assembles one `HttpConnectionManager` honoring the full bootstrap
/// listener-option surface: access logging, XFF/slash/server-header
/// normalization, HTTP/1 and HTTP/2 protocol options, the request/idle/
/// connection-duration timeout family, and the http filter chain (CORS,
/// compression, rate limiting, external authorization, router).
fn hcm_filter(route_config_name: &str, stat_prefix: &str, access_log_path: &str, cfg: &ListenerConfig, dag: &Dag) -> Filter {
    let hcm = HttpConnectionManager {
        route_specifier: Some(RouteSpecifier::Rds(Rds {
            route_config_name: route_config_name.to_string(),
            config_source: Some(ConfigSource {
                config_source_specifier: Some(ConfigSourceSpecifier::Ads(AggregatedConfigSource::default())),
                ..Default::default()
            }),
        })),
        codec_type: CodecType::Auto as i32,
        stat_prefix: stat_prefix.to_string(),
        http_filters: http_filters(cfg, dag),
        access_log: access_logs(cfg, access_log_path),
        xff_num_trusted_hops: cfg.xff_num_trusted_hops.unwrap_or(0),
        merge_slashes: cfg.merge_slashes.unwrap_or(false),
        server_header_transformation: hcm_server_header_transformation(cfg.server_header_transformation) as i32,
        http_protocol_options: Some(Http1ProtocolOptions {
            allow_chunked_length: cfg.allow_chunked_length.unwrap_or(false),
            ..Default::default()
        }),
        http2_protocol_options: cfg
            .http2_max_concurrent_streams
            .map(|n| Http2ProtocolOptions { max_concurrent_streams: Some(UInt32Value { value: n }), ..Default::default() }),
        common_http_protocol_options: common_http_protocol_options(cfg),
        request_timeout: cfg.timeouts.as_ref().and_then(|t| t.request).map(duration_to_pb),
        stream_idle_timeout: cfg.timeouts.as_ref().and_then(|t| t.stream_idle).map(duration_to_pb),
        delayed_close_timeout: cfg.timeouts.as_ref().and_then(|t| t.delayed_close).map(duration_to_pb),
        drain_timeout: cfg.timeouts.as_ref().and_then(|t| t.connection_shutdown_grace_period).map(duration_to_pb),
        strip_trailing_host_dot: cfg.strip_trailing_host_dot.unwrap_or(false),
        ..Default::default()
    };

    Filter {
        name: HTTP_FILTER_NAME.to_string(),
        config_type: Some(envoy_types::pb::envoy::config::listener::v3::filter::ConfigType::TypedConfig(Any {
            type_url: "type.googleapis.com/envoy.extensions.filters.network.http_connection_manager.v3.HttpConnectionManager".to_string(),
            value: hcm.encode_to_vec(),
        })),
    }
}

fn duration_to_pb(d: std::time::Duration) -> PbDuration {
    PbDuration { seconds: d.as_secs() as i64, nanos: d.subsec_nanos() as i32 }
}

fn hcm_server_header_transformation(value: Option<ServerHeaderTransformation>) -> HcmServerHeaderTransformation {
    match value {
        Some(ServerHeaderTransformation::AppendIfAbsent) => HcmServerHeaderTransformation::AppendIfAbsent,
        Some(ServerHeaderTransformation::PassThrough) => HcmServerHeaderTransformation::PassThrough,
        Some(ServerHeaderTransformation::Overwrite) | None => HcmServerHeaderTransformation::Overwrite,
    }
}

fn common_http_protocol_options(cfg: &ListenerConfig) -> Option<CommonHttpProtocolOptions> {
    let idle_timeout = cfg.timeouts.as_ref().and_then(|t| t.connection_idle);
    let max_connection_duration = cfg.timeouts.as_ref().and_then(|t| t.max_connection_duration);
    if idle_timeout.is_none() && max_connection_duration.is_none() && cfg.max_requests_per_connection.is_none() {
        return None;
    }
    Some(CommonHttpProtocolOptions {
        idle_timeout: idle_timeout.map(duration_to_pb),
        max_connection_duration: max_connection_duration.map(duration_to_pb),
        max_requests_per_connection: cfg.max_requests_per_connection.map(|v| UInt32Value { value: v }),
        ..Default::default()
    })
}

/// The access log, unless disabled; an `Error` level gates it behind a
/// status-code >= 500 filter so only failed requests are logged.
fn access_logs(cfg: &ListenerConfig, path: &str) -> Vec<AccessLog> {
    if matches!(cfg.access_log_level, Some(AccessLogLevel::Disabled)) {
        return Vec::new();
    }
    let filter = matches!(cfg.access_log_level, Some(AccessLogLevel::Error)).then(|| AccessLogFilter {
        filter_specifier: Some(access_log_filter::FilterSpecifier::StatusCodeFilter(StatusCodeFilter {
            comparison: Some(ComparisonFilter {
                op: comparison_filter::Op::Ge as i32,
                value: Some(RuntimeUInt32 { default_value: 500, runtime_key: String::new() }),
            }),
        })),
    });
    let file_log = FileAccessLog { path: path.to_string(), ..Default::default() };
    vec![AccessLog {
        name: "envoy.access_loggers.file".to_string(),
        filter,
        config_type: Some(access_log::ConfigType::TypedConfig(Any {
            type_url: "type.googleapis.com/envoy.extensions.access_loggers.file.v3.FileAccessLog".to_string(),
            value: file_log.encode_to_vec(),
        })),
    }]
}

/// TCP keepalive is always on; DSCP/TOS and the IPv6 traffic class are
/// applied on top when configured.
fn socket_options(cfg: &ListenerConfig) -> Vec<SocketOption> {
    let mut options = vec![SocketOption {
        description: "tcp keepalive".to_string(),
        level: 1,  // SOL_SOCKET
        name: 9,   // SO_KEEPALIVE
        state: 0,  // STATE_PREBIND
        value: Some(socket_option::Value::IntValue(1)),
    }];
    if let Some(socket_cfg) = &cfg.socket_options {
        if let Some(tos) = socket_cfg.tos {
            options.push(SocketOption {
                description: "ip tos".to_string(),
                level: 0, // IPPROTO_IP
                name: 1,  // IP_TOS
                state: 0,
                value: Some(socket_option::Value::IntValue(tos as i64)),
            });
        }
        if let Some(traffic_class) = socket_cfg.traffic_class {
            options.push(SocketOption {
                description: "ipv6 traffic class".to_string(),
                level: 41, // IPPROTO_IPV6
                name: 67,  // IPV6_TCLASS
                state: 0,
                value: Some(socket_option::Value::IntValue(traffic_class as i64)),
            });
        }
    }
    options
}

fn listener_filters(cfg: &ListenerConfig) -> Vec<ListenerFilter> {
    if !cfg.use_proxy_proto.unwrap_or(false) {
        return Vec::new();
    }
    vec![ListenerFilter {
        name: "envoy.filters.listener.proxy_protocol".to_string(),
        config_type: Some(ListenerFilterConfigType::TypedConfig(Any {
            type_url: "type.googleapis.com/envoy.extensions.filters.listener.proxy_protocol.v3.ProxyProtocol".to_string(),
            value: ProxyProtocol::default().encode_to_vec(),
        })),
        ..Default::default()
    }]
}

/// CORS is always present (a no-op for vhosts without a `cors` policy);
/// compression, rate limiting and external authorization are each added
/// only when configured. The router terminates the chain.
fn http_filters(cfg: &ListenerConfig, dag: &Dag) -> Vec<HttpFilter> {
    let mut filters = vec![cors_filter()];
    if let Some(filter) = compressor_filter(cfg.compression()) {
        filters.push(filter);
    }
    if let Some(rl_cfg) = &cfg.rate_limit_config {
        if let Some(cluster) = dag.extension_service_clusters.get(&rl_cfg.extension_service_ref) {
            filters.push(ratelimit_filter(rl_cfg, cluster));
        }
    }
    if let Some(cluster) = crate::translate::authz_backend(dag) {
        filters.push(ext_authz_filter(&cluster));
    }
    filters.push(router_filter());
    filters
}

fn router_filter() -> HttpFilter {
    HttpFilter {
        name: ROUTER_FILTER_NAME.to_string(),
        is_optional: false,
        disabled: false,
        config_type: Some(HttpFilterConfigType::TypedConfig(Any {
            type_url: "type.googleapis.com/envoy.extensions.filters.http.router.v3.Router".to_string(),
            value: RouterFilter::default().encode_to_vec(),
        })),
    }
}

fn cors_filter() -> HttpFilter {
    HttpFilter {
        name: CORS_FILTER_NAME.to_string(),
        is_optional: false,
        disabled: false,
        config_type: Some(HttpFilterConfigType::TypedConfig(Any {
            type_url: "type.googleapis.com/envoy.extensions.filters.http.cors.v3.Cors".to_string(),
            value: Cors::default().encode_to_vec(),
        })),
    }
}

fn compressor_filter(algorithm: CompressionAlgorithm) -> Option<HttpFilter> {
    let (type_url, value) = match algorithm {
        CompressionAlgorithm::Disabled => return None,
        CompressionAlgorithm::Gzip => (
            "type.googleapis.com/envoy.extensions.compression.gzip.compressor.v3.Gzip",
            Gzip::default().encode_to_vec(),
        ),
        CompressionAlgorithm::Brotli => (
            "type.googleapis.com/envoy.extensions.compression.brotli.compressor.v3.Brotli",
            Brotli::default().encode_to_vec(),
        ),
        CompressionAlgorithm::Zstd => (
            "type.googleapis.com/envoy.extensions.compression.zstd.compressor.v3.Zstd",
            Zstd::default().encode_to_vec(),
        ),
    };
    let compressor = Compressor {
        compressor_library: Some(TypedExtensionConfig {
            name: "compressor".to_string(),
            typed_config: Some(Any { type_url: type_url.to_string(), value }),
        }),
        ..Default::default()
    };
    Some(HttpFilter {
        name: COMPRESSOR_FILTER_NAME.to_string(),
        is_optional: false,
        disabled: false,
        config_type: Some(HttpFilterConfigType::TypedConfig(Any {
            type_url: "type.googleapis.com/envoy.extensions.filters.http.compressor.v3.Compressor".to_string(),
            value: compressor.encode_to_vec(),
        })),
    })
}

fn ratelimit_filter(cfg: &ingress_dag::types::config_surface::RateLimitServiceConfig, cluster: &str) -> HttpFilter {
    let rate_limit = RateLimitFilter {
        domain: cfg.domain.clone(),
        failure_mode_deny: !cfg.fail_open,
        rate_limit_service: Some(RlsServiceConfig {
            grpc_service: Some(GrpcService {
                target_specifier: Some(grpc_service::TargetSpecifier::EnvoyGrpc(grpc_service::EnvoyGrpc {
                    cluster_name: cluster.to_string(),
                    ..Default::default()
                })),
                timeout: cfg.timeout.map(duration_to_pb),
                ..Default::default()
            }),
            transport_api_version: 3, // V3
        }),
        ..Default::default()
    };
    HttpFilter {
        name: RATELIMIT_FILTER_NAME.to_string(),
        is_optional: false,
        disabled: false,
        config_type: Some(HttpFilterConfigType::TypedConfig(Any {
            type_url: "type.googleapis.com/envoy.extensions.filters.http.ratelimit.v3.RateLimit".to_string(),
            value: rate_limit.encode_to_vec(),
        })),
    }
}

fn ext_authz_filter(cluster: &str) -> HttpFilter {
    let ext_authz = ExtAuthz {
        services: Some(ext_authz::Services::GrpcService(GrpcService {
            target_specifier: Some(grpc_service::TargetSpecifier::EnvoyGrpc(grpc_service::EnvoyGrpc {
                cluster_name: cluster.to_string(),
                ..Default::default()
            })),
            ..Default::default()
        })),
        transport_api_version: 3, // V3
        failure_mode_allow: false,
        ..Default::default()
    };
    HttpFilter {
        name: EXT_AUTHZ_FILTER_NAME.to_string(),
        is_optional: false,
        disabled: false,
        config_type: Some(HttpFilterConfigType::TypedConfig(Any {
            type_url: "type.googleapis.com/envoy.extensions.filters.http.ext_authz.v3.ExtAuthz".to_string(),
            value: ext_authz.encode_to_vec(),
        })),
    }
}

fn tcp_proxy_filter(clusters: &[ingress_dag::dag::entities::WeightedClusterRef], stat_prefix: &str) -> Filter {
    let cluster_specifier = if clusters.len() == 1 {
        TcpClusterSpecifier::Cluster(clusters[0].cluster_name.clone())
    } else {
        TcpClusterSpecifier::WeightedClusters(envoy_types::pb::envoy::extensions::filters::network::tcp_proxy::v3::tcp_proxy::WeightedCluster {
            clusters: clusters
                .iter()
                .map(|c| envoy_types::pb::envoy::extensions::filters::network::tcp_proxy::v3::tcp_proxy::weighted_cluster::ClusterWeight {
                    name: c.cluster_name.clone(),
                    weight: c.weight,
                })
                .collect(),
        })
    };

    let tcp_proxy = TcpProxy { cluster_specifier: Some(cluster_specifier), stat_prefix: stat_prefix.to_string(), ..Default::default() };

    Filter {
        name: TCP_FILTER_NAME.to_string(),
        config_type: Some(envoy_types::pb::envoy::config::listener::v3::filter::ConfigType::TypedConfig(Any {
            type_url: "type.googleapis.com/envoy.extensions.filters.network.tcp_proxy.v3.TcpProxy".to_string(),
            value: tcp_proxy.encode_to_vec(),
        })),
    }
}
