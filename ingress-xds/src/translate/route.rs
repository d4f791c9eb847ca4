//! RouteConfiguration translation: one `"ingress_http"`
//! config for all insecure vhosts, one `"https/{fqdn}"` config per secure
//! vhost, and one `"ingress_fallbackcert"` config carrying the opted-in
//! vhosts again under the fallback filter chain.

use ingress_dag::dag::entities::{
    Dag, HeaderMatch, HeaderMatchKind, PathMatch, QueryMatch, Route as DagRoute, RoutePolicies,
    VirtualHost as DagVirtualHost, WeightedClusterRef,
};

use envoy_types::pb::envoy::config::route::v3::{
    header_matcher, query_parameter_matcher, rate_limit, route, route_action, route_match, virtual_host,
    weighted_cluster, CorsPolicy as EnvoyCorsPolicy, HeaderMatcher, QueryParameterMatcher,
    RateLimit as RouteRateLimit, Route as EnvoyRoute, RouteAction, RouteConfiguration, RouteMatch,
    VirtualHost as EnvoyVirtualHost, WeightedCluster,
};
use envoy_types::pb::envoy::r#type::matcher::v3::{
    string_matcher, regex_matcher, RegexMatcher, StringMatcher,
};
use envoy_types::pb::google::protobuf::{Any, BoolValue, Duration as PbDuration, UInt32Value};
use prost::Message;

use crate::resource_cache::EncodedResource;
use crate::translate::listener::EXT_AUTHZ_FILTER_NAME;

pub const HTTP_ROUTE_NAME: &str = "ingress_http";
pub const FALLBACK_ROUTE_NAME: &str = "ingress_fallbackcert";
pub(crate) const ROUTE_CONFIGURATION_TYPE_URL: &str = "type.googleapis.com/envoy.config.route.v3.RouteConfiguration";

pub fn https_route_name(fqdn: &str) -> String {
    format!("https/{fqdn}")
}

pub fn build(dag: &Dag) -> Vec<EncodedResource> {
    let mut out = Vec::new();
    let authz_enabled = crate::translate::authz_backend(dag).is_some();

    if !dag.virtual_hosts.is_empty() {
        out.push(encode(build_route_configuration(HTTP_ROUTE_NAME, &dag.virtual_hosts, authz_enabled)));
    }

    for svhost in &dag.secure_virtual_hosts {
        if svhost.tcp_proxy.is_some() {
            continue;
        }
        let name = https_route_name(&svhost.base.fqdn);
        out.push(encode(build_route_configuration(&name, std::slice::from_ref(&svhost.base), authz_enabled)));
    }

    if let Some(fallback) = &dag.fallback {
        let vhosts: Vec<DagVirtualHost> = dag
            .secure_virtual_hosts
            .iter()
            .filter(|s| fallback.vhosts.contains(&s.base.fqdn))
            .map(|s| s.base.clone())
            .collect();
        out.push(encode(build_route_configuration(FALLBACK_ROUTE_NAME, &vhosts, authz_enabled)));
    }

    out
}

fn encode(config: RouteConfiguration) -> EncodedResource {
    EncodedResource { name: config.name.clone(), any: crate::translate::any(ROUTE_CONFIGURATION_TYPE_URL, config.encode_to_vec()) }
}

fn build_route_configuration(name: &str, vhosts: &[DagVirtualHost], authz_enabled: bool) -> RouteConfiguration {
    let mut sorted: Vec<&DagVirtualHost> = vhosts.iter().collect();
    sorted.sort_by(|a, b| a.fqdn.cmp(&b.fqdn));

    RouteConfiguration {
        name: name.to_string(),
        virtual_hosts: sorted.into_iter().map(|v| build_virtual_host(v, authz_enabled)).collect(),
        ..Default::default()
    }
}

/// `require_tls`/`cors_policy`/`rate_limit_ref` translate directly onto the
/// vhost. External authorization is a single shared backend per listener
/// (wired into the http filter chain in [`super::listener`]); a vhost
/// without `authz_ref` is opted out via `typed_per_filter_config` so the
/// filter stays a no-op for it.
fn build_virtual_host(vhost: &DagVirtualHost, authz_enabled: bool) -> EnvoyVirtualHost {
    let mut typed_per_filter_config = std::collections::HashMap::new();
    if authz_enabled && vhost.authz_ref.is_none() {
        typed_per_filter_config.insert(EXT_AUTHZ_FILTER_NAME.to_string(), disabled_ext_authz());
    }

    EnvoyVirtualHost {
        name: vhost.fqdn.clone(),
        domains: vec![vhost.fqdn.clone()],
        routes: vhost.routes.iter().map(build_route).collect(),
        cors: vhost.cors_policy.as_ref().map(build_cors_policy),
        require_tls: (if vhost.require_tls { virtual_host::TlsRequirementType::All } else { virtual_host::TlsRequirementType::None }) as i32,
        rate_limits: vhost.rate_limit_ref.as_ref().map(|_| vec![vhost_rate_limit(&vhost.fqdn)]).unwrap_or_default(),
        typed_per_filter_config,
        ..Default::default()
    }
}

fn build_cors_policy(cors: &ingress_dag::types::httpproxy::CorsPolicy) -> EnvoyCorsPolicy {
    EnvoyCorsPolicy {
        allow_origin_string_match: cors
            .allow_origin
            .iter()
            .map(|origin| StringMatcher {
                match_pattern: Some(string_matcher::MatchPattern::Exact(origin.clone())),
                ..Default::default()
            })
            .collect(),
        allow_credentials: Some(BoolValue { value: cors.allow_credentials }),
        ..Default::default()
    }
}

fn vhost_rate_limit(fqdn: &str) -> RouteRateLimit {
    RouteRateLimit {
        actions: vec![rate_limit::Action {
            action_specifier: Some(rate_limit::action::ActionSpecifier::GenericKey(rate_limit::action::GenericKey {
                descriptor_value: fqdn.to_string(),
                descriptor_key: String::new(),
            })),
        }],
        ..Default::default()
    }
}

fn disabled_ext_authz() -> Any {
    use envoy_types::pb::envoy::extensions::filters::http::ext_authz::v3::{ext_authz_per_route, ExtAuthzPerRoute};
    let per_route = ExtAuthzPerRoute { r#override: Some(ext_authz_per_route::Override::Disabled(true)) };
    Any {
        type_url: "type.googleapis.com/envoy.extensions.filters.http.ext_authz.v3.ExtAuthzPerRoute".to_string(),
        value: per_route.encode_to_vec(),
    }
}

fn build_route(route: &DagRoute) -> EnvoyRoute {
    EnvoyRoute {
        r#match: Some(build_match(&route.path_match, &route.header_matches, &route.query_matches)),
        action: Some(route::Action::Route(build_action(&route.clusters, &route.policies))),
        ..Default::default()
    }
}

fn build_match(path: &PathMatch, headers: &[HeaderMatch], queries: &[QueryMatch]) -> RouteMatch {
    let path_specifier = match path {
        PathMatch::Exact(p) => route_match::PathSpecifier::Path(p.clone()),
        PathMatch::Prefix(p) => route_match::PathSpecifier::Prefix(p.clone()),
        PathMatch::SegmentPrefix(p) => route_match::PathSpecifier::PathSeparatedPrefix(p.clone()),
        PathMatch::Regex(p) => route_match::PathSpecifier::SafeRegex(regex(p)),
    };
    RouteMatch {
        path_specifier: Some(path_specifier),
        headers: headers.iter().map(build_header_matcher).collect(),
        query_parameters: queries.iter().map(build_query_matcher).collect(),
        ..Default::default()
    }
}

fn build_header_matcher(header: &HeaderMatch) -> HeaderMatcher {
    let specifier = match (&header.kind, &header.value) {
        (HeaderMatchKind::Exact, Some(v)) => header_matcher::HeaderMatchSpecifier::ExactMatch(v.clone()),
        (HeaderMatchKind::Contains, Some(v)) => header_matcher::HeaderMatchSpecifier::ContainsMatch(v.clone()),
        (HeaderMatchKind::Regex, Some(v)) => header_matcher::HeaderMatchSpecifier::SafeRegexMatch(regex(v)),
        (HeaderMatchKind::Present, _) | (HeaderMatchKind::NotPresent, _) => header_matcher::HeaderMatchSpecifier::PresentMatch(true),
        (_, None) => header_matcher::HeaderMatchSpecifier::PresentMatch(true),
    };
    HeaderMatcher {
        name: header.name.clone(),
        header_match_specifier: Some(specifier),
        invert_match: header.invert || matches!(header.kind, HeaderMatchKind::NotPresent),
        ..Default::default()
    }
}

fn build_query_matcher(query: &QueryMatch) -> QueryParameterMatcher {
    let specifier = match (&query.kind, &query.value) {
        (HeaderMatchKind::Present, _) => query_parameter_matcher::QueryParameterMatchSpecifier::PresentMatch(true),
        (HeaderMatchKind::Contains, Some(v)) => {
            query_parameter_matcher::QueryParameterMatchSpecifier::StringMatch(StringMatcher {
                match_pattern: Some(envoy_types::pb::envoy::r#type::matcher::v3::string_matcher::MatchPattern::Contains(v.clone())),
                ..Default::default()
            })
        }
        (HeaderMatchKind::Regex, Some(v)) => query_parameter_matcher::QueryParameterMatchSpecifier::StringMatch(StringMatcher {
            match_pattern: Some(envoy_types::pb::envoy::r#type::matcher::v3::string_matcher::MatchPattern::SafeRegex(regex(v))),
            ..Default::default()
        }),
        (_, Some(v)) => query_parameter_matcher::QueryParameterMatchSpecifier::StringMatch(StringMatcher {
            match_pattern: Some(envoy_types::pb::envoy::r#type::matcher::v3::string_matcher::MatchPattern::Exact(v.clone())),
            ..Default::default()
        }),
        (_, None) => query_parameter_matcher::QueryParameterMatchSpecifier::PresentMatch(true),
    };
    QueryParameterMatcher { name: query.name.clone(), query_parameter_match_specifier: Some(specifier), ..Default::default() }
}

fn regex(pattern: &str) -> RegexMatcher {
    RegexMatcher {
        regex: pattern.to_string(),
        engine_type: Some(regex_matcher::EngineType::GoogleRe2(Default::default())),
    }
}

fn build_action(clusters: &[WeightedClusterRef], policies: &RoutePolicies) -> RouteAction {
    let cluster_specifier = if clusters.len() == 1 {
        route_action::ClusterSpecifier::Cluster(clusters[0].cluster_name.clone())
    } else {
        route_action::ClusterSpecifier::WeightedClusters(WeightedCluster {
            clusters: clusters
                .iter()
                .map(|c| weighted_cluster::ClusterWeight {
                    name: c.cluster_name.clone(),
                    weight: Some(UInt32Value { value: c.weight }),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        })
    };

    RouteAction {
        cluster_specifier: Some(cluster_specifier),
        timeout: policies.timeout.map(duration_to_pb),
        retry_policy: policies.retry.as_ref().map(|r| envoy_types::pb::envoy::config::route::v3::RetryPolicy {
            retry_on: r.retry_on.join(","),
            num_retries: Some(UInt32Value { value: r.num_retries }),
            per_try_timeout: r.per_try_timeout.map(duration_to_pb),
            ..Default::default()
        }),
        request_mirror_policies: policies
            .mirror
            .iter()
            .map(|name| route_action::RequestMirrorPolicy { cluster: name.clone(), ..Default::default() })
            .collect(),
        ..Default::default()
    }
}

fn duration_to_pb(d: std::time::Duration) -> PbDuration {
    PbDuration { seconds: d.as_secs() as i64, nanos: d.subsec_nanos() as i32 }
}
