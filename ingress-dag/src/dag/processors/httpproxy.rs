//! HTTPProxyProcessor: translates HTTPProxy trees, including inclusion
//! resolution, TLS policy merging, and fallback certificate opt-in
//! bookkeeping (finalized in [`super::super::builder::build`]).

use std::collections::HashSet;
use std::sync::Arc;

use crate::cache::SourceObject;
use crate::types::config_surface::AuthType;
use crate::types::httpproxy::{
    HeaderMatchSpec, HttpProxy, MatchConditions, PathMatchSpec, QueryMatchSpec, RouteSpec, TcpProxySpec, VirtualHostSpec,
};
use crate::types::key::{Kind, NamespacedName, ObjectKey};
use crate::types::meta::HasMeta;

use super::super::entities::{
    HeaderMatch, HeaderMatchKind, PathMatch, QueryMatch, Route, RoutePolicies, RoutePolicyRetry,
    SecureVirtualHost, StatusKind, VirtualHost, WeightedClusterRef,
};
use super::super::resolve::resolve_backend;
use super::super::tls;
use super::{BuilderContext, Processor};

const MAX_INCLUSION_DEPTH: usize = 8;

pub struct HttpProxyProcessor;

/// Accumulated match conditions along an inclusion path from a root down to
/// the object currently being visited.
#[derive(Debug, Clone, Default)]
struct Composed {
    prefix: String,
    headers: Vec<HeaderMatchSpec>,
    queries: Vec<QueryMatchSpec>,
}

impl Composed {
    fn extend(&self, conditions: &MatchConditions) -> Composed {
        let mut prefix = self.prefix.clone();
        if let Some(p) = &conditions.prefix {
            prefix.push_str(p);
        }
        let mut headers = self.headers.clone();
        headers.extend(conditions.headers.iter().cloned());
        let mut queries = self.queries.clone();
        queries.extend(conditions.query_params.iter().cloned());
        Composed { prefix, headers, queries }
    }
}

impl Processor for HttpProxyProcessor {
    fn process(&self, ctx: &mut BuilderContext<'_>) {
        let all: Vec<(ObjectKey, Arc<HttpProxy>)> = ctx
            .snapshot
            .of_kind(Kind::HttpProxy)
            .filter_map(|(k, obj)| match obj {
                SourceObject::HttpProxy(p) => Some((k.clone(), p.clone())),
                _ => None,
            })
            .collect();

        let mut roots: Vec<(ObjectKey, Arc<HttpProxy>)> = all.iter().filter(|(_, p)| p.is_root()).cloned().collect();
        roots.sort_by_key(|(_, p)| p.creation_order_key());

        let mut reached: HashSet<(String, String)> = HashSet::new();

        for (key, proxy) in &roots {
            let order = proxy.creation_order_key();
            let fqdn = proxy.virtualhost.as_ref().unwrap().fqdn.clone();
            if !ctx.claim_fqdn(&fqdn, key, order) {
                continue;
            }
            let vhost_spec = proxy.virtualhost.as_ref().unwrap();
            let secure = vhost_spec.tls.is_some();

            if secure {
                ctx.secure_virtual_hosts.insert(fqdn.clone(), build_secure_vhost(ctx, &fqdn, vhost_spec));
                if vhost_spec.enable_fallback_certificate {
                    ctx.fallback_opt_in.push(fqdn.clone());
                }
            } else {
                ctx.virtual_hosts.insert(fqdn.clone(), VirtualHost { fqdn: fqdn.clone(), ..vhost_policies(vhost_spec) });
            }

            if let Some(tcpproxy) = &proxy.tcpproxy {
                if secure {
                    apply_tcp_proxy(ctx, &fqdn, tcpproxy);
                } else {
                    ctx.record_status(key.clone(), StatusKind::StructuralValidation, "tcpproxy requires a TLS virtualhost");
                }
            }

            let mut ancestors = HashSet::new();
            ancestors.insert((key.namespace.clone(), key.name.clone()));
            reached.insert((key.namespace.clone(), key.name.clone()));

            visit(ctx, &fqdn, secure, proxy, Composed::default(), &all, &mut ancestors, &mut reached, 0);

            if secure {
                if let Some(svhost) = ctx.secure_virtual_hosts.get_mut(&fqdn) {
                    svhost.jwt_providers = jwt_providers_in_use(&svhost.base.routes);
                }
            }
        }

        for (key, proxy) in &all {
            if proxy.is_root() {
                continue;
            }
            let id = (key.namespace.clone(), key.name.clone());
            if !reached.contains(&id) {
                ctx.record_status(key.clone(), StatusKind::ReferenceResolution, "HTTPProxy is never reached from a root via inclusion");
            }
        }
    }
}

/// Lifts the vhost-scoped policies (CORS, rate limit, authorization) from
/// the spec onto a fresh [`VirtualHost`], leaving `fqdn`/`routes` at their
/// defaults for the caller to fill in.
fn vhost_policies(vhost_spec: &VirtualHostSpec) -> VirtualHost {
    VirtualHost {
        cors_policy: vhost_spec.cors_policy.clone(),
        rate_limit_ref: vhost_spec.rate_limit_policy.as_ref().map(|r| r.extension_service.clone()),
        authz_ref: vhost_spec.authorization.as_ref().map(|a| a.extension_service.clone()),
        ..Default::default()
    }
}

/// The union of JWT provider names referenced by any route auth strategy
/// in this vhost, used to drive the listener's JWT authentication filter.
fn jwt_providers_in_use(routes: &[Route]) -> Vec<String> {
    let mut providers: Vec<String> = routes
        .iter()
        .filter_map(|r| match &r.policies.auth {
            Some(AuthType::Jwt { jwt }) => Some(jwt.providers.clone()),
            _ => None,
        })
        .flatten()
        .collect();
    providers.sort();
    providers.dedup();
    providers
}

fn build_secure_vhost(ctx: &BuilderContext<'_>, fqdn: &str, vhost_spec: &VirtualHostSpec) -> SecureVirtualHost {
    let tls_spec = vhost_spec.tls.as_ref();
    let default_min = ctx.config.minimum_tls_version.as_deref().unwrap_or("1.2");
    let default_max = ctx.config.maximum_tls_version.as_deref().unwrap_or("1.3");
    let merged = tls_spec
        .and_then(|t| tls::merge(default_min, default_max, t.minimum_tls_version.as_deref(), t.maximum_tls_version.as_deref()))
        .unwrap_or_else(|| tls::merge(default_min, default_max, None, None).unwrap());

    let secret_ref = tls_spec
        .and_then(|t| t.secret_name.clone())
        .unwrap_or_else(|| NamespacedName::new("", ""));

    SecureVirtualHost {
        base: VirtualHost { fqdn: fqdn.to_string(), ..vhost_policies(vhost_spec) },
        secret_ref,
        min_tls_version: merged.min,
        max_tls_version: merged.max,
        cipher_suites: tls::merge_ciphers(
            &ctx.config.cipher_suites.clone().unwrap_or_default(),
            tls_spec.map(|t| t.cipher_suites.as_slice()).unwrap_or(&[]),
        ),
        alpn_protocols: vec!["h2".to_string(), "http/1.1".to_string()],
        downstream_validation: tls_spec.and_then(|t| t.client_validation.as_ref()).map(|v| super::super::entities::DownstreamValidation {
            ca_secret: v.ca_secret.clone(),
            skip_client_cert_validation: v.skip_client_cert_validation,
        }),
        fallback_enabled: false,
        jwt_providers: Vec::new(),
        authz_service: vhost_spec.authorization.as_ref().map(|a| a.extension_service.clone()),
        tcp_proxy: None,
    }
}

/// A `tcpproxy` block replaces the HTTP route table for that vhost with raw
/// TCP/TLS-passthrough forwarding. The listener translator emits a
/// `TcpProxy` network filter for this SNI match instead of an HTTP
/// connection manager.
fn apply_tcp_proxy(ctx: &mut BuilderContext<'_>, fqdn: &str, spec: &TcpProxySpec) {
    let raw_weights: Vec<Option<i64>> = spec.services.iter().map(|s| s.weight).collect();
    let weights = match super::super::cluster::resolve_weights(&raw_weights) {
        Ok(w) => w,
        Err(_) => return,
    };

    let mut clusters = Vec::new();
    for (service, weight) in spec.services.iter().zip(weights) {
        let Some((tuple, assignment)) = resolve_backend(ctx.snapshot, &service.name.namespace, &service.name.name, &service.port) else {
            continue;
        };
        let cluster_name = super::super::cluster::cluster_name(&tuple);
        ctx.register_cluster(cluster_name.clone(), tuple, assignment);
        clusters.push(WeightedClusterRef { cluster_name, weight });
    }
    if clusters.is_empty() {
        return;
    }
    if let Some(svhost) = ctx.secure_virtual_hosts.get_mut(fqdn) {
        svhost.tcp_proxy = Some(clusters);
    }
}

#[allow(clippy::too_many_arguments)]
fn visit(
    ctx: &mut BuilderContext<'_>,
    fqdn: &str,
    secure: bool,
    proxy: &HttpProxy,
    inherited: Composed,
    all: &[(ObjectKey, Arc<HttpProxy>)],
    ancestors: &mut HashSet<(String, String)>,
    reached: &mut HashSet<(String, String)>,
    depth: usize,
) {
    for route in &proxy.routes {
        let composed = inherited.extend(&route.conditions);
        emit_route(ctx, fqdn, secure, route, &composed);
    }

    if depth >= MAX_INCLUSION_DEPTH {
        return;
    }

    for inclusion in &proxy.includes {
        let id = (inclusion.target.namespace.clone(), inclusion.target.name.clone());
        if ancestors.contains(&id) {
            continue;
        }
        let Some((_, child)) = all.iter().find(|(k, _)| k.namespace == inclusion.target.namespace && k.name == inclusion.target.name) else {
            continue;
        };
        let child_composed = inherited.extend(&inclusion.conditions);
        ancestors.insert(id.clone());
        reached.insert(id.clone());
        visit(ctx, fqdn, secure, child, child_composed, all, ancestors, reached, depth + 1);
        ancestors.remove(&id);
    }
}

fn emit_route(ctx: &mut BuilderContext<'_>, fqdn: &str, secure: bool, route: &RouteSpec, composed: &Composed) {
    let path_match = match &route.path {
        None => PathMatch::Prefix(if composed.prefix.is_empty() { "/".to_string() } else { composed.prefix.clone() }),
        Some(PathMatchSpec::Prefix(p)) => PathMatch::Prefix(format!("{}{}", composed.prefix, p)),
        Some(PathMatchSpec::Exact(p)) => PathMatch::Exact(p.clone()),
        Some(PathMatchSpec::Regex(p)) => PathMatch::Regex(p.clone()),
    };

    let header_matches: Vec<HeaderMatch> = composed.headers.iter().map(convert_header).collect();
    let query_matches: Vec<QueryMatch> = composed.queries.iter().map(convert_query).collect();

    let raw_weights: Vec<Option<i64>> = route.services.iter().map(|s| s.weight).collect();
    let weights = match super::super::cluster::resolve_weights(&raw_weights) {
        Ok(w) => w,
        Err(_) => return,
    };

    let mut clusters = Vec::new();
    for (service, weight) in route.services.iter().zip(weights) {
        let Some((tuple, assignment)) = resolve_backend(ctx.snapshot, &service.name.namespace, &service.name.name, &service.port) else {
            continue;
        };
        let cluster_name = super::super::cluster::cluster_name(&tuple);
        ctx.register_cluster(cluster_name.clone(), tuple, assignment);
        clusters.push(WeightedClusterRef { cluster_name, weight });
    }
    if clusters.is_empty() {
        return;
    }

    let mirror = route.mirror.as_ref().and_then(|m| {
        resolve_backend(ctx.snapshot, &m.name.namespace, &m.name.name, &m.port).map(|(tuple, assignment)| {
            let name = super::super::cluster::cluster_name(&tuple);
            ctx.register_cluster(name.clone(), tuple, assignment);
            name
        })
    });

    let dag_route = Route {
        path_match,
        header_matches,
        query_matches,
        clusters,
        policies: RoutePolicies {
            timeout: route.timeout,
            retry: route.retry.as_ref().map(|r| RoutePolicyRetry {
                num_retries: r.num_retries,
                per_try_timeout: r.per_try_timeout,
                retry_on: r.retry_on.clone(),
            }),
            websocket: route.websocket,
            auth: route.auth.clone(),
            mirror,
        },
    };

    if secure {
        if let Some(svhost) = ctx.secure_virtual_hosts.get_mut(fqdn) {
            svhost.base.routes.push(dag_route);
        }
    } else if let Some(vhost) = ctx.virtual_hosts.get_mut(fqdn) {
        vhost.routes.push(dag_route);
    }
}

fn convert_header(spec: &HeaderMatchSpec) -> HeaderMatch {
    HeaderMatch { name: spec.name.clone(), kind: convert_kind(&spec.kind), value: spec.value.clone(), invert: spec.invert }
}

fn convert_query(spec: &QueryMatchSpec) -> QueryMatch {
    QueryMatch { name: spec.name.clone(), kind: convert_kind(&spec.kind), value: spec.value.clone() }
}

fn convert_kind(kind: &crate::types::httpproxy::MatchKind) -> HeaderMatchKind {
    use crate::types::httpproxy::MatchKind;
    match kind {
        MatchKind::Exact => HeaderMatchKind::Exact,
        MatchKind::Contains => HeaderMatchKind::Contains,
        MatchKind::Present => HeaderMatchKind::Present,
        MatchKind::NotPresent => HeaderMatchKind::NotPresent,
        MatchKind::Regex => HeaderMatchKind::Regex,
    }
}
