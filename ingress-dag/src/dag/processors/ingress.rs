//! IngressProcessor: translates `networking.k8s.io/v1 Ingress` objects.

use std::sync::Arc;

use crate::cache::SourceObject;
use crate::types::ingress::{Backend, HttpIngressPath, IngressRule};
use crate::types::key::{Kind, NamespacedName, ObjectKey};
use crate::types::meta::HasMeta;

use super::super::entities::{
    HeaderMatch as DagHeaderMatch, PathMatch, Route, RoutePolicies, RoutePolicyRetry, SecureVirtualHost,
    StatusKind, VirtualHost, WeightedClusterRef,
};
use super::super::resolve::resolve_backend;
use super::super::tls;
use super::{BuilderContext, Processor};

const DEFAULT_HOST: &str = "*";

pub struct IngressProcessor;

impl Processor for IngressProcessor {
    fn process(&self, ctx: &mut BuilderContext<'_>) {
        let mut rules: Vec<(ObjectKey, Arc<IngressRule>)> = ctx
            .snapshot
            .of_kind(Kind::Ingress)
            .filter_map(|(k, obj)| match obj {
                SourceObject::Ingress(rule) => Some((k.clone(), rule.clone())),
                _ => None,
            })
            .collect();
        // Process in creation order so the conflict rule ("first wins") is
        // meaningful regardless of cache iteration order.
        rules.sort_by_key(|(_, r)| r.creation_order_key());

        for (key, rule) in rules {
            process_one(ctx, &key, &rule);
        }
    }
}

fn process_one(ctx: &mut BuilderContext<'_>, key: &ObjectKey, rule: &IngressRule) {
    let namespace = rule.namespace().to_string();
    let order = rule.creation_order_key();

    let tls_hosts: std::collections::HashSet<&str> =
        rule.tls.iter().flat_map(|t| t.hosts.iter().map(String::as_str)).collect();

    if let Some(backend) = &rule.default_backend {
        insert_route(ctx, key, &order, DEFAULT_HOST, PathMatch::Prefix("/".to_string()), backend, &namespace, false, rule);
    }

    for http_rule in &rule.rules {
        let host = http_rule.host.as_deref().unwrap_or(DEFAULT_HOST);
        let secure = tls_hosts.contains(host);
        for path in &http_rule.paths {
            insert_path(ctx, key, &order, host, path, &namespace, secure, rule);
        }
    }

    for tls_block in &rule.tls {
        for host in &tls_block.hosts {
            if ctx.secure_virtual_hosts.contains_key(host) {
                apply_tls(ctx, key, rule, host, &tls_block.secret_name, &namespace);
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn insert_path(
    ctx: &mut BuilderContext<'_>,
    key: &ObjectKey,
    order: &(String, String, String),
    host: &str,
    path: &HttpIngressPath,
    namespace: &str,
    secure: bool,
    rule: &IngressRule,
) {
    let path_match = match path.path_type {
        crate::types::ingress::IngressPathType::Exact => PathMatch::Exact(path.path.clone()),
        crate::types::ingress::IngressPathType::Prefix
        | crate::types::ingress::IngressPathType::ImplementationSpecific => PathMatch::Prefix(path.path.clone()),
    };
    insert_route(ctx, key, order, host, path_match, &path.backend, namespace, secure, rule);
}

/// The request-timeout/retry/websocket annotations are object-scoped in the
/// Ingress contract (no per-path equivalent), so every route this rule
/// emits carries the same policy.
fn route_policies(rule: &IngressRule, path_match: &PathMatch) -> RoutePolicies {
    let retry = rule.retry_on().map(|retry_on| RoutePolicyRetry {
        num_retries: rule.num_retries().unwrap_or(1),
        per_try_timeout: rule.per_try_timeout(),
        retry_on,
    });
    let websocket = rule.websocket_routes().iter().any(|p| p == path_match.value());
    RoutePolicies { timeout: rule.request_timeout(), retry, websocket, auth: None, mirror: None }
}

#[allow(clippy::too_many_arguments)]
fn insert_route(
    ctx: &mut BuilderContext<'_>,
    key: &ObjectKey,
    order: &(String, String, String),
    host: &str,
    path_match: PathMatch,
    backend: &Backend,
    namespace: &str,
    secure: bool,
    rule: &IngressRule,
) {
    let Some((tuple, assignment)) = resolve_backend(ctx.snapshot, namespace, &backend.service_name, &backend.service_port)
    else {
        ctx.record_status(
            key.clone(),
            StatusKind::ReferenceResolution,
            format!("backend service {} does not resolve", backend.service_name),
        );
        return;
    };
    let cluster_name = super::super::cluster::cluster_name(&tuple);
    ctx.register_cluster(cluster_name.clone(), tuple, assignment);

    if !ctx.claim_fqdn(host, key, order.clone()) {
        return;
    }

    let policies = route_policies(rule, &path_match);

    let route = Route {
        path_match,
        header_matches: Vec::<DagHeaderMatch>::new(),
        query_matches: Vec::new(),
        clusters: vec![WeightedClusterRef { cluster_name, weight: 1 }],
        policies,
    };

    if secure {
        if !ctx.secure_virtual_hosts.contains_key(host) {
            let fresh = new_secure_vhost(ctx, host);
            ctx.secure_virtual_hosts.insert(host.to_string(), fresh);
        }
        ctx.secure_virtual_hosts.get_mut(host).unwrap().base.routes.push(route.clone());

        // A TLS host still serves plain HTTP by default (`allow-http`
        // defaults to true); `force-ssl-redirect` instead marks the
        // insecure vhost `require_tls` so Envoy redirects before routing.
        if rule.allow_http() {
            let vhost = ctx.virtual_hosts.entry(host.to_string()).or_insert_with(|| VirtualHost { fqdn: host.to_string(), ..Default::default() });
            if rule.force_ssl_redirect() {
                vhost.require_tls = true;
            } else {
                vhost.routes.push(route);
            }
        }
    } else {
        ctx.virtual_hosts.entry(host.to_string()).or_insert_with(|| VirtualHost { fqdn: host.to_string(), ..Default::default() }).routes.push(route);
    }
}

fn new_secure_vhost(ctx: &BuilderContext<'_>, host: &str) -> SecureVirtualHost {
    SecureVirtualHost {
        base: VirtualHost { fqdn: host.to_string(), ..Default::default() },
        secret_ref: NamespacedName::new("", ""),
        min_tls_version: ctx.config.minimum_tls_version.clone().unwrap_or_else(|| "1.2".to_string()),
        max_tls_version: ctx.config.maximum_tls_version.clone().unwrap_or_else(|| "1.3".to_string()),
        cipher_suites: ctx.config.cipher_suites.clone().unwrap_or_default(),
        alpn_protocols: vec!["h2".to_string(), "http/1.1".to_string()],
        downstream_validation: None,
        fallback_enabled: false,
        jwt_providers: Vec::new(),
        authz_service: None,
        tcp_proxy: None,
    }
}

fn apply_tls(ctx: &mut BuilderContext<'_>, key: &ObjectKey, rule: &IngressRule, host: &str, secret_name: &str, namespace: &str) {
    let default_min = ctx.config.minimum_tls_version.as_deref().unwrap_or("1.2");
    let default_max = ctx.config.maximum_tls_version.as_deref().unwrap_or("1.3");
    let merged = tls::merge(
        default_min,
        default_max,
        rule.tls_minimum_protocol_version(),
        rule.tls_maximum_protocol_version(),
    );

    let Some(merged) = merged else {
        ctx.secure_virtual_hosts.remove(host);
        ctx.record_status(key.clone(), StatusKind::Conflict, format!("vhost {host} has min_tls_version > max_tls_version"));
        return;
    };

    let secret_key = ObjectKey::new(Kind::Secret, namespace, secret_name);
    if !matches!(ctx.snapshot.get(&secret_key), Some(SourceObject::Secret(_))) {
        ctx.secure_virtual_hosts.remove(host);
        ctx.record_status(key.clone(), StatusKind::ReferenceResolution, format!("tls secret {secret_name} does not resolve"));
        return;
    }

    if let Some(svhost) = ctx.secure_virtual_hosts.get_mut(host) {
        svhost.secret_ref = NamespacedName::new(namespace, secret_name);
        svhost.min_tls_version = merged.min;
        svhost.max_tls_version = merged.max;
    }
}
