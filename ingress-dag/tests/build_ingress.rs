use std::collections::BTreeMap;
use std::sync::Arc;

use ingress_dag::cache::{ObjectCache, SourceObject};
use ingress_dag::dag::entities::PathMatch;
use ingress_dag::types::config_surface::ListenerConfig;
use ingress_dag::types::ingress::{Backend, HttpIngressPath, HttpIngressRule, IngressPathType, IngressRule, IngressTls, PortRef};
use ingress_dag::types::key::{Kind, ObjectKey};
use ingress_dag::types::secret::{Secret, SecretKind};
use ingress_dag::types::service::{Protocol, Service, ServicePort};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

fn meta(name: &str) -> ObjectMeta {
    ObjectMeta { name: Some(name.to_string()), namespace: Some("default".to_string()), ..Default::default() }
}

/// Scenario 1: a single HTTP Ingress with a default backend produces one
/// HTTP listener and one prefix-`/` route to a coalesced cluster.
#[test]
fn single_http_ingress_produces_ingress_http_listener() {
    let cache = ObjectCache::new();

    let service = Service {
        metadata: meta("kuard"),
        ports: vec![ServicePort { name: None, port: 8080, protocol: Protocol::Tcp, target_port: 8080 }],
    };
    cache.upsert(ObjectKey::new(Kind::Service, "default", "kuard"), SourceObject::Service(Arc::new(service)));

    let ingress = IngressRule {
        metadata: meta("kuard"),
        tls: vec![],
        rules: vec![],
        default_backend: Some(Backend { service_name: "kuard".to_string(), service_port: PortRef::Number(8080) }),
        annotations: BTreeMap::new(),
    };
    cache.upsert(ObjectKey::new(Kind::Ingress, "default", "kuard"), SourceObject::Ingress(Arc::new(ingress)));

    let snapshot = cache.snapshot();
    let config = ListenerConfig::default();
    let dag = ingress_dag::dag::build(&snapshot, &config);

    assert!(dag.http_listener.is_some());
    assert!(dag.https_listener.is_none());
    assert_eq!(dag.virtual_hosts.len(), 1);
    let vhost = &dag.virtual_hosts[0];
    assert_eq!(vhost.fqdn, "*");
    assert_eq!(vhost.routes.len(), 1);
    assert!(matches!(&vhost.routes[0].path_match, PathMatch::Prefix(p) if p == "/"));
    assert_eq!(dag.clusters.len(), 1);
    assert!(dag.clusters[0].name.starts_with("default/kuard/8080/"));
}

#[test]
fn dangling_backend_reference_drops_the_route_and_records_status() {
    let cache = ObjectCache::new();
    let ingress = IngressRule {
        metadata: meta("kuard"),
        tls: vec![],
        rules: vec![],
        default_backend: Some(Backend { service_name: "missing".to_string(), service_port: PortRef::Number(80) }),
        annotations: BTreeMap::new(),
    };
    cache.upsert(ObjectKey::new(Kind::Ingress, "default", "kuard"), SourceObject::Ingress(Arc::new(ingress)));

    let snapshot = cache.snapshot();
    let config = ListenerConfig::default();
    let dag = ingress_dag::dag::build(&snapshot, &config);

    assert!(dag.virtual_hosts.is_empty());
    assert!(dag.http_listener.is_none());
    assert_eq!(dag.statuses.len(), 1);
}

fn tls_ingress(host: &str, annotations: BTreeMap<String, String>) -> (ObjectCache, ObjectKey) {
    let cache = ObjectCache::new();

    let service = Service {
        metadata: meta("kuard"),
        ports: vec![ServicePort { name: None, port: 8080, protocol: Protocol::Tcp, target_port: 8080 }],
    };
    cache.upsert(ObjectKey::new(Kind::Service, "default", "kuard"), SourceObject::Service(Arc::new(service)));

    let secret = Secret {
        metadata: meta("kuard-cert"),
        kind: SecretKind::Tls { cert_chain: b"cert".to_vec(), private_key: b"key".to_vec() },
        data: BTreeMap::new(),
    };
    cache.upsert(ObjectKey::new(Kind::Secret, "default", "kuard-cert"), SourceObject::Secret(Arc::new(secret)));

    let ingress_key = ObjectKey::new(Kind::Ingress, "default", "kuard");
    let ingress = IngressRule {
        metadata: meta("kuard"),
        tls: vec![IngressTls { hosts: vec![host.to_string()], secret_name: "kuard-cert".to_string() }],
        rules: vec![HttpIngressRule {
            host: Some(host.to_string()),
            paths: vec![HttpIngressPath {
                path: "/".to_string(),
                path_type: IngressPathType::Prefix,
                backend: Backend { service_name: "kuard".to_string(), service_port: PortRef::Number(8080) },
            }],
        }],
        default_backend: None,
        annotations,
    };
    cache.upsert(ingress_key.clone(), SourceObject::Ingress(Arc::new(ingress)));
    (cache, ingress_key)
}

/// By default a TLS host also gets a plain-HTTP vhost serving the same
/// routes, since `allow-http` defaults to true.
#[test]
fn tls_host_also_serves_plain_http_by_default() {
    let (cache, _) = tls_ingress("kuard.example.com", BTreeMap::new());
    let snapshot = cache.snapshot();
    let dag = ingress_dag::dag::build(&snapshot, &ListenerConfig::default());

    assert_eq!(dag.secure_virtual_hosts.len(), 1);
    assert_eq!(dag.virtual_hosts.len(), 1);
    let vhost = &dag.virtual_hosts[0];
    assert!(!vhost.require_tls);
    assert_eq!(vhost.routes.len(), 1);
}

/// `force-ssl-redirect` marks the insecure vhost `require_tls` instead of
/// duplicating routes into it.
#[test]
fn force_ssl_redirect_marks_require_tls_with_no_routes() {
    let mut annotations = BTreeMap::new();
    annotations.insert("ingress.kubernetes.io/force-ssl-redirect".to_string(), "true".to_string());
    let (cache, _) = tls_ingress("kuard.example.com", annotations);
    let snapshot = cache.snapshot();
    let dag = ingress_dag::dag::build(&snapshot, &ListenerConfig::default());

    let vhost = &dag.virtual_hosts[0];
    assert!(vhost.require_tls);
    assert!(vhost.routes.is_empty());
}

/// `allow-http: false` omits the plain-HTTP vhost entirely.
#[test]
fn allow_http_false_omits_the_insecure_vhost() {
    let mut annotations = BTreeMap::new();
    annotations.insert("kubernetes.io/ingress.allow-http".to_string(), "false".to_string());
    let (cache, _) = tls_ingress("kuard.example.com", annotations);
    let snapshot = cache.snapshot();
    let dag = ingress_dag::dag::build(&snapshot, &ListenerConfig::default());

    assert!(dag.virtual_hosts.is_empty());
    assert_eq!(dag.secure_virtual_hosts.len(), 1);
}

/// `request-timeout`/`retry-on`/`num-retries`/`per-try-timeout` apply
/// uniformly to every route the Ingress object emits.
#[test]
fn request_timeout_and_retry_annotations_apply_to_routes() {
    let mut annotations = BTreeMap::new();
    annotations.insert("projectcontour.io/request-timeout".to_string(), "5s".to_string());
    annotations.insert("projectcontour.io/retry-on".to_string(), "5xx,gateway-error".to_string());
    annotations.insert("projectcontour.io/num-retries".to_string(), "3".to_string());
    annotations.insert("projectcontour.io/per-try-timeout".to_string(), "250ms".to_string());
    let (cache, _) = tls_ingress("kuard.example.com", annotations);
    let snapshot = cache.snapshot();
    let dag = ingress_dag::dag::build(&snapshot, &ListenerConfig::default());

    let svhost = &dag.secure_virtual_hosts[0];
    let route = &svhost.base.routes[0];
    assert_eq!(route.policies.timeout, Some(std::time::Duration::from_secs(5)));
    let retry = route.policies.retry.as_ref().expect("retry policy");
    assert_eq!(retry.num_retries, 3);
    assert_eq!(retry.retry_on, vec!["5xx".to_string(), "gateway-error".to_string()]);
    assert_eq!(retry.per_try_timeout, Some(std::time::Duration::from_millis(250)));
}

/// `websocket-routes` enables the websocket policy only for listed paths.
#[test]
fn websocket_routes_annotation_matches_by_exact_path() {
    let mut annotations = BTreeMap::new();
    annotations.insert("projectcontour.io/websocket-routes".to_string(), "/, /other".to_string());
    let (cache, _) = tls_ingress("kuard.example.com", annotations);
    let snapshot = cache.snapshot();
    let dag = ingress_dag::dag::build(&snapshot, &ListenerConfig::default());

    let svhost = &dag.secure_virtual_hosts[0];
    assert!(svhost.base.routes[0].policies.websocket);
}
