//! The DAG builder: a pure function from a cache snapshot to a [`Dag`] plus
//! a validation report. Runs the fixed processor pipeline, then finalizes
//! listeners and route ordering.

use std::collections::BTreeMap;

use crate::cache::Snapshot;
use crate::types::config_surface::ListenerConfig;
use crate::types::key::{Kind, NamespacedName, ObjectKey};

use super::entities::{
    Cluster, ClusterLoadAssignment, Dag, ExtensionCluster, FallbackCertificate, Listener,
    ListenerProtocol, ObjectStatus, SecureVirtualHost, StatusKind, ValidatedSecret, VirtualHost,
};
use super::processors::{
    extension_service::ExtensionServiceProcessor, gateway_api::GatewayApiProcessor,
    httpproxy::HttpProxyProcessor, ingress::IngressProcessor, listener::ListenerProcessor,
    Processor,
};
use super::route_order;

/// Shared mutable state the fixed processor pipeline accumulates into.
/// Keyed maps rather than `Vec`s so later processors (HTTPProxy) can detect
/// FQDN conflicts against earlier output (Ingress) in O(1).
pub struct BuilderContext<'a> {
    pub snapshot: &'a Snapshot,
    pub config: &'a ListenerConfig,

    pub http_listener_address: Option<(String, u16)>,
    pub https_listener_address: Option<(String, u16)>,

    pub virtual_hosts: BTreeMap<String, VirtualHost>,
    pub secure_virtual_hosts: BTreeMap<String, SecureVirtualHost>,
    /// `(fqdn -> creation_order_key)` of whichever object currently owns
    /// that FQDN, used for the "keep the first" conflict rule.
    pub fqdn_owners: BTreeMap<String, (String, String, String)>,

    pub clusters: BTreeMap<String, Cluster>,
    pub load_assignments: BTreeMap<String, ClusterLoadAssignment>,
    pub extension_clusters: Vec<ExtensionCluster>,
    pub extension_service_clusters: BTreeMap<String, String>,
    pub secrets: BTreeMap<NamespacedName, ValidatedSecret>,

    pub fallback_opt_in: Vec<String>,

    pub statuses: Vec<ObjectStatus>,
}

impl<'a> BuilderContext<'a> {
    fn new(snapshot: &'a Snapshot, config: &'a ListenerConfig) -> Self {
        BuilderContext {
            snapshot,
            config,
            http_listener_address: None,
            https_listener_address: None,
            virtual_hosts: BTreeMap::new(),
            secure_virtual_hosts: BTreeMap::new(),
            fqdn_owners: BTreeMap::new(),
            clusters: BTreeMap::new(),
            load_assignments: BTreeMap::new(),
            extension_clusters: Vec::new(),
            extension_service_clusters: BTreeMap::new(),
            secrets: BTreeMap::new(),
            fallback_opt_in: Vec::new(),
            statuses: Vec::new(),
        }
    }

    pub fn record_status(&mut self, key: ObjectKey, kind: StatusKind, message: impl Into<String>) {
        self.statuses.push(ObjectStatus { key, kind, message: message.into() });
    }

    /// Register a cluster under its coalesced name if this is the first
    /// route to reference that tuple; coalescing is by hash-of-tuple, not
    /// pointer identity.
    pub fn register_cluster(&mut self, name: String, tuple: super::entities::ClusterTuple, assignment: ClusterLoadAssignment) {
        self.clusters.entry(name.clone()).or_insert(Cluster { name: name.clone(), tuple });
        self.load_assignments.entry(name).or_insert(assignment);
    }

    /// Try to claim `fqdn` for `owner_key` with ordering `owner_order`.
    /// Returns `true` if the claim succeeds (no prior owner, or the new
    /// owner strictly precedes it). A losing claim records a conflict
    /// status and does not replace the existing vhost.
    pub fn claim_fqdn(&mut self, fqdn: &str, owner_key: &ObjectKey, owner_order: (String, String, String)) -> bool {
        match self.fqdn_owners.get(fqdn) {
            None => {
                self.fqdn_owners.insert(fqdn.to_string(), owner_order);
                true
            }
            Some(existing) if owner_order == *existing => true,
            Some(existing) if owner_order < *existing => {
                self.fqdn_owners.insert(fqdn.to_string(), owner_order);
                self.virtual_hosts.remove(fqdn);
                self.secure_virtual_hosts.remove(fqdn);
                true
            }
            Some(_) => {
                self.record_status(
                    owner_key.clone(),
                    StatusKind::Conflict,
                    format!("virtual host {fqdn} already claimed by an earlier object"),
                );
                false
            }
        }
    }
}

/// Run the fixed five-processor pipeline and finalize into a [`Dag`]:
/// instantiate listeners only for protocols that ended up with at least
/// one vhost, apply the fallback certificate, and sort every
/// virtual host's routes.
pub fn build(snapshot: &Snapshot, config: &ListenerConfig) -> Dag {
    let mut ctx = BuilderContext::new(snapshot, config);

    let pipeline: [&dyn Processor; 5] = [
        &ListenerProcessor,
        &ExtensionServiceProcessor,
        &IngressProcessor,
        &HttpProxyProcessor,
        &GatewayApiProcessor,
    ];
    for processor in pipeline {
        processor.process(&mut ctx);
    }

    finalize(ctx)
}

fn finalize(mut ctx: BuilderContext<'_>) -> Dag {
    resolve_secrets(&mut ctx);

    for vhost in ctx.virtual_hosts.values_mut() {
        route_order::sort_routes(&mut vhost.routes);
    }
    for svhost in ctx.secure_virtual_hosts.values_mut() {
        route_order::sort_routes(&mut svhost.base.routes);
    }

    let http_listener = (!ctx.virtual_hosts.is_empty()).then(|| {
        let (address, port) = ctx.http_listener_address.clone().unwrap_or(("0.0.0.0".to_string(), 8080));
        Listener { name: "ingress_http".to_string(), address, port, protocol: ListenerProtocol::Http }
    });

    let https_listener = (!ctx.secure_virtual_hosts.is_empty() || !ctx.fallback_opt_in.is_empty()).then(|| {
        let (address, port) = ctx.https_listener_address.clone().unwrap_or(("0.0.0.0".to_string(), 8443));
        Listener { name: "ingress_https".to_string(), address, port, protocol: ListenerProtocol::Https }
    });

    let fallback = resolve_fallback(&mut ctx);

    Dag {
        http_listener,
        https_listener,
        virtual_hosts: ctx.virtual_hosts.into_values().collect(),
        secure_virtual_hosts: ctx.secure_virtual_hosts.into_values().collect(),
        clusters: ctx.clusters.into_values().collect(),
        extension_clusters: ctx.extension_clusters,
        load_assignments: ctx.load_assignments.into_values().collect(),
        secrets: ctx.secrets.into_values().collect(),
        fallback,
        statuses: ctx.statuses,
        listener_config: ctx.config.clone(),
        extension_service_clusters: ctx.extension_service_clusters,
    }
}

/// The fallback filter chain exists iff a fallback secret is
/// configured, resolves, and at least one vhost opted in. A non-resolving
/// fallback secret drops every opted-in vhost instead of the listener
/// silently omitting fallback. Opted-in vhosts that were themselves dropped
/// by [`resolve_secrets`] (missing server certificate) no longer count.
fn resolve_fallback(ctx: &mut BuilderContext<'_>) -> Option<FallbackCertificate> {
    ctx.fallback_opt_in.retain(|fqdn| ctx.secure_virtual_hosts.contains_key(fqdn));

    let fallback_ref = ctx.config.fallback_certificate.clone()?;
    if ctx.fallback_opt_in.is_empty() {
        return None;
    }
    let key = ObjectKey::new(Kind::Secret, &fallback_ref.namespace, &fallback_ref.name);
    match resolve_tls_secret(ctx, &fallback_ref) {
        Some(validated) => {
            ctx.secrets.entry(fallback_ref.clone()).or_insert(validated);
        }
        None => {
            for fqdn in ctx.fallback_opt_in.drain(..).collect::<Vec<_>>() {
                ctx.secure_virtual_hosts.remove(&fqdn);
            }
            ctx.record_status(key, StatusKind::ReferenceResolution, "fallback certificate secret does not resolve");
            return None;
        }
    }
    let mut vhosts = ctx.fallback_opt_in.clone();
    vhosts.sort();
    Some(FallbackCertificate { secret: fallback_ref, vhosts })
}

/// Materialize the TLS material every secure vhost references into
/// `ctx.secrets` (a `ValidatedSecret`), dropping any vhost whose server
/// certificate does not resolve and any client-validation block whose CA
/// bundle does not resolve.
fn resolve_secrets(ctx: &mut BuilderContext<'_>) {
    let hosts: Vec<String> = ctx.secure_virtual_hosts.keys().cloned().collect();
    for host in hosts {
        let (secret_ref, ca_secret) = {
            let svhost = &ctx.secure_virtual_hosts[&host];
            (svhost.secret_ref.clone(), svhost.downstream_validation.as_ref().map(|d| d.ca_secret.clone()))
        };

        match resolve_tls_secret(ctx, &secret_ref) {
            Some(validated) => {
                ctx.secrets.entry(secret_ref.clone()).or_insert(validated);
            }
            None => {
                ctx.secure_virtual_hosts.remove(&host);
                ctx.record_status(
                    ObjectKey::new(Kind::Secret, &secret_ref.namespace, &secret_ref.name),
                    StatusKind::ReferenceResolution,
                    format!("tls secret for vhost {host} does not resolve"),
                );
                continue;
            }
        }

        let Some(ca) = ca_secret else { continue };
        match resolve_ca_secret(ctx, &ca) {
            Some(validated) => {
                ctx.secrets.entry(ca.clone()).or_insert(validated);
            }
            None => {
                if let Some(svhost) = ctx.secure_virtual_hosts.get_mut(&host) {
                    svhost.downstream_validation = None;
                }
                ctx.record_status(
                    ObjectKey::new(Kind::Secret, &ca.namespace, &ca.name),
                    StatusKind::ReferenceResolution,
                    format!("client validation ca secret for vhost {host} does not resolve"),
                );
            }
        }
    }
}

fn resolve_tls_secret(ctx: &BuilderContext<'_>, name: &NamespacedName) -> Option<ValidatedSecret> {
    let key = ObjectKey::new(Kind::Secret, &name.namespace, &name.name);
    match ctx.snapshot.get(&key) {
        Some(crate::cache::SourceObject::Secret(secret)) => match &secret.kind {
            crate::types::secret::SecretKind::Tls { cert_chain, private_key } => {
                Some(ValidatedSecret { name: name.clone(), cert_chain: cert_chain.clone(), private_key: private_key.clone() })
            }
            _ => None,
        },
        _ => None,
    }
}

fn resolve_ca_secret(ctx: &BuilderContext<'_>, name: &NamespacedName) -> Option<ValidatedSecret> {
    let key = ObjectKey::new(Kind::Secret, &name.namespace, &name.name);
    match ctx.snapshot.get(&key) {
        Some(crate::cache::SourceObject::Secret(secret)) => match &secret.kind {
            crate::types::secret::SecretKind::Ca { bundle } => {
                Some(ValidatedSecret { name: name.clone(), cert_chain: bundle.clone(), private_key: Vec::new() })
            }
            _ => None,
        },
        _ => None,
    }
}
