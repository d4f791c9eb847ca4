//! ExtensionServiceProcessor: resolves `ExtensionService` refs into
//! `ExtensionCluster`s.

use std::sync::Arc;

use crate::cache::SourceObject;
use crate::types::extension::ExtensionService;
use crate::types::key::{Kind, ObjectKey};

use super::super::entities::{Cluster, ExtensionCluster, StatusKind};
use super::super::resolve::resolve_backend;
use super::{BuilderContext, Processor};

pub struct ExtensionServiceProcessor;

impl Processor for ExtensionServiceProcessor {
    fn process(&self, ctx: &mut BuilderContext<'_>) {
        let refs: Vec<(ObjectKey, Arc<ExtensionService>)> = ctx
            .snapshot
            .of_kind(Kind::ExtensionService)
            .filter_map(|(k, obj)| match obj {
                SourceObject::ExtensionService(svc) => Some((k.clone(), svc.clone())),
                _ => None,
            })
            .collect();

        for (key, svc) in refs {
            for target in &svc.targets {
                let Some((tuple, assignment)) =
                    resolve_backend(ctx.snapshot, &target.name.namespace, &target.name.name, &target.port)
                else {
                    ctx.record_status(
                        key.clone(),
                        StatusKind::ReferenceResolution,
                        format!("extension service target {} does not resolve", target.name),
                    );
                    continue;
                };
                let name = super::super::cluster::cluster_name(&tuple);
                ctx.extension_service_clusters.entry(format!("{}/{}", key.namespace, key.name)).or_insert_with(|| name.clone());
                ctx.extension_clusters.push(ExtensionCluster {
                    cluster: Cluster { name: name.clone(), tuple },
                    timeout: svc.timeout,
                });
                ctx.load_assignments.entry(name).or_insert(assignment);
            }
        }
    }
}
