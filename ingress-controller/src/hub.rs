//! Event hub: a single serialized build task that debounces object-cache
//! change notifications and republishes a fresh [`ingress_dag::Dag`] to
//! every xDS cache after the quiet window elapses. One task, so at most
//! one build runs at a time.

use std::sync::Arc;
use std::time::Duration;

use ingress_dag::types::config_surface::ListenerConfig;
use ingress_dag::ObjectCache;
use ingress_xds::XdsServer;
use tracing::{debug, info, instrument};

pub struct EventHub {
    cache: Arc<ObjectCache>,
    server: Arc<XdsServer>,
    listener_config: ListenerConfig,
    debounce: Duration,
}

impl EventHub {
    pub fn new(cache: Arc<ObjectCache>, server: Arc<XdsServer>, listener_config: ListenerConfig, debounce: Duration) -> Self {
        EventHub { cache, server, listener_config, debounce }
    }

    /// Runs until the object cache's change channel closes. The build task
    /// is rate-limited with a short debounce window that resets on each
    /// incoming event.
    pub async fn run(self) {
        let mut changes = self.cache.subscribe();
        loop {
            if changes.recv().await.is_err() {
                info!("object cache closed, event hub stopping");
                return;
            }

            loop {
                tokio::select! {
                    _ = tokio::time::sleep(self.debounce) => break,
                    res = changes.recv() => {
                        if res.is_err() {
                            return;
                        }
                        debug!("coalescing additional cache event within debounce window");
                    }
                }
            }

            self.build_and_publish();
        }
    }

    #[instrument(skip(self))]
    fn build_and_publish(&self) {
        let snapshot = self.cache.snapshot();
        let dag = ingress_dag::build(&snapshot, &self.listener_config);
        self.server.publish(&dag);
        info!(
            http_listener = dag.http_listener.is_some(),
            https_listener = dag.https_listener.is_some(),
            clusters = dag.clusters.len(),
            "published a new dag to the xds caches"
        );
    }
}
