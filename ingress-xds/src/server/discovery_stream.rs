//! The generic per-stream state machine, shared by all five discovery
//! services so the ACK/NACK/coalesce logic is implemented once.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use envoy_types::pb::envoy::service::discovery::v3::{DiscoveryRequest, DiscoveryResponse};
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tonic::Status;
use tracing::{debug, warn};

use crate::resource_cache::ResourceCache;

static NONCE_COUNTER: AtomicU64 = AtomicU64::new(1);

fn next_nonce() -> String {
    NONCE_COUNTER.fetch_add(1, Ordering::Relaxed).to_string()
}

struct StreamState {
    last_nonce_sent: Option<String>,
    last_version_sent: Option<String>,
    last_version_acked: Option<String>,
    requested_names: Vec<String>,
}

impl StreamState {
    fn new() -> Self {
        StreamState { last_nonce_sent: None, last_version_sent: None, last_version_acked: None, requested_names: Vec::new() }
    }
}

enum Classification {
    Nack,
    Ack,
    Fresh,
}

fn classify(state: &StreamState, req: &DiscoveryRequest) -> Classification {
    if req.error_detail.is_some() {
        return Classification::Nack;
    }
    let nonce_matches = !req.response_nonce.is_empty() && state.last_nonce_sent.as_deref() == Some(req.response_nonce.as_str());
    let version_matches = state.last_version_sent.as_deref() == Some(req.version_info.as_str());
    if nonce_matches && version_matches {
        Classification::Ack
    } else {
        Classification::Fresh
    }
}

fn build_response<C: ResourceCache + ?Sized>(cache: &C, state: &mut StreamState) -> DiscoveryResponse {
    let version = cache.version();
    let resources = if state.requested_names.is_empty() { cache.contents() } else { cache.query(&state.requested_names) };
    let nonce = next_nonce();
    let version_info = version.to_string();
    state.last_nonce_sent = Some(nonce.clone());
    state.last_version_sent = Some(version_info.clone());
    DiscoveryResponse {
        version_info,
        resources: resources.into_iter().map(|r| r.any).collect(),
        type_url: cache.type_url().to_string(),
        nonce,
        ..Default::default()
    }
}

/// Drives one bidirectional stream against `cache` until the peer disconnects.
///
/// One outstanding response at a time: a version that arrives while a
/// response is in flight is coalesced into the next send rather than
/// queued as a second message.
pub async fn drive<C, S>(cache: Arc<C>, mut requests: S, responses: mpsc::Sender<Result<DiscoveryResponse, Status>>)
where
    C: ResourceCache + 'static,
    S: futures_util::Stream<Item = Result<DiscoveryRequest, Status>> + Unpin,
{
    let mut state = StreamState::new();
    let mut changes = cache.subscribe();
    let mut outstanding = false;
    let mut pending = false;

    loop {
        tokio::select! {
            req = requests.next() => {
                match req {
                    Some(Ok(req)) => {
                        match classify(&state, &req) {
                            Classification::Nack => {
                                warn!(type_url = cache.type_url(), nonce = %req.response_nonce, "nack received");
                                outstanding = false;
                            }
                            Classification::Ack => {
                                debug!(type_url = cache.type_url(), version = %req.version_info, "ack received");
                                state.last_version_acked = Some(req.version_info.clone());
                                outstanding = false;
                            }
                            Classification::Fresh => {
                                state.requested_names = req.resource_names.clone();
                                outstanding = false;
                                pending = true;
                            }
                        }
                    }
                    None => break,
                    Some(Err(status)) => {
                        warn!(type_url = cache.type_url(), error = %status, "discovery stream read error");
                        break;
                    }
                }
            }
            recv = changes.recv() => {
                if recv.is_err() {
                    break;
                }
                pending = true;
            }
        }

        if pending && !outstanding {
            pending = false;
            outstanding = true;
            let response = build_response(cache.as_ref(), &mut state);
            if responses.send(Ok(response)).await.is_err() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource_cache::{EncodedResource, ResourceStore};

    struct TestCache(ResourceStore);

    impl ResourceCache for TestCache {
        fn type_url(&self) -> &'static str {
            self.0.type_url()
        }
        fn version(&self) -> u64 {
            self.0.version()
        }
        fn contents(&self) -> Vec<EncodedResource> {
            self.0.contents()
        }
        fn query(&self, names: &[String]) -> Vec<EncodedResource> {
            names.iter().filter_map(|n| self.0.get(n)).collect()
        }
        fn subscribe(&self) -> tokio::sync::broadcast::Receiver<u64> {
            self.0.subscribe()
        }
    }

    fn resource(name: &str) -> EncodedResource {
        EncodedResource {
            name: name.to_string(),
            any: envoy_types::pb::google::protobuf::Any { type_url: "type.googleapis.com/test".to_string(), value: vec![] },
        }
    }

    #[tokio::test]
    async fn fresh_subscription_gets_an_immediate_response() {
        let cache = Arc::new(TestCache(ResourceStore::new("test")));
        cache.0.on_change(vec![resource("a")]);

        let (in_tx, in_rx) = mpsc::channel::<Result<DiscoveryRequest, Status>>(4);
        let (resp_tx, mut resp_rx) = mpsc::channel(4);
        let requests = tokio_stream::wrappers::ReceiverStream::new(in_rx);
        let handle = tokio::spawn(drive(cache.clone(), requests, resp_tx));

        in_tx
            .send(Ok(DiscoveryRequest {
                node: None,
                resource_names: vec![],
                version_info: String::new(),
                type_url: "test".to_string(),
                response_nonce: String::new(),
                error_detail: None,
            }))
            .await
            .unwrap();

        let resp = resp_rx.recv().await.unwrap().unwrap();
        assert_eq!(resp.version_info, "1");
        assert_eq!(resp.resources.len(), 1);

        drop(in_tx);
        let _ = handle.await;
    }

    #[tokio::test]
    async fn ack_does_not_trigger_a_second_response_without_a_new_version() {
        let cache = Arc::new(TestCache(ResourceStore::new("test")));
        cache.0.on_change(vec![resource("a")]);

        let (in_tx, in_rx) = mpsc::channel::<Result<DiscoveryRequest, Status>>(4);
        let (resp_tx, mut resp_rx) = mpsc::channel(4);
        let requests = tokio_stream::wrappers::ReceiverStream::new(in_rx);
        let handle = tokio::spawn(drive(cache.clone(), requests, resp_tx));

        in_tx
            .send(Ok(DiscoveryRequest {
                node: None,
                resource_names: vec![],
                version_info: String::new(),
                type_url: "test".to_string(),
                response_nonce: String::new(),
                error_detail: None,
            }))
            .await
            .unwrap();
        let first = resp_rx.recv().await.unwrap().unwrap();

        in_tx
            .send(Ok(DiscoveryRequest {
                node: None,
                resource_names: vec![],
                version_info: first.version_info.clone(),
                type_url: "test".to_string(),
                response_nonce: first.nonce.clone(),
                error_detail: None,
            }))
            .await
            .unwrap();

        drop(in_tx);
        assert!(resp_rx.recv().await.is_none());
        let _ = handle.await;
    }
}
