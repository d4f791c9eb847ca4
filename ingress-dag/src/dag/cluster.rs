//! Cluster coalescing and weight rules: deterministic identity hashing
//! generalized from one fixed backend to arbitrary
//! `(service, port, policy)` tuples.

use std::hash::{Hash, Hasher};

use super::entities::ClusterTuple;

/// `"{ns}/{svc}/{port}/{policy-hash[:10]}"` — the first ten hex digits of
/// an `ahash` digest over everything in the tuple but namespace/service/port
/// (those three are already in the name and would be redundant to hash).
pub fn cluster_name(tuple: &ClusterTuple) -> String {
    let mut h = ahash::AHasher::default();
    tuple.load_balancing_policy.hash(&mut h);
    tuple.upstream_tls.hash(&mut h);
    tuple.health_check.hash(&mut h);
    tuple.connect_timeout.hash(&mut h);
    tuple.protocol.hash(&mut h);
    let digest = h.finish();
    let hex = format!("{digest:016x}");
    format!("{}/{}/{}/{}", tuple.namespace, tuple.service_name, tuple.port, &hex[..10])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeightError {
    Negative,
}

/// Weight assignment for a route's N backend services:
/// - all zero/unset -> equal split of 1 each.
/// - some set, others zero -> zero-weighted entries kept at 0.
/// - any negative -> the route is invalid.
pub fn resolve_weights(raw: &[Option<i64>]) -> Result<Vec<u32>, WeightError> {
    if raw.iter().flatten().any(|w| *w < 0) {
        return Err(WeightError::Negative);
    }
    let all_zero_or_unset = raw.iter().all(|w| matches!(w, None | Some(0)));
    if all_zero_or_unset {
        return Ok(vec![1; raw.len()]);
    }
    Ok(raw.iter().map(|w| w.unwrap_or(0) as u32).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_unset_weights_split_equally() {
        assert_eq!(resolve_weights(&[None, None]).unwrap(), vec![1, 1]);
    }

    #[test]
    fn one_zero_weight_is_kept_at_zero() {
        assert_eq!(resolve_weights(&[None, Some(50)]).unwrap(), vec![0, 50]);
    }

    #[test]
    fn negative_weight_is_rejected() {
        assert_eq!(resolve_weights(&[Some(-1), Some(50)]), Err(WeightError::Negative));
    }

    #[test]
    fn identical_tuples_hash_to_the_same_name() {
        let tuple = ClusterTuple {
            namespace: "default".into(),
            service_name: "kuard".into(),
            port: 8080,
            load_balancing_policy: super::super::entities::LoadBalancingPolicy::RoundRobin,
            upstream_tls: None,
            health_check: None,
            connect_timeout: None,
            protocol: crate::types::service::Protocol::Tcp,
        };
        assert_eq!(cluster_name(&tuple), cluster_name(&tuple.clone()));
        assert!(cluster_name(&tuple).starts_with("default/kuard/8080/"));
    }
}
