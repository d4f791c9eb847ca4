use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use super::key::ContentHash;
use super::meta::HasMeta;

/// `v1 Secret` shape restricted to the two types the builder understands:
/// a secret of type other than TLS or CA is rejected on insert and never
/// observed by the builder.
#[derive(Debug, Clone, PartialEq)]
pub struct Secret {
    pub metadata: ObjectMeta,
    pub kind: SecretKind,
    /// Retained raw bytes so the cache's structural hash changes when the
    /// underlying material rotates even though `kind`'s shape does not.
    pub data: BTreeMap<String, Vec<u8>>,
}

impl HasMeta for Secret {
    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }
}

impl ContentHash for Secret {
    fn content_hash(&self) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut h = ahash::AHasher::default();
        self.kind.hash(&mut h);
        h.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SecretKind {
    Tls { cert_chain: Vec<u8>, private_key: Vec<u8> },
    Ca { bundle: Vec<u8> },
}

/// The two `type` values the cache accepts; anything else is a structural
/// validation error at insert time.
pub const SECRET_TYPE_TLS: &str = "kubernetes.io/tls";
pub const SECRET_TYPE_CA: &str = "projectcontour.io/ca-bundle";

impl Secret {
    pub fn from_raw(
        metadata: ObjectMeta,
        type_: &str,
        data: BTreeMap<String, Vec<u8>>,
    ) -> Result<Self, String> {
        let kind = match type_ {
            SECRET_TYPE_TLS => {
                let cert_chain = data
                    .get("tls.crt")
                    .cloned()
                    .ok_or_else(|| "tls secret missing tls.crt".to_string())?;
                let private_key = data
                    .get("tls.key")
                    .cloned()
                    .ok_or_else(|| "tls secret missing tls.key".to_string())?;
                SecretKind::Tls { cert_chain, private_key }
            }
            SECRET_TYPE_CA => {
                let bundle = data
                    .get("ca.crt")
                    .cloned()
                    .ok_or_else(|| "ca-bundle secret missing ca.crt".to_string())?;
                SecretKind::Ca { bundle }
            }
            other => return Err(format!("unsupported secret type {other}")),
        };
        Ok(Secret { metadata, kind, data })
    }
}
