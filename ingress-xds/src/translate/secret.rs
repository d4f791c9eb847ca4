//! Secret (SDS) translation: one `envoy::Secret` per
//! distinct validated TLS material reference, named `"namespace/name"`.

use ingress_dag::dag::entities::ValidatedSecret;
use ingress_dag::Dag;

use envoy_types::pb::envoy::extensions::transport_sockets::tls::v3::secret::Type as SecretType;
use envoy_types::pb::envoy::extensions::transport_sockets::tls::v3::{
    CertificateValidationContext, DataSource, Secret as EnvoySecret, TlsCertificate,
};
use prost::Message;

use crate::resource_cache::EncodedResource;

pub(crate) const SECRET_TYPE_URL: &str = "type.googleapis.com/envoy.extensions.transport_sockets.tls.v3.Secret";

pub fn build(dag: &Dag) -> Vec<EncodedResource> {
    let mut out: Vec<EncodedResource> = dag.secrets.iter().map(|s| encode(build_secret(s))).collect();
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}

fn encode(secret: EnvoySecret) -> EncodedResource {
    EncodedResource { name: secret.name.clone(), any: crate::translate::any(SECRET_TYPE_URL, secret.encode_to_vec()) }
}

fn build_secret(secret: &ValidatedSecret) -> EnvoySecret {
    let name = format!("{}/{}", secret.name.namespace, secret.name.name);
    let secret_type = if secret.private_key.is_empty() {
        SecretType::ValidationContext(CertificateValidationContext {
            trusted_ca: Some(inline_bytes(&secret.cert_chain)),
            ..Default::default()
        })
    } else {
        SecretType::TlsCertificate(TlsCertificate {
            certificate_chain: Some(inline_bytes(&secret.cert_chain)),
            private_key: Some(inline_bytes(&secret.private_key)),
            ..Default::default()
        })
    };
    EnvoySecret { name, r#type: Some(secret_type), ..Default::default() }
}

fn inline_bytes(bytes: &[u8]) -> DataSource {
    DataSource {
        watched_directory: None,
        specifier: Some(envoy_types::pb::envoy::config::core::v3::data_source::Specifier::InlineBytes(bytes.to_vec())),
    }
}
