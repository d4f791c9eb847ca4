use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Standard object metadata, following the `kube-resource-extra` pattern of
/// carrying the real `k8s-openapi` `ObjectMeta` on every source type rather
/// than re-declaring namespace/name/timestamp fields by hand.
pub trait HasMeta {
    fn meta(&self) -> &ObjectMeta;

    fn namespace(&self) -> &str {
        self.meta().namespace.as_deref().unwrap_or_default()
    }

    fn name(&self) -> &str {
        self.meta().name.as_deref().unwrap_or_default()
    }

    /// `(creation_timestamp, namespace, name)` ascending ordering used by
    /// conflict resolution: the object that showed up first wins.
    fn creation_order_key(&self) -> (String, String, String) {
        let ts = self
            .meta()
            .creation_timestamp
            .as_ref()
            .map(|t| t.0.to_rfc3339())
            .unwrap_or_default();
        (ts, self.namespace().to_string(), self.name().to_string())
    }
}
