use ahash::AHashMap as HashMap;
use label_guard_core::Policy;
use label_guard_k8s_api::{self as k8s, ResourceExt};
use parking_lot::RwLock;
use std::sync::Arc;

pub type SharedIndex = Arc<RwLock<Index>>;

/// Holds isolation policies by namespace and name.
#[derive(Debug, Default)]
pub struct Index {
    namespaces: HashMap<String, NamespaceIndex>,
}

#[derive(Debug, Default)]
pub(crate) struct NamespaceIndex {
    pub(crate) policies: HashMap<String, Policy>,
}

// === impl Index ===

impl Index {
    pub fn shared() -> SharedIndex {
        Arc::new(RwLock::new(Self::default()))
    }

    /// Returns a snapshot of the policies in `namespace`, ordered by name.
    pub fn policies(&self, namespace: &str) -> Vec<Policy> {
        let mut policies = self
            .namespaces
            .get(namespace)
            .map(|ns| ns.policies.values().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        policies.sort_by(|a, b| a.id.cmp(&b.id));
        policies
    }

    pub(crate) fn namespaces(&self) -> impl Iterator<Item = (&String, &NamespaceIndex)> {
        self.namespaces.iter()
    }

    fn apply_policy(&mut self, namespace: String, name: String, policy: Policy) {
        tracing::debug!(%namespace, %name, "Indexing NetworkPolicy");
        self.namespaces
            .entry(namespace)
            .or_default()
            .policies
            .insert(name, policy);
    }

    fn delete_policy(&mut self, namespace: &str, name: &str) {
        if let Some(ns) = self.namespaces.get_mut(namespace) {
            tracing::debug!(%namespace, %name, "Removing NetworkPolicy");
            ns.policies.remove(name);
            if ns.policies.is_empty() {
                self.namespaces.remove(namespace);
            }
        }
    }
}

impl kubert::index::IndexNamespacedResource<k8s::NetworkPolicy> for Index {
    fn apply(&mut self, resource: k8s::NetworkPolicy) {
        let Some(namespace) = resource.namespace() else {
            tracing::warn!(name = %resource.name_any(), "NetworkPolicy has no namespace");
            return;
        };
        let name = resource.name_unchecked();
        let policy = k8s::isolation_policy(resource);
        self.apply_policy(namespace, name, policy);
    }

    fn delete(&mut self, namespace: String, name: String) {
        self.delete_policy(&namespace, &name);
    }

    // Since apply only reindexes a single NetworkPolicy at a time, there's no need
    // to handle resets specially.
}
