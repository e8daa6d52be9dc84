use crate::{LabelSelector, NetworkPolicy};
use kube::ResourceExt;
use label_guard_core::{Policy, PolicyRef, Selector};

/// Reduces a `NetworkPolicy` to the pod selector that scopes the pods it isolates.
///
/// Only `matchLabels` requirements are honored. A policy whose pod selector has no `matchLabels`
/// (including one with only `matchExpressions`) selects every pod in its namespace.
pub fn isolation_policy(np: NetworkPolicy) -> Policy {
    let id = PolicyRef::new(np.namespace().unwrap_or_default(), np.name_any());

    let LabelSelector {
        match_labels,
        match_expressions,
    } = np.spec.map(|spec| spec.pod_selector).unwrap_or_default();

    if match_expressions.as_ref().is_some_and(|exprs| !exprs.is_empty()) {
        tracing::debug!(policy = %id, "Ignoring podSelector matchExpressions");
    }

    Policy::new(id, Selector::from_map(match_labels.unwrap_or_default()))
}
