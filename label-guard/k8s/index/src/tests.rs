use super::*;
use k8s_openapi::{
    api::networking::v1::{NetworkPolicy, NetworkPolicySpec},
    apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta},
};
use kubert::index::IndexNamespacedResource;
use label_guard_core::{policy, Labels, PolicyRef};
use maplit::btreemap;
use std::iter::FromIterator;

fn mk_network_policy(ns: &str, name: &str, app: &str) -> NetworkPolicy {
    NetworkPolicy {
        metadata: ObjectMeta {
            namespace: Some(ns.to_string()),
            name: Some(name.to_string()),
            ..Default::default()
        },
        spec: Some(NetworkPolicySpec {
            pod_selector: LabelSelector {
                match_labels: Some(btreemap! { "app".to_string() => app.to_string() }),
                ..Default::default()
            },
            ..Default::default()
        }),
    }
}

#[test]
fn policies_are_scoped_by_namespace() {
    let mut index = Index::default();
    index.apply(mk_network_policy("ns-0", "np-b", "web"));
    index.apply(mk_network_policy("ns-0", "np-a", "db"));
    index.apply(mk_network_policy("ns-1", "np-c", "web"));

    let ids = index
        .policies("ns-0")
        .into_iter()
        .map(|p| p.id)
        .collect::<Vec<_>>();
    assert_eq!(
        ids,
        vec![PolicyRef::new("ns-0", "np-a"), PolicyRef::new("ns-0", "np-b")]
    );
    assert_eq!(index.policies("ns-1").len(), 1);
    assert!(index.policies("ns-2").is_empty());
}

#[test]
fn apply_replaces_existing_policy() {
    let mut index = Index::default();
    index.apply(mk_network_policy("ns-0", "np-0", "web"));
    index.apply(mk_network_policy("ns-0", "np-0", "db"));

    let policies = index.policies("ns-0");
    assert_eq!(policies.len(), 1);
    let db = Labels::from_iter(Some(("app", "db")));
    let web = Labels::from_iter(Some(("app", "web")));
    assert!(policy::referenced_by(&db, &policies));
    assert!(!policy::referenced_by(&web, &policies));
}

#[test]
fn delete_removes_policy() {
    let mut index = Index::default();
    index.apply(mk_network_policy("ns-0", "np-0", "web"));
    index.apply(mk_network_policy("ns-0", "np-1", "db"));

    IndexNamespacedResource::<NetworkPolicy>::delete(&mut index, "ns-0".into(), "np-0".into());
    assert_eq!(index.policies("ns-0").len(), 1);

    IndexNamespacedResource::<NetworkPolicy>::delete(&mut index, "ns-0".into(), "np-1".into());
    assert!(index.policies("ns-0").is_empty());
    assert_eq!(index.namespaces().count(), 0);

    // Deleting an unknown policy is a no-op.
    IndexNamespacedResource::<NetworkPolicy>::delete(&mut index, "ns-9".into(), "np-0".into());
}
