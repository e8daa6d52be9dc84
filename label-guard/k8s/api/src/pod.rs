use crate::Pod;
use kube::ResourceExt;
use label_guard_core::{Labels, Workload, WorkloadRef};

/// Reduces a pod to the state needed to decide label updates.
///
/// A pod without labels has an empty label set.
pub fn workload(pod: Pod) -> Workload {
    let target = WorkloadRef::new(pod.namespace().unwrap_or_default(), pod.name_any());
    let labels = Labels::from(pod.metadata.labels);
    Workload { target, labels }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ObjectMeta;
    use maplit::btreemap;

    #[test]
    fn unlabeled_pod() {
        let pod = Pod {
            metadata: ObjectMeta {
                namespace: Some("ns-0".to_string()),
                name: Some("pod-0".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let workload = workload(pod);
        assert_eq!(workload.target, WorkloadRef::new("ns-0", "pod-0"));
        assert!(workload.labels.is_empty());
    }

    #[test]
    fn labeled_pod() {
        let labels = btreemap! {
            "app".to_string() => "web".to_string(),
            "pod-template-hash".to_string() => "5d8f9c".to_string(),
        };
        let pod = Pod {
            metadata: ObjectMeta {
                namespace: Some("ns-0".to_string()),
                name: Some("web-5d8f9c-abcde".to_string()),
                labels: Some(labels.clone()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(workload(pod).labels, Labels::from(labels));
    }
}
