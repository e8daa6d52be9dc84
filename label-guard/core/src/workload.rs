use crate::labels::Labels;
use std::fmt;

/// Identifies a workload (e.g. a pod) within a namespace.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WorkloadRef {
    pub namespace: String,
    pub name: String,
}

/// The persisted state of a workload, as returned by a [`WorkloadStore`](crate::WorkloadStore).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Workload {
    pub target: WorkloadRef,
    pub labels: Labels,
}

// === impl WorkloadRef ===

impl WorkloadRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for WorkloadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
