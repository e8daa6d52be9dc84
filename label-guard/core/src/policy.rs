use crate::labels::{Labels, Selector};
use std::fmt;

/// Identifies an isolation policy within a namespace.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolicyRef {
    pub namespace: String,
    pub name: String,
}

/// An isolation policy, reduced to the selector that scopes the workloads it governs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Policy {
    pub id: PolicyRef,
    pub selector: Selector,
}

/// Returns true if any of `policies` selects `labels`.
///
/// Callers must restrict `policies` to the workload's namespace.
pub fn referenced_by(labels: &Labels, policies: &[Policy]) -> bool {
    first_reference(labels, policies).is_some()
}

/// Returns the first of `policies` whose selector matches `labels`.
pub fn first_reference<'p>(labels: &Labels, policies: &'p [Policy]) -> Option<&'p Policy> {
    policies.iter().find(|p| p.selector.matches(labels))
}

// === impl PolicyRef ===

impl PolicyRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for PolicyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

// === impl Policy ===

impl Policy {
    pub fn new(id: PolicyRef, selector: Selector) -> Self {
        Self { id, selector }
    }
}
