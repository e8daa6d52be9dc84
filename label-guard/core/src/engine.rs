//! Decides whether a workload's label update may break traffic isolation.
//!
//! The decision only considers the relationship between the workload's *previous* labels and the
//! isolation policies in its namespace: if a policy selected the workload before the update, the
//! update may silently remove the workload from that policy. Such updates are still admitted, but
//! carry a warning back to the client that issued them.

use crate::{
    labels::{self, Labels},
    policy::{self, Policy},
    verdict::Verdict,
    workload::{Workload, WorkloadRef},
};

pub const NEW_OBJECT: &str = "new object creation";
pub const UNCHANGED: &str = "no label changes detected";
pub const REFERENCED: &str = "labels referenced by isolation policy";
pub const NOT_REFERENCED: &str = "labels not referenced by any isolation policy";

/// Receives every verdict produced by an [`Engine`].
pub trait Observe {
    fn decided(&self, target: &WorkloadRef, verdict: &Verdict);
}

/// Logs each verdict.
#[derive(Copy, Clone, Debug, Default)]
pub struct Tracing;

/// A stateless decision function, parameterized by an observer.
#[derive(Clone, Debug, Default)]
pub struct Engine<O = ()> {
    observer: O,
}

// === impl Engine ===

impl<O: Observe> Engine<O> {
    pub fn new(observer: O) -> Self {
        Self { observer }
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Decides whether replacing the labels of `previous` with `proposed` is safe.
    ///
    /// `policies` must already be limited to the target's namespace. They are only consulted
    /// when the labels changed.
    pub fn decide(
        &self,
        target: &WorkloadRef,
        previous: Option<&Workload>,
        proposed: &Labels,
        policies: &[Policy],
    ) -> Verdict {
        let verdict = match previous {
            None => Verdict::allowed(NEW_OBJECT),
            Some(prev) => Self::decide_update(prev, proposed, policies),
        };
        self.observer.decided(target, &verdict);
        verdict
    }

    fn decide_update(previous: &Workload, proposed: &Labels, policies: &[Policy]) -> Verdict {
        if !labels::changed(&previous.labels, proposed) {
            return Verdict::allowed(UNCHANGED);
        }

        match policy::first_reference(&previous.labels, policies) {
            Some(policy) => Verdict::allowed_with_warning(
                REFERENCED,
                format!("labels are referenced by isolation policy {}", policy.id),
            ),
            None => Verdict::allowed(NOT_REFERENCED),
        }
    }
}

// === impl Observe ===

impl Observe for () {
    fn decided(&self, _: &WorkloadRef, _: &Verdict) {}
}

impl Observe for Tracing {
    fn decided(&self, target: &WorkloadRef, verdict: &Verdict) {
        let WorkloadRef { namespace, name } = target;
        match verdict.warning() {
            Some(warning) => tracing::info!(
                %namespace,
                %name,
                reason = %verdict.reason(),
                %warning,
                "Admitted with warning"
            ),
            None => tracing::debug!(
                %namespace,
                %name,
                outcome = %verdict.outcome(),
                reason = %verdict.reason(),
                "Decided"
            ),
        }
    }
}
