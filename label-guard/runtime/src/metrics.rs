use crate::core::{Error, Observe, Tracing, Verdict, WorkloadRef};
use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{counter::Counter, family::Family},
    registry::Registry,
};

/// Counts admission decisions and decision failures.
#[derive(Clone, Debug, Default)]
pub struct DecisionMetrics {
    decisions: Family<DecisionLabels, Counter>,
    errors: Family<ErrorLabels, Counter>,
}

#[derive(Clone, Hash, PartialEq, Eq, EncodeLabelSet, Debug)]
struct DecisionLabels {
    outcome: &'static str,
}

#[derive(Clone, Hash, PartialEq, Eq, EncodeLabelSet, Debug)]
struct ErrorLabels {
    kind: &'static str,
}

// === impl DecisionMetrics ===

impl DecisionMetrics {
    pub fn register(reg: &mut Registry) -> Self {
        let decisions = Family::<DecisionLabels, Counter>::default();
        reg.register(
            "decisions",
            "Total number of label update decisions by outcome",
            decisions.clone(),
        );

        let errors = Family::<ErrorLabels, Counter>::default();
        reg.register(
            "errors",
            "Total number of admission requests that could not be decided",
            errors.clone(),
        );

        Self { decisions, errors }
    }

    pub(crate) fn failed(&self, error: &Error) {
        let kind = match error {
            Error::Lookup { .. } => "lookup",
            Error::ListPolicies { .. } => "list_policies",
        };
        self.errors.get_or_create(&ErrorLabels { kind }).inc();
    }

    #[cfg(test)]
    pub(crate) fn decisions(&self, outcome: crate::core::Outcome) -> u64 {
        self.decisions
            .get_or_create(&DecisionLabels {
                outcome: outcome.as_str(),
            })
            .get()
    }

    #[cfg(test)]
    pub(crate) fn errors(&self, kind: &'static str) -> u64 {
        self.errors.get_or_create(&ErrorLabels { kind }).get()
    }
}

impl Observe for DecisionMetrics {
    fn decided(&self, target: &WorkloadRef, verdict: &Verdict) {
        Tracing.decided(target, verdict);
        self.decisions
            .get_or_create(&DecisionLabels {
                outcome: verdict.outcome().as_str(),
            })
            .inc();
    }
}
