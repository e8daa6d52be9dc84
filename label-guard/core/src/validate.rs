use crate::{
    engine::{Engine, Observe},
    labels::{self, Labels},
    policy::Policy,
    verdict::Verdict,
    workload::{Workload, WorkloadRef},
};
use thiserror::Error;

/// Looks up the persisted state of a workload.
#[async_trait::async_trait]
pub trait WorkloadStore {
    /// Returns `Ok(None)` only when the workload does not exist. Any other failure must be
    /// returned as an error.
    async fn get_workload(&self, target: &WorkloadRef) -> anyhow::Result<Option<Workload>>;
}

/// Lists the isolation policies in a namespace.
#[async_trait::async_trait]
pub trait PolicySource {
    async fn list_policies(&self, namespace: &str) -> anyhow::Result<Vec<Policy>>;
}

/// Indicates that no decision could be made.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to get workload {target}: {source}")]
    Lookup {
        target: WorkloadRef,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to list isolation policies in namespace {namespace}: {source}")]
    ListPolicies {
        namespace: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Drives an [`Engine`] for a single admission event, fetching the state it needs from its
/// collaborators.
#[derive(Clone, Debug)]
pub struct Validator<S, P, O = ()> {
    workloads: S,
    policies: P,
    engine: Engine<O>,
}

// === impl Validator ===

impl<S, P, O> Validator<S, P, O>
where
    S: WorkloadStore + Send + Sync,
    P: PolicySource + Send + Sync,
    O: Observe + Send + Sync,
{
    pub fn new(workloads: S, policies: P, observer: O) -> Self {
        Self {
            workloads,
            policies,
            engine: Engine::new(observer),
        }
    }

    pub fn engine(&self) -> &Engine<O> {
        &self.engine
    }

    /// Decides whether `target` may be updated to carry the `proposed` labels.
    ///
    /// Policies are only listed when the workload exists and its labels changed. A target without
    /// a name (e.g. one created with a generated name) cannot exist yet and is never looked up.
    pub async fn validate(&self, target: &WorkloadRef, proposed: &Labels) -> Result<Verdict, Error> {
        let previous = if target.name.is_empty() {
            None
        } else {
            self.workloads
                .get_workload(target)
                .await
                .map_err(|source| Error::Lookup {
                    target: target.clone(),
                    source,
                })?
        };

        let policies = match previous.as_ref() {
            Some(prev) if labels::changed(&prev.labels, proposed) => self
                .policies
                .list_policies(&target.namespace)
                .await
                .map_err(|source| Error::ListPolicies {
                    namespace: target.namespace.clone(),
                    source,
                })?,
            _ => Vec::new(),
        };

        Ok(self
            .engine
            .decide(target, previous.as_ref(), proposed, &policies))
    }
}
