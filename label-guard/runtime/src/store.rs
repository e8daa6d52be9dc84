//! Cluster-backed collaborators for the [`Validator`](crate::core::Validator).

use crate::{
    core::{Policy, PolicySource, Workload, WorkloadRef, WorkloadStore},
    index::SharedIndex,
    k8s::{self, Api, Client},
};
use anyhow::Result;

/// Reads pods from the API server.
#[derive(Clone)]
pub struct Pods {
    client: Client,
}

/// Lists isolation policies, either from the API server or from a watch-backed index.
#[derive(Clone)]
pub enum NetworkPolicies {
    Api(Client),
    Index(SharedIndex),
}

// === impl Pods ===

impl Pods {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl WorkloadStore for Pods {
    async fn get_workload(&self, target: &WorkloadRef) -> Result<Option<Workload>> {
        let api = Api::<k8s::Pod>::namespaced(self.client.clone(), &target.namespace);
        // `get_opt` maps only a 404 to `None`; every other failure is an error.
        let pod = api.get_opt(&target.name).await?;
        Ok(pod.map(k8s::workload))
    }
}

// === impl NetworkPolicies ===

#[async_trait::async_trait]
impl PolicySource for NetworkPolicies {
    async fn list_policies(&self, namespace: &str) -> Result<Vec<Policy>> {
        match self {
            Self::Api(client) => {
                let api = Api::<k8s::NetworkPolicy>::namespaced(client.clone(), namespace);
                let list = api.list(&Default::default()).await?;
                Ok(list.items.into_iter().map(k8s::isolation_policy).collect())
            }
            Self::Index(index) => Ok(index.read().policies(namespace)),
        }
    }
}
