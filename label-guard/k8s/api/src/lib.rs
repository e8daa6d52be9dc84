#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod network_policy;
pub mod pod;

pub use self::{network_policy::isolation_policy, pod::workload};
pub use k8s_openapi::{
    api::{core::v1::Pod, networking::v1::NetworkPolicy},
    apimachinery::pkg::apis::meta::v1::LabelSelector,
};
pub use kube::{
    api::{Api, ObjectMeta},
    Client, Error, Resource, ResourceExt,
};
