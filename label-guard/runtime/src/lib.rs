#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use label_guard_core as core;
pub use label_guard_k8s_api as k8s;
pub use label_guard_k8s_index as index;

mod admission;
mod args;
mod metrics;
mod store;

pub use self::{
    admission::Admission,
    args::Args,
    metrics::DecisionMetrics,
    store::{NetworkPolicies, Pods},
};
