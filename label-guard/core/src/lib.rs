//! Label Guard core
//!
//! Decides whether an update to a workload's labels may silently remove it from the isolation
//! policies that currently select it. The decision is made purely from in-memory inputs:
//!
//! ```text
//! [ previous Workload ] --changed?--> [ Policy selectors ] --> Verdict
//! ```
//!
//! Fetching the previous workload and the namespace's policies is left to the [`WorkloadStore`]
//! and [`PolicySource`] collaborators, which are injected into a [`Validator`].

#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod engine;
pub mod labels;
pub mod policy;
mod validate;
mod verdict;
mod workload;

pub use self::{
    engine::{Engine, Observe, Tracing, NEW_OBJECT, NOT_REFERENCED, REFERENCED, UNCHANGED},
    labels::{Labels, Selector},
    policy::{Policy, PolicyRef},
    validate::{Error, PolicySource, Validator, WorkloadStore},
    verdict::{Outcome, Verdict},
    workload::{Workload, WorkloadRef},
};
