//! Label Guard NetworkPolicy index
//!
//! Maintains a per-namespace cache of isolation policies from a `NetworkPolicy` watch so that
//! admission decisions need not list policies from the API server. The index is updated by a
//! single `kubert::index` task and read by the admission server, which takes a snapshot of a
//! namespace's policies under a short read lock.

#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod index;
pub mod metrics;

#[cfg(test)]
mod tests;

pub use self::index::{Index, SharedIndex};
