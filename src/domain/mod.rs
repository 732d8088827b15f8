//! Domain layer - plugin identification and the cluster port
//!
//! This module defines the trait every cluster adapter implements, keeping
//! the listing logic independent of the Kubernetes client.

pub mod ports;

#[cfg(test)]
pub mod memory;

pub use ports::*;
