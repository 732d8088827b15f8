//! Cluster Adapters
//!
//! Provides the live Kubernetes implementation of the cluster port.

pub mod client;

pub use client::*;
