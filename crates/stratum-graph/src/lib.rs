//! # stratum-graph
//!
//! Orders configurations so that every dependency deploys before its
//! dependents.
//!
//! Handles:
//! - **Matrix**: adjacency matrix and in-degree construction.
//! - **Topology**: Kahn-style sort with full cycle attribution.
//! - **Sort**: project-level then config-level ordering per environment.
//! - **Parameters**: ordering of the parameters inside one configuration.
//! - **Dot**: Graphviz export of the reference graph.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod dot;
pub mod error;
pub mod matrix;
pub mod parameters;
pub mod sort;
pub mod topology;
