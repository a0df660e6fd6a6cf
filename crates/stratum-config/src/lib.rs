//! # stratum-config
//!
//! In-memory model of everything Stratum deploys.
//!
//! Handles:
//! - **Configuration**: coordinates, config types, projects, and reference extraction.
//! - **Parameter**: value, list, environment, reference and compound parameters.
//! - **Template**: `{{ .name }}` payload rendering.
//! - **Entity**: the resolved entity store filled while deploying.
//! - **Api**: the registry of classic configuration APIs.
//! - **Loader**: manifest and project YAML loading plus validation.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod api;
pub mod configuration;
pub mod entity;
pub mod idutils;
pub mod loader;
pub mod parameter;
pub mod template;
