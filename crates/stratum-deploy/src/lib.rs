//! # stratum-deploy
//!
//! Deploys sorted configurations and deletes remote objects.
//!
//! Handles:
//! - **Dispatcher**: the sequential per-environment deploy loop and the
//!   parallel fan-out over environments.
//! - **Resolve**: parameter ordering and resolution against the entity store.
//! - **Deployer**: one module per configuration type family.
//! - **Delete**: removal of remote objects named in a delete file.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod delete;
pub mod deployer;
pub mod dispatcher;
pub mod error;
pub mod resolve;

pub use dispatcher::{DeployOptions, deploy_configs, deploy_environments};
pub use error::DeployError;
