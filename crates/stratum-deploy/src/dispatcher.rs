//! Deployment dispatcher.
//!
//! Walks one environment's sorted configurations strictly in order,
//! resolving each against the entities deployed before it. Environments
//! are independent and deploy in parallel, each with its own entity store.

use std::collections::BTreeMap;

use rayon::prelude::*;
use stratum_client::clients::ClientSet;
use stratum_common::config::StratumConfig;
use stratum_config::api::ApiRegistry;
use stratum_config::configuration::Configuration;
use stratum_config::entity::{EntityMap, ResolvedEntity};

use crate::deployer::{self, DeployContext};
use crate::error::DeployError;
use crate::resolve::resolve_parameters;

/// Knobs of a deploy run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeployOptions {
    /// Keep going after a configuration failed.
    pub continue_on_error: bool,
    /// Resolve and render everything but make no client calls. Implies
    /// continuing after failures.
    pub dry_run: bool,
    /// Treat references to skipped configurations as errors.
    pub strict_skipped_references: bool,
}

impl From<&StratumConfig> for DeployOptions {
    fn from(config: &StratumConfig) -> Self {
        Self {
            continue_on_error: config.continue_on_error,
            dry_run: config.dry_run,
            strict_skipped_references: config.strict_skipped_references,
        }
    }
}

impl DeployOptions {
    const fn fail_fast(self) -> bool {
        !self.continue_on_error && !self.dry_run
    }
}

/// Deploys the sorted configurations of one environment.
///
/// Returns every error collected. Without `continue_on_error` (and outside
/// dry runs) the run stops at the first failing configuration.
pub fn deploy_configs(
    clients: &ClientSet,
    apis: &ApiRegistry,
    sorted: &[Configuration],
    options: DeployOptions,
) -> Vec<DeployError> {
    let mut entities = EntityMap::new();
    deploy_configs_into(&mut entities, clients, apis, sorted, options)
}

/// Like [`deploy_configs`], recording every resolved entity in `entities`.
pub fn deploy_configs_into(
    entities: &mut EntityMap,
    clients: &ClientSet,
    apis: &ApiRegistry,
    sorted: &[Configuration],
    options: DeployOptions,
) -> Vec<DeployError> {
    let mut errors = Vec::new();

    for config in sorted {
        if config.skip {
            tracing::warn!(
                coordinate = %config.coordinate,
                environment = %config.environment,
                "skipping deployment"
            );
            entities.put(ResolvedEntity::skipped(config.coordinate.clone()));
            continue;
        }

        tracing::info!(
            coordinate = %config.coordinate,
            environment = %config.environment,
            dry_run = options.dry_run,
            "deploying"
        );
        match deploy_one(entities, clients, apis, config, options) {
            Ok(entity) => entities.put(entity),
            Err(err) => {
                tracing::error!(
                    coordinate = %config.coordinate,
                    environment = %config.environment,
                    error = %err,
                    "deployment failed"
                );
                errors.push(err);
                if options.fail_fast() {
                    break;
                }
            }
        }
    }
    errors
}

fn deploy_one(
    entities: &mut EntityMap,
    clients: &ClientSet,
    apis: &ApiRegistry,
    config: &Configuration,
    options: DeployOptions,
) -> Result<ResolvedEntity, DeployError> {
    let parameters = resolve_parameters(config, entities, options.strict_skipped_references)?;
    let payload = config
        .template
        .render(&parameters)
        .map_err(|source| DeployError::Render {
            coordinate: config.coordinate.clone(),
            environment: config.environment.clone(),
            source,
        })?;
    if !config.config_type.is_deployable() {
        return Ok(deployer::reference_only(config, &parameters));
    }

    let mut ctx = DeployContext {
        clients,
        apis,
        entities,
        dry_run: options.dry_run,
    };
    deployer::deploy(&mut ctx, config, &parameters, &payload)
}

/// Deploys several environments in parallel.
///
/// Each environment is deployed by [`deploy_configs`] with its own clients
/// and entity store. An environment without clients yields a single
/// [`DeployError::MissingClients`].
pub fn deploy_environments(
    clients: &BTreeMap<String, ClientSet>,
    apis: &ApiRegistry,
    sorted: &BTreeMap<String, Vec<Configuration>>,
    options: DeployOptions,
) -> BTreeMap<String, Vec<DeployError>> {
    sorted
        .par_iter()
        .map(|(environment, configs)| {
            let errors = clients.get(environment).map_or_else(
                || {
                    vec![DeployError::MissingClients {
                        environment: environment.clone(),
                    }]
                },
                |set| deploy_configs(set, apis, configs, options),
            );
            tracing::info!(
                environment = %environment,
                configs = configs.len(),
                errors = errors.len(),
                "environment finished"
            );
            (environment.clone(), errors)
        })
        .collect()
}
