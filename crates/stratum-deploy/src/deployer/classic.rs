//! Classic configuration APIs, upserted by name.

use std::collections::BTreeMap;

use serde_json::Value;
use stratum_config::configuration::Configuration;
use stratum_config::entity::ResolvedEntity;

use super::{DeployContext, entity_name, remote_error, resolved};
use crate::error::DeployError;

/// Deploys a classic API object.
///
/// # Errors
///
/// Returns an error if the API is not registered, the name was already
/// deployed through a unique-name API, or the platform rejects the object.
pub fn deploy(
    ctx: &mut DeployContext<'_>,
    config: &Configuration,
    api_id: &str,
    parameters: &BTreeMap<String, Value>,
    payload: &Value,
) -> Result<ResolvedEntity, DeployError> {
    let Some(api) = ctx.apis.get(api_id) else {
        return Err(DeployError::UnknownType {
            coordinate: config.coordinate.clone(),
            environment: config.environment.clone(),
            type_name: api_id.to_string(),
        });
    };

    let name = entity_name(config, parameters);
    let unique = !api.non_unique_name && !api.single_configuration;
    if unique && ctx.entities.contains_name(&api.id, &name) {
        return Err(DeployError::DuplicateName {
            coordinate: config.coordinate.clone(),
            environment: config.environment.clone(),
            api: api.id.clone(),
            name,
        });
    }

    let entity = if ctx.dry_run {
        tracing::debug!(coordinate = %config.coordinate, api = %api.id, name = %name, "dry run: skipping upsert");
        resolved(config, parameters, config.coordinate.config_id.clone(), name.clone())
    } else {
        let remote = ctx
            .clients
            .classic
            .upsert_by_name(api, &name, payload)
            .map_err(|e| remote_error(config, e))?;
        tracing::info!(coordinate = %config.coordinate, id = %remote.id, "classic object deployed");
        resolved(config, parameters, remote.id, remote.name)
    };

    // Only names that made it to the platform block later configurations.
    if unique {
        let _ = ctx.entities.register_name(&api.id, &name);
    }
    Ok(entity)
}
