//! Filter segments, upserted by external id.

use std::collections::BTreeMap;

use serde_json::Value;
use stratum_config::configuration::Configuration;
use stratum_config::entity::ResolvedEntity;
use stratum_config::idutils;

use super::{DeployContext, entity_name, remote_error, resolved};
use crate::error::DeployError;

/// Deploys a filter segment.
///
/// # Errors
///
/// Returns an error if the platform rejects the segment.
pub fn deploy(
    ctx: &mut DeployContext<'_>,
    config: &Configuration,
    parameters: &BTreeMap<String, Value>,
    payload: &Value,
) -> Result<ResolvedEntity, DeployError> {
    let external_id = idutils::external_id(&config.coordinate);
    let name = entity_name(config, parameters);

    if ctx.dry_run {
        tracing::debug!(coordinate = %config.coordinate, "dry run: skipping upsert");
        let id = config.origin_object_id.clone().unwrap_or(external_id);
        return Ok(resolved(config, parameters, id, name));
    }

    let remote = ctx
        .clients
        .segments
        .upsert(&external_id, config.origin_object_id.as_deref(), payload)
        .map_err(|e| remote_error(config, e))?;
    tracing::info!(coordinate = %config.coordinate, uid = %remote.id, "segment deployed");
    Ok(resolved(config, parameters, remote.id, name))
}
