//! Automation resources, upserted by id.

use std::collections::BTreeMap;

use serde_json::Value;
use stratum_config::configuration::{AutomationResource, Configuration};
use stratum_config::entity::ResolvedEntity;
use stratum_config::idutils;

use super::{DeployContext, entity_name, remote_error, resolved};
use crate::error::DeployError;

/// Deploys an automation resource under its origin object id, or under the
/// id derived from its coordinate.
///
/// # Errors
///
/// Returns an error if the platform rejects the resource.
pub fn deploy(
    ctx: &mut DeployContext<'_>,
    config: &Configuration,
    resource: AutomationResource,
    parameters: &BTreeMap<String, Value>,
    payload: &Value,
) -> Result<ResolvedEntity, DeployError> {
    let id = config
        .origin_object_id
        .clone()
        .unwrap_or_else(|| idutils::automation_id(&config.coordinate));

    if ctx.dry_run {
        tracing::debug!(coordinate = %config.coordinate, %resource, id = %id, "dry run: skipping upsert");
        let name = entity_name(config, parameters);
        return Ok(resolved(config, parameters, id, name));
    }

    let remote = ctx
        .clients
        .automation
        .upsert(resource, &id, payload)
        .map_err(|e| remote_error(config, e))?;
    tracing::info!(coordinate = %config.coordinate, %resource, id = %remote.id, "automation resource deployed");
    Ok(resolved(config, parameters, remote.id, remote.name))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use stratum_common::types::Coordinate;
    use stratum_config::api::ApiRegistry;
    use stratum_config::configuration::ConfigType;
    use stratum_config::entity::EntityMap;
    use stratum_config::template::Template;

    use super::*;
    use crate::deployer::test_support::clients;

    fn workflow(origin: Option<&str>) -> Configuration {
        Configuration {
            coordinate: Coordinate::new("p", "workflow", "wf"),
            group: "default".into(),
            environment: "dev".into(),
            config_type: ConfigType::Automation {
                resource: AutomationResource::Workflow,
            },
            parameters: BTreeMap::new(),
            skip: false,
            origin_object_id: origin.map(str::to_string),
            template: Template::new("t", "{}"),
        }
    }

    #[test]
    fn id_is_derived_from_coordinate_unless_origin_is_set() {
        let (recorder, clients) = clients();
        let apis = ApiRegistry::builtin();
        let mut entities = EntityMap::new();
        let mut ctx = DeployContext {
            clients: &clients,
            apis: &apis,
            entities: &mut entities,
            dry_run: false,
        };
        let derived = idutils::automation_id(&workflow(None).coordinate);
        let a = deploy(&mut ctx, &workflow(None), AutomationResource::Workflow, &BTreeMap::new(), &json!({}))
            .expect("deploy");
        let b = deploy(&mut ctx, &workflow(Some("abc")), AutomationResource::Workflow, &BTreeMap::new(), &json!({}))
            .expect("deploy");
        assert_eq!(a.properties["id"], json!(derived));
        assert_eq!(b.properties["id"], json!("abc"));
        assert_eq!(
            recorder.calls(),
            vec![format!("automation:workflow:{derived}"), "automation:workflow:abc".to_string()]
        );
    }
}
