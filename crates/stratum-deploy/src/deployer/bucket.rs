//! Storage buckets, upserted by bucket name.

use std::collections::BTreeMap;

use serde_json::Value;
use stratum_config::configuration::Configuration;
use stratum_config::entity::ResolvedEntity;
use stratum_config::idutils;

use super::{DeployContext, remote_error, resolved};
use crate::error::DeployError;

/// Deploys a bucket definition. The bucket name is the origin object id
/// when set, otherwise derived from the coordinate.
///
/// # Errors
///
/// Returns an error if the platform rejects the bucket.
pub fn deploy(
    ctx: &mut DeployContext<'_>,
    config: &Configuration,
    parameters: &BTreeMap<String, Value>,
    payload: &Value,
) -> Result<ResolvedEntity, DeployError> {
    let bucket_name = config
        .origin_object_id
        .clone()
        .unwrap_or_else(|| idutils::bucket_name(&config.coordinate));

    if ctx.dry_run {
        tracing::debug!(coordinate = %config.coordinate, bucket = %bucket_name, "dry run: skipping upsert");
        return Ok(resolved(config, parameters, bucket_name.clone(), bucket_name));
    }

    let remote = ctx
        .clients
        .buckets
        .upsert(&bucket_name, payload)
        .map_err(|e| remote_error(config, e))?;
    tracing::info!(coordinate = %config.coordinate, bucket = %remote.id, "bucket deployed");
    Ok(resolved(config, parameters, remote.id, remote.name))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use stratum_client::clients::ClientSet;
    use stratum_common::types::Coordinate;
    use stratum_config::api::ApiRegistry;
    use stratum_config::configuration::ConfigType;
    use stratum_config::entity::EntityMap;
    use stratum_config::template::Template;

    use super::*;
    use crate::deployer::test_support::clients;

    fn bucket(origin: Option<&str>) -> Configuration {
        Configuration {
            coordinate: Coordinate::new("Infra", "bucket", "Logs Archive"),
            group: "default".into(),
            environment: "dev".into(),
            config_type: ConfigType::Bucket,
            parameters: BTreeMap::new(),
            skip: false,
            origin_object_id: origin.map(str::to_string),
            template: Template::new("t", "{}"),
        }
    }

    fn context<'a>(
        clients: &'a ClientSet,
        apis: &'a ApiRegistry,
        entities: &'a mut EntityMap,
        dry_run: bool,
    ) -> DeployContext<'a> {
        DeployContext {
            clients,
            apis,
            entities,
            dry_run,
        }
    }

    #[test]
    fn bucket_name_is_derived_from_coordinate() {
        let (recorder, clients) = clients();
        let apis = ApiRegistry::builtin();
        let mut entities = EntityMap::new();
        let mut ctx = context(&clients, &apis, &mut entities, false);
        let entity = deploy(&mut ctx, &bucket(None), &BTreeMap::new(), &json!({}))
            .expect("deploy");
        assert_eq!(entity.properties["id"], json!("infra_logs_archive"));
        assert_eq!(entity.properties["name"], json!("infra_logs_archive"));
        assert_eq!(recorder.calls(), vec!["bucket:infra_logs_archive"]);
    }

    #[test]
    fn origin_object_id_names_the_bucket() {
        let (recorder, clients) = clients();
        let apis = ApiRegistry::builtin();
        let mut entities = EntityMap::new();
        let mut ctx = context(&clients, &apis, &mut entities, false);
        let entity = deploy(&mut ctx, &bucket(Some("legacy_logs")), &BTreeMap::new(), &json!({}))
            .expect("deploy");
        assert_eq!(entity.properties["id"], json!("legacy_logs"));
        assert_eq!(recorder.calls(), vec!["bucket:legacy_logs"]);
    }

    #[test]
    fn dry_run_returns_bucket_name_without_calls() {
        let (recorder, clients) = clients();
        let apis = ApiRegistry::builtin();
        let mut entities = EntityMap::new();
        let mut ctx = context(&clients, &apis, &mut entities, true);
        let derived = deploy(&mut ctx, &bucket(None), &BTreeMap::new(), &json!({}))
            .expect("deploy");
        let origin = deploy(&mut ctx, &bucket(Some("legacy_logs")), &BTreeMap::new(), &json!({}))
            .expect("deploy");
        assert_eq!(derived.properties["id"], json!("infra_logs_archive"));
        assert_eq!(origin.properties["id"], json!("legacy_logs"));
        assert!(recorder.calls().is_empty());
    }
}
